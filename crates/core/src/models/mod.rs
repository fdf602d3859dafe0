//! Resource models, list filters and request bodies.
//!
//! Resources are backend-owned and only ever decoded here. Bodies are the normalised shapes the
//! schemas produce and the clients encode; they never carry the target id of an update (see
//! [`crate::Update`]).

/// Closed enumeration with a fixed wire spelling.
pub trait WireEnum: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_wire(self) -> &'static str;

    fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_wire() == value)
    }

    /// Comma-separated list of accepted spellings, for error messages.
    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_wire())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::models::WireEnum for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_wire(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::models::WireEnum::as_wire(*self))
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalised = s.trim().to_ascii_uppercase().replace('-', "_");
                <Self as $crate::models::WireEnum>::from_wire(&normalised).ok_or_else(|| {
                    format!(
                        "unknown {} `{}`, expected one of: {}",
                        stringify!($name),
                        s,
                        <Self as $crate::models::WireEnum>::expected()
                    )
                })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str($crate::models::WireEnum::as_wire(*self))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                <Self as $crate::models::WireEnum>::from_wire(&s).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} `{}`, expected one of: {}",
                        stringify!($name),
                        s,
                        <Self as $crate::models::WireEnum>::expected()
                    ))
                })
            }
        }
    };
}

pub mod appointment;
pub mod drug;
pub mod hospital;
pub mod lecturer;
pub mod medical_record;
pub mod order;
pub mod patient;
pub mod predict;

pub use appointment::{
    Appointment, AppointmentFilters, AppointmentStatus, AppointmentType, FollowUpBody,
};
pub use drug::{Drug, DrugBody, DrugCategory, DrugFilters};
pub use hospital::{Hospital, HospitalBody, HospitalFilters};
pub use lecturer::{Lecturer, LecturerBody, LecturerFilters};
pub use medical_record::{
    FullRecordBody, MedicalRecord, MedicalRecordFilters, PrescriptionItem, RecordAttachment,
    RecordCheck, RecordFileType, RecordInitBody, RecordStatus,
};
pub use order::{Order, OrderFilters, OrderItem, OrderStatus};
pub use patient::{Gender, Patient, PatientBody, PatientFilters};
pub use predict::{Prediction, PredictionResult};

/// Body of every `PUT /:id/status` endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StatusBody<S> {
    pub status: S,
}

impl<S: serde::Serialize> crate::payload::Payload for StatusBody<S> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_enum_serde_uses_wire_spelling() {
        let json = serde_json::to_string(&DrugCategory::EyeDrops).unwrap();
        assert_eq!(json, "\"EYE_DROPS\"");
        let parsed: DrugCategory = serde_json::from_str("\"OINTMENT\"").unwrap();
        assert_eq!(parsed, DrugCategory::Ointment);
    }

    #[test]
    fn test_wire_enum_rejects_unknown_value() {
        let err = serde_json::from_str::<AppointmentStatus>("\"INVALID\"").unwrap_err();
        assert!(err.to_string().contains("expected one of: PENDING"));
    }

    #[test]
    fn test_wire_enum_from_str_is_lenient_on_case() {
        assert_eq!("lab-report".parse::<RecordFileType>(), Ok(RecordFileType::LabReport));
        assert!("scan".parse::<RecordFileType>().is_err());
    }
}
