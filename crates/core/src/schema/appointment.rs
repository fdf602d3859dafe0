use super::{opt_text, FieldReader, FormBody, RawForm, StatusForm, ValidationErrors};
use crate::models::{AppointmentStatus, AppointmentType, FollowUpBody, WireEnum};
use chrono::SecondsFormat;

/// Form behind `PUT /hospital/appointments/:id/status`.
pub type AppointmentStatusForm = StatusForm<AppointmentStatus>;

impl FormBody for FollowUpBody {
    const FIELDS: &'static [&'static str] = &[
        "appointment_id",
        "scheduled_at",
        "appointment_type",
        "reason",
        "notes",
    ];

    fn from_form(form: &RawForm) -> Result<Self, ValidationErrors> {
        let mut r = FieldReader::new(form, Self::FIELDS);
        let appointment_id = r.required_id("appointment_id");
        let scheduled_at = r.required_datetime("scheduled_at");
        let appointment_type = r.required_enum::<AppointmentType>("appointment_type");
        let reason = r.optional_text("reason");
        let notes = r.optional_text("notes");

        r.finish(|| {
            Some(FollowUpBody {
                appointment_id: appointment_id?,
                scheduled_at: scheduled_at?,
                appointment_type: appointment_type?,
                reason,
                notes,
            })
        })
    }

    fn to_form(&self) -> RawForm {
        RawForm::new()
            .with("appointment_id", self.appointment_id)
            .with(
                "scheduled_at",
                self.scheduled_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            )
            .with("appointment_type", self.appointment_type.as_wire())
            .with("reason", opt_text(&self.reason))
            .with("notes", opt_text(&self.notes))
    }
}
