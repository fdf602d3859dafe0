//! Structural query keys.

use clinic_core::payload::ListFilters;
use std::collections::BTreeMap;
use std::fmt;

/// The backend resource a key belongs to. Always the first component of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Appointments,
    Drugs,
    Hospitals,
    Lecturers,
    MedicalRecords,
    Orders,
    Patients,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Appointments => "appointments",
            ResourceKind::Drugs => "drugs",
            ResourceKind::Hospitals => "hospitals",
            ResourceKind::Lecturers => "lecturers",
            ResourceKind::MedicalRecords => "medical-records",
            ResourceKind::Orders => "orders",
            ResourceKind::Patients => "patients",
        }
    }
}

/// One component of a key after the resource kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Text(String),
    Id(i64),
    /// Filter name to rendered value. Absent filters are never stored.
    Filters(BTreeMap<String, String>),
}

/// Cache key: a resource kind followed by an ordered list of parts.
///
/// Equality and hashing are structural, so two keys built from equal filter records are the
/// same key no matter how or when they were built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    kind: ResourceKind,
    parts: Vec<KeyPart>,
}

impl QueryKey {
    /// The kind-wide prefix; invalidating it touches every key of `kind`.
    pub fn kind(kind: ResourceKind) -> Self {
        Self {
            kind,
            parts: Vec::new(),
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.parts.push(KeyPart::Text(text.to_owned()));
        self
    }

    pub fn id(mut self, id: i64) -> Self {
        self.parts.push(KeyPart::Id(id));
        self
    }

    pub fn filters<F: ListFilters>(mut self, filters: &F) -> Self {
        let map = filters.query_params().into_pairs().into_iter().collect();
        self.parts.push(KeyPart::Filters(map));
        self
    }

    pub fn resource(&self) -> ResourceKind {
        self.kind
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    /// Whether `prefix` names this key or one of its ancestors.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.kind == prefix.kind && self.parts.starts_with(&prefix.parts)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.kind.as_str())?;
        for part in &self.parts {
            match part {
                KeyPart::Text(text) => write!(f, ", {text}")?,
                KeyPart::Id(id) => write!(f, ", #{id}")?,
                KeyPart::Filters(map) => {
                    let rendered: Vec<String> =
                        map.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    write!(f, ", {{{}}}", rendered.join("&"))?;
                }
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::models::{DrugCategory, DrugFilters};
    use std::collections::HashSet;

    #[test]
    fn test_keys_from_equal_filters_are_equal() {
        let a = DrugFilters {
            search: Some("atropine".into()),
            category: Some(DrugCategory::EyeDrops),
            in_stock: None,
        };
        let b = a.clone();
        let ka = QueryKey::kind(ResourceKind::Drugs).text("list").filters(&a);
        let kb = QueryKey::kind(ResourceKind::Drugs).text("list").filters(&b);
        assert_eq!(ka, kb);

        let mut set = HashSet::new();
        set.insert(ka);
        assert!(set.contains(&kb));
    }

    #[test]
    fn test_absent_and_blank_filters_do_not_change_the_key() {
        let blank = DrugFilters {
            search: Some("  ".into()),
            ..Default::default()
        };
        let empty = DrugFilters::default();
        assert_eq!(
            QueryKey::kind(ResourceKind::Drugs).filters(&blank),
            QueryKey::kind(ResourceKind::Drugs).filters(&empty)
        );
    }

    #[test]
    fn test_prefix_matching() {
        let detail = QueryKey::kind(ResourceKind::Drugs).text("detail").id(3);
        assert!(detail.starts_with(&QueryKey::kind(ResourceKind::Drugs)));
        assert!(detail.starts_with(&QueryKey::kind(ResourceKind::Drugs).text("detail")));
        assert!(!detail.starts_with(&QueryKey::kind(ResourceKind::Patients)));
        assert!(!detail.starts_with(&QueryKey::kind(ResourceKind::Drugs).text("list")));
    }

    #[test]
    fn test_display() {
        let key = QueryKey::kind(ResourceKind::MedicalRecords)
            .text("patient")
            .id(12);
        assert_eq!(key.to_string(), "[medical-records, patient, #12]");
    }
}
