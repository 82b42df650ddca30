// Subject domain model
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    pub subject_id: String,
    pub name: String,
}

impl Subject {
    pub fn new(subject_id: String) -> Self {
        let name = Self::format_name(&subject_id);
        Self { subject_id, name }
    }

    fn format_name(id: &str) -> String {
        // "subject_001" -> "Subject 001"
        let spaced = id.trim_end_matches('_').replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => spaced,
        }
    }
}
