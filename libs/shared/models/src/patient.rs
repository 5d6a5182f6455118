use serde::{Deserialize, Serialize};

/// One registry row. `external_id` is the messaging recipient and the only
/// unique key; names may collide or be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub display_name: String,
    pub real_name: String,
    pub external_id: String,
}

impl PatientRecord {
    pub fn new(display_name: impl Into<String>, real_name: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            real_name: real_name.into(),
            external_id: external_id.into(),
        }
    }

    /// Name used when addressing the patient: the clinician-assigned name if
    /// present, otherwise the profile name.
    pub fn preferred_name(&self) -> &str {
        if self.real_name.trim().is_empty() {
            self.display_name.trim()
        } else {
            self.real_name.trim()
        }
    }
}
