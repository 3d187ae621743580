use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored house record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseModel {
    pub id: String, // UUID v4, immutable once assigned
    #[serde(rename = "houseName")]
    pub name: String,
    #[serde(rename = "accessCode")]
    pub access_code: String,
    #[serde(rename = "houseNotes")]
    pub notes: String,
}

impl HouseModel {
    /// Creates a new house model with generated ID
    pub fn new(name: String, access_code: String, notes: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            access_code,
            notes,
        }
    }

    /// Case-insensitive substring match on the name; `needle` must already be lowercase
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}
