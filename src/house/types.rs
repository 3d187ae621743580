use serde::{Deserialize, Serialize};

/// Request payload for creating or replacing a house
#[derive(Debug, Clone, Deserialize)]
pub struct HouseRequest {
    #[serde(rename = "houseName")]
    pub name: String,
    #[serde(rename = "accessCode")]
    pub access_code: String,
    #[serde(rename = "houseNotes", default)]
    pub notes: String,
}

/// Query string for house search; `?houseName=` or `?name=`
#[derive(Debug, Deserialize)]
pub struct HouseSearchQuery {
    #[serde(rename = "houseName", alias = "name")]
    pub house_name: Option<String>,
}

/// Response for house creation
#[derive(Debug, Serialize, Deserialize)]
pub struct HouseCreatedResponse {
    pub message: String,
    pub id: String,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
