use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod contact;
pub mod interchange;

pub use contact::{
    Contact, ContactQuery, ContactRecord, ContactsResponse, NewContact, PhotoPayload,
};
pub use interchange::{CsvPhotoMode, ImportResponse, PhotoUploadResponse};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
