use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Response body of `POST /contacts/import`
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportResponse {
    pub message: String,
    pub count: usize,
    /// Per-contact problems that did not stop the import (photo failures)
    pub errors: Vec<String>,
}

/// Response body of `POST /contacts/{id}/photo`
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PhotoUploadResponse {
    pub photo_url: String,
}

/// Which photo representation a CSV export carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CsvPhotoMode {
    /// `photo_base64` column with a data URI
    #[default]
    Inline,
    /// `photo_url` column with the stored reference
    Url,
}
