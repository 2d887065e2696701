use crate::error::ApiError;
use actix_multipart::Multipart;
use futures::StreamExt;
use std::collections::HashMap;

/// Upper bound for a single uploaded file
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Text fields and files of a multipart form, keyed by field name.
#[derive(Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Reads the whole form. Parts with a filename are files, the rest are text.
pub async fn read_form(mut payload: Multipart) -> Result<MultipartForm, ApiError> {
    let mut form = MultipartForm::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;

        let disposition = field.content_disposition();
        let Some(name) = disposition.get_name().map(String::from) else {
            continue;
        };
        let filename = disposition.get_filename().map(String::from);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(ApiError::BadRequest(format!(
                    "Upload exceeds {} bytes",
                    MAX_UPLOAD_BYTES
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match filename {
            Some(filename) => {
                form.files.insert(name, UploadedFile { filename, bytes });
            }
            None => {
                let value = String::from_utf8(bytes).map_err(|_| {
                    ApiError::BadRequest(format!("Field {} is not valid UTF-8", name))
                })?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}
