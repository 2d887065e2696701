//! Import/export orchestration on top of the interchange codecs.
//!
//! [`InterchangeService`] owns no state of its own; it drives the codecs and
//! the photo pipeline against the injected [`ContactStore`] and [`BlobStore`].

pub mod export;
pub mod import;
pub mod photo_upload;

pub use export::{ExportDocument, ExportFormat};
pub use import::ImportSummary;

use crate::storage::{BlobStore, ContactStore};
use interchange::{InterchangeError, PhotoOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap());

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("User ID is required")]
    MissingUserId,

    #[error("Unsupported file type: {0}. Please upload a .csv or .vcf file")]
    UnsupportedFileType(String),

    #[error("No valid contacts found in file")]
    NoValidContacts,

    #[error("No contacts found")]
    NoContactsFound,

    #[error("Contact not found")]
    ContactNotFound,

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Interchange(InterchangeError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<InterchangeError> for ServiceError {
    fn from(err: InterchangeError) -> Self {
        match err {
            InterchangeError::UnsupportedFileType(name) => ServiceError::UnsupportedFileType(name),
            other => ServiceError::Interchange(other),
        }
    }
}

#[derive(Clone)]
pub struct InterchangeService {
    contacts: Arc<dyn ContactStore>,
    blobs: Arc<dyn BlobStore>,
    photo_options: PhotoOptions,
}

impl InterchangeService {
    pub fn new(
        contacts: Arc<dyn ContactStore>,
        blobs: Arc<dyn BlobStore>,
        photo_options: PhotoOptions,
    ) -> Self {
        Self {
            contacts,
            blobs,
            photo_options,
        }
    }

    pub fn contacts(&self) -> &Arc<dyn ContactStore> {
        &self.contacts
    }
}

/// Replaces everything outside `[A-Za-z0-9_-]` with `_`, for file names and
/// storage keys built from caller input.
pub fn safe_file_stem(value: &str) -> String {
    UNSAFE_CHARS.replace_all(value.trim(), "_").into_owned()
}

fn require_user_id(user_id: &str) -> Result<&str, ServiceError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        Err(ServiceError::MissingUserId)
    } else {
        Ok(user_id)
    }
}
