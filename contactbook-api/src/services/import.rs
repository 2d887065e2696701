use super::{require_user_id, safe_file_stem, InterchangeService, ServiceError};
use interchange::sanitize::{clean_phone_number, sanitize_string};
use interchange::{photo, ContactFormat, ContactRecord, PhotoPayload};
use shared_types::NewContact;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Problems with individual contacts that did not stop the import
    pub errors: Vec<String>,
}

impl InterchangeService {
    /// Parses an uploaded CSV or vCard file and stores its valid contacts for
    /// `user_id`.
    ///
    /// Records without a name or phone are dropped. Inline photos are
    /// normalized and uploaded; a photo that fails only loses the photo.
    pub async fn import_contacts(
        &self,
        filename: &str,
        content: &[u8],
        user_id: &str,
    ) -> Result<ImportSummary, ServiceError> {
        let user_id = require_user_id(user_id)?;
        let format = ContactFormat::from_filename(filename)?;
        let records = interchange::parse_contacts(format, content)?;

        info!(
            "Parsed {} candidate contacts from {} for user {}",
            records.len(),
            filename,
            user_id
        );

        let mut errors = Vec::new();
        let mut contacts = Vec::new();

        for record in records {
            let Some((name, phone)) = required_fields(&record) else {
                continue;
            };

            let photo_url = match &record.photo {
                Some(PhotoPayload::Inline { data_base64, .. }) => {
                    match self.store_inline_photo(user_id, data_base64).await {
                        Ok(url) => Some(url),
                        Err(e) => {
                            warn!("Skipping photo for contact {}: {}", name, e);
                            errors.push(format!("Photo for {} was skipped: {}", name, e));
                            None
                        }
                    }
                }
                Some(PhotoPayload::Url { url }) if self.blobs.serves_url(url) => Some(url.clone()),
                Some(PhotoPayload::Url { url }) => {
                    warn!("Ignoring photo of contact {} at untrusted URL {}", name, url);
                    errors.push(format!(
                        "Photo for {} was skipped: {} is not a stored photo",
                        name, url
                    ));
                    None
                }
                None => None,
            };

            contacts.push(NewContact {
                user_id: user_id.to_string(),
                name,
                phone,
                email: sanitize_string(record.email.as_deref()),
                birthday: record.birthday,
                category_ids: record
                    .category_ids
                    .iter()
                    .filter_map(|id| sanitize_string(Some(id)))
                    .collect(),
                photo_url,
            });
        }

        if contacts.is_empty() {
            return Err(ServiceError::NoValidContacts);
        }

        let imported = self.contacts.insert_many(&contacts).await?;
        info!("Imported {} contacts for user {}", imported, user_id);

        Ok(ImportSummary { imported, errors })
    }

    async fn store_inline_photo(&self, user_id: &str, data_base64: &str) -> anyhow::Result<String> {
        let data = data_base64.to_string();
        let options = self.photo_options;
        let jpeg = tokio::task::spawn_blocking(move || photo::process_base64(&data, &options))
            .await
            .map_err(|e| anyhow::anyhow!("Photo processing task failed: {}", e))??;

        let key = format!(
            "{}/{}.jpg",
            safe_file_stem(user_id),
            uuid::Uuid::new_v4()
        );
        self.blobs.put(&key, jpeg, photo::JPEG_MIME).await?;

        Ok(self.blobs.public_url(&key))
    }
}

/// Sanitized name and phone, or `None` if either is missing.
fn required_fields(record: &ContactRecord) -> Option<(String, String)> {
    let name = sanitize_string(record.name.as_deref())?;
    let phone = clean_phone_number(record.phone.as_deref())?;
    Some((name, phone))
}
