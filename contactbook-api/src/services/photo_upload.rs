use super::{require_user_id, safe_file_stem, InterchangeService, ServiceError};
use interchange::photo;
use tracing::info;

impl InterchangeService {
    /// Normalizes an uploaded image and makes it the contact's photo.
    ///
    /// Unlike import, a bad image here is the request's error. The stored key
    /// is stable per contact, so a new upload replaces the previous file.
    pub async fn upload_contact_photo(
        &self,
        user_id: &str,
        contact_id: i64,
        bytes: Vec<u8>,
    ) -> Result<String, ServiceError> {
        let user_id = require_user_id(user_id)?;
        if bytes.is_empty() {
            return Err(ServiceError::InvalidInput("No photo uploaded".to_string()));
        }
        if self.contacts.get(user_id, contact_id).await?.is_none() {
            return Err(ServiceError::ContactNotFound);
        }

        let options = self.photo_options;
        let jpeg = tokio::task::spawn_blocking(move || photo::process_bytes(&bytes, &options))
            .await
            .map_err(|e| anyhow::anyhow!("Photo processing task failed: {}", e))??;

        let key = format!("{}/contact-{}.jpg", safe_file_stem(user_id), contact_id);
        self.blobs.put(&key, jpeg, photo::JPEG_MIME).await?;
        let url = self.blobs.public_url(&key);

        if !self.contacts.set_photo_url(user_id, contact_id, &url).await? {
            return Err(ServiceError::ContactNotFound);
        }

        info!("Updated photo of contact {} for user {}", contact_id, user_id);
        Ok(url)
    }
}
