use super::{require_user_id, safe_file_stem, InterchangeService, ServiceError};
use futures::stream::{self, StreamExt};
use interchange::{photo, to_csv, to_vcf, ContactFormat, ContactRecord, CsvLayout, PhotoPayload};
use shared_types::{ContactQuery, CsvPhotoMode};
use tracing::{info, warn};

/// Photo downloads in flight at once during a single export
const MAX_CONCURRENT_FETCHES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv(CsvPhotoMode),
    Vcf,
}

impl ExportFormat {
    fn contact_format(&self) -> ContactFormat {
        match self {
            ExportFormat::Csv(_) => ContactFormat::Csv,
            ExportFormat::Vcf => ContactFormat::Vcf,
        }
    }

    fn embeds_photos(&self) -> bool {
        !matches!(self, ExportFormat::Csv(CsvPhotoMode::Url))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

impl InterchangeService {
    /// Builds a CSV or vCard document from a user's contacts.
    ///
    /// Photos are fetched and embedded unless the CSV export asks for plain
    /// references. A photo that cannot be fetched is left out; the contact
    /// is still exported.
    pub async fn export_contacts(
        &self,
        user_id: &str,
        format: ExportFormat,
        query: &ContactQuery,
        filename: Option<&str>,
    ) -> Result<ExportDocument, ServiceError> {
        let user_id = require_user_id(user_id)?;

        let contacts = self.contacts.query(user_id, query).await?;
        if contacts.is_empty() {
            return Err(ServiceError::NoContactsFound);
        }

        let records: Vec<ContactRecord> = contacts.into_iter().map(ContactRecord::from).collect();
        let records = if format.embeds_photos() {
            stream::iter(records)
                .map(|record| self.embed_photo(record))
                .buffered(MAX_CONCURRENT_FETCHES)
                .collect::<Vec<_>>()
                .await
        } else {
            records
        };

        let body = match format {
            ExportFormat::Csv(CsvPhotoMode::Inline) => {
                to_csv(&records, CsvLayout::InlinePhotos.fields())?
            }
            ExportFormat::Csv(CsvPhotoMode::Url) => to_csv(&records, CsvLayout::References.fields())?,
            ExportFormat::Vcf => to_vcf(&records),
        };

        let contact_format = format.contact_format();
        info!(
            "Exported {} contacts for user {} as {}",
            records.len(),
            user_id,
            contact_format.extension()
        );

        Ok(ExportDocument {
            filename: export_filename(user_id, contact_format, filename),
            content_type: contact_format.mime_type(),
            body,
        })
    }

    /// Swaps a photo URL for the inline image, or drops the photo if it
    /// cannot be fetched.
    async fn embed_photo(&self, mut record: ContactRecord) -> ContactRecord {
        let Some(url) = record.photo_url().map(String::from) else {
            return record;
        };
        if !self.blobs.serves_url(&url) {
            warn!("Exporting contact without photo, {} is not a stored photo", url);
            record.photo = None;
            return record;
        }

        record.photo = match self.blobs.fetch(&url).await {
            Ok(bytes) => Some(PhotoPayload::Inline {
                mime_type: photo::mime_for_url(&url).to_string(),
                data_base64: photo::encode_base64(&bytes),
            }),
            Err(e) => {
                warn!("Exporting contact without photo, fetch of {} failed: {}", url, e);
                None
            }
        };

        record
    }
}

/// Caller-supplied name reduced to safe characters, or
/// `contacts_<user>_<date>`, with the format's extension.
pub fn export_filename(user_id: &str, format: ContactFormat, requested: Option<&str>) -> String {
    let extension = format.extension();

    let stem = requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let suffix = format!(".{}", extension);
            let without_ext = if name.to_ascii_lowercase().ends_with(&suffix) {
                &name[..name.len() - suffix.len()]
            } else {
                name
            };
            safe_file_stem(without_ext)
        })
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| {
            format!(
                "contacts_{}_{}",
                safe_file_stem(user_id),
                chrono::Utc::now().format("%Y-%m-%d")
            )
        });

    format!("{}.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{MemoryBlobStore, MemoryContactStore};
    use crate::storage::BlobStore;
    use interchange::PhotoOptions;
    use shared_types::Contact;
    use std::sync::Arc;

    fn contact(id: i64, name: &str, birthday: Option<&str>, photo_url: Option<&str>) -> Contact {
        Contact {
            id,
            user_id: "user-1".to_string(),
            name: name.to_string(),
            phone: format!("55{}", id),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            birthday: birthday.map(String::from),
            category_ids: vec!["team".to_string()],
            photo_url: photo_url.map(String::from),
            created_at: 0,
            updated_at: 0,
        }
    }

    async fn service_with(contacts: Vec<Contact>) -> InterchangeService {
        let blobs = Arc::new(MemoryBlobStore::default());
        blobs.put("user-1/ann.png", vec![1, 2, 3], "image/png").await.unwrap();

        InterchangeService::new(
            Arc::new(MemoryContactStore::with_contacts(contacts)),
            blobs,
            PhotoOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_vcf_export_survives_photo_failure() {
        let service = service_with(vec![
            contact(1, "Ann", None, Some("http://blobs/user-1/ann.png")),
            contact(2, "Ben", Some("1990-01-02"), Some("http://blobs/user-1/ben.jpg")),
        ])
        .await;

        let document = service
            .export_contacts("user-1", ExportFormat::Vcf, &ContactQuery::default(), None)
            .await
            .unwrap();

        assert_eq!(document.content_type, "text/vcard");
        assert!(document.filename.starts_with("contacts_user-1_"));
        assert!(document.filename.ends_with(".vcf"));

        assert!(document
            .body
            .contains("FN:Ann\nEMAIL:ann@example.com\nTEL:551\nPHOTO;ENCODING=BASE64;TYPE=PNG:AQID\nEND:VCARD\n"));
        assert!(document
            .body
            .contains("FN:Ben\nEMAIL:ben@example.com\nTEL:552\nBDAY:19900102\nEND:VCARD\n"));
        assert_eq!(document.body.matches("PHOTO").count(), 1);
    }

    #[tokio::test]
    async fn test_large_export_keeps_contact_order() {
        let contacts: Vec<Contact> = (1..=20)
            .map(|id| {
                let photo = if id % 2 == 0 {
                    "http://blobs/user-1/ann.png"
                } else {
                    "http://blobs/user-1/missing.jpg"
                };
                contact(id, &format!("C{:02}", id), None, Some(photo))
            })
            .collect();
        let service = service_with(contacts).await;

        let document = service
            .export_contacts("user-1", ExportFormat::Vcf, &ContactQuery::default(), None)
            .await
            .unwrap();

        let names: Vec<&str> = document
            .body
            .lines()
            .filter_map(|line| line.strip_prefix("FN:"))
            .collect();
        let expected: Vec<String> = (1..=20).map(|id| format!("C{:02}", id)).collect();
        assert_eq!(names, expected);
        assert_eq!(document.body.matches("PHOTO;").count(), 10);
    }

    #[tokio::test]
    async fn test_csv_export_modes() {
        let contacts = vec![contact(1, "Ann", None, Some("http://blobs/user-1/ann.png"))];

        let inline = service_with(contacts.clone())
            .await
            .export_contacts(
                "user-1",
                ExportFormat::Csv(CsvPhotoMode::Inline),
                &ContactQuery::default(),
                Some("my list!"),
            )
            .await
            .unwrap();
        assert_eq!(inline.filename, "my_list_.csv");
        assert_eq!(inline.content_type, "text/csv");
        assert_eq!(
            inline.body,
            "name,phone,email,birthday,category_ids,photo_base64\n\
             \"Ann\",\"551\",\"ann@example.com\",\"\",\"team\",\"data:image/png;base64,AQID\"\n"
        );

        let references = service_with(contacts)
            .await
            .export_contacts(
                "user-1",
                ExportFormat::Csv(CsvPhotoMode::Url),
                &ContactQuery::default(),
                Some("backup.csv"),
            )
            .await
            .unwrap();
        assert_eq!(references.filename, "backup.csv");
        assert_eq!(
            references.body,
            "name,phone,email,birthday,category_id,photo_url\n\
             \"Ann\",\"551\",\"ann@example.com\",\"\",\"team\",\"http://blobs/user-1/ann.png\"\n"
        );
    }

    #[tokio::test]
    async fn test_export_filters() {
        let service = service_with(vec![
            contact(1, "Ann", None, None),
            contact(2, "Ben", Some("1990-01-02"), None),
        ])
        .await;

        let birthdays = ContactQuery {
            has_birthday: true,
            ..Default::default()
        };
        let document = service
            .export_contacts("user-1", ExportFormat::Vcf, &birthdays, None)
            .await
            .unwrap();
        assert!(document.body.contains("FN:Ben"));
        assert!(!document.body.contains("FN:Ann"));

        let nobody = ContactQuery {
            search: Some("zed".to_string()),
            ..Default::default()
        };
        let err = service
            .export_contacts("user-1", ExportFormat::Vcf, &nobody, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoContactsFound));
        assert_eq!(err.to_string(), "No contacts found");

        let err = service
            .export_contacts("other-user", ExportFormat::Csv(CsvPhotoMode::Inline), &ContactQuery::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoContactsFound));
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("u", ContactFormat::Vcf, Some("Family.VCF")),
            "Family.vcf"
        );
        assert_eq!(
            export_filename("u", ContactFormat::Csv, Some("a.b c")),
            "a_b_c.csv"
        );

        let default = export_filename("user 1", ContactFormat::Csv, Some("   "));
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(default, format!("contacts_user_1_{}.csv", today));
    }
}
