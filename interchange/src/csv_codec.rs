//! CSV import and export of contact records.

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use shared_types::{ContactRecord, PhotoPayload};

use crate::error::InterchangeError;
use crate::photo::JPEG_MIME;
use crate::sanitize::{
    clean_phone_number, parse_birthday, sanitize_string, split_category_ids, strip_data_uri,
};

/// Columns the codec knows how to read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvField {
    Name,
    Phone,
    Email,
    Birthday,
    /// Singular spelling kept for older exports; read into `category_ids`
    CategoryId,
    CategoryIds,
    PhotoUrl,
    PhotoBase64,
}

impl CsvField {
    pub fn header(&self) -> &'static str {
        match self {
            CsvField::Name => "name",
            CsvField::Phone => "phone",
            CsvField::Email => "email",
            CsvField::Birthday => "birthday",
            CsvField::CategoryId => "category_id",
            CsvField::CategoryIds => "category_ids",
            CsvField::PhotoUrl => "photo_url",
            CsvField::PhotoBase64 => "photo_base64",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        match header.trim().to_ascii_lowercase().as_str() {
            "name" => Some(CsvField::Name),
            "phone" => Some(CsvField::Phone),
            "email" => Some(CsvField::Email),
            "birthday" => Some(CsvField::Birthday),
            "category_id" => Some(CsvField::CategoryId),
            "category_ids" => Some(CsvField::CategoryIds),
            "photo_url" => Some(CsvField::PhotoUrl),
            "photo_base64" => Some(CsvField::PhotoBase64),
            _ => None,
        }
    }

    fn value(&self, record: &ContactRecord) -> String {
        match self {
            CsvField::Name => record.name.clone().unwrap_or_default(),
            CsvField::Phone => record.phone.clone().unwrap_or_default(),
            CsvField::Email => record.email.clone().unwrap_or_default(),
            CsvField::Birthday => record.birthday_string().unwrap_or_default(),
            CsvField::CategoryId | CsvField::CategoryIds => record.category_ids.join(";"),
            CsvField::PhotoUrl => record.photo_url().unwrap_or_default().to_string(),
            CsvField::PhotoBase64 => match &record.photo {
                Some(PhotoPayload::Inline {
                    mime_type,
                    data_base64,
                }) => format!("data:{};base64,{}", mime_type, data_base64),
                _ => String::new(),
            },
        }
    }
}

/// The two export layouts offered to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLayout {
    /// `name,phone,email,birthday,category_id,photo_url`
    References,
    /// `name,phone,email,birthday,category_ids,photo_base64`
    InlinePhotos,
}

impl CsvLayout {
    pub fn fields(&self) -> &'static [CsvField] {
        match self {
            CsvLayout::References => &[
                CsvField::Name,
                CsvField::Phone,
                CsvField::Email,
                CsvField::Birthday,
                CsvField::CategoryId,
                CsvField::PhotoUrl,
            ],
            CsvLayout::InlinePhotos => &[
                CsvField::Name,
                CsvField::Phone,
                CsvField::Email,
                CsvField::Birthday,
                CsvField::CategoryIds,
                CsvField::PhotoBase64,
            ],
        }
    }
}

/// Parses CSV text into contact records.
///
/// The first non-blank row is the header. Rows whose field count differs
/// from the header are skipped; they never fail the whole document.
pub fn parse_csv(content: &[u8]) -> Result<Vec<ContactRecord>, InterchangeError> {
    let text = std::str::from_utf8(content)
        .map_err(|e| InterchangeError::Parse(format!("CSV is not valid UTF-8: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let columns: Vec<Option<CsvField>> = reader
        .headers()?
        .iter()
        .map(CsvField::from_header)
        .collect();

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(row) => records.push(record_from_row(&columns, &row)),
            Err(e) => {
                tracing::warn!("Skipping CSV row {}: {}", index + 2, e);
            }
        }
    }

    Ok(records)
}

fn record_from_row(columns: &[Option<CsvField>], row: &StringRecord) -> ContactRecord {
    let mut record = ContactRecord::default();

    for (field, value) in columns.iter().zip(row.iter()) {
        let Some(field) = field else { continue };

        match field {
            CsvField::Name => record.name = sanitize_string(Some(value)),
            CsvField::Phone => record.phone = clean_phone_number(Some(value)),
            CsvField::Email => record.email = sanitize_string(Some(value)),
            CsvField::Birthday => record.birthday = parse_birthday(value),
            CsvField::CategoryId | CsvField::CategoryIds => {
                for id in split_category_ids(value) {
                    if !record.category_ids.contains(&id) {
                        record.category_ids.push(id);
                    }
                }
            }
            CsvField::PhotoBase64 => {
                let (mime, data) = strip_data_uri(value);
                if !data.is_empty() {
                    record.photo = Some(PhotoPayload::Inline {
                        mime_type: mime.unwrap_or(JPEG_MIME).to_string(),
                        data_base64: data.to_string(),
                    });
                }
            }
            CsvField::PhotoUrl => {
                // An inline photo in the same row wins over a reference
                if record.photo.is_none() {
                    record.photo = sanitize_string(Some(value)).map(|url| PhotoPayload::Url { url });
                }
            }
        }
    }

    record
}

/// Serializes records with the given columns. The header is written bare,
/// every value is quoted.
pub fn to_csv(records: &[ContactRecord], fields: &[CsvField]) -> Result<String, InterchangeError> {
    let header = fields
        .iter()
        .map(CsvField::header)
        .collect::<Vec<_>>()
        .join(",");

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(format!("{}\n", header).into_bytes());

    for record in records {
        writer.write_record(fields.iter().map(|field| field.value(record)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| InterchangeError::Parse(format!("Failed to flush CSV: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| InterchangeError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_quoted_comma() {
        let records = parse_csv(b"name,phone\n\"Jane, A\",555123\n").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("Jane, A"));
        assert_eq!(records[0].phone.as_deref(), Some("555123"));
    }

    #[test]
    fn test_parse_skips_mismatched_rows() {
        let content = "name,phone,email\n\
                       Alice,111,alice@example.com\n\
                       Broken,222\n\
                       Carol,333,carol@example.com,extra\n\
                       \n\
                       Dave,444,\n";
        let records = parse_csv(content.as_bytes()).unwrap();

        let names: Vec<_> = records.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["Alice", "Dave"]);
        assert_eq!(records[1].email, None);
    }

    #[test]
    fn test_parse_escaped_quotes_and_sanitizing() {
        let content = "name,phone,birthday,category_id\n\
                       \"  The \"\"Boss\"\" \",\"+1 (555) 010-0199\",1985-07-04,cat-1\n\
                       Eve,555,04/07/1985,\n";
        let records = parse_csv(content.as_bytes()).unwrap();

        assert_eq!(records[0].name.as_deref(), Some("The \"Boss\""));
        assert_eq!(records[0].phone.as_deref(), Some("+15550100199"));
        assert_eq!(records[0].birthday, NaiveDate::from_ymd_opt(1985, 7, 4));
        assert_eq!(records[0].category_ids, vec!["cat-1"]);
        // Malformed birthday is dropped, not an error
        assert_eq!(records[1].birthday, None);
    }

    #[test]
    fn test_parse_photo_columns() {
        let content = "Name,Phone,category_ids,photo_base64\n\
                       Ann,1,a;b,data:image/png;base64,iVBORw0K\n\
                       Ben,2,,\n";
        let records = parse_csv(content.as_bytes()).unwrap();

        assert_eq!(records.len(), 1, "unquoted data URI adds a column");

        let content = "Name,Phone,category_ids,photo_base64\n\
                       Ann,1,a;b,\"data:image/png;base64,iVBORw0K\"\n\
                       Ben,2,,\n";
        let records = parse_csv(content.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category_ids, vec!["a", "b"]);
        assert_eq!(
            records[0].photo,
            Some(PhotoPayload::Inline {
                mime_type: "image/png".to_string(),
                data_base64: "iVBORw0K".to_string(),
            })
        );
        assert_eq!(records[1].photo, None);
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        let err = parse_csv(&[b'n', 0xff, b'\n']).unwrap_err();
        assert!(matches!(err, InterchangeError::Parse(_)));
    }

    #[test]
    fn test_to_csv_quotes_every_value() {
        let records = vec![ContactRecord {
            name: Some("Jane \"JJ\" Doe".to_string()),
            phone: Some("555".to_string()),
            category_ids: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        }];
        let fields = [
            CsvField::Name,
            CsvField::Phone,
            CsvField::Email,
            CsvField::CategoryIds,
        ];

        let output = to_csv(&records, &fields).unwrap();
        assert_eq!(
            output,
            "name,phone,email,category_ids\n\"Jane \"\"JJ\"\" Doe\",\"555\",\"\",\"a;b\"\n"
        );
    }

    #[test]
    fn test_round_trip_inline_layout() {
        let records = vec![
            ContactRecord {
                name: Some("Jane, A".to_string()),
                phone: Some("+4420".to_string()),
                email: Some("jane@example.com".to_string()),
                birthday: NaiveDate::from_ymd_opt(1990, 1, 2),
                category_ids: vec!["x".to_string(), "y".to_string()],
                photo: Some(PhotoPayload::Inline {
                    mime_type: "image/jpeg".to_string(),
                    data_base64: "/9j/4AAQ".to_string(),
                }),
            },
            ContactRecord {
                name: Some("Line\nBreak".to_string()),
                phone: Some("1".to_string()),
                ..Default::default()
            },
        ];

        let output = to_csv(&records, CsvLayout::InlinePhotos.fields()).unwrap();
        assert!(output.starts_with("name,phone,email,birthday,category_ids,photo_base64\n"));
        assert_eq!(parse_csv(output.as_bytes()).unwrap(), records);
    }

    #[test]
    fn test_references_layout_writes_urls() {
        let records = vec![ContactRecord {
            name: Some("Ann".to_string()),
            phone: Some("1".to_string()),
            category_ids: vec!["c1".to_string()],
            photo: Some(PhotoPayload::Url {
                url: "http://localhost:8080/photos/u/a.jpg".to_string(),
            }),
            ..Default::default()
        }];

        let output = to_csv(&records, CsvLayout::References.fields()).unwrap();
        assert_eq!(
            output,
            "name,phone,email,birthday,category_id,photo_url\n\
             \"Ann\",\"1\",\"\",\"\",\"c1\",\"http://localhost:8080/photos/u/a.jpg\"\n"
        );

        let parsed = parse_csv(output.as_bytes()).unwrap();
        assert_eq!(parsed, records);
    }
}
