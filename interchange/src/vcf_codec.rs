//! vCard (VCF) import and export of contact records.

use once_cell::sync::Lazy;
use regex::Regex;
use shared_types::{ContactRecord, PhotoPayload};

use crate::error::InterchangeError;
use crate::photo::{JPEG_MIME, PNG_MIME};
use crate::sanitize::{clean_phone_number, parse_birthday, sanitize_string, strip_data_uri};

const END_VCARD: &str = "END:VCARD";

static FN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^FN:(.*)$").unwrap());
static TEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^TEL[^:]*:(.*)$").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^EMAIL[^:]*:(.*)$").unwrap());
static BDAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^BDAY[^:]*:(.*)$").unwrap());
static PHOTO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^PHOTO([^:]*):(.*)$").unwrap());

/// A `PHOTO` property with its continuation lines joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoBlock {
    /// Everything between `PHOTO` and the first colon, e.g. `;ENCODING=b;TYPE=JPEG`
    pub params: String,
    pub data: String,
}

/// Parses one or more vCards.
///
/// Cards are delimited by `END:VCARD`. A card becomes a record only when it
/// carries both `FN` and `TEL`; other cards are dropped silently.
pub fn parse_vcf(content: &[u8]) -> Result<Vec<ContactRecord>, InterchangeError> {
    let text = std::str::from_utf8(content)
        .map_err(|e| InterchangeError::Parse(format!("vCard is not valid UTF-8: {}", e)))?;

    let mut records = Vec::new();
    for card in text.split(END_VCARD) {
        if card.trim().is_empty() {
            continue;
        }

        match parse_card(card) {
            Some(record) => records.push(record),
            None => tracing::debug!("Dropping vCard without FN or TEL"),
        }
    }

    Ok(records)
}

fn parse_card(card: &str) -> Option<ContactRecord> {
    let lines: Vec<&str> = card.lines().map(str::trim).collect();

    let mut name = None;
    let mut phone = None;
    let mut email = None;
    let mut birthday = None;
    let mut photo = None;

    for (index, line) in lines.iter().enumerate() {
        if name.is_none() {
            if let Some(caps) = FN_RE.captures(line) {
                name = sanitize_string(Some(&caps[1]));
                continue;
            }
        }
        if phone.is_none() {
            if let Some(caps) = TEL_RE.captures(line) {
                let value = &caps[1];
                let value = value
                    .strip_prefix("tel:")
                    .or_else(|| value.strip_prefix("TEL:"))
                    .unwrap_or(value);
                phone = clean_phone_number(Some(value));
                continue;
            }
        }
        if email.is_none() {
            if let Some(caps) = EMAIL_RE.captures(line) {
                email = sanitize_string(Some(&caps[1]));
                continue;
            }
        }
        if birthday.is_none() {
            if let Some(caps) = BDAY_RE.captures(line) {
                birthday = parse_birthday(&caps[1]);
                continue;
            }
        }
        if photo.is_none() {
            if let Some(block) = collect_photo_block(&lines, index) {
                photo = photo_payload(block);
            }
        }
    }

    Some(ContactRecord {
        name: Some(name?),
        phone: Some(phone?),
        email,
        birthday,
        category_ids: Vec::new(),
        photo,
    })
}

/// Reads the `PHOTO` property starting at `start`.
///
/// The text after the first colon is the first chunk of data. Each following
/// line is appended as long as it contains no colon; the first line with a
/// colon starts the next property. Returns `None` if `lines[start]` is not a
/// `PHOTO` line.
pub fn collect_photo_block(lines: &[&str], start: usize) -> Option<PhotoBlock> {
    let caps = PHOTO_RE.captures(lines.get(start)?.trim())?;

    let mut data = caps[2].trim().to_string();
    for line in &lines[start + 1..] {
        if line.contains(':') {
            break;
        }
        data.push_str(line.trim());
    }

    Some(PhotoBlock {
        params: caps[1].to_string(),
        data,
    })
}

fn photo_payload(block: PhotoBlock) -> Option<PhotoPayload> {
    let data = block.data.trim();
    if data.is_empty() {
        return None;
    }

    let lowered = data.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return Some(PhotoPayload::Url {
            url: data.to_string(),
        });
    }

    let (declared_mime, payload) = strip_data_uri(data);
    let mime_type = match declared_mime {
        Some(mime) => mime.to_string(),
        None if block.params.to_ascii_uppercase().contains("PNG") => PNG_MIME.to_string(),
        None => JPEG_MIME.to_string(),
    };

    Some(PhotoPayload::Inline {
        mime_type,
        data_base64: payload.to_string(),
    })
}

/// Serializes records as concatenated vCard 3.0 blocks.
///
/// Only inline photos are written; a record whose photo is still a URL is
/// emitted without a `PHOTO` line.
pub fn to_vcf(records: &[ContactRecord]) -> String {
    let mut output = String::new();

    for record in records {
        output.push_str("BEGIN:VCARD\n");
        output.push_str("VERSION:3.0\n");

        if let Some(name) = &record.name {
            push_property(&mut output, "FN", name);
        }
        if let Some(email) = &record.email {
            push_property(&mut output, "EMAIL", email);
        }
        if let Some(phone) = &record.phone {
            push_property(&mut output, "TEL", phone);
        }
        if let Some(birthday) = record.birthday {
            push_property(&mut output, "BDAY", &birthday.format("%Y%m%d").to_string());
        }
        if let Some(PhotoPayload::Inline {
            mime_type,
            data_base64,
        }) = &record.photo
        {
            let photo_type = if mime_type.eq_ignore_ascii_case(PNG_MIME) {
                "PNG"
            } else {
                "JPEG"
            };
            output.push_str(&format!(
                "PHOTO;ENCODING=BASE64;TYPE={}:{}\n",
                photo_type, data_base64
            ));
        }

        output.push_str(END_VCARD);
        output.push('\n');
    }

    output
}

fn push_property(output: &mut String, name: &str, value: &str) {
    // A raw line break would end the property early
    let value = value.replace(['\r', '\n'], " ");
    output.push_str(&format!("{}:{}\n", name, value));
}
