//! Interchange Crate
//!
//! Conversion between the internal [`ContactRecord`] and the formats contacts
//! are exchanged in. Everything here works on in-memory buffers; storage and
//! network access belong to the caller.
//!
//! # Components
//!
//! - `sanitize`: trimming, phone normalization, birthday validation
//! - `csv_codec`: CSV parsing and generation
//! - `vcf_codec`: vCard parsing and generation, including base64 photos
//! - `photo`: resize/enhance/encode pipeline for contact photos
//!
//! # Example
//!
//! ```rust,ignore
//! use interchange::{parse_contacts, ContactFormat};
//!
//! let format = ContactFormat::from_filename("people.vcf")?;
//! let records = parse_contacts(format, &bytes)?;
//! ```

pub mod csv_codec;
pub mod error;
pub mod format;
pub mod photo;
pub mod sanitize;
pub mod vcf_codec;

pub use csv_codec::{parse_csv, to_csv, CsvField, CsvLayout};
pub use error::InterchangeError;
pub use format::ContactFormat;
pub use photo::PhotoOptions;
pub use vcf_codec::{parse_vcf, to_vcf};

pub use shared_types::{ContactRecord, PhotoPayload};

/// Parses a document with the codec matching `format`.
pub fn parse_contacts(
    format: ContactFormat,
    content: &[u8],
) -> Result<Vec<ContactRecord>, InterchangeError> {
    match format {
        ContactFormat::Csv => parse_csv(content),
        ContactFormat::Vcf => parse_vcf(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contacts_dispatch() {
        let csv = parse_contacts(ContactFormat::Csv, b"name,phone\nAnn,1\n").unwrap();
        assert_eq!(csv[0].name.as_deref(), Some("Ann"));

        let vcf = parse_contacts(
            ContactFormat::Vcf,
            b"BEGIN:VCARD\nFN:Ann\nTEL:1\nEND:VCARD\n",
        )
        .unwrap();
        assert_eq!(vcf, csv);
    }
}
