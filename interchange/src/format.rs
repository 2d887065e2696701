use std::path::Path;

use crate::error::InterchangeError;

/// Interchange formats understood by the codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactFormat {
    Csv,
    Vcf,
}

impl ContactFormat {
    /// Picks the format from a file name's extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, InterchangeError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(ContactFormat::Csv),
            Some("vcf") => Ok(ContactFormat::Vcf),
            _ => Err(InterchangeError::UnsupportedFileType(filename.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ContactFormat::Csv => "csv",
            ContactFormat::Vcf => "vcf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ContactFormat::Csv => "text/csv",
            ContactFormat::Vcf => "text/vcard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename() {
        assert_eq!(
            ContactFormat::from_filename("contacts.csv").unwrap(),
            ContactFormat::Csv
        );
        assert_eq!(
            ContactFormat::from_filename("Phone Export.VCF").unwrap(),
            ContactFormat::Vcf
        );
        assert!(matches!(
            ContactFormat::from_filename("contacts.xlsx"),
            Err(InterchangeError::UnsupportedFileType(_))
        ));
        assert!(ContactFormat::from_filename("csv").is_err());
    }
}
