use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl InterchangeError {
    /// Whether the error comes from the caller's input rather than the
    /// process itself.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, InterchangeError::Csv(e) if e.is_io_error())
    }
}
