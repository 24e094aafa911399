//! DART-specific error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DartError {
    #[error("DART API error (status {status}): {message}")]
    ApiStatus {
        status: String,
        message: String,
    },

    #[error("HTTP error {status} from {endpoint}")]
    HttpStatus {
        endpoint: &'static str,
        status: u16,
    },

    #[error("Response for {receipt_no} is not a ZIP archive: {reason}")]
    NotAnArchive {
        receipt_no: String,
        reason: String,
    },

    #[error("CORPCODE.xml not found in company master archive")]
    MissingCorpCodeXml,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse XML: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid receipt number: '{0}'")]
    InvalidReceiptNo(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DartError {
    /// DART status code for "no data found"
    pub const NO_DATA: &'static str = "013";

    pub fn is_no_data(&self) -> bool {
        matches!(self, DartError::ApiStatus { status, .. } if status == Self::NO_DATA)
    }
}
