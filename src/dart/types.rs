//! Shared DART types and data structures

use serde::Deserialize;

/// Response of `list.json`
#[derive(Debug, Deserialize, Clone)]
pub struct ListResponse {
    /// `000` on success
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub page_no: u32,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub total_page: u32,
    #[serde(default)]
    pub list: Vec<ListItem>,
}

/// One row of `list.json`
#[derive(Debug, Deserialize, Clone)]
pub struct ListItem {
    /// Corporation class (Y: KOSPI, K: KOSDAQ, N: KONEX, E: other)
    #[serde(default)]
    pub corp_cls: Option<String>,
    #[serde(default)]
    pub corp_name: Option<String>,
    #[serde(default)]
    pub corp_code: Option<String>,
    #[serde(default)]
    pub stock_code: Option<String>,
    /// Report title
    #[serde(default)]
    pub report_nm: Option<String>,
    /// Receipt number - required for downloading
    pub rcept_no: String,
    /// Filer name
    #[serde(default)]
    pub flr_nm: Option<String>,
    /// Receipt date, `YYYYMMDD`
    pub rcept_dt: String,
    /// Remarks
    #[serde(default)]
    pub rm: Option<String>,
}

/// Root of `CORPCODE.xml`
#[derive(Debug, Deserialize)]
pub struct CorpCodeDocument {
    #[serde(rename = "list", default)]
    pub list: Vec<CorpCodeEntry>,
}

/// One company in `CORPCODE.xml`
#[derive(Debug, Deserialize, Clone)]
pub struct CorpCodeEntry {
    pub corp_code: String,
    pub corp_name: String,
    #[serde(default)]
    pub stock_code: Option<String>,
    #[serde(default)]
    pub modify_date: Option<String>,
}

/// Status body DART returns instead of a file when a request fails
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
    pub message: String,
}

impl StatusBody {
    /// Decode a status body from a response that was expected to be a file.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(bytes).ok()?;
        quick_xml::de::from_str(text.trim_start_matches('\u{feff}')).ok()
    }
}

/// DART API endpoints and constants
pub struct DartApiPaths;

impl DartApiPaths {
    /// Company master ZIP (holds CORPCODE.xml)
    pub const CORP_CODE_ENDPOINT: &'static str = "/api/corpCode.xml";
    /// Disclosure listing endpoint
    pub const LIST_ENDPOINT: &'static str = "/api/list.json";
    /// Original document archive endpoint
    pub const DOCUMENT_ENDPOINT: &'static str = "/api/document.xml";
    /// Status code for a successful call
    pub const STATUS_OK: &'static str = "000";
    /// Largest page size accepted by `list.json`
    pub const MAX_PAGE_COUNT: u32 = 100;
}
