use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A company candidate taken from the DART company master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    /// DART `corp_code`, eight digits
    pub registry_code: String,
    /// KRX ticker; `None` for unlisted companies
    pub stock_code: Option<String>,
}

impl Company {
    pub fn is_listed(&self) -> bool {
        self.stock_code.is_some()
    }

    /// Label used in the selection prompt
    pub fn display_label(&self) -> String {
        match &self.stock_code {
            Some(stock_code) => format!(
                "{}  (corp_code:{} / 주식코드:{})",
                self.name, self.registry_code, stock_code
            ),
            None => format!("{}  (corp_code:{})", self.name, self.registry_code),
        }
    }
}

/// One disclosure filing returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureRecord {
    pub receipt_no: String,
    /// `None` when the provider sent a date that does not parse
    pub submission_date: Option<NaiveDate>,
    pub report_title: String,
    pub company_name: String,
    pub filer_name: String,
    pub remark: String,
}

impl DisclosureRecord {
    /// File name the archive is stored under
    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.receipt_no)
    }

    /// Human-friendly name shown in the summary only, never used on disk
    pub fn alias_file_name(&self) -> String {
        format!(
            "{}_{}.zip",
            self.formatted_date("%Y%m%d", "unknown_date"),
            crate::storage::sanitize_filename(&self.report_title)
        )
    }

    pub fn formatted_date(&self, format: &str, missing: &str) -> String {
        match self.submission_date {
            Some(date) => date.format(format).to_string(),
            None => missing.to_string(),
        }
    }

    pub fn viewer_url(&self) -> String {
        format!("https://dart.fss.or.kr/dsaf001/main.do?rcpNo={}", self.receipt_no)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Downloaded { bytes: u64 },
    /// A valid archive was already present and kept
    Skipped,
    Failed(String),
}

/// Outcome of one archive fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub receipt_no: String,
    pub saved_path: PathBuf,
    pub success: bool,
    pub status: DownloadStatus,
}

impl DownloadResult {
    pub fn new(receipt_no: &str, saved_path: PathBuf, status: DownloadStatus) -> Self {
        Self {
            receipt_no: receipt_no.to_string(),
            saved_path,
            success: !matches!(status, DownloadStatus::Failed(_)),
            status,
        }
    }
}
