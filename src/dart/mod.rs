//! DART (Korea Financial Supervisory Service) module
//!
//! This module wraps the OpenDART API: resolving companies from the
//! company master, listing a company's disclosures for a year, and
//! downloading the original document archives.

pub mod types;
pub mod errors;
pub mod client;
pub mod corp_code;
pub mod listing;
pub mod downloader;

#[cfg(test)]
pub(crate) mod fake;

pub use types::*;
pub use errors::DartError;
pub use client::{DartApi, DartClient, ListQuery};

// Re-export commonly used functions
pub use corp_code::{load_company_master, search_companies};
pub use listing::fetch_disclosures;
pub use downloader::{download_archives, fetch_archive, DownloadOptions};
