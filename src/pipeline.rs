//! List, download and summarize one company's disclosures for a year

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::dart::{download_archives, fetch_disclosures, DartApi, DownloadOptions};
use crate::models::{Company, DisclosureRecord, DownloadResult};
use crate::storage::prepare_output_dir;
use crate::summary::{build_rows, write_summary, SummaryOutput};

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub company: Company,
    pub year: i32,
}

#[derive(Debug)]
pub struct RunReport {
    /// `None` when the listing was empty and nothing was written
    pub output_dir: Option<PathBuf>,
    pub records: Vec<DisclosureRecord>,
    pub results: Vec<DownloadResult>,
    pub summary: Option<SummaryOutput>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Run the listing, download and summary stages for one company and year.
///
/// Listing errors are returned. Individual download failures are recorded in
/// the report. The output directory is only created when there is something
/// to download.
pub async fn run<A, F>(
    api: &A,
    request: &RunRequest,
    config: &Config,
    on_result: F,
) -> Result<RunReport>
where
    A: DartApi + ?Sized,
    F: FnMut(usize, &DisclosureRecord, &DownloadResult),
{
    let records = fetch_disclosures(
        api,
        &request.company.registry_code,
        request.year,
        config.list_page_delay(),
    )
    .await?;

    if records.is_empty() {
        info!(
            "No disclosures for {} ({}) in {}",
            request.company.name, request.company.registry_code, request.year
        );
        return Ok(RunReport {
            output_dir: None,
            records,
            results: Vec::new(),
            summary: None,
        });
    }

    let output_dir = prepare_output_dir(&config.output_root, request.year, &request.company)?;

    let options = DownloadOptions {
        skip_existing: config.skip_existing,
        delay: config.download_delay(),
    };
    let results = download_archives(api, &records, &output_dir, &options, on_result).await;

    let rows = build_rows(&request.company, &records, &results);
    let summary = write_summary(&output_dir, request.year, &rows);

    Ok(RunReport {
        output_dir: Some(output_dir),
        records,
        results,
        summary: Some(summary),
    })
}
