//! Excel and CSV summaries of a download run.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Company, DisclosureRecord, DownloadResult, DownloadStatus};
use crate::storage::summary_stem;

/// Errors that can occur while writing a summary file.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column titles, in order. Must match the serde names on [`SummaryRow`].
pub const HEADERS: [&str; 10] = [
    "기업명",
    "corp_code",
    "보고서명",
    "접수번호",
    "제출일",
    "ZIP저장파일",
    "표시용파일명",
    "다운로드성공",
    "비고",
    "DART링크",
];

/// One summary line per disclosure record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "기업명")]
    pub company_name: String,
    #[serde(rename = "corp_code")]
    pub registry_code: String,
    #[serde(rename = "보고서명")]
    pub report_title: String,
    #[serde(rename = "접수번호")]
    pub receipt_no: String,
    #[serde(rename = "제출일")]
    pub submission_date: String,
    /// File name on disk, always `<receipt_no>.zip`
    #[serde(rename = "ZIP저장파일")]
    pub saved_file: String,
    #[serde(rename = "표시용파일명")]
    pub alias: String,
    #[serde(rename = "다운로드성공")]
    pub success: String,
    #[serde(rename = "비고")]
    pub note: String,
    #[serde(rename = "DART링크")]
    pub link: String,
}

impl SummaryRow {
    pub fn new(company: &Company, record: &DisclosureRecord, result: Option<&DownloadResult>) -> Self {
        let (success, note) = match result.map(|r| &r.status) {
            Some(DownloadStatus::Downloaded { .. }) => (true, String::new()),
            Some(DownloadStatus::Skipped) => (true, "기존 파일 유지".to_string()),
            Some(DownloadStatus::Failed(reason)) => (false, reason.clone()),
            None => (false, "다운로드 시도 없음".to_string()),
        };

        Self {
            company_name: company.name.clone(),
            registry_code: company.registry_code.clone(),
            report_title: record.report_title.clone(),
            receipt_no: record.receipt_no.clone(),
            submission_date: record.formatted_date("%Y-%m-%d", ""),
            saved_file: record.archive_file_name(),
            alias: record.alias_file_name(),
            success: if success { "Y" } else { "N" }.to_string(),
            note,
            link: record.viewer_url(),
        }
    }

    fn cells(&self) -> [&str; 10] {
        [
            self.company_name.as_str(),
            self.registry_code.as_str(),
            self.report_title.as_str(),
            self.receipt_no.as_str(),
            self.submission_date.as_str(),
            self.saved_file.as_str(),
            self.alias.as_str(),
            self.success.as_str(),
            self.note.as_str(),
            self.link.as_str(),
        ]
    }
}

/// Build rows in listing order; every record gets a row whatever its outcome.
pub fn build_rows(
    company: &Company,
    records: &[DisclosureRecord],
    results: &[DownloadResult],
) -> Vec<SummaryRow> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let result = results
                .get(index)
                .filter(|r| r.receipt_no == record.receipt_no)
                .or_else(|| results.iter().find(|r| r.receipt_no == record.receipt_no));
            SummaryRow::new(company, record, result)
        })
        .collect()
}

/// Where each summary file went, or why it could not be written.
#[derive(Debug)]
pub struct SummaryOutput {
    pub excel: Result<PathBuf, SummaryError>,
    pub csv: Result<PathBuf, SummaryError>,
}

/// Write `공시ZIP요약_<year>.xlsx` and `.csv` into `dir`.
///
/// The two files are written independently.
pub fn write_summary(dir: &Path, year: i32, rows: &[SummaryRow]) -> SummaryOutput {
    let stem = summary_stem(year);

    let excel_path = dir.join(format!("{}.xlsx", stem));
    let excel = write_excel(&excel_path, rows).map(|_| excel_path);
    match &excel {
        Ok(path) => info!("Excel summary written: {}", path.display()),
        Err(e) => warn!("Failed to write Excel summary: {}", e),
    }

    let csv_path = dir.join(format!("{}.csv", stem));
    let csv = write_csv(&csv_path, rows).map(|_| csv_path);
    match &csv {
        Ok(path) => info!("CSV summary written: {}", path.display()),
        Err(e) => warn!("Failed to write CSV summary: {}", e),
    }

    SummaryOutput { excel, csv }
}

/// CSV with a UTF-8 byte order mark so spreadsheet tools pick the right encoding.
pub fn write_csv(path: &Path, rows: &[SummaryRow]) -> Result<(), SummaryError> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_excel(path: &Path, rows: &[SummaryRow]) -> Result<(), SummaryError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("요약")?;

    for (col, title) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let excel_row = (index + 1) as u32;
        for (col, value) in row.cells().iter().enumerate() {
            worksheet.write_string(excel_row, col as u16, *value)?;
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.set_column_width(2, 40)?;
    worksheet.set_column_width(5, 22)?;
    worksheet.set_column_width(6, 48)?;

    workbook.save(path)?;
    Ok(())
}
