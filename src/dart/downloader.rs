//! DART document archive downloading

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::dart::{DartApi, DartError, StatusBody};
use crate::models::{DisclosureRecord, DownloadResult, DownloadStatus};
use crate::storage::sanitize_filename;

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Settings for a batch of archive downloads
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Keep valid archives that are already on disk
    pub skip_existing: bool,
    /// Pause between consecutive downloads
    pub delay: Duration,
}

pub fn has_zip_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_SIGNATURE)
}

/// Accept `bytes` only if they form a readable ZIP archive.
pub fn check_archive(receipt_no: &str, bytes: &[u8]) -> Result<(), DartError> {
    if !has_zip_signature(bytes) {
        let reason = match StatusBody::from_bytes(bytes) {
            Some(body) => format!("{} ({})", body.message, body.status),
            None => format!("unexpected {}-byte response", bytes.len()),
        };
        return Err(DartError::NotAnArchive {
            receipt_no: receipt_no.to_string(),
            reason,
        });
    }

    ZipArchive::new(Cursor::new(bytes)).map_err(|e| DartError::NotAnArchive {
        receipt_no: receipt_no.to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Receipt numbers are plain digit strings; anything else could escape `out_dir`.
pub fn is_valid_receipt_no(receipt_no: &str) -> bool {
    !receipt_no.is_empty() && receipt_no.bytes().all(|b| b.is_ascii_digit())
}

fn existing_archive_is_valid(path: &Path, receipt_no: &str) -> bool {
    std::fs::read(path)
        .map(|bytes| check_archive(receipt_no, &bytes).is_ok())
        .unwrap_or(false)
}

/// Download one archive into `out_dir` as `<receipt_no>.zip`.
///
/// Failures are captured in the returned result rather than propagated.
pub async fn fetch_archive<A: DartApi + ?Sized>(
    api: &A,
    receipt_no: &str,
    out_dir: &Path,
    skip_existing: bool,
) -> DownloadResult {
    if !is_valid_receipt_no(receipt_no) {
        let error = DartError::InvalidReceiptNo(receipt_no.to_string());
        warn!("✗ Not downloading: {}", error);
        let placeholder = out_dir.join(format!("{}.zip", sanitize_filename(receipt_no)));
        return DownloadResult::new(receipt_no, placeholder, DownloadStatus::Failed(error.to_string()));
    }

    let output_path = out_dir.join(format!("{}.zip", receipt_no));

    if skip_existing && existing_archive_is_valid(&output_path, receipt_no) {
        debug!("Keeping existing archive: {}", output_path.display());
        return DownloadResult::new(receipt_no, output_path, DownloadStatus::Skipped);
    }

    match download_archive(api, receipt_no, &output_path).await {
        Ok(bytes) => {
            info!("✓ Saved {} ({} bytes)", output_path.display(), bytes);
            DownloadResult::new(receipt_no, output_path, DownloadStatus::Downloaded { bytes })
        }
        Err(e) => {
            warn!("✗ Failed to download {}: {}", receipt_no, e);
            DownloadResult::new(receipt_no, output_path, DownloadStatus::Failed(e.to_string()))
        }
    }
}

async fn download_archive<A: DartApi + ?Sized>(
    api: &A,
    receipt_no: &str,
    output_path: &Path,
) -> Result<u64, DartError> {
    let bytes = api.document_archive(receipt_no).await?;
    check_archive(receipt_no, &bytes)?;
    write_atomically(output_path, &bytes)?;
    Ok(bytes.len() as u64)
}

/// Write to `<path>.part` and rename into place, so an interrupted or failed
/// write never leaves a truncated archive under the final name.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut part_name = path.as_os_str().to_owned();
    part_name.push(".part");
    let part_path = PathBuf::from(part_name);

    let written = std::fs::write(&part_path, bytes).and_then(|_| std::fs::rename(&part_path, path));
    if written.is_err() {
        let _ = std::fs::remove_file(&part_path);
    }
    written
}

/// Download every record's archive in listing order.
///
/// `on_result` is called after each attempt with the record's zero-based index.
/// The returned results line up with `records`.
pub async fn download_archives<A, F>(
    api: &A,
    records: &[DisclosureRecord],
    out_dir: &Path,
    options: &DownloadOptions,
    mut on_result: F,
) -> Vec<DownloadResult>
where
    A: DartApi + ?Sized,
    F: FnMut(usize, &DisclosureRecord, &DownloadResult),
{
    let mut results = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        if index > 0 && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }

        info!(
            "Downloading {}/{}: {} ({}) receipt {}",
            index + 1,
            records.len(),
            record.report_title,
            record.formatted_date("%Y-%m-%d", "-"),
            record.receipt_no
        );

        let result = fetch_archive(api, &record.receipt_no, out_dir, options.skip_existing).await;
        on_result(index, record, &result);
        results.push(result);
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    info!("Downloaded {} of {} archives", succeeded, records.len());
    results
}
