//! Disclosure listing for one company and year

use chrono::NaiveDate;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::dart::{DartApi, DartApiPaths, DartError, ListItem, ListQuery, ListResponse};
use crate::models::DisclosureRecord;

/// Collect every disclosure filed by `corp_code` during `year`, in provider order.
///
/// Pages are fetched until `total_count` records are collected or a page comes
/// back empty. A "no data" status yields an empty list.
pub async fn fetch_disclosures<A: DartApi + ?Sized>(
    api: &A,
    corp_code: &str,
    year: i32,
    page_delay: Duration,
) -> Result<Vec<DisclosureRecord>, DartError> {
    let query = ListQuery::for_year(corp_code, year)?;
    info!(
        "Listing disclosures for {} from {} to {}",
        corp_code, query.begin, query.end
    );

    let mut records = Vec::new();
    let mut page_no = 1;

    loop {
        let page = match check_status(api.list_page(&query, page_no).await?) {
            Ok(page) => page,
            Err(e) if e.is_no_data() => break,
            Err(e) => return Err(e),
        };

        let fetched = page.list.len();
        for item in page.list {
            records.push(into_record(item));
        }
        debug!(
            "Page {}: {} records ({} of {} collected)",
            page_no,
            fetched,
            records.len(),
            page.total_count
        );

        if fetched == 0 || records.len() >= page.total_count {
            break;
        }

        page_no += 1;
        tokio::time::sleep(page_delay).await;
    }

    info!("Collected {} disclosures", records.len());
    Ok(records)
}

fn check_status(response: ListResponse) -> Result<ListResponse, DartError> {
    if response.status == DartApiPaths::STATUS_OK {
        Ok(response)
    } else {
        Err(DartError::ApiStatus {
            status: response.status,
            message: response.message,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A malformed `rcept_dt` leaves the date empty; the receipt number alone is
/// enough to fetch the archive.
fn into_record(item: ListItem) -> DisclosureRecord {
    let submission_date = match NaiveDate::parse_from_str(item.rcept_dt.trim(), "%Y%m%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(
                "Disclosure {} has an invalid rcept_dt '{}': {}",
                item.rcept_no, item.rcept_dt, e
            );
            None
        }
    };
    DisclosureRecord {
        receipt_no: item.rcept_no.trim().to_string(),
        submission_date,
        report_title: non_blank(item.report_nm).unwrap_or_else(|| "unknown_report".to_string()),
        company_name: non_blank(item.corp_name).unwrap_or_default(),
        filer_name: non_blank(item.flr_nm).unwrap_or_default(),
        remark: non_blank(item.rm).unwrap_or_default(),
    }
}
