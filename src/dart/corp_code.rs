//! Company lookup against the DART company master
//!
//! DART does not offer a name search endpoint. The full company master
//! (`corpCode.xml`, a ZIP holding `CORPCODE.xml`) is downloaded, cached on
//! disk, and matched locally.

use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::dart::downloader::has_zip_signature;
use crate::dart::{CorpCodeDocument, DartApi, DartError, StatusBody};
use crate::models::Company;

const CACHE_ZIP_NAME: &str = "corpCode.zip";
const CACHE_XML_NAME: &str = "CORPCODE.xml";

/// Load the company master, reusing the cached copy while it is younger than `ttl`.
pub async fn load_company_master<A: DartApi + ?Sized>(
    api: &A,
    cache_dir: &Path,
    ttl: Duration,
) -> Result<Vec<Company>, DartError> {
    let xml_path = cache_dir.join(CACHE_XML_NAME);

    if is_fresh(&xml_path, ttl) {
        debug!("Using cached company master: {}", xml_path.display());
        let xml = std::fs::read_to_string(&xml_path)?;
        return parse_corp_codes(&xml);
    }

    info!("Downloading company master");
    let archive = api.corp_code_archive().await?;
    if !has_zip_signature(&archive) {
        return Err(match StatusBody::from_bytes(&archive) {
            Some(body) => DartError::ApiStatus {
                status: body.status,
                message: body.message,
            },
            None => DartError::NotAnArchive {
                receipt_no: "corpCode".to_string(),
                reason: format!("unexpected {}-byte response", archive.len()),
            },
        });
    }

    std::fs::create_dir_all(cache_dir)?;
    std::fs::write(cache_dir.join(CACHE_ZIP_NAME), &archive)?;

    let xml = extract_corp_code_xml(&archive)?;
    std::fs::write(&xml_path, &xml)?;

    let companies = parse_corp_codes(&xml)?;
    info!("Company master cached with {} companies", companies.len());
    Ok(companies)
}

fn is_fresh(path: &Path, ttl: Duration) -> bool {
    let modified = match std::fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(modified) => modified,
        Err(_) => return false,
    };
    modified.elapsed().map(|age| age < ttl).unwrap_or(false)
}

fn extract_corp_code_xml(archive: &[u8]) -> Result<String, DartError> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;

    let index = (0..zip.len())
        .find(|&i| {
            zip.by_index(i)
                .map(|file| file.name().eq_ignore_ascii_case(CACHE_XML_NAME))
                .unwrap_or(false)
        })
        .ok_or(DartError::MissingCorpCodeXml)?;

    let mut xml = String::new();
    zip.by_index(index)?.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Parse `CORPCODE.xml` into companies, in file order.
pub fn parse_corp_codes(xml: &str) -> Result<Vec<Company>, DartError> {
    let document: CorpCodeDocument = quick_xml::de::from_str(xml.trim_start_matches('\u{feff}'))?;

    let mut companies = Vec::with_capacity(document.list.len());
    for entry in document.list {
        let registry_code = entry.corp_code.trim().to_string();
        if registry_code.is_empty() {
            warn!("Skipping company master entry without corp_code: {}", entry.corp_name);
            continue;
        }
        companies.push(Company {
            name: entry.corp_name.trim().to_string(),
            registry_code,
            stock_code: entry
                .stock_code
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty()),
        });
    }
    Ok(companies)
}

fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<String>().to_lowercase()
}

/// Match companies by name.
///
/// Whitespace and case are ignored. Exact matches come first, then partial
/// matches; listed companies precede unlisted ones, then by name.
pub fn search_companies(master: &[Company], query: &str, limit: usize) -> Vec<Company> {
    let needle = normalize(query);
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<(u8, &Company)> = master
        .iter()
        .filter_map(|company| {
            let name = normalize(&company.name);
            if name == needle {
                Some((0, company))
            } else if name.contains(&needle) {
                Some((1, company))
            } else {
                None
            }
        })
        .collect();

    matches.sort_by(|(rank_a, a), (rank_b, b)| {
        rank_a
            .cmp(rank_b)
            .then_with(|| b.is_listed().cmp(&a.is_listed()))
            .then_with(|| a.name.cmp(&b.name))
    });

    matches
        .into_iter()
        .take(limit)
        .map(|(_, company)| company.clone())
        .collect()
}
