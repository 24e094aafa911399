//! Output directory layout and file naming

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::Company;

const MAX_FILENAME_CHARS: usize = 120;
const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Make a string safe to use as a single path component.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let joined = replaced.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        return "unknown_report".to_string();
    }

    joined.chars().take(MAX_FILENAME_CHARS).collect()
}

/// `DART_<year>_<company>_<corp_code>_ZIP`
pub fn output_dir_name(year: i32, company: &Company) -> String {
    format!(
        "DART_{}_{}_{}_ZIP",
        year,
        sanitize_filename(&company.name),
        company.registry_code
    )
}

/// Create the per-company output directory and return its path.
pub fn prepare_output_dir(root: &Path, year: i32, company: &Company) -> Result<PathBuf> {
    let dir = root.join(output_dir_name(year, company));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Cannot create output directory: {}", dir.display()))?;
    info!("Output directory ready: {}", dir.display());
    Ok(dir)
}

/// Summary file stem, shared by the spreadsheet and the CSV.
pub fn summary_stem(year: i32) -> String {
    format!("공시ZIP요약_{}", year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn samsung() -> Company {
        Company {
            name: "삼성전자".to_string(),
            registry_code: "00126380".to_string(),
            stock_code: Some("005930".to_string()),
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a/b\\c:d*e?f\"g<h>i|j"), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("  반기보고서   (2023.06) "), "반기보고서_(2023.06)");
        assert_eq!(sanitize_filename(""), "unknown_report");
        assert_eq!(sanitize_filename("   "), "unknown_report");
    }

    #[test]
    fn test_sanitize_truncates_by_characters() {
        let long = "가".repeat(200);
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.chars().count(), 120);
    }

    #[test]
    fn test_output_dir_layout() {
        let temp_dir = TempDir::new().unwrap();
        let dir = prepare_output_dir(temp_dir.path(), 2023, &samsung()).unwrap();
        assert!(dir.is_dir());
        assert_eq!(
            dir.file_name().unwrap().to_str().unwrap(),
            "DART_2023_삼성전자_00126380_ZIP"
        );

        // Preparing twice is fine
        prepare_output_dir(temp_dir.path(), 2023, &samsung()).unwrap();
        assert_eq!(summary_stem(2023), "공시ZIP요약_2023");
    }
}
