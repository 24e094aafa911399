//! HTTP boundary to the OpenDART API

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use tracing::debug;

use crate::config::Config;
use crate::dart::{DartApiPaths, DartError, ListResponse};

/// Query window for `list.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub corp_code: String,
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl ListQuery {
    /// Whole calendar year, January 1st through December 31st
    pub fn for_year(corp_code: &str, year: i32) -> Result<Self, DartError> {
        let begin = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| DartError::Config(format!("Invalid year: {}", year)))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| DartError::Config(format!("Invalid year: {}", year)))?;
        Ok(Self {
            corp_code: corp_code.to_string(),
            begin,
            end,
        })
    }
}

/// Operations the downloader needs from DART.
///
/// Every call carries the API key; implementations own it.
#[async_trait]
pub trait DartApi: Send + Sync {
    /// Raw company master archive (`corpCode.xml`)
    async fn corp_code_archive(&self) -> Result<Vec<u8>, DartError>;

    /// One page of the disclosure listing
    async fn list_page(&self, query: &ListQuery, page_no: u32) -> Result<ListResponse, DartError>;

    /// Raw document archive for a receipt number
    async fn document_archive(&self, receipt_no: &str) -> Result<Vec<u8>, DartError>;
}

/// reqwest-backed DART client
#[derive(Debug, Clone)]
pub struct DartClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DartClient {
    pub fn new(api_key: &str, config: &Config) -> Result<Self, DartError> {
        if api_key.trim().is_empty() {
            return Err(DartError::Config("API key must not be empty".to_string()));
        }

        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: api_key.trim().to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_bytes(
        &self,
        endpoint: &'static str,
        params: &[(&str, &str)],
    ) -> Result<Vec<u8>, DartError> {
        let url = self.url(endpoint);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(&[("crtfc_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DartError::HttpStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl DartApi for DartClient {
    async fn corp_code_archive(&self) -> Result<Vec<u8>, DartError> {
        self.get_bytes(DartApiPaths::CORP_CODE_ENDPOINT, &[]).await
    }

    async fn list_page(&self, query: &ListQuery, page_no: u32) -> Result<ListResponse, DartError> {
        let bgn_de = query.begin.format("%Y%m%d").to_string();
        let end_de = query.end.format("%Y%m%d").to_string();
        let page_no = page_no.to_string();
        let page_count = DartApiPaths::MAX_PAGE_COUNT.to_string();

        let body = self
            .get_bytes(
                DartApiPaths::LIST_ENDPOINT,
                &[
                    ("corp_code", query.corp_code.as_str()),
                    ("bgn_de", bgn_de.as_str()),
                    ("end_de", end_de.as_str()),
                    ("page_no", page_no.as_str()),
                    ("page_count", page_count.as_str()),
                ],
            )
            .await?;

        Ok(serde_json::from_slice(&body)?)
    }

    async fn document_archive(&self, receipt_no: &str) -> Result<Vec<u8>, DartError> {
        self.get_bytes(DartApiPaths::DOCUMENT_ENDPOINT, &[("rcept_no", receipt_no)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_for_year() {
        let query = ListQuery::for_year("00126380", 2023).unwrap();
        assert_eq!(query.begin.format("%Y%m%d").to_string(), "20230101");
        assert_eq!(query.end.format("%Y%m%d").to_string(), "20231231");
    }

    #[test]
    fn test_client_rejects_blank_key() {
        let config = Config::default();
        assert!(DartClient::new("   ", &config).is_err());

        let client = DartClient::new(" key ", &config).unwrap();
        assert_eq!(client.api_key, "key");
        assert_eq!(client.url(DartApiPaths::LIST_ENDPOINT), "https://opendart.fss.or.kr/api/list.json");
    }
}
