//! In-memory DART used by tests

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::dart::{DartApi, DartError, ListItem, ListQuery, ListResponse};
use crate::models::DisclosureRecord;

#[derive(Default)]
pub struct FakeDart {
    corp_codes: Option<Vec<u8>>,
    list_pages: Vec<ListResponse>,
    documents: HashMap<String, Vec<u8>>,
    corp_code_calls: AtomicUsize,
    list_calls: AtomicUsize,
    document_calls: AtomicUsize,
    last_list_query: Mutex<Option<ListQuery>>,
}

impl FakeDart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_corp_codes(mut self, archive: Vec<u8>) -> Self {
        self.corp_codes = Some(archive);
        self
    }

    pub fn with_list_pages(mut self, pages: Vec<ListResponse>) -> Self {
        self.list_pages = pages;
        self
    }

    pub fn with_document(mut self, receipt_no: &str, body: Vec<u8>) -> Self {
        self.documents.insert(receipt_no.to_string(), body);
        self
    }

    pub fn with_documents_for(mut self, records: &[DisclosureRecord]) -> Self {
        for record in records {
            self.documents
                .insert(record.receipt_no.clone(), document_zip(&record.receipt_no));
        }
        self
    }

    pub fn corp_code_calls(&self) -> usize {
        self.corp_code_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    pub fn last_list_query(&self) -> Option<ListQuery> {
        self.last_list_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl DartApi for FakeDart {
    async fn corp_code_archive(&self) -> Result<Vec<u8>, DartError> {
        self.corp_code_calls.fetch_add(1, Ordering::SeqCst);
        self.corp_codes.clone().ok_or(DartError::HttpStatus {
            endpoint: "corpCode",
            status: 500,
        })
    }

    async fn list_page(&self, query: &ListQuery, page_no: u32) -> Result<ListResponse, DartError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_list_query.lock().unwrap() = Some(query.clone());
        Ok(self
            .list_pages
            .get(page_no as usize - 1)
            .cloned()
            .unwrap_or_else(|| list_page("000", 0, vec![])))
    }

    async fn document_archive(&self, receipt_no: &str) -> Result<Vec<u8>, DartError> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(receipt_no)
            .cloned()
            .ok_or(DartError::HttpStatus {
                endpoint: "document",
                status: 404,
            })
    }
}

fn zip_with(name: &str, contents: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().last_modified_time(zip::DateTime::default());
    writer.start_file(name, options).unwrap();
    writer.write_all(contents.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn corp_code_zip(xml: &str) -> Vec<u8> {
    zip_with("CORPCODE.xml", xml)
}

/// Deterministic archive for a receipt number
pub fn document_zip(receipt_no: &str) -> Vec<u8> {
    zip_with(
        &format!("{}.xml", receipt_no),
        &format!("<DOCUMENT><DOCUMENT-NAME>{}</DOCUMENT-NAME></DOCUMENT>", receipt_no),
    )
}

pub fn list_item(rcept_no: &str, rcept_dt: &str, report_nm: &str) -> ListItem {
    ListItem {
        corp_cls: Some("Y".to_string()),
        corp_name: Some("삼성전자".to_string()),
        corp_code: Some("00126380".to_string()),
        stock_code: Some("005930".to_string()),
        report_nm: Some(report_nm.to_string()),
        rcept_no: rcept_no.to_string(),
        flr_nm: Some("삼성전자".to_string()),
        rcept_dt: rcept_dt.to_string(),
        rm: None,
    }
}

pub fn list_page(status: &str, total_count: usize, list: Vec<ListItem>) -> ListResponse {
    ListResponse {
        status: status.to_string(),
        message: if status == "000" { "정상" } else { "오류" }.to_string(),
        page_no: 1,
        page_count: 100,
        total_count,
        total_page: 1,
        list,
    }
}

pub fn sample_records(count: usize) -> Vec<DisclosureRecord> {
    (1..=count)
        .map(|i| DisclosureRecord {
            receipt_no: format!("2023{:02}15{:06}", i, i),
            submission_date: NaiveDate::from_ymd_opt(2023, i as u32, 15),
            report_title: format!("주요사항보고서 {}", i),
            company_name: "삼성전자".to_string(),
            filer_name: "삼성전자".to_string(),
            remark: String::new(),
        })
        .collect()
}
