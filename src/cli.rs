use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use tracing::info;

use crate::dart::search_companies;
use crate::models::Company;

#[derive(Parser)]
#[command(name = "dartzip")]
#[command(about = "Interactively download a company's DART disclosure archives for one year")]
#[command(version)]
pub struct Cli {}

/// What the user picked from the candidate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Company(usize),
    SearchAgain,
}

/// The questions asked while picking a company
pub trait CompanyPrompts {
    fn company_query(&self) -> Result<String>;
    fn select_company(&self, candidates: &[Company]) -> Result<Selection>;
    /// Asked after a search with no matches; `false` ends the run
    fn retry_search(&self) -> Result<bool>;
}

/// Search until the user picks a company; `None` when they give up.
pub fn choose_company<P: CompanyPrompts + ?Sized>(
    prompts: &P,
    master: &[Company],
    limit: usize,
) -> Result<Option<Company>> {
    loop {
        let query = prompts.company_query()?;
        let candidates = search_companies(master, &query, limit);
        info!("Search '{}' matched {} companies", query, candidates.len());

        if candidates.is_empty() {
            if prompts.retry_search()? {
                continue;
            }
            return Ok(None);
        }

        match prompts.select_company(&candidates)? {
            Selection::Company(index) => match candidates.get(index) {
                Some(company) => return Ok(Some(company.clone())),
                None => continue,
            },
            Selection::SearchAgain => continue,
        }
    }
}

/// Interactive prompts, all sharing one theme
pub struct Prompter {
    theme: ColorfulTheme,
}

impl Default for Prompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    pub fn api_key(&self) -> Result<String> {
        let key = Password::with_theme(&self.theme)
            .with_prompt("🔑 OpenDART API Key")
            .interact()
            .context("Failed to read API key")?;
        Ok(key.trim().to_string())
    }

    /// Ask for a four-digit year; anything else falls back to the current year.
    pub fn year(&self) -> Result<i32> {
        let current = Local::now().year();
        let input: String = Input::with_theme(&self.theme)
            .with_prompt("📅 다운로드 연도 (예: 2024)")
            .default(current.to_string())
            .interact_text()
            .context("Failed to read year")?;

        match parse_year(&input) {
            Some(year) => Ok(year),
            None => {
                println!(
                    "{} 연도 형식이 올바르지 않아 현재 연도({})로 진행합니다.",
                    style("⚠").yellow(),
                    current
                );
                Ok(current)
            }
        }
    }
}

impl CompanyPrompts for Prompter {
    fn company_query(&self) -> Result<String> {
        let query: String = Input::with_theme(&self.theme)
            .with_prompt("🏢 회사명 (부분 일치 가능)")
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.trim().is_empty() {
                    Err("회사명을 입력하세요")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .context("Failed to read company name")?;
        Ok(query.trim().to_string())
    }

    fn select_company(&self, candidates: &[Company]) -> Result<Selection> {
        let mut items: Vec<String> = candidates.iter().map(Company::display_label).collect();
        items.push(style("↺ 다시 검색").dim().to_string());

        let index = Select::with_theme(&self.theme)
            .with_prompt(format!("🔎 검색 결과 {}건, 회사를 선택하세요", candidates.len()))
            .items(&items)
            .default(0)
            .max_length(20)
            .interact()
            .context("Failed to select company")?;

        Ok(selection_from_index(index, candidates.len()))
    }

    fn retry_search(&self) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt("검색 결과가 없습니다. 다시 검색할까요?")
            .default(true)
            .interact()
            .context("Failed to confirm")
    }
}

fn selection_from_index(index: usize, candidate_count: usize) -> Selection {
    if index < candidate_count {
        Selection::Company(index)
    } else {
        Selection::SearchAgain
    }
}

/// Four ASCII digits, nothing else.
pub fn parse_year(input: &str) -> Option<i32> {
    let trimmed = input.trim();
    if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        trimmed.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Answers prompts from fixed queues, in order
    #[derive(Default)]
    struct ScriptedPrompts {
        queries: RefCell<VecDeque<&'static str>>,
        selections: RefCell<VecDeque<Selection>>,
        retries: RefCell<VecDeque<bool>>,
        offered: RefCell<Vec<usize>>,
    }

    impl ScriptedPrompts {
        fn new(queries: &[&'static str], selections: Vec<Selection>, retries: &[bool]) -> Self {
            Self {
                queries: RefCell::new(queries.iter().copied().collect()),
                selections: RefCell::new(selections.into()),
                retries: RefCell::new(retries.iter().copied().collect()),
                offered: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompanyPrompts for ScriptedPrompts {
        fn company_query(&self) -> Result<String> {
            self.queries
                .borrow_mut()
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("no more queries"))
        }

        fn select_company(&self, candidates: &[Company]) -> Result<Selection> {
            self.offered.borrow_mut().push(candidates.len());
            self.selections
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no more selections"))
        }

        fn retry_search(&self) -> Result<bool> {
            self.retries
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no more retry answers"))
        }
    }

    fn master() -> Vec<Company> {
        vec![
            Company {
                name: "삼성전자".to_string(),
                registry_code: "00126380".to_string(),
                stock_code: Some("005930".to_string()),
            },
            Company {
                name: "삼성물산".to_string(),
                registry_code: "00149655".to_string(),
                stock_code: Some("028260".to_string()),
            },
            Company {
                name: "카카오".to_string(),
                registry_code: "00258801".to_string(),
                stock_code: Some("035720".to_string()),
            },
        ]
    }

    #[test]
    fn test_no_match_then_decline_ends_without_company() {
        let prompts = ScriptedPrompts::new(&["없는회사"], vec![], &[false]);

        let chosen = choose_company(&prompts, &master(), 200).unwrap();

        assert!(chosen.is_none());
        assert!(prompts.offered.borrow().is_empty());
        assert!(prompts.retries.borrow().is_empty());
    }

    #[test]
    fn test_no_match_then_retry_finds_company() {
        let prompts = ScriptedPrompts::new(&["없는회사", "카카오"], vec![Selection::Company(0)], &[true]);

        let chosen = choose_company(&prompts, &master(), 200).unwrap().unwrap();

        assert_eq!(chosen.registry_code, "00258801");
        assert_eq!(*prompts.offered.borrow(), vec![1]);
    }

    #[test]
    fn test_search_again_restarts_query() {
        let prompts = ScriptedPrompts::new(
            &["삼성", "삼성물산"],
            vec![Selection::SearchAgain, Selection::Company(0)],
            &[],
        );

        let chosen = choose_company(&prompts, &master(), 200).unwrap().unwrap();

        assert_eq!(chosen.name, "삼성물산");
        assert_eq!(*prompts.offered.borrow(), vec![2, 1]);
    }

    #[test]
    fn test_prompt_error_propagates() {
        let prompts = ScriptedPrompts::new(&[], vec![], &[]);
        assert!(choose_company(&prompts, &master(), 200).is_err());
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2023"), Some(2023));
        assert_eq!(parse_year(" 2024 "), Some(2024));
        assert_eq!(parse_year("23"), None);
        assert_eq!(parse_year("20234"), None);
        assert_eq!(parse_year("+202"), None);
        assert_eq!(parse_year("이천이십삼"), None);
    }

    #[test]
    fn test_selection_from_index() {
        assert_eq!(selection_from_index(0, 3), Selection::Company(0));
        assert_eq!(selection_from_index(2, 3), Selection::Company(2));
        assert_eq!(selection_from_index(3, 3), Selection::SearchAgain);
    }

    #[test]
    fn test_cli_has_no_arguments() {
        assert!(Cli::try_parse_from(["dartzip"]).is_ok());
        assert!(Cli::try_parse_from(["dartzip", "--year", "2023"]).is_err());
    }
}
