use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

use dartzip::cli::{choose_company, Cli, Prompter};
use dartzip::config::Config;
use dartzip::dart::{load_company_master, DartClient};
use dartzip::models::DownloadStatus;
use dartzip::pipeline::{self, RunReport, RunRequest};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Keep the console quiet by default; the log file gets INFO
    let console_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let file_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "dartzip=info".to_string());

    // Initialize logging to both console and file
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let file_appender = tracing_appender::rolling::never(".", "dartzip.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::new(console_filter))
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::new(file_filter))
        )
        .init();

    let _cli = Cli::parse();
    let config = Config::from_env()?;
    config.validate()?;

    println!("\n{}\n", style("=== DART 공시 ZIP 다운로더 ===").cyan().bold());

    // Reported once on stdout; the console log layer is WARN, so this only reaches the file
    match run_interactive(&config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            info!("Run failed: {:#}", e);
            println!("\n{} {:#}", style("❌").red(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_interactive(config: &Config) -> Result<()> {
    let prompter = Prompter::new();

    let api_key = prompter.api_key()?;
    let client = DartClient::new(&api_key, config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("법인코드 마스터 확인 중…");
    spinner.enable_steady_tick(Duration::from_millis(120));
    let master = load_company_master(&client, &config.cache_dir, config.corp_cache_ttl())
        .await
        .context("Failed to load the DART company master");
    spinner.finish_and_clear();
    let master = master?;

    let Some(company) = choose_company(&prompter, &master, config.max_candidates)? else {
        println!("종료합니다.");
        return Ok(());
    };

    let year = prompter.year()?;
    info!(
        "Selected {} ({}) for {}",
        company.name, company.registry_code, year
    );

    println!(
        "\n📡 공시 목록 조회: {} / {}-01-01 ~ {}-12-31",
        company.name, year, year
    );

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {pos}건 처리 {msg}")
            .context("Invalid progress bar template")?,
    );
    progress.enable_steady_tick(Duration::from_millis(120));

    let request = RunRequest { company, year };
    let report = pipeline::run(&client, &request, config, |index, record, result| {
        let marker = match &result.status {
            DownloadStatus::Downloaded { .. } => style("✓").green(),
            DownloadStatus::Skipped => style("↪").cyan(),
            DownloadStatus::Failed(_) => style("✗").red(),
        };
        progress.println(format!(
            "{} [{}] {} ({}) 접수번호:{}",
            marker,
            index + 1,
            record.report_title,
            record.formatted_date("%Y-%m-%d", "날짜 미상"),
            record.receipt_no
        ));
        progress.inc(1);
    })
    .await
    .context("Failed to list disclosures");
    progress.finish_and_clear();
    let report = report?;

    print_report(&request, &report);
    Ok(())
}

fn print_report(request: &RunRequest, report: &RunReport) {
    let Some(output_dir) = &report.output_dir else {
        println!(
            "{} {}년 공시가 없습니다. 종료합니다.",
            style("⚠").yellow(),
            request.year
        );
        return;
    };

    println!("\n{}", style("🎉 완료!").green().bold());
    println!("📁 저장 폴더  : {}", output_dir.display());
    println!(
        "🧾 ZIP 다운로드: {} 성공 / {} 실패 (총 {}건, 파일명은 접수번호.zip)",
        report.succeeded(),
        report.failed(),
        report.records.len()
    );

    if let Some(summary) = &report.summary {
        match &summary.excel {
            Ok(path) => println!("📊 요약(Excel): {}", path.display()),
            Err(e) => println!("{} 엑셀 저장 실패: {}", style("⚠").yellow(), e),
        }
        match &summary.csv {
            Ok(path) => println!("📄 요약(CSV)  : {}", path.display()),
            Err(e) => println!("{} CSV 저장 실패: {}", style("⚠").yellow(), e),
        }
    }
}
