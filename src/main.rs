mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use bookscout::config::ScoutConfig;
use bookscout::filter::{filter_sources, page_count, paginate};
use bookscout::types::{BookSource, ScrapeResult};
use bookscout::{logging, BookScout};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = ScoutConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Relays => {
            for r in &config.relays {
                println!("{:<12} {:<14} {}", r.name, format!("{:?}", r.style), r.endpoint);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Parse { file, json } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("reading html: {}", file.display()))?;
            let scout = BookScout::new(config)?;
            let result = scout.parse_html(&html);
            report(&result, None, json, None)
        }
        Commands::Page { page, filter, json, analyze, per_page, view } => {
            let scout = BookScout::new(config)?;
            let result = scout.fetch_page(page).await;
            let report_code = report(&result, filter.as_deref(), json, per_page.map(|n| (view.unwrap_or(1), n)))?;
            if analyze && result.is_success() {
                if !scout.can_analyze() {
                    eprintln!("analysis unavailable: no API key configured");
                } else if let Some(a) = scout.analyze(result.data()).await {
                    println!("\nSummary: {}", a.summary);
                    if !a.tags.is_empty() {
                        println!("Tags: {}", a.tags.join(", "));
                    }
                } else {
                    eprintln!("analysis failed; see log for details");
                }
            }
            Ok(report_code)
        }
    }
}

/// `chunk` is `(view, per_page)`: show only that slice of the filtered rows.
fn report(result: &ScrapeResult, filter: Option<&str>, json: bool, chunk: Option<(usize, usize)>) -> Result<ExitCode> {
    if json {
        let shown = match filter {
            Some(q) if result.is_success() => {
                ScrapeResult::Success(filter_sources(result.data(), q).into_iter().cloned().collect())
            }
            _ => result.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else if let Some(err) = result.error() {
        eprintln!("error: {err}");
    } else {
        let matched = filter_sources(result.data(), filter.unwrap_or(""));
        let rows = match chunk {
            Some((view, per_page)) => paginate(&matched, view, per_page),
            None => &matched[..],
        };
        for s in rows {
            print_row(s);
        }
        match chunk {
            Some((view, per_page)) => println!(
                "view {view}/{}: {} of {} matching ({} total)",
                page_count(matched.len(), per_page),
                rows.len(),
                matched.len(),
                result.data().len()
            ),
            None => println!("{} of {} sources", matched.len(), result.data().len()),
        }
    }
    Ok(if result.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_row(s: &BookSource) {
    println!("{:>6}  {:<12}  {}  {}", s.id, s.update_date.as_deref().unwrap_or("-"), s.title, s.json_url);
}
