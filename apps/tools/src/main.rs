use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::{sort_records, Column, SortDirection};
use storage::{CompanyPatch, NewCompany, Storage};
use tracing_subscriber::EnvFilter;
use url::Url;

mod scrape;

use scrape::{build_client, extract_case_studies, fetch_page, ScrapeSummary};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "data.csv")]
    data: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append a company; total citations are computed.
    Add {
        company: String,
        website: String,
        #[arg(long, default_value_t = 0)]
        research: i64,
        #[arg(long, default_value_t = 0)]
        lab: i64,
        #[arg(long, default_value_t = 0)]
        field: i64,
        #[arg(long, default_value_t = 0)]
        testimonials: i64,
        #[arg(long, default_value_t = 0)]
        news: i64,
        #[arg(long, default_value = "favorable")]
        sentiment: String,
    },
    /// Update fields of an existing company.
    Update {
        company: String,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        total: Option<i64>,
        #[arg(long)]
        research: Option<i64>,
        #[arg(long)]
        lab: Option<i64>,
        #[arg(long)]
        field: Option<i64>,
        #[arg(long)]
        testimonials: Option<i64>,
        #[arg(long)]
        news: Option<i64>,
        #[arg(long)]
        sentiment: Option<String>,
    },
    Validate,
    List {
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
    },
    /// Scrape a case-studies page and tally report types and outcomes.
    Scrape {
        #[arg(long, default_value = scrape::DEFAULT_CASE_STUDIES_URL)]
        url: String,
        #[arg(long, default_value = "Huma")]
        company: String,
        /// Website stored when the company is new; defaults to the page host.
        #[arg(long)]
        website: Option<String>,
        /// Write the tallies into the dataset.
        #[arg(long)]
        apply: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    let storage = Storage::open(&cli.data).await?;

    match cli.command {
        Command::Add {
            company,
            website,
            research,
            lab,
            field,
            testimonials,
            news,
            sentiment,
        } => {
            let record = storage
                .add_company(NewCompany {
                    company,
                    website,
                    research_reports: research,
                    lab_reports: lab,
                    field_reports: field,
                    testimonials,
                    news_articles: news,
                    news_sentiment: sentiment,
                })
                .await?;
            let path = storage.save(&cli.data).await?;
            println!(
                "added {} (total_citations={}); {} rows saved to {}",
                record.company,
                record.total_citations.unwrap_or_default(),
                storage.len().await,
                path.display()
            );
        }
        Command::Update {
            company,
            website,
            total,
            research,
            lab,
            field,
            testimonials,
            news,
            sentiment,
        } => {
            let patch = CompanyPatch {
                website,
                total_citations: total,
                research_reports: research,
                lab_reports: lab,
                field_reports: field,
                testimonials,
                news_articles: news,
                news_sentiment: sentiment,
            };
            let record = storage.update_company(&company, patch).await?;
            let path = storage.save(&cli.data).await?;
            println!(
                "updated {} (total_citations={}); saved to {}",
                record.company,
                record.total_citations.unwrap_or_default(),
                path.display()
            );
        }
        Command::Validate => {
            let report = storage.validate().await;
            for mismatch in &report.total_mismatches {
                println!(
                    "total mismatch: {} total_citations={:?} calculated={:?}",
                    mismatch.company, mismatch.total_citations, mismatch.calculated_total
                );
            }
            for company in &report.duplicate_companies {
                println!("duplicate company: {company}");
            }
            for (company, sentiment) in &report.invalid_sentiments {
                println!("invalid sentiment: {company} {sentiment:?}");
            }
            if !report.is_clean() {
                bail!("validation failed: {}", report.issues().join("; "));
            }
            println!("data validation passed");
        }
        Command::List { sort, desc } => {
            let mut records = storage.list_records().await;
            if let Some(column) = sort {
                let column: Column = column.parse()?;
                let direction = if desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                sort_records(&mut records, column, direction);
            }
            for record in records {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.company,
                    record.website,
                    record.total_citations.unwrap_or_default(),
                    record.sentiment().css_class()
                );
            }
        }
        Command::Scrape {
            url,
            company,
            website,
            apply,
        } => {
            let url = Url::parse(&url)?;
            let html = fetch_page(&build_client()?, &url).await?;
            let studies = extract_case_studies(&html, &url)?;
            if studies.is_empty() {
                println!("no case studies found on {url}; the page layout may have changed");
            }
            for (idx, study) in studies.iter().enumerate() {
                println!(
                    "[{}/{}] {} ({}): {}",
                    idx + 1,
                    studies.len(),
                    study.report_type,
                    study.outcome.css_class(),
                    study.title
                );
            }

            let summary = ScrapeSummary::from_studies(&studies);
            println!("{summary}");

            if apply {
                let exists = storage
                    .list_records()
                    .await
                    .iter()
                    .any(|r| r.company == company);
                let record = if exists {
                    storage.update_company(&company, summary.to_patch()).await?
                } else {
                    let website = website
                        .or_else(|| url.host_str().map(str::to_string))
                        .unwrap_or_default();
                    storage
                        .add_company(summary.to_new_company(&company, &website))
                        .await?
                };
                let path = storage.save(&cli.data).await?;
                println!(
                    "applied to {} (total_citations={}); saved to {}",
                    record.company,
                    record.total_citations.unwrap_or_default(),
                    path.display()
                );
            }
        }
    }

    Ok(())
}
