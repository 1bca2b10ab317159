//! Case-study scraping: pulls report cards off a company page, classifies each
//! one by keyword, and tallies the counts that feed the dataset.

use std::{fmt, time::Duration};

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use shared::domain::{Sentiment, FAVORABLE, UNFAVORABLE};
use storage::{CompanyPatch, NewCompany};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_CASE_STUDIES_URL: &str = "https://humagro.com/case-studies/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const RESEARCH_KEYWORDS: &[&str] = &["research", "study", "trial", "university", "academic"];
const FIELD_KEYWORDS: &[&str] = &["field", "farm", "grower", "acre", "crop", "yield"];
const LAB_KEYWORDS: &[&str] = &["lab", "laboratory", "analysis", "test"];

const POSITIVE_KEYWORDS: &[&str] = &[
    "increase",
    "improve",
    "better",
    "higher",
    "enhanced",
    "boost",
    "success",
    "positive",
    "effective",
    "benefit",
    "gain",
    "growth",
    "superior",
    "excellent",
    "significant",
    "outstanding",
];
const NEGATIVE_KEYWORDS: &[&str] = &[
    "decrease",
    "decline",
    "lower",
    "reduce",
    "fail",
    "negative",
    "poor",
    "worse",
    "ineffective",
    "loss",
];

/// Tried in order; every match is kept.
const CARD_SELECTORS: &[&str] = &[
    "div.case-study",
    "article.post",
    "div.card",
    "div.study",
    "a.case-study-link",
];
const DESCRIPTION_SELECTOR: &str =
    "p.description, p.excerpt, p.summary, div.description, div.excerpt, div.summary";
const TAG_SELECTOR: &str = "span.tag, span.category, span.label, a.tag, a.category, a.label";
const LINK_HINTS: &[&str] = &["case", "study", "research"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Research,
    Field,
    Lab,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportType::Research => "research",
            ReportType::Field => "field",
            ReportType::Lab => "lab",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseStudy {
    pub title: String,
    pub url: String,
    pub description: String,
    pub tags: Vec<String>,
    pub report_type: ReportType,
    pub outcome: Sentiment,
}

fn keyword_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

/// Highest keyword score wins; ties go to research, then field. No hits at
/// all counts as a field report.
pub fn categorize_report_type(title: &str, description: &str, tags: &[String]) -> ReportType {
    let text = format!("{title} {description} {}", tags.join(" ")).to_lowercase();
    let scores = [
        (ReportType::Research, keyword_hits(&text, RESEARCH_KEYWORDS)),
        (ReportType::Field, keyword_hits(&text, FIELD_KEYWORDS)),
        (ReportType::Lab, keyword_hits(&text, LAB_KEYWORDS)),
    ];

    let mut best = (ReportType::Field, 0);
    for (kind, score) in scores {
        if score > best.1 {
            best = (kind, score);
        }
    }
    best.0
}

/// Unfavorable only when negative keywords outnumber positive ones.
pub fn determine_outcome(title: &str, description: &str) -> Sentiment {
    let text = format!("{title} {description}").to_lowercase();
    let positive = keyword_hits(&text, POSITIVE_KEYWORDS);
    let negative = keyword_hits(&text, NEGATIVE_KEYWORDS);
    if negative > positive {
        Sentiment::Unfavorable
    } else {
        Sentiment::Favorable
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector '{css}': {e}"))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn absolute_link(base_url: &Url, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    base_url
        .join(href)
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}

/// Finds case-study cards in `html`. Falls back to every link whose target
/// looks like a case study when no card matches.
pub fn extract_case_studies(html: &str, base_url: &Url) -> Result<Vec<CaseStudy>> {
    let document = Html::parse_document(html);
    let link_selector = selector("a[href]")?;
    let description_selector = selector(DESCRIPTION_SELECTOR)?;
    let tag_selector = selector(TAG_SELECTOR)?;

    let mut cards = Vec::new();
    for css in CARD_SELECTORS {
        let found: Vec<_> = document.select(&selector(css)?).collect();
        if !found.is_empty() {
            debug!(selector = *css, count = found.len(), "matched case-study cards");
            cards.extend(found);
        }
    }

    if cards.is_empty() {
        cards = document
            .select(&link_selector)
            .filter(|link| {
                let href = link.value().attr("href").unwrap_or_default().to_lowercase();
                LINK_HINTS.iter().any(|hint| href.contains(hint))
            })
            .collect();
        debug!(count = cards.len(), "fell back to case-study links");
    }

    let studies = cards
        .into_iter()
        .map(|card| {
            let title = element_text(card);
            let href = if card.value().name() == "a" {
                card.value().attr("href")
            } else {
                card.select(&link_selector)
                    .next()
                    .and_then(|a| a.value().attr("href"))
            };
            let description = card
                .select(&description_selector)
                .next()
                .map(element_text)
                .unwrap_or_default();
            let tags: Vec<String> = card.select(&tag_selector).map(element_text).collect();

            CaseStudy {
                report_type: categorize_report_type(&title, &description, &tags),
                outcome: determine_outcome(&title, &description),
                url: absolute_link(base_url, href.unwrap_or_default()),
                title,
                description,
                tags,
            }
        })
        .collect();
    Ok(studies)
}

pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("failed to build http client")
}

pub async fn fetch_page(client: &Client, url: &Url) -> Result<String> {
    info!(%url, "fetching case studies");
    let body = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("failed to fetch {url}"))?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub total: i64,
    pub research: i64,
    pub field: i64,
    pub lab: i64,
    pub favorable: i64,
    pub unfavorable: i64,
}

impl ScrapeSummary {
    pub fn from_studies(studies: &[CaseStudy]) -> Self {
        let mut summary = Self::default();
        for study in studies {
            summary.total += 1;
            match study.report_type {
                ReportType::Research => summary.research += 1,
                ReportType::Field => summary.field += 1,
                ReportType::Lab => summary.lab += 1,
            }
            match study.outcome {
                Sentiment::Favorable => summary.favorable += 1,
                Sentiment::Unfavorable => summary.unfavorable += 1,
            }
        }
        summary
    }

    /// Report counts for an existing company; the stored total is recomputed
    /// from them.
    pub fn to_patch(&self) -> CompanyPatch {
        CompanyPatch {
            research_reports: Some(self.research),
            lab_reports: Some(self.lab),
            field_reports: Some(self.field),
            ..CompanyPatch::default()
        }
    }

    /// A fresh row; sentiment follows the majority outcome, favorable on ties.
    pub fn to_new_company(&self, company: &str, website: &str) -> NewCompany {
        let sentiment = if self.unfavorable > self.favorable {
            UNFAVORABLE
        } else {
            FAVORABLE
        };
        NewCompany {
            company: company.to_string(),
            website: website.to_string(),
            research_reports: self.research,
            lab_reports: self.lab,
            field_reports: self.field,
            testimonials: 0,
            news_articles: 0,
            news_sentiment: sentiment.to_string(),
        }
    }
}

impl fmt::Display for ScrapeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Reports Found: {}", self.total)?;
        writeln!(f, "  - Research Reports: {}", self.research)?;
        writeln!(f, "  - Field Reports: {}", self.field)?;
        writeln!(f, "  - Lab Reports: {}", self.lab)?;
        writeln!(f, "Outcome Analysis:")?;
        writeln!(f, "  - Favorable: {}", self.favorable)?;
        write!(f, "  - Unfavorable: {}", self.unfavorable)
    }
}

#[cfg(test)]
#[path = "tests/scrape_tests.rs"]
mod tests;
