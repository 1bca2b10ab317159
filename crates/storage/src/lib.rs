use anyhow::{anyhow, Context, Result};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use shared::domain::{Column, Record, FAVORABLE, UNFAVORABLE};

/// In-memory company dataset backed by a CSV file.
#[derive(Clone, Default)]
pub struct Storage {
    records: Arc<RwLock<Vec<Record>>>,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub company: String,
    pub website: String,
    pub research_reports: i64,
    pub lab_reports: i64,
    pub field_reports: i64,
    pub testimonials: i64,
    pub news_articles: i64,
    pub news_sentiment: String,
}

/// Partial update for a single company. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct CompanyPatch {
    pub website: Option<String>,
    pub total_citations: Option<i64>,
    pub research_reports: Option<i64>,
    pub lab_reports: Option<i64>,
    pub field_reports: Option<i64>,
    pub testimonials: Option<i64>,
    pub news_articles: Option<i64>,
    pub news_sentiment: Option<String>,
}

impl CompanyPatch {
    fn touches_citation_sources(&self) -> bool {
        self.research_reports.is_some()
            || self.lab_reports.is_some()
            || self.field_reports.is_some()
            || self.testimonials.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalMismatch {
    pub company: String,
    pub total_citations: Option<i64>,
    /// `None` when the four citation sources overflow.
    pub calculated_total: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub total_mismatches: Vec<TotalMismatch>,
    /// Every row whose company name appears more than once, in dataset order.
    pub duplicate_companies: Vec<String>,
    pub invalid_sentiments: Vec<(String, Option<String>)>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.total_mismatches.is_empty()
            && self.duplicate_companies.is_empty()
            && self.invalid_sentiments.is_empty()
    }

    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.total_mismatches.is_empty() {
            issues.push(format!(
                "Total citation mismatches found in {} rows",
                self.total_mismatches.len()
            ));
        }
        if !self.duplicate_companies.is_empty() {
            issues.push(format!(
                "Duplicate companies found: {} rows",
                self.duplicate_companies.len()
            ));
        }
        if !self.invalid_sentiments.is_empty() {
            issues.push(format!(
                "Invalid sentiment values: {} rows",
                self.invalid_sentiments.len()
            ));
        }
        issues
    }
}

impl Storage {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Loads the dataset from `path`. A missing file yields an empty dataset.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "data file not found; starting with empty dataset");
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read data file '{}'", path.display()))
            }
        };

        let records = parse_csv(&raw)
            .with_context(|| format!("failed to parse data file '{}'", path.display()))?;
        info!(path = %path.display(), rows = records.len(), "loaded dataset");
        Ok(Self::from_records(records))
    }

    pub async fn list_records(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn add_company(&self, new: NewCompany) -> Result<Record> {
        if new.company.trim().is_empty() {
            return Err(anyhow!("company name must not be empty"));
        }

        let total = [
            new.research_reports,
            new.lab_reports,
            new.field_reports,
            new.testimonials,
        ]
        .into_iter()
        .try_fold(0i64, i64::checked_add)
        .ok_or_else(|| anyhow!("citation total for '{}' overflows", new.company))?;
        let record = Record {
            company: new.company,
            website: new.website,
            total_citations: Some(total),
            research_reports: Some(new.research_reports),
            lab_reports: Some(new.lab_reports),
            field_reports: Some(new.field_reports),
            testimonials: Some(new.testimonials),
            news_articles: Some(new.news_articles),
            news_sentiment: Some(new.news_sentiment),
        };

        self.records.write().await.push(record.clone());
        info!(company = %record.company, "added company");
        Ok(record)
    }

    /// Applies `patch` to the first row named `company`. Citation totals are
    /// recomputed whenever one of the four citation sources changes.
    pub async fn update_company(&self, company: &str, patch: CompanyPatch) -> Result<Record> {
        let mut records = self.records.write().await;
        let row = records
            .iter_mut()
            .find(|r| r.company == company)
            .ok_or_else(|| anyhow!("company '{company}' not found"))?;

        let recompute = patch.touches_citation_sources();
        let mut updated = row.clone();
        if let Some(v) = patch.website {
            updated.website = v;
        }
        if let Some(v) = patch.total_citations {
            updated.total_citations = Some(v);
        }
        if let Some(v) = patch.research_reports {
            updated.research_reports = Some(v);
        }
        if let Some(v) = patch.lab_reports {
            updated.lab_reports = Some(v);
        }
        if let Some(v) = patch.field_reports {
            updated.field_reports = Some(v);
        }
        if let Some(v) = patch.testimonials {
            updated.testimonials = Some(v);
        }
        if let Some(v) = patch.news_articles {
            updated.news_articles = Some(v);
        }
        if let Some(v) = patch.news_sentiment {
            updated.news_sentiment = Some(v);
        }
        if recompute {
            let total = updated
                .citation_sum()
                .ok_or_else(|| anyhow!("citation total for '{company}' overflows"))?;
            updated.total_citations = Some(total);
        }
        *row = updated;

        info!(%company, "updated company");
        Ok(row.clone())
    }

    pub async fn validate(&self) -> ValidationReport {
        let records = self.records.read().await;
        let mut report = ValidationReport::default();

        for row in records.iter() {
            let calculated_total = row.citation_sum();
            if calculated_total.is_none() || row.total_citations != calculated_total {
                report.total_mismatches.push(TotalMismatch {
                    company: row.company.clone(),
                    total_citations: row.total_citations,
                    calculated_total,
                });
            }
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for row in records.iter() {
            *seen.entry(row.company.as_str()).or_default() += 1;
        }
        report.duplicate_companies = records
            .iter()
            .filter(|r| seen.get(r.company.as_str()).copied().unwrap_or(0) > 1)
            .map(|r| r.company.clone())
            .collect();

        report.invalid_sentiments = records
            .iter()
            .filter(|r| {
                !matches!(
                    r.news_sentiment.as_deref(),
                    Some(FAVORABLE) | Some(UNFAVORABLE)
                )
            })
            .map(|r| (r.company.clone(), r.news_sentiment.clone()))
            .collect();

        report
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let records = self.records.read().await;
        let encoded = encode_csv(&records)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create parent directory '{}'", parent.display())
            })?;
        }
        tokio::fs::write(path, encoded)
            .await
            .with_context(|| format!("failed to write data file '{}'", path.display()))?;

        info!(path = %path.display(), rows = records.len(), "saved dataset");
        Ok(path.to_path_buf())
    }
}

pub fn parse_csv(raw: &[u8]) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(raw);
    reader
        .deserialize::<Record>()
        .enumerate()
        .map(|(idx, row)| row.with_context(|| format!("invalid row {}", idx + 1)))
        .collect()
}

pub fn encode_csv(records: &[Record]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    // The writer only emits a header alongside the first row.
    if records.is_empty() {
        writer
            .write_record(Column::ALL.map(Column::as_str))
            .context("failed to encode header")?;
    }
    for row in records {
        writer.serialize(row).context("failed to encode row")?;
    }
    writer.into_inner().context("failed to flush csv writer")
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
