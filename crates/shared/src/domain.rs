use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FAVORABLE: &str = "favorable";
pub const UNFAVORABLE: &str = "unfavorable";

/// One company row as served by `/api/data`.
///
/// Every field is optional on the wire; absent values render as blank cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub company: String,
    pub website: String,
    pub total_citations: Option<i64>,
    pub research_reports: Option<i64>,
    pub lab_reports: Option<i64>,
    pub field_reports: Option<i64>,
    pub testimonials: Option<i64>,
    pub news_articles: Option<i64>,
    pub news_sentiment: Option<String>,
}

impl Record {
    pub fn count(&self, column: Column) -> Option<i64> {
        match column {
            Column::TotalCitations => self.total_citations,
            Column::ResearchReports => self.research_reports,
            Column::LabReports => self.lab_reports,
            Column::FieldReports => self.field_reports,
            Column::Testimonials => self.testimonials,
            Column::NewsArticles => self.news_articles,
            Column::Company | Column::Website | Column::NewsSentiment => None,
        }
    }

    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_raw(self.news_sentiment.as_deref())
    }

    /// Sum of the four citation sources, or `None` if it overflows.
    /// Missing counts contribute zero.
    pub fn citation_sum(&self) -> Option<i64> {
        [
            self.research_reports,
            self.lab_reports,
            self.field_reports,
            self.testimonials,
        ]
        .into_iter()
        .try_fold(0i64, |acc, v| acc.checked_add(v.unwrap_or(0)))
    }

    pub fn link_target(&self) -> String {
        format!("https://{}", self.website)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Company,
    Website,
    TotalCitations,
    ResearchReports,
    LabReports,
    FieldReports,
    Testimonials,
    NewsArticles,
    NewsSentiment,
}

impl Column {
    /// Display order of the rendered table.
    pub const ALL: [Column; 9] = [
        Column::Company,
        Column::Website,
        Column::TotalCitations,
        Column::ResearchReports,
        Column::LabReports,
        Column::FieldReports,
        Column::Testimonials,
        Column::NewsArticles,
        Column::NewsSentiment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Column::Company => "company",
            Column::Website => "website",
            Column::TotalCitations => "total_citations",
            Column::ResearchReports => "research_reports",
            Column::LabReports => "lab_reports",
            Column::FieldReports => "field_reports",
            Column::Testimonials => "testimonials",
            Column::NewsArticles => "news_articles",
            Column::NewsSentiment => "news_sentiment",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Column::Company => "Company",
            Column::Website => "Website",
            Column::TotalCitations => "Total Citations",
            Column::ResearchReports => "Research Reports",
            Column::LabReports => "Lab Reports",
            Column::FieldReports => "Field Reports",
            Column::Testimonials => "Testimonials",
            Column::NewsArticles => "News Articles",
            Column::NewsSentiment => "News Sentiment",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            Column::Company | Column::Website | Column::NewsSentiment
        )
    }

    /// Ascending comparison of two records on this column.
    ///
    /// Counts compare numerically and text lexicographically; absent values
    /// order before present ones.
    pub fn compare(self, a: &Record, b: &Record) -> Ordering {
        match self {
            Column::Company => a.company.cmp(&b.company),
            Column::Website => a.website.cmp(&b.website),
            Column::NewsSentiment => a.news_sentiment.cmp(&b.news_sentiment),
            numeric => a.count(numeric).cmp(&b.count(numeric)),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown column '{0}'")]
pub struct ColumnParseError(pub String);

impl FromStr for Column {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| ColumnParseError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Next direction for a header click given the last one applied.
    pub fn toggled(previous: Option<SortDirection>) -> SortDirection {
        match previous {
            Some(SortDirection::Asc) => SortDirection::Desc,
            Some(SortDirection::Desc) | None => SortDirection::Asc,
        }
    }

    /// Lenient parse used by URL paths: only `asc` is ascending.
    pub fn from_segment(segment: &str) -> SortDirection {
        if segment == "asc" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Favorable,
    Unfavorable,
}

impl Sentiment {
    pub fn from_raw(raw: Option<&str>) -> Sentiment {
        if raw == Some(FAVORABLE) {
            Sentiment::Favorable
        } else {
            Sentiment::Unfavorable
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Sentiment::Favorable => FAVORABLE,
            Sentiment::Unfavorable => UNFAVORABLE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Favorable => "👍 Favorable",
            Sentiment::Unfavorable => "👎 Unfavorable",
        }
    }
}

/// Stable in-place sort; equal keys keep their relative order in both directions.
pub fn sort_records(records: &mut [Record], column: Column, direction: SortDirection) {
    records.sort_by(|a, b| direction.apply(column.compare(a, b)));
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
