use shared::{domain::ColumnParseError, error::ApiException};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to fetch dataset: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request: {0}")]
    Api(#[from] ApiException),
    #[error("unexpected server status {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Column(#[from] ColumnParseError),
}
