use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Column, Record, SortDirection},
    error::{ApiError, ApiException},
    routes::{data_route, sorted_data_path},
};
use url::Url;

use crate::error::ViewError;

/// Where the view gets its dataset from.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<Record>, ViewError>;
}

/// Fetches `/api/data` from a running server.
#[derive(Clone)]
pub struct HttpDataSource {
    http: Client,
    base_url: Url,
}

impl HttpDataSource {
    pub fn new(server_url: &str) -> Result<Self, ViewError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, ViewError> {
        let mut base_url = Url::parse(server_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn data_url(&self) -> Result<Url, ViewError> {
        Ok(self.base_url.join(relative(data_route()))?)
    }

    /// Asks the server to sort instead of sorting locally.
    pub async fn fetch_sorted(
        &self,
        column: Column,
        direction: SortDirection,
    ) -> Result<Vec<Record>, ViewError> {
        let url = self
            .base_url
            .join(relative(&sorted_data_path(column, direction)))?;
        let response = self.http.get(url).send().await?;
        decode_records(response).await
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_records(&self) -> Result<Vec<Record>, ViewError> {
        let response = self.http.get(self.data_url()?).send().await?;
        decode_records(response).await
    }
}

/// Routes are absolute; joining them relative keeps any base path prefix.
fn relative(route: &str) -> &str {
    route.trim_start_matches('/')
}

async fn decode_records(response: Response) -> Result<Vec<Record>, ViewError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<Vec<Record>>().await?);
    }
    match response.json::<ApiError>().await {
        Ok(api_error) => Err(ApiException::from(api_error).into()),
        Err(_) => Err(ViewError::Status(status)),
    }
}

/// A fixed dataset, used when the records are already in process.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch_records(&self) -> Result<Vec<Record>, ViewError> {
        Ok(self.records.clone())
    }
}
