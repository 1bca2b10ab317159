use std::collections::HashMap;

use shared::domain::{sort_records, Column, Record, SortDirection};
use tracing::{debug, error, info};

use crate::{
    error::ViewError,
    render::{TableBody, TableRow},
    source::DataSource,
};

/// Owns the current dataset, the per-column sort directions and the rendered
/// table body.
pub struct TableView<S> {
    source: S,
    dataset: Vec<Record>,
    directions: HashMap<Column, SortDirection>,
    body: TableBody,
}

impl<S: DataSource> TableView<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            dataset: Vec::new(),
            directions: HashMap::new(),
            body: TableBody::default(),
        }
    }

    /// Replaces the dataset from the source and re-renders.
    ///
    /// On failure the error is logged and returned; the dataset and table
    /// body keep their previous contents.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        match self.source.fetch_records().await {
            Ok(records) => {
                info!(rows = records.len(), "dataset loaded");
                self.dataset = records;
                self.render();
                Ok(())
            }
            Err(error) => {
                error!(%error, "failed to load dataset");
                Err(error)
            }
        }
    }

    pub fn render(&mut self) {
        self.body.clear();
        for record in &self.dataset {
            self.body.push(TableRow::from_record(record));
        }
    }

    /// Header-click sort: flips the column's last direction (first click is
    /// ascending) and returns the direction applied.
    pub fn sort(&mut self, column: Column) -> SortDirection {
        let direction = SortDirection::toggled(self.directions.get(&column).copied());
        self.sort_by(column, direction);
        direction
    }

    pub fn sort_named(&mut self, column: &str) -> Result<SortDirection, ViewError> {
        let column: Column = column.parse()?;
        Ok(self.sort(column))
    }

    pub fn sort_by(&mut self, column: Column, direction: SortDirection) {
        self.directions.insert(column, direction);
        sort_records(&mut self.dataset, column, direction);
        debug!(%column, %direction, "dataset sorted");
        self.render();
    }

    pub fn dataset(&self) -> &[Record] {
        &self.dataset
    }

    pub fn body(&self) -> &TableBody {
        &self.body
    }

    pub fn direction(&self, column: Column) -> Option<SortDirection> {
        self.directions.get(&column).copied()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
