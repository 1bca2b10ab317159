//! Table view controller: loads company records from a data source, keeps
//! them as the current dataset, and renders them into a table body that can
//! be re-sorted per column.

pub mod error;
pub mod render;
pub mod source;
mod view;

pub use error::ViewError;
pub use render::{Cell, TableBody, TableRow};
pub use source::{DataSource, HttpDataSource, StaticSource};
pub use view::TableView;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
