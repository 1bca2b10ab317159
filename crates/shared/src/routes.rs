use crate::domain::{Column, SortDirection};

pub fn data_route() -> &'static str {
    "/api/data"
}

/// Router pattern for the server-sorted dataset.
pub fn sorted_data_route() -> &'static str {
    "/api/data/sorted/:column/:direction"
}

pub fn sorted_data_path(column: Column, direction: SortDirection) -> String {
    format!("{}/sorted/{column}/{direction}", data_route())
}
