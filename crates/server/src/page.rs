use client_core::{render::header_row_html, StaticSource, TableView, ViewError};
use shared::domain::{Column, Record, SortDirection};

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 0.4rem 0.6rem; }
th a { color: inherit; text-decoration: none; }
td.number { text-align: right; }
.favorable { color: #1a7f37; }
.unfavorable { color: #cf222e; }
"#;

/// Renders the full board page with the table view controller, optionally
/// sorted by one column.
pub(crate) async fn render_page(
    records: Vec<Record>,
    sort: Option<(Column, SortDirection)>,
) -> Result<String, ViewError> {
    let mut view = TableView::new(StaticSource::new(records));
    view.load().await?;
    if let Some((column, direction)) = sort {
        view.sort_by(column, direction);
    }

    let mut html = String::with_capacity(4096 + view.body().len() * 256);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Citation Board</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<h1>Citation Board</h1>\n<table>\n<thead>");
    html.push_str(&header_row_html(sort));
    html.push_str("</thead>\n<tbody id=\"tableBody\">\n");
    html.push_str(&view.body().to_html());
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    Ok(html)
}
