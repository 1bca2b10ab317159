use anyhow::Result;
use clap::{Parser, ValueEnum};
use client_core::{HttpDataSource, TableView};
use shared::domain::{Column, SortDirection};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Html,
    Json,
}

/// Loads the board from a running server and prints the rendered table.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
    /// Column header to click; repeat to click several times, in order.
    #[arg(long = "sort", value_name = "COLUMN")]
    sorts: Vec<String>,
    /// Ask the server to sort by this column instead of sorting locally.
    #[arg(long, value_name = "COLUMN", conflicts_with = "sorts")]
    server_sort: Option<String>,
    /// Descending order for --server-sort.
    #[arg(long, requires = "server_sort")]
    desc: bool,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let source = HttpDataSource::new(&args.server_url)?;
    let mut view = TableView::new(source);

    if let Some(column) = args.server_sort.as_deref() {
        let column: Column = column.parse()?;
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        let records = view.source().fetch_sorted(column, direction).await?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    view.load().await?;
    for column in &args.sorts {
        let direction = view.sort_named(column)?;
        info!(%column, %direction, "applied sort");
    }

    match args.format {
        Format::Text => print!("{}", view.body().to_text()),
        Format::Html => print!("{}", view.body().to_html()),
        Format::Json => println!("{}", serde_json::to_string_pretty(view.dataset())?),
    }

    Ok(())
}
