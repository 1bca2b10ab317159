use super::*;
use async_trait::async_trait;
use axum::{http::StatusCode, routing::get, Json, Router};
use shared::{
    domain::{Column, Record, Sentiment, SortDirection},
    error::{ApiError, ErrorCode},
};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;

fn record(company: &str, total: i64, sentiment: &str, website: &str) -> Record {
    Record {
        company: company.to_string(),
        website: website.to_string(),
        total_citations: Some(total),
        research_reports: Some(1),
        lab_reports: Some(2),
        field_reports: Some(3),
        testimonials: Some(4),
        news_articles: Some(5),
        news_sentiment: Some(sentiment.to_string()),
    }
}

fn scenario() -> Vec<Record> {
    vec![
        record("A", 5, "favorable", "a.com"),
        record("B", 2, "bad", "b.com"),
    ]
}

fn companies<S: DataSource>(view: &TableView<S>) -> Vec<String> {
    view.body()
        .rows()
        .iter()
        .map(|row| row.cells[0].text())
        .collect()
}

/// Serves one good dataset, then fails every later fetch.
struct FlakySource {
    records: Vec<Record>,
    served: AtomicBool,
}

#[async_trait]
impl DataSource for FlakySource {
    async fn fetch_records(&self) -> Result<Vec<Record>, ViewError> {
        if self.served.swap(true, Ordering::SeqCst) {
            return Err(ViewError::Status(StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(self.records.clone())
    }
}

async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn load_renders_rows_in_input_order_with_sentiment_markers() {
    let mut view = TableView::new(StaticSource::new(scenario()));
    view.load().await.expect("load");

    assert_eq!(view.body().len(), 2);
    assert_eq!(companies(&view), ["A", "B"]);
    let rows = view.body().rows();
    assert_eq!(
        rows[0].cell(Column::NewsSentiment),
        Some(&Cell::Sentiment(Sentiment::Favorable))
    );
    assert_eq!(
        rows[1].cell(Column::NewsSentiment),
        Some(&Cell::Sentiment(Sentiment::Unfavorable))
    );
}

#[tokio::test]
async fn rows_follow_fixed_column_order() {
    let mut view = TableView::new(StaticSource::new(vec![record(
        "Acme",
        10,
        "favorable",
        "example.com/page",
    )]));
    view.load().await.expect("load");

    let row = &view.body().rows()[0];
    assert_eq!(
        row.cells,
        vec![
            Cell::Text("Acme".into()),
            Cell::Link {
                href: "https://example.com/page".into(),
                label: "example.com/page".into(),
            },
            Cell::Count(Some(10)),
            Cell::Count(Some(1)),
            Cell::Count(Some(2)),
            Cell::Count(Some(3)),
            Cell::Count(Some(4)),
            Cell::Count(Some(5)),
            Cell::Sentiment(Sentiment::Favorable),
        ]
    );
}

#[tokio::test]
async fn repeated_sort_alternates_direction() {
    let mut view = TableView::new(StaticSource::new(scenario()));
    view.load().await.expect("load");

    assert_eq!(view.sort(Column::TotalCitations), SortDirection::Asc);
    assert_eq!(companies(&view), ["B", "A"]);
    assert_eq!(view.sort(Column::TotalCitations), SortDirection::Desc);
    assert_eq!(companies(&view), ["A", "B"]);
    assert_eq!(view.sort(Column::TotalCitations), SortDirection::Asc);
    assert_eq!(companies(&view), ["B", "A"]);
    assert_eq!(view.direction(Column::TotalCitations), Some(SortDirection::Asc));
    assert_eq!(view.direction(Column::Company), None);
}

#[tokio::test]
async fn directions_are_tracked_per_column() {
    let mut view = TableView::new(StaticSource::new(scenario()));
    view.load().await.expect("load");

    view.sort(Column::TotalCitations);
    assert_eq!(view.sort(Column::Company), SortDirection::Asc);
    assert_eq!(view.sort(Column::TotalCitations), SortDirection::Desc);
}

#[tokio::test]
async fn sort_is_a_permutation_of_the_dataset() {
    let mut records = scenario();
    records.push(record("C", 2, "favorable", "c.com"));
    records.push(record("A", 5, "favorable", "a.com"));
    let mut view = TableView::new(StaticSource::new(records.clone()));
    view.load().await.expect("load");

    for column in Column::ALL {
        view.sort(column);
        let mut before = records.clone();
        let mut after = view.dataset().to_vec();
        before.sort_by(|a, b| a.company.cmp(&b.company).then(a.website.cmp(&b.website)));
        after.sort_by(|a, b| a.company.cmp(&b.company).then(a.website.cmp(&b.website)));
        assert_eq!(before, after, "{column}");
        assert_eq!(view.body().len(), records.len());
    }
}

#[tokio::test]
async fn unknown_column_name_leaves_state_untouched() {
    let mut view = TableView::new(StaticSource::new(scenario()));
    view.load().await.expect("load");

    let err = view.sort_named("revenue").expect_err("should fail");
    assert!(matches!(err, ViewError::Column(_)));
    assert_eq!(companies(&view), ["A", "B"]);
    assert_eq!(
        view.sort_named("total_citations").expect("sort"),
        SortDirection::Asc
    );
}

#[tokio::test]
async fn failed_reload_keeps_previous_dataset_and_table() {
    let mut view = TableView::new(FlakySource {
        records: scenario(),
        served: AtomicBool::new(false),
    });
    view.load().await.expect("first load");
    view.sort(Column::TotalCitations);
    let rendered = view.body().clone();

    let err = view.load().await.expect_err("second load fails");
    assert!(
        matches!(err, ViewError::Status(status) if status == StatusCode::SERVICE_UNAVAILABLE),
        "{err:?}"
    );
    assert_eq!(view.body(), &rendered);
    assert_eq!(view.dataset().len(), 2);
    assert_eq!(view.dataset()[0].company, "B");
}

#[tokio::test]
async fn html_matches_row_markup() {
    let mut view = TableView::new(StaticSource::new(vec![Record {
        company: "A&B <Labs>".into(),
        website: "ab.com".into(),
        total_citations: Some(3),
        news_sentiment: Some("neutral".into()),
        ..Record::default()
    }]));
    view.load().await.expect("load");

    let html = view.body().to_html();
    assert!(html.starts_with("<tr><td>A&amp;B &lt;Labs&gt;</td>"), "{html}");
    assert!(html.contains(r#"<a href="https://ab.com" target="_blank">ab.com</a>"#));
    assert!(html.contains(r#"<td class="number">3</td><td class="number"></td>"#));
    assert!(html.contains(r#"<span class="unfavorable">👎 Unfavorable</span>"#));
    assert_eq!(html.matches("<tr>").count(), 1);
}

#[tokio::test]
async fn text_grid_has_header_rule_and_rows() {
    let mut view = TableView::new(StaticSource::new(scenario()));
    view.load().await.expect("load");

    let text = view.body().to_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Company"));
    assert!(lines[1].starts_with("-------"));
    assert!(lines[2].starts_with("A "));
    assert!(lines[3].contains("b.com"));
}

#[test]
fn header_links_request_next_direction() {
    let html = render::header_row_html(Some((Column::Company, SortDirection::Asc)));
    assert!(html.contains(r#"href="/?sort=company&amp;dir=desc">Company ▲</a>"#));
    assert!(html.contains(r#"href="/?sort=lab_reports&amp;dir=asc">Lab Reports</a>"#));
}

#[tokio::test]
async fn http_source_loads_from_api_data() {
    let app = Router::new().route("/api/data", get(|| async { Json(scenario()) }));
    let server_url = spawn_server(app).await;

    let source = HttpDataSource::new(&server_url).expect("source");
    assert_eq!(
        source.data_url().expect("url").as_str(),
        format!("{server_url}/api/data")
    );

    let mut view = TableView::new(source);
    view.load().await.expect("load");
    assert_eq!(companies(&view), ["A", "B"]);
}

#[test]
fn http_source_keeps_base_path_prefix() {
    let source = HttpDataSource::new("http://localhost:9000/board").expect("source");
    assert_eq!(
        source.data_url().expect("url").as_str(),
        "http://localhost:9000/board/api/data"
    );
}

#[tokio::test]
async fn http_source_reports_malformed_payload() {
    let app = Router::new().route(
        "/api/data",
        get(|| async { Json(serde_json::json!({ "not": "an array" })) }),
    );
    let server_url = spawn_server(app).await;

    let mut view = TableView::new(HttpDataSource::new(&server_url).expect("source"));
    let err = view.load().await.expect_err("should fail");
    assert!(matches!(err, ViewError::Transport(_)));
    assert!(view.body().is_empty());
}

#[tokio::test]
async fn http_source_surfaces_api_errors_and_statuses() {
    let app = Router::new()
        .route(
            "/api/data/sorted/company/asc",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiError::new(ErrorCode::Validation, "unknown column")),
                )
            }),
        )
        .route("/api/data", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let server_url = spawn_server(app).await;
    let source = HttpDataSource::new(&server_url).expect("source");

    let err = source
        .fetch_sorted(Column::Company, SortDirection::Asc)
        .await
        .expect_err("should fail");
    let ViewError::Api(api) = err else {
        panic!("expected api error");
    };
    assert!(matches!(api.code, ErrorCode::Validation));
    assert_eq!(api.message, "unknown column");

    let err = source.fetch_records().await.expect_err("should fail");
    assert!(
        matches!(err, ViewError::Status(status) if status == StatusCode::SERVICE_UNAVAILABLE),
        "{err:?}"
    );
}

#[tokio::test]
async fn http_source_fetches_server_sorted_rows() {
    let app = Router::new().route(
        "/api/data/sorted/total_citations/desc",
        get(|| async { Json(vec![record("Z", 9, "favorable", "z.com")]) }),
    );
    let server_url = spawn_server(app).await;
    let source = HttpDataSource::new(&server_url).expect("source");

    let rows = source
        .fetch_sorted(Column::TotalCitations, SortDirection::Desc)
        .await
        .expect("sorted");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company, "Z");
}
