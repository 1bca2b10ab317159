use shared::domain::{sort_records, Column, SortDirection};
use storage::{CompanyPatch, NewCompany, Storage};

#[tokio::test]
async fn curate_validate_and_persist_dataset_acceptance() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.csv");

    let storage = Storage::open(&path).await.expect("open empty");
    for (name, research) in [("Acme", 4), ("Globex", 1), ("Initech", 9)] {
        storage
            .add_company(NewCompany {
                company: name.to_string(),
                website: format!("{}.example", name.to_ascii_lowercase()),
                research_reports: research,
                lab_reports: 1,
                field_reports: 1,
                testimonials: 0,
                news_articles: 2,
                news_sentiment: "favorable".to_string(),
            })
            .await
            .expect("add");
    }
    storage
        .update_company(
            "Globex",
            CompanyPatch {
                news_sentiment: Some("unfavorable".to_string()),
                testimonials: Some(20),
                ..CompanyPatch::default()
            },
        )
        .await
        .expect("update");
    assert!(storage.validate().await.is_clean());

    storage.save(&path).await.expect("save");
    let reopened = Storage::open(&path).await.expect("reopen");

    let mut rows = reopened.list_records().await;
    sort_records(&mut rows, Column::TotalCitations, SortDirection::Desc);
    let order: Vec<_> = rows.iter().map(|r| r.company.as_str()).collect();
    assert_eq!(order, ["Globex", "Initech", "Acme"]);
}
