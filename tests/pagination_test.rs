mod common;

use common::{Order, ids, setup_test_db, setup_test_db_with_orders};
use querycrate::{FilterNode, PageRequest, Repository, SortDirection};
use serde_json::json;

fn by_id(page: u64, size: u64) -> PageRequest {
    PageRequest::new(page, size).with_sort("id", SortDirection::Asc)
}

#[tokio::test]
async fn test_last_partial_page() {
    let db = setup_test_db_with_orders()
        .await
        .expect("Failed to setup test database");
    let repo = Repository::<Order>::new();

    let first = repo.get_rows(&db, &by_id(0, 3)).await.unwrap();
    assert_eq!(first.total, 7);
    assert_eq!(ids(&first.rows), vec![1, 2, 3]);

    let last = repo.get_rows(&db, &by_id(2, 3)).await.unwrap();
    assert_eq!(last.total, 7);
    assert_eq!(ids(&last.rows), vec![7]);
}

#[tokio::test]
async fn test_page_past_the_end_keeps_total() {
    let db = setup_test_db_with_orders()
        .await
        .expect("Failed to setup test database");
    let repo = Repository::<Order>::new();

    let page = repo.get_rows(&db, &by_id(3, 3)).await.unwrap();
    assert_eq!(page.total, 7);
    assert!(page.rows.is_empty());
}

#[tokio::test]
async fn test_zero_size_returns_every_row() {
    let db = setup_test_db_with_orders()
        .await
        .expect("Failed to setup test database");
    let repo = Repository::<Order>::new();

    // page is ignored when size is 0
    let page = repo.get_rows(&db, &by_id(5, 0)).await.unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(ids(&page.rows), vec![1, 2, 3, 4, 5, 6, 7]);
}

#[tokio::test]
async fn test_total_counts_filtered_rows_only() {
    let db = setup_test_db_with_orders()
        .await
        .expect("Failed to setup test database");
    let repo = Repository::<Order>::new();

    let request = by_id(0, 2).with_filter(FilterNode::eq("status", "ACTIVE"));
    let page = repo.get_rows(&db, &request).await.unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(ids(&page.rows), vec![1, 2]);
}

#[tokio::test]
async fn test_empty_table() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let repo = Repository::<Order>::new();

    let page = repo.get_rows(&db, &by_id(0, 10)).await.unwrap();
    assert_eq!(page.total, 0);
    assert!(page.rows.is_empty());
}

#[tokio::test]
async fn test_request_from_json() {
    let db = setup_test_db_with_orders()
        .await
        .expect("Failed to setup test database");
    let repo = Repository::<Order>::new();

    let request: PageRequest = serde_json::from_value(json!({
        "page": 0,
        "size": 10,
        "filter": {"field": "status", "operator": "eq", "value": "ACTIVE"},
        "sortProps": [{"field": "createdAt", "dir": "DESC"}]
    }))
    .unwrap();

    let page = repo.get_rows(&db, &request).await.unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(ids(&page.rows), vec![7, 5, 2, 1]);

    let body = serde_json::to_value(page.map(|order| order.id)).unwrap();
    assert_eq!(body, json!({"total": 4, "rows": [7, 5, 2, 1]}));
}

#[tokio::test]
async fn test_huge_page_index_reads_past_the_end() {
    let db = setup_test_db_with_orders()
        .await
        .expect("Failed to setup test database");
    let repo = Repository::<Order>::new();

    let page = repo
        .get_rows(&db, &by_id(u64::MAX / 2, 4))
        .await
        .unwrap();
    assert_eq!(page.total, 7);
    assert!(page.rows.is_empty());
}

#[tokio::test]
async fn test_huge_page_size_returns_every_row() {
    let db = setup_test_db_with_orders()
        .await
        .expect("Failed to setup test database");
    let repo = Repository::<Order>::new();

    let page = repo.get_rows(&db, &by_id(0, u64::MAX)).await.unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(ids(&page.rows), vec![1, 2, 3, 4, 5, 6, 7]);
}
