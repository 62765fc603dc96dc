//! Integration Test: 並行リクエストの追記
//!
//! 同時に届いた nget はロックで直列化され、1件も欠けずに1行ずつ追記される。

use crate::support::app::{build_app, build_sqlite_app, expect_status, TestApp};
use axum::http::StatusCode;
use std::collections::BTreeSet;
use std::sync::Arc;

async fn send_concurrently(app: Arc<TestApp>, count: i64) {
    let mut handles = Vec::new();
    for row in 1..=count {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let uri = format!("/exec?mode=nget&status=s{}&sheetRowIndex={}&sheetId=1", row, row);
            expect_status(app.get(&uri).await, StatusCode::OK).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

async fn assert_all_rows_present(app: &TestApp, count: i64) {
    let rows = app.log_rows().await;
    assert_eq!(rows.len() as i64, count);

    let indexes: Vec<i64> = rows.iter().map(|row| row.row_index).collect();
    assert_eq!(indexes, (1..=count).collect::<Vec<_>>());

    let rows_logged: BTreeSet<i64> = rows
        .iter()
        .map(|row| row.values[3].parse().unwrap())
        .collect();
    assert_eq!(rows_logged, (1..=count).collect());
    assert!(app.diagnostics.messages().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_nget_appends_every_record_in_memory() {
    let app = Arc::new(build_app().await);
    send_concurrently(app.clone(), 20).await;
    assert_all_rows_present(&app, 20).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_nget_appends_every_record_in_sqlite() {
    let app = Arc::new(build_sqlite_app().await);
    send_concurrently(app.clone(), 20).await;
    assert_all_rows_present(&app, 20).await;
}
