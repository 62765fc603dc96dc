//! Integration Test: 監査ログのロック競合
//!
//! ロックが10秒以上保持されている間の nget は追記せずにサンクスページを返す。

use crate::support::app::{body_json, build_app, expect_status};
use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;

const NGET: &str = "/exec?mode=nget&status=done&sheetRowIndex=5&sheetId=42";

#[tokio::test(start_paused = true)]
async fn test_nget_under_contention_drops_record() {
    let app = build_app().await;
    let held = app
        .state
        .audit_log_writer
        .lock()
        .try_lock()
        .expect("lock should be free");

    let started = tokio::time::Instant::now();
    let html = expect_status(app.get(NGET).await, StatusCode::OK).await;

    assert!(html.contains("ありがとうございました"));
    assert!(started.elapsed() >= Duration::from_millis(10_000));
    assert!(app.log_rows().await.is_empty());
    assert_eq!(app.diagnostics.messages(), vec!["append failed"]);

    drop(held);
}

#[tokio::test(start_paused = true)]
async fn test_nget_waits_for_lock_released_within_timeout() {
    let app = build_app().await;
    let held = app
        .state
        .audit_log_writer
        .lock()
        .try_lock()
        .expect("lock should be free");

    let release = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(9_000)).await;
        drop(held);
    });

    expect_status(app.get(NGET).await, StatusCode::OK).await;
    release.await.unwrap();

    let rows = app.log_rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0].values[2..], &["done", "5", "42"]);
    assert!(app.diagnostics.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_import_mode_ignores_held_lock() {
    let app = build_app().await;
    let _held = app
        .state
        .audit_log_writer
        .lock()
        .try_lock()
        .expect("lock should be free");

    let started = tokio::time::Instant::now();
    let body = expect_status(app.get("/exec?mode=import").await, StatusCode::OK).await;

    assert_eq!(body, "import mode selected");
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(app.diagnostics.messages().is_empty());
}

/// アップロードはロック競合でも保存され、監査ログだけが欠落する
#[tokio::test(start_paused = true)]
async fn test_import_upload_under_contention_keeps_file() {
    let app = build_app().await;
    let held = app
        .state
        .audit_log_writer
        .lock()
        .try_lock()
        .expect("lock should be free");

    let started = tokio::time::Instant::now();
    let response = app
        .post_json(
            "/api/import",
            &json!({ "data": "aGVsbG8=", "fileName": "note.txt", "folder": "f", "user": "u" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "note.txt");
    assert!(json["url"]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:8080/files/root/"));
    assert!(started.elapsed() >= Duration::from_millis(10_000));
    assert!(app.log_rows().await.is_empty());
    assert_eq!(app.diagnostics.messages(), vec!["append failed"]);
    // ファイル本体とメタデータ
    assert_eq!(app.stored_file_count(), 2);

    drop(held);
}
