//! Contract Test: GET /exec のエラー応答

use crate::support::app::{body_json, build_app, build_app_with_store};
use axum::http::StatusCode;
use sheetgate::config::sheet_names;
use sheetgate::db::memory::MemoryRecordStore;
use sheetgate::db::traits::RecordStore;
use std::sync::Arc;

#[tokio::test]
async fn test_admin_and_reply_are_not_implemented() {
    let app = build_app().await;

    for mode in ["admin", "reply"] {
        let response = app.get(&format!("/exec?mode={}", mode)).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "not_implemented");
        assert_eq!(
            json["error"]["message"],
            format!("Mode '{}' is not implemented", mode)
        );
    }
    assert!(app.log_rows().await.is_empty());
}

#[tokio::test]
async fn test_nget_with_non_integer_row_is_bad_request() {
    let app = build_app().await;

    let response = app
        .get("/exec?mode=nget&status=done&sheetRowIndex=abc&sheetId=42")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["type"], "invalid_request_error");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("sheetRowIndex"));
    assert!(app.log_rows().await.is_empty());
}

#[tokio::test]
async fn test_nget_with_missing_parameter_is_bad_request() {
    let app = build_app().await;

    let response = app.get("/exec?mode=nget&status=done&sheetRowIndex=1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["error"]["message"],
        "Missing required parameter: sheetId"
    );
    assert!(app.log_rows().await.is_empty());
}

#[tokio::test]
async fn test_nget_with_malformed_status_escape_is_bad_request() {
    let app = build_app().await;

    // 展開後の status は "%E5%AE"（途中で切れたUTF-8）
    let response = app
        .get("/exec?mode=nget&status=%25E5%25AE&sheetRowIndex=1&sheetId=2")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.log_rows().await.is_empty());
}

#[tokio::test]
async fn test_nget_without_log_sheet_is_not_found() {
    let store = Arc::new(MemoryRecordStore::new());
    store.ensure_sheet(sheet_names::CONFIG).await.unwrap();
    let app = build_app_with_store(store.clone());

    let response = app
        .get("/exec?mode=nget&status=done&sheetRowIndex=5&sheetId=42")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["type"], "not_found_error");
    assert_eq!(json["error"]["message"], "Sheet with name \"log\" not found.");

    assert!(store.get_sheet(sheet_names::LOG).await.unwrap().is_none());
}
