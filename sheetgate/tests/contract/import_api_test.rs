//! Contract Test: POST /api/import, GET /api/session-user

use crate::support::app::{body_json, build_app, build_app_with_store, body_text, TEST_USER};
use async_trait::async_trait;
use axum::http::StatusCode;
use sheetgate::common::error::{GateError, GateResult};
use sheetgate::config::{config_cells, sheet_names};
use sheetgate::db::memory::MemoryRecordStore;
use sheetgate::db::traits::{CellRef, RecordStore, SheetHandle, SheetRow};
use serde_json::json;
use std::sync::Arc;

/// 行の追記だけが失敗するストア
struct FailingAppendStore(MemoryRecordStore);

#[async_trait]
impl RecordStore for FailingAppendStore {
    async fn get_sheet(&self, name: &str) -> GateResult<Option<SheetHandle>> {
        self.0.get_sheet(name).await
    }

    async fn ensure_sheet(&self, name: &str) -> GateResult<SheetHandle> {
        self.0.ensure_sheet(name).await
    }

    async fn append_row(&self, _sheet: &SheetHandle, _values: &[String]) -> GateResult<i64> {
        Err(GateError::Database("disk I/O error".to_string()))
    }

    async fn rows(&self, sheet: &SheetHandle) -> GateResult<Vec<SheetRow>> {
        self.0.rows(sheet).await
    }

    async fn cell_value(&self, sheet: &SheetHandle, cell: CellRef) -> GateResult<Option<String>> {
        self.0.cell_value(sheet, cell).await
    }

    async fn set_cell_value(
        &self,
        sheet: &SheetHandle,
        cell: CellRef,
        value: &str,
    ) -> GateResult<()> {
        self.0.set_cell_value(sheet, cell, value).await
    }
}

fn upload(data: &str, file_name: &str) -> serde_json::Value {
    json!({
        "data": data,
        "mimeType": "text/plain",
        "fileName": file_name,
        "folder": "請求書",
        "user": "山田",
        "isOcr": false
    })
}

#[tokio::test]
async fn test_import_stores_file_and_appends_upload_record() {
    let app = build_app().await;

    let response = app
        .post_json("/api/import", &upload("aGVsbG8=", "note.txt"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "note.txt");
    let url = json["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("http://localhost:8080/files/root/"));
    assert!(url.ends_with("/note.txt"));

    // 既定フォルダ root 配下に保存される
    let relative = url.trim_start_matches("http://localhost:8080/files/");
    let stored = app.files_dir.path().join(relative);
    assert_eq!(std::fs::read(stored).unwrap(), b"hello");

    let rows = app.log_rows().await;
    assert_eq!(rows.len(), 1);
    let values = &rows[0].values;
    assert_eq!(values[1], TEST_USER);
    assert_eq!(values[2], "upload");
    assert_eq!(values[3], url);
    assert_eq!(values[4], "請求書");
    assert_eq!(values[5], "note.txt");
    assert!(url.contains(&values[6]));
}

#[tokio::test]
async fn test_import_uses_config_folder_and_serves_file() {
    let app = build_app().await;
    let config = app
        .store
        .get_sheet(sheet_names::CONFIG)
        .await
        .unwrap()
        .unwrap();
    app.store
        .set_cell_value(
            &config,
            CellRef::parse(config_cells::ATTACH_FOLDER_ID).unwrap(),
            "folder-abc",
        )
        .await
        .unwrap();

    let response = app
        .post_json(
            "/api/import",
            &upload("data:text/plain;base64,aGVsbG8gd29ybGQ=", "hello.txt"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let url = json["url"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:8080/files/folder-abc/"));

    let path = url.trim_start_matches("http://localhost:8080");
    let served = app.get(path).await;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(body_text(served).await, "hello world");
}

#[tokio::test]
async fn test_import_without_file_name_uses_default() {
    let app = build_app().await;

    let response = app
        .post_json("/api/import", &json!({ "data": "aGVsbG8=" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "defaultFileName");
}

#[tokio::test]
async fn test_import_with_invalid_base64_is_bad_request() {
    let app = build_app().await;

    let response = app
        .post_json("/api/import", &upload("***", "broken.txt"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.log_rows().await.is_empty());
}

#[tokio::test]
async fn test_import_without_config_sheet_is_not_found() {
    let store = Arc::new(MemoryRecordStore::new());
    store.ensure_sheet(sheet_names::LOG).await.unwrap();
    let app = build_app_with_store(store);

    let response = app
        .post_json("/api/import", &upload("aGVsbG8=", "note.txt"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(
        json["error"]["message"],
        "Sheet with name \"config\" not found."
    );
    assert!(app.log_rows().await.is_empty());
}

#[tokio::test]
async fn test_import_without_log_sheet_stores_nothing() {
    let store = Arc::new(MemoryRecordStore::new());
    store.ensure_sheet(sheet_names::CONFIG).await.unwrap();
    let app = build_app_with_store(store);

    let response = app
        .post_json("/api/import", &upload("aGVsbG8=", "note.txt"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Sheet with name \"log\" not found.");
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn test_import_removes_file_when_append_fails() {
    let store = FailingAppendStore(MemoryRecordStore::new());
    store.ensure_sheet(sheet_names::CONFIG).await.unwrap();
    store.ensure_sheet(sheet_names::LOG).await.unwrap();
    let app = build_app_with_store(Arc::new(store));

    let response = app
        .post_json("/api/import", &upload("aGVsbG8=", "note.txt"))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn test_import_metadata_is_not_served() {
    let app = build_app().await;

    let response = app
        .post_json("/api/import", &upload("aGVsbG8=", "note.txt"))
        .await;
    let json = body_json(response).await;
    let url = json["url"].as_str().unwrap();
    // <base>/files/root/<id>/note.txt
    let id = url.rsplit('/').nth(1).unwrap().to_string();

    let sidecar = format!("{}.metadata.json", id);
    assert!(app.metadata_dir.path().join("root").join(&sidecar).exists());
    assert!(!app.files_dir.path().join("root").join(&sidecar).exists());

    let served = app.get(&format!("/files/root/{}", sidecar)).await;
    assert_eq!(served.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_user_returns_configured_email() {
    let app = build_app().await;

    let response = app.get("/api/session-user").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "email": TEST_USER }));
}
