//! Contract Test: GET /exec
//!
//! モードごとの応答と監査ログへの追記

use crate::support::app::{body_text, build_app, build_sqlite_app, expect_status, TEST_USER};
use axum::http::StatusCode;
use chrono::DateTime;

/// nget: サンクスページを返し、ログに {ts, actor, status, row, sheetId} を1行追記する
#[tokio::test]
async fn test_nget_appends_record_and_returns_thankyou() {
    let app = build_app().await;

    let response = app
        .get("/exec?mode=nget&status=done&sheetRowIndex=5&sheetId=42")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let html = body_text(response).await;
    assert!(html.contains("ありがとうございました"));

    let rows = app.log_rows().await;
    assert_eq!(rows.len(), 1);
    let values = &rows[0].values;
    assert_eq!(values.len(), 5);
    assert!(DateTime::parse_from_rfc3339(&values[0]).is_ok());
    assert_eq!(&values[1..], &[TEST_USER, "done", "5", "42"]);
    assert!(app.diagnostics.messages().is_empty());
}

#[tokio::test]
async fn test_nget_decodes_status() {
    let app = build_app().await;

    // クエリ展開後も残る %25 エスケープを decodeURI で復元する
    let response = app
        .get("/exec?mode=nget&status=%25E5%25AE%258C%25E4%25BA%2586&sheetRowIndex=1&sheetId=7")
        .await;
    expect_status(response, StatusCode::OK).await;

    let rows = app.log_rows().await;
    assert_eq!(rows[0].values[2], "完了");
}

#[tokio::test]
async fn test_nget_appends_in_request_order() {
    let app = build_sqlite_app().await;

    for (status, row) in [("first", 1), ("second", 2), ("third", 3)] {
        let uri = format!(
            "/exec?mode=nget&status={}&sheetRowIndex={}&sheetId=9",
            status, row
        );
        expect_status(app.get(&uri).await, StatusCode::OK).await;
    }

    let rows = app.log_rows().await;
    let statuses: Vec<&str> = rows.iter().map(|row| row.values[2].as_str()).collect();
    assert_eq!(statuses, vec!["first", "second", "third"]);
    let indexes: Vec<i64> = rows.iter().map(|row| row.row_index).collect();
    assert_eq!(indexes, vec![1, 2, 3]);
}

/// import: 固定テキストを返し、ログは追記しない
#[tokio::test]
async fn test_import_mode_returns_literal_text() {
    let app = build_app().await;

    let body = expect_status(app.get("/exec?mode=import").await, StatusCode::OK).await;
    assert_eq!(body, "import mode selected");
    assert!(app.log_rows().await.is_empty());
}

/// mode未指定: フォームページ
#[tokio::test]
async fn test_missing_mode_renders_form() {
    let app = build_app().await;

    let html = expect_status(app.get("/exec").await, StatusCode::OK).await;
    assert!(html.contains("<title>yourTitle</title>"));
    assert!(html.contains(r#"<link rel="icon" href="favicon URL" />"#));
    assert!(html
        .contains(r#"<meta name="viewport" content="width=device-width, initial-scale=1.0" />"#));
    assert!(app.log_rows().await.is_empty());
}

#[tokio::test]
async fn test_unknown_mode_and_root_render_form() {
    let app = build_app().await;

    for uri in ["/exec?mode=unknown", "/exec?mode=", "/"] {
        let html = expect_status(app.get(uri).await, StatusCode::OK).await;
        assert!(html.contains("<title>yourTitle</title>"), "uri: {}", uri);
    }
    assert!(app.log_rows().await.is_empty());
}

#[tokio::test]
async fn test_nget_with_form_encoded_status() {
    let app = build_app().await;

    let query = serde_urlencoded::to_string([
        ("mode", "nget"),
        ("status", "対応済み & 確認"),
        ("sheetRowIndex", "12"),
        ("sheetId", "3"),
    ])
    .unwrap();
    expect_status(app.get(&format!("/exec?{}", query)).await, StatusCode::OK).await;

    let rows = app.log_rows().await;
    assert_eq!(&rows[0].values[2..], &["対応済み & 確認", "12", "3"]);
}
