//! REST APIハンドラー
//!
//! ルーティングの組み立てと各ハンドラー

/// APIエラーレスポンス型
pub mod error;

/// モード振り分けエントリポイント
pub mod router;

/// ファイルインポートAPI
pub mod import;

use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// インポートAPIのボディサイズ上限（base64化後のファイルを含む）
const IMPORT_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// アプリケーションのルーターを作成
pub fn create_app(state: AppState) -> Router {
    let files = ServeDir::new(&state.files_dir);

    Router::new()
        .route("/", get(router::exec))
        .route("/exec", get(router::exec))
        .route(
            "/api/import",
            post(import::import_file).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
        .route("/api/session-user", get(import::session_user))
        .route("/health", get(health))
        .nest_service("/files", files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - 稼働確認
async fn health() -> &'static str {
    "ok"
}
