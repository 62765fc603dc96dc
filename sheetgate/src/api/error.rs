//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::GateError;
use axum::{response::IntoResponse, Json};

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub GateError);

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        // 詳細はサーバーログのみに出し、レスポンスには external_message を使う
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "Request failed");
        } else {
            tracing::info!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        (status, Json(self.0.to_error_response())).into_response()
    }
}
