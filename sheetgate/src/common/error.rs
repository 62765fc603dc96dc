//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! # エラー分類
//!
//! - `NotFound`: 必須シートが存在しない（リクエストは失敗として呼び出し元へ返す）
//! - `InvalidRequest`: クエリパラメータの解析失敗（400）
//! - ロック競合はエラーではない（`AppendOutcome::Dropped` + 診断メッセージ）

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// リクエストパラメータの解析エラー
///
/// 「レコードが見つからない」とは区別して扱う。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// 必須パラメータが指定されていない
    #[error("Missing required parameter: {0}")]
    Missing(&'static str),

    /// 整数として解釈できない
    #[error("Invalid integer for parameter '{name}': {value:?}")]
    InvalidInteger {
        /// パラメータ名
        name: &'static str,
        /// 受け取った値
        value: String,
    },

    /// URIエスケープが不正
    #[error("Malformed URI sequence in parameter '{name}' at byte {position}")]
    MalformedEscape {
        /// パラメータ名
        name: &'static str,
        /// 不正なシーケンスの開始位置
        position: usize,
    },
}

/// sheetgate error type
#[derive(Debug, Error)]
pub enum GateError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Request parameters could not be parsed
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ParseError),

    /// Resource not found (e.g. a named sheet)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Mode is recognized but has no handler
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// File storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Returns a safe error message for external clients.
    ///
    /// Internal details (SQL errors, file paths) stay in the server log.
    /// `NotFound` and `InvalidRequest` carry user-facing text and are passed through.
    pub fn external_message(&self) -> String {
        match self {
            Self::Common(CommonError::Validation(msg)) => msg.clone(),
            Self::Common(_) => "Request error".to_string(),
            Self::InvalidRequest(err) => err.to_string(),
            Self::NotFound(msg) => msg.clone(),
            Self::NotImplemented(mode) => format!("Mode '{}' is not implemented", mode),
            Self::Database(_) => "Database error".to_string(),
            Self::Storage(_) => "Storage error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Returns the error type string used in JSON error bodies.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Common(_) => "invalid_request_error",
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::NotFound(_) => "not_found_error",
            Self::NotImplemented(_) => "not_implemented",
            Self::Database(_) => "server_error",
            Self::Storage(_) => "server_error",
            Self::Internal(_) => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(CommonError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Common(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts this error to a JSON error response body.
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                message: self.external_message(),
                error_type: self.error_type().to_string(),
                code: Some(self.status_code().as_u16().to_string()),
            },
        }
    }
}

impl From<sqlx::Error> for GateError {
    fn from(err: sqlx::Error) -> Self {
        GateError::Database(err.to_string())
    }
}

/// エラーレスポンス
///
/// # Example
///
/// ```json
/// {
///   "error": {
///     "message": "Sheet with name \"log\" not found.",
///     "type": "not_found_error",
///     "code": "404"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// The error details
    pub error: ErrorDetail,
}

/// エラー詳細
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    /// Human-readable error message
    pub message: String,
    /// Error type (e.g., "invalid_request_error", "server_error")
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error code (HTTP status as string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Result type alias (Common)
pub type CommonResult<T> = Result<T, CommonError>;

/// Result type alias (sheetgate)
pub type GateResult<T> = Result<T, GateError>;
