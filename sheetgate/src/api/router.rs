//! モード振り分けエントリポイント
//!
//! `GET /exec?mode=...` のクエリ `mode` で処理を選ぶ。
//! 未知の値や未指定はエラーにせずフォームページを返す。
//!
//! | mode     | 応答                                   |
//! |----------|----------------------------------------|
//! | `admin`  | 501（未実装）                          |
//! | `reply`  | 501（未実装）                          |
//! | `nget`   | 監査ログ追記 + サンクスページ          |
//! | `import` | テキスト `import mode selected`        |
//! | その他   | フォームページ                         |

use super::error::AppError;
use crate::audit::types::AppendOutcome;
use crate::common::error::{GateError, GateResult, ParseError};
use crate::common::uri::decode_uri;
use crate::config::messages;
use crate::{pages, AppState};
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use std::collections::HashMap;
use tracing::{info, warn};

/// クエリパラメータ（キー・値とも文字列、スキーマなし）
pub type RequestParams = HashMap<String, String>;

/// 振り分けモード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 管理モード
    Admin,
    /// 返信モード
    Reply,
    /// 行番号指定のステータス記録（`nget`）
    GetByRow,
    /// インポートモード
    Import,
    /// フォーム表示（既定）
    RenderForm,
}

impl Mode {
    /// `mode` パラメータから判定する（未知の値・未指定は `RenderForm`）
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("admin") => Self::Admin,
            Some("reply") => Self::Reply,
            Some("nget") => Self::GetByRow,
            Some("import") => Self::Import,
            _ => Self::RenderForm,
        }
    }

    /// クエリ上の表記
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Reply => "reply",
            Self::GetByRow => "nget",
            Self::Import => "import",
            Self::RenderForm => "form",
        }
    }
}

/// `nget` モードのパラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetByRowParams {
    /// ステータス（URIデコード済み）
    pub status: String,
    /// 対象行番号
    pub sheet_row_index: i64,
    /// 対象シートID
    pub sheet_id: i64,
}

impl GetByRowParams {
    /// クエリパラメータを解析する
    pub fn from_query(params: &RequestParams) -> Result<Self, ParseError> {
        let status = required(params, "status")?;
        let status = decode_uri(status).map_err(|e| ParseError::MalformedEscape {
            name: "status",
            position: e.position,
        })?;

        Ok(Self {
            status,
            sheet_row_index: parse_integer(params, "sheetRowIndex")?,
            sheet_id: parse_integer(params, "sheetId")?,
        })
    }

    /// 監査ログの追加フィールド（行番号, シートID）
    pub fn log_fields(&self) -> Vec<String> {
        vec![self.sheet_row_index.to_string(), self.sheet_id.to_string()]
    }
}

fn required<'a>(params: &'a RequestParams, name: &'static str) -> Result<&'a str, ParseError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or(ParseError::Missing(name))
}

fn parse_integer(params: &RequestParams, name: &'static str) -> Result<i64, ParseError> {
    let raw = required(params, name)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidInteger {
            name,
            value: raw.to_string(),
        })
}

/// 振り分け結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResponse {
    /// HTMLページ
    Page(String),
    /// プレーンテキスト
    Text(String),
}

impl IntoResponse for RouteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Page(html) => Html(html).into_response(),
            Self::Text(text) => text.into_response(),
        }
    }
}

/// リクエストを振り分ける
pub async fn dispatch(state: &AppState, params: &RequestParams) -> GateResult<RouteResponse> {
    let raw_mode = params.get("mode").map(String::as_str);
    let mode = Mode::parse(raw_mode);

    match mode {
        Mode::Admin | Mode::Reply => {
            info!("{} mode selected", mode.as_str());
            Err(GateError::NotImplemented(mode.as_str().to_string()))
        }
        Mode::GetByRow => {
            info!("Get mode selected");
            let request = GetByRowParams::from_query(params)?;
            let outcome = state
                .audit_log_writer
                .append(&request.status, request.log_fields())
                .await?;
            if let AppendOutcome::Dropped = outcome {
                warn!(
                    sheet_id = request.sheet_id,
                    sheet_row_index = request.sheet_row_index,
                    "Status was not recorded"
                );
            }
            Ok(RouteResponse::Page(pages::render_thankyou_page()?))
        }
        Mode::Import => {
            info!("Import mode selected");
            Ok(RouteResponse::Text(messages::IMPORT_SELECTED.to_string()))
        }
        Mode::RenderForm => {
            info!(mode = ?raw_mode, "Rendering form page");
            Ok(RouteResponse::Page(pages::render_form_page(&state.webapp)?))
        }
    }
}

/// GET /exec - モード振り分けエントリポイント
pub async fn exec(
    State(state): State<AppState>,
    Query(params): Query<RequestParams>,
) -> Result<RouteResponse, AppError> {
    Ok(dispatch(&state, &params).await?)
}
