//! ファイルインポートAPI
//!
//! - `POST /api/import`: base64のファイルを保存し、`upload` を監査ログへ記録
//! - `GET /api/session-user`: 実行ユーザーのメールアドレス

use super::error::AppError;
use crate::common::error::{CommonError, GateError, GateResult};
use crate::config::{config_cells, sheet_names};
use crate::db::traits::CellRef;
use crate::files::{FileMetadata, StoredFile, DEFAULT_FILE_NAME};
use crate::AppState;
use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A2が空のときの保存先フォルダID
const DEFAULT_FOLDER_ID: &str = "root";

/// ブラウザから送られるアップロード内容
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBlob {
    /// base64エンコードされたファイル本体（`data:...;base64,` 付きも可）
    pub data: String,
    /// MIMEタイプ
    #[serde(default)]
    pub mime_type: String,
    /// ファイル名
    #[serde(default)]
    pub file_name: Option<String>,
    /// 利用者が指定したフォルダ名
    #[serde(default)]
    pub folder: String,
    /// 利用者
    #[serde(default)]
    pub user: String,
    /// OCR指定（保存内容には影響しない）
    #[serde(default)]
    pub is_ocr: bool,
}

/// インポート結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResponse {
    /// 閲覧用URL
    pub url: String,
    /// 保存されたファイル名
    pub title: String,
}

/// 実行ユーザー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUserResponse {
    /// メールアドレス
    pub email: String,
}

/// base64本体をデコードする（data URLの接頭辞は取り除く）
pub fn decode_payload(data: &str) -> GateResult<Vec<u8>> {
    let encoded = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    STANDARD.decode(encoded.trim()).map_err(|e| {
        GateError::Common(CommonError::Validation(format!(
            "File data is not valid base64: {}",
            e
        )))
    })
}

/// アップロードを保存し、監査ログへ記録する
///
/// 必須シート（`config`, `log`）は保存前に確認する。追記自体が失敗した場合は
/// 保存したファイルを削除してエラーを返す。
pub async fn import_upload(state: &AppState, blob: UploadBlob) -> GateResult<StoredFile> {
    let bytes = decode_payload(&blob.data)?;

    let config_sheet = state
        .record_store
        .get_sheet(sheet_names::CONFIG)
        .await?
        .ok_or_else(|| {
            GateError::NotFound(format!(
                "Sheet with name \"{}\" not found.",
                sheet_names::CONFIG
            ))
        })?;
    let folder_id = state
        .record_store
        .cell_value(&config_sheet, CellRef::parse(config_cells::ATTACH_FOLDER_ID)?)
        .await?
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FOLDER_ID.to_string());
    state.audit_log_writer.log_sheet().await?;

    let name = blob
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
    let mime_type = if blob.mime_type.is_empty() {
        mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    } else {
        blob.mime_type
    };

    let file = state
        .file_store
        .create_file(
            bytes,
            FileMetadata {
                name,
                parent: folder_id,
                description: format!("{}・{}", blob.folder, blob.user),
                mime_type,
            },
        )
        .await?;

    let appended = state
        .audit_log_writer
        .append(
            "upload",
            vec![
                file.url.clone(),
                blob.folder,
                file.name.clone(),
                file.id.clone(),
            ],
        )
        .await;
    if let Err(e) = appended {
        if let Err(cleanup) = state.file_store.delete_file(&file).await {
            warn!(file_id = %file.id, error = %cleanup, "Failed to remove orphaned upload");
        }
        return Err(e);
    }

    info!(file_id = %file.id, ocr = blob.is_ocr, "Imported file");
    Ok(file)
}

/// POST /api/import - ファイルインポート
pub async fn import_file(
    State(state): State<AppState>,
    Json(blob): Json<UploadBlob>,
) -> Result<Json<ImportResponse>, AppError> {
    let file = import_upload(&state, blob).await?;
    Ok(Json(ImportResponse {
        url: file.url,
        title: file.name,
    }))
}

/// GET /api/session-user - 実行ユーザー取得
pub async fn session_user(State(state): State<AppState>) -> Json<SessionUserResponse> {
    Json(SessionUserResponse {
        email: state.identity.current_user_email().await,
    })
}
