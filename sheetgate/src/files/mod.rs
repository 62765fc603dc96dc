//! ファイルストア
//!
//! アップロードされたファイルを保存し、閲覧用URLを返す。
//! `LocalFileStore` は `<root>/<folder>/<uuid>/<name>` に保存し、
//! `/files` 配下で配信する前提のURLを組み立てる。
//! メタデータ（説明にアップロード者を含む）は公開されない
//! `<metadata_root>/<folder>/<uuid>.metadata.json` に保存する。

use crate::common::error::{GateError, GateResult};
use crate::common::uri::encode_path_segment;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// ファイル名が無い場合の既定名
pub const DEFAULT_FILE_NAME: &str = "defaultFileName";

/// メタデータサイドカーのファイル名
const METADATA_FILE: &str = "metadata.json";

/// 保存時のメタデータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// ファイル名
    pub name: String,
    /// 保存先フォルダID
    pub parent: String,
    /// 説明（`<folder>・<user>`）
    pub description: String,
    /// MIMEタイプ
    pub mime_type: String,
}

/// 保存済みファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// ファイルID
    pub id: String,
    /// 保存先フォルダID
    pub folder: String,
    /// 保存されたファイル名
    pub name: String,
    /// 閲覧用URL
    pub url: String,
}

/// ファイルストア
#[async_trait]
pub trait FileStore: Send + Sync {
    /// ファイルを作成して保存結果を返す
    async fn create_file(&self, bytes: Vec<u8>, metadata: FileMetadata) -> GateResult<StoredFile>;

    /// 作成済みのファイルとメタデータを削除する
    async fn delete_file(&self, file: &StoredFile) -> GateResult<()>;
}

#[derive(Debug, Serialize)]
struct StoredMetadata<'a> {
    id: &'a str,
    #[serde(flatten)]
    metadata: &'a FileMetadata,
    size: usize,
    created_at: DateTime<Utc>,
}

/// ローカルファイルシステム版ファイルストア
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    metadata_root: PathBuf,
    public_base_url: String,
}

impl LocalFileStore {
    /// 保存ディレクトリ・メタデータディレクトリ・URLの基点を指定して作成
    pub fn new(
        root: impl Into<PathBuf>,
        metadata_root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            metadata_root: metadata_root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    fn sidecar_path(&self, parent: &str, id: &str) -> PathBuf {
        self.metadata_root
            .join(parent)
            .join(format!("{}.{}", id, METADATA_FILE))
    }

    fn url_for(&self, parent: &str, id: &str, name: &str) -> String {
        format!(
            "{}/files/{}/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            encode_path_segment(parent),
            id,
            encode_path_segment(name)
        )
    }
}

/// パスの1要素として安全な名前に変換する
///
/// 区切り文字と制御文字は `_` に置き換え、`.` / `..` / 空文字は `fallback` にする。
pub fn sanitize_component(raw: &str, fallback: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => fallback.to_string(),
        _ => cleaned,
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn create_file(&self, bytes: Vec<u8>, metadata: FileMetadata) -> GateResult<StoredFile> {
        let parent = sanitize_component(&metadata.parent, "root");
        let name = sanitize_component(&metadata.name, DEFAULT_FILE_NAME);
        let id = Uuid::new_v4().to_string();

        let dir = self.root.join(&parent).join(&id);
        create_dir(&dir).await?;

        let path = dir.join(&name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| GateError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        let stored_metadata = FileMetadata {
            name: name.clone(),
            parent: parent.clone(),
            ..metadata
        };
        let sidecar = serde_json::to_vec_pretty(&StoredMetadata {
            id: &id,
            metadata: &stored_metadata,
            size: bytes.len(),
            created_at: Utc::now(),
        })
        .map_err(|e| GateError::Internal(format!("Failed to encode file metadata: {}", e)))?;
        let sidecar_path = self.sidecar_path(&parent, &id);
        if let Some(sidecar_dir) = sidecar_path.parent() {
            create_dir(sidecar_dir).await?;
        }
        tokio::fs::write(&sidecar_path, sidecar).await.map_err(|e| {
            GateError::Storage(format!("Failed to write {}: {}", sidecar_path.display(), e))
        })?;

        info!(
            file_id = %id,
            parent = %parent,
            size = bytes.len(),
            "Stored uploaded file"
        );

        Ok(StoredFile {
            url: self.url_for(&parent, &id, &name),
            id,
            folder: parent,
            name,
        })
    }

    async fn delete_file(&self, file: &StoredFile) -> GateResult<()> {
        let dir = self.root.join(&file.folder).join(&file.id);
        remove(tokio::fs::remove_dir_all(&dir).await, &dir)?;
        let sidecar_path = self.sidecar_path(&file.folder, &file.id);
        remove(tokio::fs::remove_file(&sidecar_path).await, &sidecar_path)?;

        info!(file_id = %file.id, folder = %file.folder, "Deleted uploaded file");
        Ok(())
    }
}

async fn create_dir(dir: &Path) -> GateResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| GateError::Storage(format!("Failed to create {}: {}", dir.display(), e)))
}

// 既に無いものは削除済みとして扱う
fn remove(result: std::io::Result<()>, path: &Path) -> GateResult<()> {
    match result {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(GateError::Storage(format!(
            "Failed to remove {}: {}",
            path.display(),
            e
        ))),
        _ => Ok(()),
    }
}
