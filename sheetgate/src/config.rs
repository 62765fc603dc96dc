//! Configuration management via environment variables
//!
//! 環境変数の読み取りヘルパーと、起動時に一度だけ確定する固定設定値。
//! どの値もリクエスト処理中に計算し直さない。

use std::path::PathBuf;
use std::time::Duration;

/// シート名称
pub mod sheet_names {
    /// 設定シート（A2: 添付フォルダID）
    pub const CONFIG: &str = "config";
    /// 監査ログシート
    pub const LOG: &str = "log";

    /// 起動時に作成するシート
    pub const BOOTSTRAP: &[&str] = &[CONFIG, LOG];
}

/// 固定メッセージ
pub mod messages {
    /// サンクスページのテンプレート名
    pub const THANKYOU: &str = "thankyou";
    /// テンプレートが見つからない
    pub const NOTFOUND: &str = "ファイルがありません";
    /// 監査ログの追記失敗（ロック取得タイムアウト）
    pub const APPEND_ERROR: &str = "append failed";
    /// importモードの応答本文
    pub const IMPORT_SELECTED: &str = "import mode selected";
}

/// 設定シート上のセル位置（A1表記）
pub mod config_cells {
    /// 添付ファイルの保存先フォルダID
    pub const ATTACH_FOLDER_ID: &str = "A2";
}

/// ロック待機時間の既定値（ミリ秒）
pub const DEFAULT_LOCK_WAIT_MS: u64 = 10_000;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// `true/1/yes/on` を真として解釈する
pub fn get_env_flag(new_name: &str, old_name: &str, default: bool) -> bool {
    get_env_with_fallback(new_name, old_name)
        .map(|value| {
            matches!(
                value.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(default)
}

/// 監査ログのロック設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// ロック取得の最大待機時間
    pub wait: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(DEFAULT_LOCK_WAIT_MS),
        }
    }
}

impl LockConfig {
    /// 環境変数 `SHEETGATE_LOCK_WAIT_MS`（旧: `LOCK_WAIT_MS`）から読み込む
    pub fn from_env() -> Self {
        let wait_ms = get_env_with_fallback_parse(
            "SHEETGATE_LOCK_WAIT_MS",
            "LOCK_WAIT_MS",
            DEFAULT_LOCK_WAIT_MS,
        );
        Self {
            wait: Duration::from_millis(wait_ms),
        }
    }
}

/// フォームページの固定メタデータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAppConfig {
    /// ページタイトル
    pub title: String,
    /// ファビコンURL
    pub favicon_url: String,
    /// viewportメタタグのname
    pub viewport_name: String,
    /// viewportメタタグのcontent
    pub viewport_content: String,
}

impl Default for WebAppConfig {
    fn default() -> Self {
        Self {
            title: "yourTitle".to_string(),
            favicon_url: "favicon URL".to_string(),
            viewport_name: "viewport".to_string(),
            viewport_content: "width=device-width, initial-scale=1.0".to_string(),
        }
    }
}

impl WebAppConfig {
    /// 環境変数で上書きした設定を返す（未設定の項目は既定値）
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            title: get_env_with_fallback_or("SHEETGATE_TITLE", "WEBAPP_TITLE", &defaults.title),
            favicon_url: get_env_with_fallback_or(
                "SHEETGATE_FAVICON_URL",
                "WEBAPP_FAVICON_URL",
                &defaults.favicon_url,
            ),
            viewport_name: defaults.viewport_name,
            viewport_content: get_env_with_fallback_or(
                "SHEETGATE_VIEWPORT",
                "WEBAPP_VIEWPORT",
                &defaults.viewport_content,
            ),
        }
    }
}

/// 永続化先の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// レコードストアのデータベースURL
    pub database_url: String,
    /// アップロードファイルの保存ディレクトリ（`/files` で公開）
    pub files_dir: PathBuf,
    /// アップロードファイルのメタデータ保存ディレクトリ（非公開）
    pub metadata_dir: PathBuf,
    /// アップロードファイルURLの基点
    pub public_base_url: String,
    /// 起動時に必要なシートを作成する
    pub create_sheets: bool,
    /// 設定シートA2へ初期投入するフォルダID
    pub attach_folder_id: Option<String>,
}

impl StorageConfig {
    /// 環境変数から読み込む
    ///
    /// データディレクトリは `SHEETGATE_DATA_DIR`（未設定時は `~/.sheetgate`）。
    pub fn from_env() -> Self {
        let data_dir = data_dir();
        let database_url = get_env_with_fallback("SHEETGATE_DATABASE_URL", "DATABASE_URL")
            .unwrap_or_else(|| format!("sqlite:{}", data_dir.join("sheetgate.db").display()));
        let files_dir = get_env_with_fallback("SHEETGATE_FILES_DIR", "FILES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("files"));
        let metadata_dir = get_env_with_fallback("SHEETGATE_METADATA_DIR", "METADATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("metadata"));
        let public_base_url =
            get_env_with_fallback_or("SHEETGATE_PUBLIC_BASE_URL", "PUBLIC_BASE_URL", "");
        Self {
            database_url,
            files_dir,
            metadata_dir,
            public_base_url,
            create_sheets: get_env_flag("SHEETGATE_CREATE_SHEETS", "CREATE_SHEETS", true),
            attach_folder_id: get_env_with_fallback(
                "SHEETGATE_ATTACH_FOLDER_ID",
                "ATTACH_FOLDER_ID",
            ),
        }
    }
}

/// 実行ユーザーの設定
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityConfig {
    /// 実行ユーザーのメールアドレス（未設定時は空文字）
    pub active_user_email: String,
}

impl IdentityConfig {
    /// 環境変数 `SHEETGATE_ACTIVE_USER` から読み込む
    pub fn from_env() -> Self {
        Self {
            active_user_email: get_env_with_fallback_or(
                "SHEETGATE_ACTIVE_USER",
                "ACTIVE_USER",
                "",
            ),
        }
    }
}

fn data_dir() -> PathBuf {
    if let Some(dir) = get_env_with_fallback("SHEETGATE_DATA_DIR", "DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".sheetgate")
}
