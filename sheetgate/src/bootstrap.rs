//! サーバー初期化ロジック
//!
//! レコードストアの接続、必須シートの作成、監査ログライターの組み立てなど
//! サーバー起動に必要なコンポーネントの初期化を担当する。

use crate::audit::writer::{AuditLogWriter, AuditLogWriterConfig};
use crate::common::error::{GateError, GateResult};
use crate::config::{
    config_cells, sheet_names, IdentityConfig, LockConfig, StorageConfig, WebAppConfig,
};
use crate::db::memory::MemoryRecordStore;
use crate::db::sheets::SqliteRecordStore;
use crate::db::traits::{CellRef, RecordStore};
use crate::files::LocalFileStore;
use crate::identity::ConfiguredIdentity;
use crate::AppState;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// 初期化オプション
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// 永続化先
    pub storage: StorageConfig,
    /// ロック設定
    pub lock: LockConfig,
    /// フォームページの固定メタデータ
    pub webapp: WebAppConfig,
    /// 実行ユーザー
    pub identity: IdentityConfig,
    /// SQLiteを使わずインメモリのストアで起動する
    pub in_memory: bool,
}

impl BootstrapOptions {
    /// 環境変数から読み込む
    pub fn from_env() -> Self {
        Self {
            storage: StorageConfig::from_env(),
            lock: LockConfig::from_env(),
            webapp: WebAppConfig::from_env(),
            identity: IdentityConfig::from_env(),
            in_memory: false,
        }
    }
}

/// サーバー初期化を実行し、`AppState` を返す
pub async fn initialize(options: BootstrapOptions) -> GateResult<AppState> {
    info!("Sheetgate v{}", env!("CARGO_PKG_VERSION"));

    let record_store: Arc<dyn RecordStore> = if options.in_memory {
        info!("Using in-memory record store");
        Arc::new(MemoryRecordStore::new())
    } else {
        let db_pool = init_db_pool(&options.storage.database_url).await?;
        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .map_err(|e| GateError::Database(format!("Failed to run migrations: {}", e)))?;
        info!(database_url = %options.storage.database_url, "Record store initialized");
        Arc::new(SqliteRecordStore::new(db_pool))
    };

    if options.storage.create_sheets {
        ensure_default_sheets(
            record_store.as_ref(),
            options.storage.attach_folder_id.as_deref(),
        )
        .await?;
    }

    Ok(build_state(record_store, options))
}

/// ストアを指定して `AppState` を組み立てる
pub fn build_state(record_store: Arc<dyn RecordStore>, options: BootstrapOptions) -> AppState {
    let identity = Arc::new(ConfiguredIdentity::from(options.identity));
    let audit_log_writer = AuditLogWriter::new(
        record_store.clone(),
        identity.clone(),
        AuditLogWriterConfig::from(options.lock),
    );
    let files_dir = options.storage.files_dir;
    let file_store = Arc::new(LocalFileStore::new(
        files_dir.clone(),
        options.storage.metadata_dir,
        options.storage.public_base_url,
    ));

    AppState {
        record_store,
        file_store,
        identity,
        audit_log_writer,
        webapp: options.webapp,
        files_dir,
    }
}

/// 必須シート（`config`, `log`）を作成する
///
/// `attach_folder_id` が指定され、設定シートA2が空の場合のみ書き込む。
pub async fn ensure_default_sheets(
    store: &dyn RecordStore,
    attach_folder_id: Option<&str>,
) -> GateResult<()> {
    for name in sheet_names::BOOTSTRAP {
        store.ensure_sheet(name).await?;
    }

    if let Some(folder_id) = attach_folder_id {
        let config = store.ensure_sheet(sheet_names::CONFIG).await?;
        let cell = CellRef::parse(config_cells::ATTACH_FOLDER_ID)?;
        let current = store.cell_value(&config, cell).await?;
        if current.map_or(true, |value| value.is_empty()) {
            store.set_cell_value(&config, cell, folder_id).await?;
            info!(folder_id, "Seeded attachment folder id");
        }
    }

    Ok(())
}

/// SQLite接続プールを初期化する
pub async fn init_db_pool(database_url: &str) -> sqlx::Result<sqlx::SqlitePool> {
    // 親ディレクトリが無いとSQLiteファイルを作成できない
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        // `sqlite::memory:` はスキップ
        if !path.starts_with(':') {
            let normalized = path.trim_start_matches("//");
            let path_without_params = normalized.split('?').next().unwrap_or(normalized);
            let db_path = std::path::Path::new(path_without_params);
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    sqlx::SqlitePool::connect_with(connect_options).await
}
