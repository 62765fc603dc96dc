//! Sheetgate Server
//!
//! クエリの `mode` で処理を振り分け、シートへ監査ログを追記するWebアプリ

#![warn(missing_docs)]

/// 共通型定義（エラー、URIデコード）
pub mod common;

/// REST APIハンドラー
pub mod api;

/// データベースアクセス（シートストレージ）
pub mod db;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// 監査ログシステム
pub mod audit;

/// CLIインターフェース
pub mod cli;

/// 追記の排他制御（上限付き待機ロック）
pub mod lock;

/// 実行ユーザーの解決
pub mod identity;

/// アップロードファイルの保存
pub mod files;

/// HTMLページの生成
pub mod pages;

/// サーバー初期化
pub mod bootstrap;

/// axumサーバー起動
pub mod server;

use std::path::PathBuf;
use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// シートストレージ
    pub record_store: Arc<dyn db::traits::RecordStore>,
    /// アップロードファイルの保存先
    pub file_store: Arc<dyn files::FileStore>,
    /// 実行ユーザー
    pub identity: Arc<dyn identity::IdentityProvider>,
    /// 監査ログライター
    pub audit_log_writer: audit::writer::AuditLogWriter,
    /// フォームページの固定メタデータ
    pub webapp: config::WebAppConfig,
    /// `/files` で配信するディレクトリ
    pub files_dir: PathBuf,
}
