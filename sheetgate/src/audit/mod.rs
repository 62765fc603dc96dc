//! 監査ログシステム
//!
//! 操作のタイムスタンプ・実行ユーザー・種別をログシートへ追記する

/// 監査ログの型定義
pub mod types;

/// ロック付きライター
pub mod writer;
