//! 共通定義
//!
//! エラー型・URIユーティリティ

/// エラー型
pub mod error;

/// URIエンコード/デコード
pub mod uri;
