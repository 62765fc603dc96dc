//! データベースアクセス層
//!
//! シート（名前付きの表）の永続化

/// Repository traitとセル参照
pub mod traits;

/// SQLite版シートストレージ
pub mod sheets;

/// インメモリ版シートストレージ
pub mod memory;
