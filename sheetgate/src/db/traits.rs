//! Repository trait定義
//!
//! シート（名前付きの表）への読み書きを抽象化する。
//! ルーターと監査ログライターは実ストレージを知らずにこのtraitだけを使う。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::error::{CommonError, GateResult};

/// シートへのハンドル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetHandle {
    /// シートID
    pub id: i64,
    /// シート名
    pub name: String,
}

/// シートの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRow {
    /// 行番号（1始まり）
    pub row_index: i64,
    /// セル値（A列から順）
    pub values: Vec<String>,
}

/// A1表記のセル参照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// 行番号（1始まり）
    pub row: i64,
    /// 列番号（1始まり、A=1）
    pub column: usize,
}

impl CellRef {
    /// `A2` や `AB10` のようなA1表記を解析する
    pub fn parse(a1: &str) -> GateResult<Self> {
        let invalid = || CommonError::Validation(format!("Invalid cell reference: {:?}", a1));

        let trimmed = a1.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = trimmed.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid().into());
        }

        let mut column: usize = 0;
        for c in letters.chars() {
            let value = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
            column = column
                .checked_mul(26)
                .and_then(|v| v.checked_add(value))
                .ok_or_else(invalid)?;
        }

        let row: i64 = digits.parse().map_err(|_| invalid())?;
        if row < 1 {
            return Err(invalid().into());
        }

        Ok(Self { row, column })
    }

    /// 0始まりの列インデックス
    pub fn column_index(&self) -> usize {
        self.column - 1
    }
}

/// 名前付きシートを持つレコードストア
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 名前でシートを取得（存在しない場合は `None`）
    async fn get_sheet(&self, name: &str) -> GateResult<Option<SheetHandle>>;

    /// シートを取得し、存在しなければ作成する
    async fn ensure_sheet(&self, name: &str) -> GateResult<SheetHandle>;

    /// 最終行の次に1行追記し、追記した行番号を返す
    async fn append_row(&self, sheet: &SheetHandle, values: &[String]) -> GateResult<i64>;

    /// 全行を行番号順に取得
    async fn rows(&self, sheet: &SheetHandle) -> GateResult<Vec<SheetRow>>;

    /// セル値を取得（行または列が存在しない場合は `None`）
    async fn cell_value(&self, sheet: &SheetHandle, cell: CellRef) -> GateResult<Option<String>>;

    /// セル値を設定（行が無ければ作成、列が足りなければ空文字で埋める）
    async fn set_cell_value(&self, sheet: &SheetHandle, cell: CellRef, value: &str)
        -> GateResult<()>;
}

/// 行データにセル値を書き込む（不足する列は空文字で埋める）
pub(crate) fn write_cell(values: &mut Vec<String>, cell: CellRef, value: &str) {
    let index = cell.column_index();
    if values.len() <= index {
        values.resize(index + 1, String::new());
    }
    values[index] = value.to_string();
}
