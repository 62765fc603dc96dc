//! シートストレージ（SQLite版）
//!
//! `sheets` テーブルにシート名、`sheet_rows` テーブルに行（セル値のJSON配列）を保存する。

use super::traits::{write_cell, CellRef, RecordStore, SheetHandle, SheetRow};
use crate::common::error::{CommonError, GateError, GateResult};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// SQLiteベースのレコードストア
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SheetRecord {
    id: i64,
    name: String,
}

#[derive(sqlx::FromRow)]
struct SheetRowRecord {
    row_index: i64,
    cells: String,
}

impl From<SheetRecord> for SheetHandle {
    fn from(record: SheetRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}

impl TryFrom<SheetRowRecord> for SheetRow {
    type Error = GateError;

    fn try_from(record: SheetRowRecord) -> Result<Self, Self::Error> {
        let values: Vec<String> =
            serde_json::from_str(&record.cells).map_err(CommonError::Serialization)?;
        Ok(Self {
            row_index: record.row_index,
            values,
        })
    }
}

impl SqliteRecordStore {
    /// 新しいストアを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_row(&self, sheet: &SheetHandle, row_index: i64) -> GateResult<Option<SheetRow>> {
        let record = sqlx::query_as::<_, SheetRowRecord>(
            "SELECT row_index, cells FROM sheet_rows WHERE sheet_id = ? AND row_index = ?",
        )
        .bind(sheet.id)
        .bind(row_index)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GateError::Database(format!("Failed to load row: {}", e)))?;

        record.map(SheetRow::try_from).transpose()
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get_sheet(&self, name: &str) -> GateResult<Option<SheetHandle>> {
        let record =
            sqlx::query_as::<_, SheetRecord>("SELECT id, name FROM sheets WHERE name = ? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| GateError::Database(format!("Failed to load sheet: {}", e)))?;

        Ok(record.map(SheetHandle::from))
    }

    async fn ensure_sheet(&self, name: &str) -> GateResult<SheetHandle> {
        sqlx::query("INSERT INTO sheets (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| GateError::Database(format!("Failed to create sheet: {}", e)))?;

        self.get_sheet(name)
            .await?
            .ok_or_else(|| GateError::Internal(format!("Sheet {:?} vanished after insert", name)))
    }

    async fn append_row(&self, sheet: &SheetHandle, values: &[String]) -> GateResult<i64> {
        let cells = serde_json::to_string(values).map_err(CommonError::Serialization)?;

        // 行番号の採番と挿入を1文で行う
        let row_index = sqlx::query_scalar::<_, i64>(
            "INSERT INTO sheet_rows (sheet_id, row_index, cells)
             SELECT ?, COALESCE(MAX(row_index), 0) + 1, ? FROM sheet_rows WHERE sheet_id = ?
             RETURNING row_index",
        )
        .bind(sheet.id)
        .bind(&cells)
        .bind(sheet.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GateError::Database(format!("Failed to append row: {}", e)))?;

        Ok(row_index)
    }

    async fn rows(&self, sheet: &SheetHandle) -> GateResult<Vec<SheetRow>> {
        let records = sqlx::query_as::<_, SheetRowRecord>(
            "SELECT row_index, cells FROM sheet_rows WHERE sheet_id = ? ORDER BY row_index",
        )
        .bind(sheet.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GateError::Database(format!("Failed to load rows: {}", e)))?;

        records.into_iter().map(SheetRow::try_from).collect()
    }

    async fn cell_value(&self, sheet: &SheetHandle, cell: CellRef) -> GateResult<Option<String>> {
        let row = self.load_row(sheet, cell.row).await?;
        Ok(row.and_then(|row| row.values.get(cell.column_index()).cloned()))
    }

    async fn set_cell_value(
        &self,
        sheet: &SheetHandle,
        cell: CellRef,
        value: &str,
    ) -> GateResult<()> {
        let mut values = self
            .load_row(sheet, cell.row)
            .await?
            .map(|row| row.values)
            .unwrap_or_default();
        write_cell(&mut values, cell, value);
        let cells = serde_json::to_string(&values).map_err(CommonError::Serialization)?;

        sqlx::query(
            "INSERT INTO sheet_rows (sheet_id, row_index, cells) VALUES (?, ?, ?)
             ON CONFLICT(sheet_id, row_index) DO UPDATE SET cells = excluded.cells",
        )
        .bind(sheet.id)
        .bind(cell.row)
        .bind(&cells)
        .execute(&self.pool)
        .await
        .map_err(|e| GateError::Database(format!("Failed to update cell: {}", e)))?;

        Ok(())
    }
}
