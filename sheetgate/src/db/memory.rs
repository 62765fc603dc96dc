//! シートストレージ（インメモリ版）
//!
//! `--memory` 起動時とテストで使う。プロセス終了で内容は消える。

use super::traits::{write_cell, CellRef, RecordStore, SheetHandle, SheetRow};
use crate::common::error::GateResult;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: i64,
    sheets: HashMap<String, MemorySheet>,
}

struct MemorySheet {
    handle: SheetHandle,
    rows: BTreeMap<i64, Vec<String>>,
}

/// インメモリのレコードストア
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: RwLock<Inner>,
}

impl MemoryRecordStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_sheet(&self, name: &str) -> GateResult<Option<SheetHandle>> {
        let inner = self.inner.read().await;
        Ok(inner.sheets.get(name).map(|sheet| sheet.handle.clone()))
    }

    async fn ensure_sheet(&self, name: &str) -> GateResult<SheetHandle> {
        let mut inner = self.inner.write().await;
        if let Some(sheet) = inner.sheets.get(name) {
            return Ok(sheet.handle.clone());
        }
        inner.next_id += 1;
        let handle = SheetHandle {
            id: inner.next_id,
            name: name.to_string(),
        };
        inner.sheets.insert(
            name.to_string(),
            MemorySheet {
                handle: handle.clone(),
                rows: BTreeMap::new(),
            },
        );
        Ok(handle)
    }

    async fn append_row(&self, sheet: &SheetHandle, values: &[String]) -> GateResult<i64> {
        let mut inner = self.inner.write().await;
        let target = inner
            .sheets
            .entry(sheet.name.clone())
            .or_insert_with(|| MemorySheet {
                handle: sheet.clone(),
                rows: BTreeMap::new(),
            });
        let row_index = target.rows.keys().next_back().copied().unwrap_or(0) + 1;
        target.rows.insert(row_index, values.to_vec());
        Ok(row_index)
    }

    async fn rows(&self, sheet: &SheetHandle) -> GateResult<Vec<SheetRow>> {
        let inner = self.inner.read().await;
        Ok(inner
            .sheets
            .get(&sheet.name)
            .map(|target| {
                target
                    .rows
                    .iter()
                    .map(|(row_index, values)| SheetRow {
                        row_index: *row_index,
                        values: values.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn cell_value(&self, sheet: &SheetHandle, cell: CellRef) -> GateResult<Option<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .sheets
            .get(&sheet.name)
            .and_then(|target| target.rows.get(&cell.row))
            .and_then(|values| values.get(cell.column_index()).cloned()))
    }

    async fn set_cell_value(
        &self,
        sheet: &SheetHandle,
        cell: CellRef,
        value: &str,
    ) -> GateResult<()> {
        let mut inner = self.inner.write().await;
        let target = inner
            .sheets
            .entry(sheet.name.clone())
            .or_insert_with(|| MemorySheet {
                handle: sheet.clone(),
                rows: BTreeMap::new(),
            });
        let values = target.rows.entry(cell.row).or_default();
        write_cell(values, cell, value);
        Ok(())
    }
}
