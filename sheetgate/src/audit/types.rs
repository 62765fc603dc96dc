//! 監査ログの型定義

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// 監査ログレコード
///
/// シート上では `[timestamp, actor, event_kind, extra_fields...]` の1行になる。
/// 追記のみで、更新・削除はしない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// 追記時刻
    pub timestamp: DateTime<Utc>,
    /// 実行ユーザーのメールアドレス
    pub actor: String,
    /// イベント種別
    pub event_kind: String,
    /// 追加フィールド（順序を保持）
    pub extra_fields: Vec<String>,
}

impl LogRecord {
    /// シートの1行に変換
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(3 + self.extra_fields.len());
        row.push(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true));
        row.push(self.actor.clone());
        row.push(self.event_kind.clone());
        row.extend(self.extra_fields.iter().cloned());
        row
    }
}

/// 追記結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// ロックを取得して追記した
    Appended(LogRecord),
    /// ロックを取得できず、追記しなかった
    Dropped,
}

impl AppendOutcome {
    /// 追記した場合は `true`
    pub fn is_appended(&self) -> bool {
        matches!(self, Self::Appended(_))
    }
}

/// 現在時刻の取得元
pub trait Clock: Send + Sync {
    /// 現在時刻
    fn now(&self) -> DateTime<Utc>;
}

/// システム時計
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
