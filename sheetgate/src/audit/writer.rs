//! 監査ログライター
//!
//! ロックを1回だけ上限付きで待ち、取得できた場合のみログシートへ1行追記する。
//! 取得できなければ追記せず診断メッセージを出して正常終了する（リトライしない）。

use crate::audit::types::{AppendOutcome, Clock, LogRecord, SystemClock};
use crate::common::error::{GateError, GateResult};
use crate::config::{messages, sheet_names, LockConfig};
use crate::db::traits::{RecordStore, SheetHandle};
use crate::identity::IdentityProvider;
use crate::lock::{LockOutcome, ScriptLock};
use crate::logging::{DiagnosticSink, TracingDiagnostics};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 監査ログライター設定
#[derive(Debug, Clone)]
pub struct AuditLogWriterConfig {
    /// 追記先シート名。デフォルト: `log`
    pub sheet_name: String,
    /// ロック取得の最大待機時間。デフォルト: 10秒
    pub lock_wait: Duration,
}

impl Default for AuditLogWriterConfig {
    fn default() -> Self {
        Self {
            sheet_name: sheet_names::LOG.to_string(),
            lock_wait: LockConfig::default().wait,
        }
    }
}

impl From<LockConfig> for AuditLogWriterConfig {
    fn from(lock: LockConfig) -> Self {
        Self {
            lock_wait: lock.wait,
            ..Self::default()
        }
    }
}

/// 監査ログライター
///
/// Clone可能（ロックとストアを共有する）。
#[derive(Clone)]
pub struct AuditLogWriter {
    store: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityProvider>,
    diagnostics: Arc<dyn DiagnosticSink>,
    clock: Arc<dyn Clock>,
    lock: ScriptLock,
    config: AuditLogWriterConfig,
}

impl AuditLogWriter {
    /// 新しいAuditLogWriterを作成
    ///
    /// 診断出力は `tracing`、時刻はシステム時計を使う。
    pub fn new(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        config: AuditLogWriterConfig,
    ) -> Self {
        let lock = ScriptLock::new(&config.sheet_name);
        Self {
            store,
            identity,
            diagnostics: Arc::new(TracingDiagnostics),
            clock: Arc::new(SystemClock),
            lock,
            config,
        }
    }

    /// 診断出力先を差し替える
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// 時刻の取得元を差し替える
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 追記を直列化するロック
    pub fn lock(&self) -> &ScriptLock {
        &self.lock
    }

    /// ライター設定
    pub fn config(&self) -> &AuditLogWriterConfig {
        &self.config
    }

    /// 追記先のログシートを取得する（無ければ `GateError::NotFound`）
    pub async fn log_sheet(&self) -> GateResult<SheetHandle> {
        self.store
            .get_sheet(&self.config.sheet_name)
            .await?
            .ok_or_else(|| {
                GateError::NotFound(format!(
                    "Sheet with name \"{}\" not found.",
                    self.config.sheet_name
                ))
            })
    }

    /// 監査ログを1行追記する
    ///
    /// - ロック取得に失敗: 追記せず `AppendOutcome::Dropped`（診断メッセージを出力）
    /// - ログシートが存在しない: `GateError::NotFound`
    ///
    /// アクターはロック取得後に問い合わせる。
    pub async fn append(
        &self,
        event_kind: &str,
        extra_fields: Vec<String>,
    ) -> GateResult<AppendOutcome> {
        let guard = match self.lock.try_lock_for(self.config.lock_wait).await {
            LockOutcome::Acquired(guard) => guard,
            LockOutcome::TimedOut => {
                warn!(
                    lock = self.lock.name(),
                    event_kind,
                    wait_ms = self.config.lock_wait.as_millis() as u64,
                    "Audit log lock not acquired; record dropped"
                );
                self.diagnostics.log(messages::APPEND_ERROR);
                return Ok(AppendOutcome::Dropped);
            }
        };

        let sheet = self.log_sheet().await?;

        let record = LogRecord {
            timestamp: self.clock.now(),
            actor: self.identity.current_user_email().await,
            event_kind: event_kind.to_string(),
            extra_fields,
        };
        let row_index = self.store.append_row(&sheet, &record.to_row()).await?;

        debug!(
            sheet = %sheet.name,
            lock = guard.name(),
            row_index,
            event_kind,
            "Appended audit log record"
        );

        Ok(AppendOutcome::Appended(record))
    }
}
