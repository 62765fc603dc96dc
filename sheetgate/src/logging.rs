//! ロギング初期化と診断メッセージ出力
//!
//! - `SHEETGATE_LOG_LEVEL`（旧: `LOG_LEVEL`）: EnvFilter書式、既定 `info`
//! - `SHEETGATE_LOG_FORMAT=json`: 標準出力をJSON形式にする
//! - `SHEETGATE_LOG_DIR`: 指定時は日次ローテーションのJSONログファイルを追加

use crate::config::{get_env_with_fallback, get_env_with_fallback_or};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// ログファイル名の接頭辞
const LOG_FILE_PREFIX: &str = "sheetgate.log";

/// 診断メッセージの出力先
///
/// ロック競合などで処理を黙って諦めた場合に、その事実を観測可能にする。
pub trait DiagnosticSink: Send + Sync {
    /// 診断メッセージを1件出力
    fn log(&self, message: &str);
}

/// `tracing` に出力する既定の診断シンク
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn log(&self, message: &str) {
        tracing::warn!(target: "sheetgate::diagnostics", "{}", message);
    }
}

/// ロギングを初期化する
///
/// 戻り値のガードはプロセス終了まで保持すること（ファイル出力のフラッシュに必要）。
pub fn init() -> anyhow::Result<Option<WorkerGuard>> {
    let level = get_env_with_fallback_or("SHEETGATE_LOG_LEVEL", "LOG_LEVEL", "info");
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let json = get_env_with_fallback("SHEETGATE_LOG_FORMAT", "LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let stdout_layer = if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let (file_layer, guard) = match get_env_with_fallback("SHEETGATE_LOG_DIR", "LOG_DIR") {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
