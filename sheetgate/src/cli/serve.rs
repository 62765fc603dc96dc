//! serve サブコマンド
//!
//! Webサーバーを起動します。
//! サブコマンド省略時も同じ `ServerConfig::resolve` で設定を確定する。

use crate::config::{get_env_flag, get_env_with_fallback_or, get_env_with_fallback_parse};
use clap::Args;

/// serve サブコマンドの引数
///
/// 未指定の項目は環境変数（`SHEETGATE_*`、旧名 `HOST` / `PORT` / `MEMORY`）から補う。
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port [env: SHEETGATE_PORT] [default: 8080]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address [env: SHEETGATE_HOST] [default: 0.0.0.0]
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Keep sheets in memory instead of SQLite [env: SHEETGATE_MEMORY]
    #[arg(long, default_value_t = false)]
    pub memory: bool,
}

/// サーバー起動設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// バインドアドレス
    pub host: String,
    /// 待ち受けポート
    pub port: u16,
    /// SQLiteを使わずメモリ上にシートを保持する
    pub in_memory: bool,
}

impl ServerConfig {
    /// 環境変数のみから設定を読み込む
    pub fn from_env() -> Self {
        Self {
            host: get_env_with_fallback_or("SHEETGATE_HOST", "HOST", "0.0.0.0"),
            port: get_env_with_fallback_parse("SHEETGATE_PORT", "PORT", 8080),
            in_memory: get_env_flag("SHEETGATE_MEMORY", "MEMORY", false),
        }
    }

    /// CLI引数を環境変数より優先して設定を確定する
    pub fn resolve(args: Option<ServeArgs>) -> Self {
        let env = Self::from_env();
        let args = args.unwrap_or_default();
        Self {
            host: args.host.unwrap_or(env.host),
            port: args.port.unwrap_or(env.port),
            in_memory: args.memory || env.in_memory,
        }
    }

    /// `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
