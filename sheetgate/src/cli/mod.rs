//! CLI module for sheetgate
//!
//! Provides command-line interface for the server.

pub mod serve;

use clap::{Parser, Subcommand};

/// Sheetgate - mode-dispatching web app with an append-only audit log
#[derive(Parser, Debug)]
#[command(name = "sheetgate")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    SHEETGATE_HOST              Bind address (default: 0.0.0.0)
    SHEETGATE_PORT              Listen port (default: 8080)
    SHEETGATE_MEMORY            Keep sheets in memory: true | false (default: false)
    SHEETGATE_LOG_LEVEL         Log level (default: info)
    SHEETGATE_LOG_FORMAT        Log format: text | json (default: text)
    SHEETGATE_LOG_DIR           Write daily-rotated log files to this directory
    SHEETGATE_DATA_DIR          Data directory (default: ~/.sheetgate)
    SHEETGATE_DATABASE_URL      Database URL (default: sqlite:<data dir>/sheetgate.db)
    SHEETGATE_FILES_DIR         Uploaded file directory (default: <data dir>/files)
    SHEETGATE_METADATA_DIR      Uploaded file metadata directory (default: <data dir>/metadata)
    SHEETGATE_PUBLIC_BASE_URL   Base URL for uploaded file links
    SHEETGATE_ATTACH_FOLDER_ID  Seed value for config!A2
    SHEETGATE_ACTIVE_USER       Email recorded as the audit log actor
    SHEETGATE_LOCK_WAIT_MS      Audit log lock wait in milliseconds (default: 10000)
    SHEETGATE_TITLE             Form page title
    SHEETGATE_FAVICON_URL       Form page favicon URL
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server
    Serve(serve::ServeArgs),
}
