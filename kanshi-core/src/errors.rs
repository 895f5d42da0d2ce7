//! デバッガのエラー

use std::path::PathBuf;
use thiserror::Error;

/// セッション操作のエラー
#[derive(Debug, Error)]
pub enum DebuggerError {
    /// 同じセッションで2回起動しようとした
    #[error("debugger session is already launched")]
    AlreadyLaunched,
    #[error("invalid breakpoint '{0}', expected unit:line[:count]")]
    InvalidBreakpoint(String),
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
