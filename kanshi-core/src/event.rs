//! 正規化されたデバッグイベント

use crate::{DebuggerListener, Result, StackFrame};
use kanshi_target::Location;
use std::fmt;

/// リスナーに配信されるイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugEvent {
    Start,
    Stop,
    Step(Location),
    BreakpointHit(Location),
    Exception {
        message: String,
        /// 例外発生時点のコールスタック
        frames: Vec<StackFrame>,
    },
    /// 変換規則のない生イベント（既定の文字列表現を運ぶ）
    Other(String),
}

impl DebugEvent {
    /// 対応するハンドラを呼び出す
    pub fn notify(&self, listener: &dyn DebuggerListener) -> Result<()> {
        match self {
            DebugEvent::Start => listener.on_start(),
            DebugEvent::Stop => listener.on_stop(),
            DebugEvent::Step(location) => listener.on_step(location),
            DebugEvent::BreakpointHit(location) => listener.on_breakpoint(location),
            DebugEvent::Exception { message, frames } => listener.on_exception(message, frames),
            DebugEvent::Other(description) => listener.on_other(description),
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            DebugEvent::Step(location) | DebugEvent::BreakpointHit(location) => Some(location),
            _ => None,
        }
    }
}

impl fmt::Display for DebugEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugEvent::Start => f.write_str("start"),
            DebugEvent::Stop => f.write_str("stop"),
            DebugEvent::Step(location) => write!(f, "step @{}", location),
            DebugEvent::BreakpointHit(location) => write!(f, "breakpoint @{}", location),
            DebugEvent::Exception { message, .. } => write!(f, "exception: {}", message),
            DebugEvent::Other(description) => write!(f, "other: {}", description),
        }
    }
}
