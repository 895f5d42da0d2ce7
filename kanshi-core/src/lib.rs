//! Kanshi デバッガのコア機能
//!
//! このクレートは、デバッガの中核となるロジックを提供します。
//! ブレークポイントの解決、ステップ実行、ターゲットイベントの変換と配信、
//! 停止中のターゲットに対する変数・コールスタックの問い合わせを統合します。

pub mod breakpoint;
pub mod call_stack;
pub mod config;
pub mod debugger;
mod dispatch;
pub mod errors;
pub mod event;
pub mod listener;
pub mod listeners;
pub mod parse;
pub mod stepping;
pub mod variables;

pub use breakpoint::{Breakpoint, BreakpointResolver, BreakpointState};
pub use call_stack::{CallStackModel, StackFrame};
pub use config::{NamingStyle, SessionConfig};
pub use debugger::{Debugger, WeakDebugger};
pub use errors::DebuggerError;
pub use event::DebugEvent;
pub use listener::{DebuggerListener, ListenerRegistry};
pub use listeners::{EventCountListener, TimingListener, TracingListener};
pub use stepping::{StepState, SteppingController};
pub use variables::VariablesModel;

// 他のクレートから使用するために再エクスポート
pub use kanshi_target::{Location, StepDirection, TargetRuntime, ThreadId, UnitName};
pub use kanshi_view::{Variable, VariableColumn};

/// デバッガの結果型
pub type Result<T> = anyhow::Result<T>;
