//! ターゲットから届く生イベント

use crate::{Location, ObjectId, RequestId, ThreadId, UnitHandle, Value};
use std::fmt;

/// ターゲットランタイムが発行する生イベント
///
/// イベントの種類はこの列挙で閉じている。
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// ターゲットの起動
    VmStart { thread: ThreadId },
    /// ターゲットの終了
    VmDeath,
    /// コード単位のロード
    UnitPrepared { unit: UnitHandle },
    /// 監視対象フィールドへの書き込み
    FieldModified {
        thread: ThreadId,
        object: Option<ObjectId>,
        field: String,
        new_value: Value,
    },
    /// ステップ完了
    Step {
        thread: ThreadId,
        request: RequestId,
        location: Location,
    },
    /// ブレークポイント到達
    Breakpoint {
        thread: ThreadId,
        request: RequestId,
        location: Location,
    },
    /// 例外の送出
    ///
    /// リモート構成によっては所有スレッドが取得できないことがある。
    Exception {
        thread: Option<ThreadId>,
        exception: ObjectId,
        type_name: String,
        location: Option<Location>,
    },
    /// 上記以外
    Other { description: String },
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawEvent::VmStart { thread } => write!(f, "VMStartEvent in thread {}", thread),
            RawEvent::VmDeath => f.write_str("VMDeathEvent"),
            RawEvent::UnitPrepared { unit } => write!(f, "ClassPrepareEvent {}", unit.name),
            RawEvent::FieldModified { field, new_value, .. } => {
                write!(f, "ModificationWatchpointEvent {} = {}", field, new_value)
            }
            RawEvent::Step { location, .. } => write!(f, "StepEvent @{}", location),
            RawEvent::Breakpoint { location, .. } => write!(f, "BreakpointEvent @{}", location),
            RawEvent::Exception { type_name, .. } => write!(f, "ExceptionEvent {}", type_name),
            RawEvent::Other { description } => f.write_str(description),
        }
    }
}

/// 一度に届くイベントのまとまり
pub type EventSet = Vec<RawEvent>;
