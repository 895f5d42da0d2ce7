//! スレッドとスタックフレームの情報

use crate::UnitName;
use std::fmt;

/// ターゲット内のスレッドID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// スレッドの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStatus {
    Running,
    Suspended,
    /// 終了済み
    Zombie,
}

/// スタックフレームの生情報
///
/// インデックス0が最も内側のフレーム。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub method: String,
    pub unit: UnitName,
    pub line: u32,
}

impl FrameInfo {
    pub fn new(method: impl Into<String>, unit: impl Into<UnitName>, line: u32) -> Self {
        Self {
            method: method.into(),
            unit: unit.into(),
            line,
        }
    }
}
