//! イベントリクエストの仕様

use crate::{Location, ThreadId};
use std::fmt;

/// ターゲットに設置したリクエストのハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// イベント発生時にどこまで停止させるか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendPolicy {
    None,
    EventThread,
    All,
}

/// ステップの方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepDirection {
    Into,
    Over,
    Out,
}

impl fmt::Display for StepDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepDirection::Into => "into",
            StepDirection::Over => "over",
            StepDirection::Out => "out",
        };
        f.write_str(name)
    }
}

/// 行ブレークポイントのリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRequest {
    pub location: Location,
    /// n回目の到達でだけ発火し、その後は無効になる（`None` は無制限）
    pub hit_count: Option<u32>,
    pub suspend: SuspendPolicy,
}

/// 行単位ステップのリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRequest {
    pub thread: ThreadId,
    pub direction: StepDirection,
    /// ステップで入り込まないコード単位のパターン
    pub exclusions: Vec<String>,
    pub suspend: SuspendPolicy,
    pub hit_count: Option<u32>,
}

/// クラスフィルタのパターンに名前が一致するか判定する
///
/// パターンは完全一致、`prefix*`、`*suffix` の3形式。
pub fn matches_class_filter(pattern: &str, name: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        name.starts_with(prefix)
    } else if let Some(suffix) = pattern.strip_prefix('*') {
        name.ends_with(suffix)
    } else {
        pattern == name
    }
}
