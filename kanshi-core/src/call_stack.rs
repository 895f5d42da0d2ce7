//! コールスタックのツリーモデル

use crate::debugger::Shared;
use crate::variables::slice_range;
use kanshi_target::{TargetRuntime, ThreadId, UnitName};
use kanshi_view::Presenter;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// スタックフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub method: String,
    pub line: u32,
    pub unit: UnitName,
    /// 直近に取得したスタックの最も内側のフレームか
    pub is_current: bool,
}

impl StackFrame {
    /// 表示名（`method:line`）
    pub fn display_name(&self) -> String {
        format!("{}:{}", self.method, self.line)
    }

    /// コード単位の `foo/Bar` 形式の名前
    pub fn unit_path(&self) -> String {
        self.unit.qualified_name()
    }
}

/// スレッドのフレームを可視性フィルタに通して取得する
///
/// 最初に残ったフレームだけが現在のフレームになる。
pub(crate) fn snapshot(
    target: &dyn TargetRuntime,
    presenter: &Presenter,
    thread: ThreadId,
) -> Vec<StackFrame> {
    let frames = match target.frames(thread) {
        Ok(frames) => frames,
        Err(err) => {
            debug!("failed to read frames of thread {}: {}", thread, err);
            return Vec::new();
        }
    };

    frames
        .into_iter()
        .filter(|frame| presenter.is_visible_frame(frame))
        .enumerate()
        .map(|(i, frame)| StackFrame {
            method: frame.method,
            line: frame.line,
            unit: frame.unit,
            is_current: i == 0,
        })
        .collect()
}

/// 現在のスレッドのコールスタックを見せる読み取り専用モデル
///
/// ターゲットが停止中で、現在のスレッドが生きているときだけ中身を返す。
#[derive(Clone)]
pub struct CallStackModel {
    shared: Arc<Shared>,
}

impl CallStackModel {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// フレーム一覧（範囲指定があればその部分だけ）
    pub fn children(&self, range: Option<Range<usize>>) -> Vec<StackFrame> {
        let state = self.shared.state.lock();
        let Some(thread) = self.shared.inspectable_thread(&state) else {
            return Vec::new();
        };
        slice_range(
            snapshot(self.shared.target.as_ref(), &self.shared.presenter, thread),
            range,
        )
    }

    pub fn frames(&self) -> Vec<StackFrame> {
        self.children(None)
    }

    pub fn children_count(&self) -> usize {
        self.children(None).len()
    }

    /// フレームは子を持たない
    pub fn is_leaf(&self, _frame: &StackFrame) -> bool {
        true
    }

    pub fn display_name(&self, frame: &StackFrame) -> String {
        frame.display_name()
    }
}
