//! リスナーの登録
//!
//! リスナーは名前で識別される。同じ名前で登録し直すと後の登録が勝つ。

use crate::{Result, StackFrame};
use indexmap::IndexMap;
use kanshi_target::Location;
use std::sync::Arc;

/// デバッグイベントの受け手
///
/// ハンドラはイベント処理スレッド上で順に呼ばれるため、速やかに戻ること。
/// エラーを返しても他のリスナーへの配信は続く。
pub trait DebuggerListener: Send + Sync {
    /// 登録キーになる名前
    fn name(&self) -> &str;

    fn on_start(&self) -> Result<()> {
        Ok(())
    }

    fn on_stop(&self) -> Result<()> {
        Ok(())
    }

    fn on_step(&self, _location: &Location) -> Result<()> {
        Ok(())
    }

    fn on_breakpoint(&self, _location: &Location) -> Result<()> {
        Ok(())
    }

    fn on_exception(&self, _message: &str, _frames: &[StackFrame]) -> Result<()> {
        Ok(())
    }

    fn on_other(&self, _description: &str) -> Result<()> {
        Ok(())
    }
}

/// 名前をキーにしたリスナーの集合（登録順を保つ）
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: IndexMap<String, Arc<dyn DebuggerListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// リスナーを登録する
    ///
    /// 同じ名前のリスナーがあれば同じ位置で置き換え、古い方を返す。
    pub fn add(&mut self, listener: Arc<dyn DebuggerListener>) -> Option<Arc<dyn DebuggerListener>> {
        self.listeners.insert(listener.name().to_string(), listener)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn DebuggerListener>> {
        self.listeners.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn DebuggerListener>> {
        self.listeners.get(name)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// 配信用に現在のリスナーを登録順で取り出す
    pub fn snapshot(&self) -> Vec<Arc<dyn DebuggerListener>> {
        self.listeners.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.listeners.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
