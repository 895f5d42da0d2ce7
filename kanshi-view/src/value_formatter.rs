//! 型ごとのフォーマッタ
//!
//! コンテナや日付・ファイルのような型は、フィールドをそのまま並べても
//! 意味のある表示にならない。そうした型はランタイム型名をキーにして
//! フォーマッタを登録し、表示値と子要素の生成をまるごと任せる。

use crate::{Presenter, Result, Variable};
use kanshi_target::{ObjectId, TargetRuntime, ThreadId, Value};
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// フォーマッタの表示値が入れ子にできる深さ
const MAX_DISPLAY_DEPTH: usize = 8;

/// フォーマッタが値を読むための文脈
pub struct FormatContext<'a> {
    pub target: &'a dyn TargetRuntime,
    /// リモート呼び出しに使う停止中のスレッド
    pub thread: ThreadId,
    pub presenter: &'a Presenter,
    depth: Cell<usize>,
}

impl<'a> FormatContext<'a> {
    pub fn new(target: &'a dyn TargetRuntime, thread: ThreadId, presenter: &'a Presenter) -> Self {
        Self {
            target,
            thread,
            presenter,
            depth: Cell::new(0),
        }
    }

    /// オブジェクトのメソッドを呼び出す
    pub fn invoke(&self, object: ObjectId, method: &str, args: &[Value]) -> Result<Value> {
        Ok(self.target.invoke(object, self.thread, method, args)?)
    }

    /// フィールドの値を読む
    pub fn field(&self, object: ObjectId, name: &str) -> Result<Value> {
        Ok(self.target.field_value(object, name)?)
    }

    /// 値の表示文字列
    pub fn display(&self, value: &Value) -> String {
        self.presenter.display_value(self, value)
    }

    /// 値から子ノードを作る
    pub fn variable(&self, name: &str, value: Value) -> Variable {
        self.presenter.value_variable(self, name, "", value)
    }

    /// 読み出し結果から子ノードを作る。失敗したらそのノードだけnull表示にする
    pub fn read_variable(&self, name: &str, value: Result<Value>) -> Variable {
        match value {
            Ok(value) => self.variable(name, value),
            Err(err) => {
                debug!("failed to read '{}': {:#}", name, err);
                self.presenter.unreadable_variable(name, "")
            }
        }
    }

    /// 表示値の生成を1段入れ子にして実行する。深すぎる場合は `None`
    ///
    /// 自分自身を参照するノードなどで表示が循環しても止まるようにする。
    pub fn nested<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let depth = self.depth.get();
        if depth >= MAX_DISPLAY_DEPTH {
            return None;
        }
        self.depth.set(depth + 1);
        let result = f();
        self.depth.set(depth);
        Some(result)
    }
}

/// 特定のランタイム型の表示方法
pub trait Formatter: Send + Sync {
    /// 対象のランタイム型名
    fn type_key(&self) -> &str;

    /// 型のラベル
    fn object_name(&self) -> &str;

    fn display_value(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<String>;

    fn children(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<Vec<Variable>>;
}

/// ランタイム型名からフォーマッタへの対応表
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Arc<dyn Formatter>>,
}

impl FormatterRegistry {
    /// 空の対応表を作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 組み込みのフォーマッタを登録した対応表を作成する
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for formatter in crate::builtin::defaults() {
            registry.register(formatter);
        }
        registry
    }

    /// フォーマッタを登録する（同じ型のものは置き換える）
    pub fn register(&mut self, formatter: Arc<dyn Formatter>) -> Option<Arc<dyn Formatter>> {
        self.formatters
            .insert(formatter.type_key().to_string(), formatter)
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn Formatter>> {
        self.formatters.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.formatters.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl Formatter for Fixed {
        fn type_key(&self) -> &str {
            self.0
        }

        fn object_name(&self) -> &str {
            "Fixed"
        }

        fn display_value(&self, _cx: &FormatContext<'_>, _object: ObjectId) -> Result<String> {
            Ok("fixed".into())
        }

        fn children(&self, _cx: &FormatContext<'_>, _object: ObjectId) -> Result<Vec<Variable>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_register_replaces_same_type() {
        let mut registry = FormatterRegistry::new();
        assert!(registry.register(Arc::new(Fixed("a.B"))).is_none());
        assert!(registry.register(Arc::new(Fixed("a.B"))).is_some());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("a.B"));
        assert!(!registry.contains("a.C"));
    }

    #[test]
    fn test_defaults_cover_builtin_types() {
        let registry = FormatterRegistry::with_defaults();
        for key in [
            "quorum.Libraries.Containers.Array",
            "quorum.Libraries.Containers.List",
            "quorum.Libraries.Containers.Stack",
            "quorum.Libraries.Containers.HashTable",
            "quorum.Libraries.Containers.Support.HashNode",
            "quorum.Libraries.System.DateTime",
            "quorum.Libraries.System.File",
        ] {
            assert!(registry.contains(key), "missing formatter for {}", key);
        }
    }
}
