//! 変数のツリーモデル
//!
//! 必要になったノードだけをその場で問い合わせる。問い合わせはセッションの
//! ロックの下で行うため、ステップや再開と競合しない。

use crate::debugger::Shared;
use kanshi_target::ThreadId;
use kanshi_view::{Variable, VariableColumn};
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// 範囲で切り出す（範囲外は詰める）
pub(crate) fn slice_range<T>(mut items: Vec<T>, range: Option<Range<usize>>) -> Vec<T> {
    let Some(range) = range else {
        return items;
    };
    let end = range.end.min(items.len());
    let start = range.start.min(end);
    items.truncate(end);
    items.drain(..start);
    items
}

/// 現在のスレッドの変数を見せる読み取り専用モデル
#[derive(Clone)]
pub struct VariablesModel {
    shared: Arc<Shared>,
}

impl VariablesModel {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// ノードの子を取得する
    ///
    /// `node` が `None` ならルート（レシーバ、続いてローカル変数を宣言順）。
    /// ターゲットが停止していない、現在のスレッドがない、スレッドが終了している
    /// 場合は空を返す。
    pub fn children(&self, node: Option<&Variable>, range: Option<Range<usize>>) -> Vec<Variable> {
        let state = self.shared.state.lock();
        let Some(thread) = self.shared.inspectable_thread(&state) else {
            return Vec::new();
        };
        let children = match node {
            None => self.root(thread),
            Some(node) => {
                self.shared
                    .presenter
                    .children(self.shared.target.as_ref(), thread, node)
            }
        };
        slice_range(children, range)
    }

    pub fn children_count(&self, node: Option<&Variable>) -> usize {
        self.children(node, None).len()
    }

    pub fn is_leaf(&self, node: Option<&Variable>) -> bool {
        node.map_or(false, Variable::is_leaf)
    }

    pub fn display_name<'a>(&self, node: &'a Variable) -> &'a str {
        &node.name
    }

    pub fn value_at<'a>(&self, node: &'a Variable, column: VariableColumn) -> &'a str {
        node.value_at(column)
    }

    /// 監視式の評価
    ///
    /// 現在のフレームにある同名のローカル変数を監視式として返す。
    pub fn watch(&self, expression: &str) -> Option<Variable> {
        let expression = expression.trim();
        let state = self.shared.state.lock();
        let thread = self.shared.inspectable_thread(&state)?;
        let target = self.shared.target.as_ref();

        let info = target
            .visible_variables(thread, 0)
            .ok()?
            .into_iter()
            .find(|info| info.name == expression)?;
        let value = target.local_value(thread, 0, &info.name);
        let mut var = self
            .shared
            .presenter
            .local_variable(target, thread, &info, value);
        var.is_watch_expression = true;
        Some(var)
    }

    fn root(&self, thread: ThreadId) -> Vec<Variable> {
        let target = self.shared.target.as_ref();
        let presenter = &self.shared.presenter;
        let mut variables = Vec::new();

        match target.this_object(thread, 0) {
            Ok(Some(object)) => variables.push(presenter.this_variable(target, thread, object)),
            Ok(None) => {}
            Err(err) => debug!("failed to read receiver: {}", err),
        }

        let locals = match target.visible_variables(thread, 0) {
            Ok(locals) => locals,
            Err(err) => {
                debug!("failed to list locals: {}", err);
                return variables;
            }
        };
        variables.extend(locals.iter().map(|info| {
            let value = target.local_value(thread, 0, &info.name);
            presenter.local_variable(target, thread, info, value)
        }));
        variables
    }
}
