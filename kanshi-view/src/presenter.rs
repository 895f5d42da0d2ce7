//! 変数ツリーの組み立て
//!
//! 値を表示用の [`Variable`] に変換し、ノードの子を求める。
//! 個々の値の読み出しに失敗しても一覧全体は中断せず、
//! そのノードだけをnull相当の表示に落とす。

use crate::naming::is_primitive_type;
use crate::{
    FormatContext, FormatterRegistry, MarkerFilter, NamingConvention, RawNaming, Variable,
    VisibilityFilter,
};
use kanshi_target::{FrameInfo, LocalVariableInfo, ObjectId, TargetRuntime, ThreadId, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// 命名規則・可視性フィルタ・フォーマッタをまとめた変数の見せ方
#[derive(Clone)]
pub struct Presenter {
    naming: Arc<dyn NamingConvention>,
    filter: Arc<dyn VisibilityFilter>,
    formatters: FormatterRegistry,
}

impl Presenter {
    pub fn new(
        naming: Arc<dyn NamingConvention>,
        filter: Arc<dyn VisibilityFilter>,
        formatters: FormatterRegistry,
    ) -> Self {
        Self {
            naming,
            filter,
            formatters,
        }
    }

    pub fn naming(&self) -> &dyn NamingConvention {
        self.naming.as_ref()
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn formatters_mut(&mut self) -> &mut FormatterRegistry {
        &mut self.formatters
    }

    pub fn is_visible_frame(&self, frame: &FrameInfo) -> bool {
        self.filter.is_visible_frame(frame)
    }

    /// 値の表示文字列を求める
    pub fn display_value(&self, cx: &FormatContext<'_>, value: &Value) -> String {
        let object = match value {
            Value::Null => return self.naming.null_text().to_string(),
            Value::Object(object) => *object,
            other => return other.to_string(),
        };
        let type_name = match cx.target.type_name(object) {
            Ok(name) => name,
            Err(err) => {
                debug!("failed to read type of object {}: {}", object, err);
                return self.naming.null_text().to_string();
            }
        };
        let Some(formatter) = self.formatters.get(&type_name) else {
            return self.naming.object_value(&type_name, object);
        };
        match cx.nested(|| formatter.display_value(cx, object)) {
            Some(Ok(text)) => text,
            Some(Err(err)) => {
                warn!("formatter for {} failed: {:#}", type_name, err);
                self.naming.object_value(&type_name, object)
            }
            None => {
                debug!("display of object {} nested too deeply", object);
                self.naming.object_value(&type_name, object)
            }
        }
    }

    /// 名前と値から変数ノードを作る
    ///
    /// `declared_type` は値がnullのときの型名に使う。
    pub fn value_variable(
        &self,
        cx: &FormatContext<'_>,
        name: &str,
        declared_type: &str,
        value: Value,
    ) -> Variable {
        let raw_type = match &value {
            Value::Object(object) => cx
                .target
                .type_name(*object)
                .unwrap_or_else(|_| declared_type.to_string()),
            Value::Null => declared_type.to_string(),
            other => other
                .primitive_type_name()
                .unwrap_or(declared_type)
                .to_string(),
        };
        let mut var = Variable {
            name: name.to_string(),
            value: self.display_value(cx, &value),
            object: value.object_id(),
            ..Default::default()
        };
        self.apply_type_name(&mut var, &raw_type);
        var
    }

    /// 読み出しに失敗したノード
    pub fn unreadable_variable(&self, name: &str, declared_type: &str) -> Variable {
        let mut var = Variable {
            name: name.to_string(),
            value: self.naming.null_text().to_string(),
            ..Default::default()
        };
        self.apply_type_name(&mut var, declared_type);
        var
    }

    /// 型名のラベルを付け、プリミティブかどうかを決める（判定は命名規則に依存しない）
    ///
    /// プリミティブでない場合は変数名も命名規則で書き換える。
    fn apply_type_name(&self, var: &mut Variable, raw_type: &str) {
        var.is_primitive = is_primitive_type(raw_type);
        if var.is_primitive {
            var.type_name = self
                .naming
                .primitive_name(raw_type)
                .unwrap_or_else(|| raw_type.to_string());
            return;
        }
        var.type_name = match self.formatters.get(raw_type) {
            Some(formatter) => formatter.object_name().to_string(),
            None => self.naming.object_name(raw_type),
        };
        var.name = self.naming.variable_name(&var.name);
    }

    /// レシーバを表す合成エントリ
    pub fn this_variable(
        &self,
        target: &dyn TargetRuntime,
        thread: ThreadId,
        object: ObjectId,
    ) -> Variable {
        let cx = FormatContext::new(target, thread, self);
        let mut var = self.value_variable(&cx, "", "", Value::Object(object));
        var.name = self.naming.this_name().to_string();
        var.is_field = true;
        var
    }

    /// ローカル変数のノード
    pub fn local_variable(
        &self,
        target: &dyn TargetRuntime,
        thread: ThreadId,
        info: &LocalVariableInfo,
        value: kanshi_target::Result<Value>,
    ) -> Variable {
        match value {
            Ok(value) => {
                let cx = FormatContext::new(target, thread, self);
                self.value_variable(&cx, &info.name, &info.type_name, value)
            }
            Err(err) => {
                debug!("failed to read local '{}': {}", info.name, err);
                self.unreadable_variable(&info.name, &info.type_name)
            }
        }
    }

    /// ノードの子を求める
    ///
    /// プリミティブとnullは子を持たない。専用フォーマッタがある型は
    /// そちらに任せ、それ以外はフィールドを可視性フィルタに通して並べる。
    pub fn children(
        &self,
        target: &dyn TargetRuntime,
        thread: ThreadId,
        node: &Variable,
    ) -> Vec<Variable> {
        if node.is_primitive {
            return Vec::new();
        }
        let Some(object) = node.object else {
            return Vec::new();
        };
        let type_name = match target.type_name(object) {
            Ok(name) => name,
            Err(err) => {
                debug!("failed to read type of object {}: {}", object, err);
                return Vec::new();
            }
        };

        let cx = FormatContext::new(target, thread, self);
        if let Some(formatter) = self.formatters.get(&type_name) {
            return formatter.children(&cx, object).unwrap_or_else(|err| {
                warn!("formatter for {} failed: {:#}", type_name, err);
                Vec::new()
            });
        }
        self.field_variables(&cx, object)
    }

    fn field_variables(&self, cx: &FormatContext<'_>, object: ObjectId) -> Vec<Variable> {
        let fields = match cx.target.fields(object) {
            Ok(fields) => fields,
            Err(err) => {
                debug!("failed to list fields of object {}: {}", object, err);
                return Vec::new();
            }
        };

        fields
            .iter()
            .filter(|field| self.filter.is_visible_field(&field.name))
            .map(|field| {
                let mut var = match cx.target.field_value(object, &field.name) {
                    Ok(value) => self.value_variable(cx, &field.name, &field.type_name, value),
                    Err(err) => {
                        debug!("failed to read field '{}': {}", field.name, err);
                        self.unreadable_variable(&field.name, &field.type_name)
                    }
                };
                var.is_field = true;
                var.is_parent = self.filter.is_parent_field(&field.name);
                var
            })
            .collect()
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new(
            Arc::new(RawNaming),
            Arc::new(MarkerFilter::default()),
            FormatterRegistry::with_defaults(),
        )
    }
}
