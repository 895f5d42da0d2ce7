//! コンテナ型のフォーマッタ
//!
//! 要素数や要素はメモリレイアウトではなく、リモート呼び出しで取得する。

use crate::{FormatContext, Formatter, Result, Variable};
use anyhow::anyhow;
use kanshi_target::{ObjectId, Value};
use std::sync::Arc;
use tracing::debug;

/// 1ノードで展開する要素数の上限
const ITERATION_LIMIT: usize = 10_000;

fn size_of(cx: &FormatContext<'_>, object: ObjectId) -> Result<usize> {
    let value = cx.invoke(object, "GetSize", &[])?;
    value
        .as_int()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| anyhow!("GetSize returned {}", value))
}

/// `GetSize` と `Get(i)` で要素を列挙する
fn indexed_elements(
    cx: &FormatContext<'_>,
    object: ObjectId,
    skip_null: bool,
) -> Result<Vec<Variable>> {
    let size = size_of(cx, object)?;
    let mut elements = Vec::with_capacity(size.min(ITERATION_LIMIT));
    for i in 0..size.min(ITERATION_LIMIT) {
        let index = i32::try_from(i)?;
        let value = cx.invoke(object, "Get", &[Value::Int(index)]);
        if skip_null && value.as_ref().is_ok_and(Value::is_null) {
            continue;
        }
        elements.push(cx.read_variable(&i.to_string(), value));
    }
    Ok(elements)
}

/// `size` フィールドを使った表示値
fn size_field_display(cx: &FormatContext<'_>, object: ObjectId) -> Result<String> {
    let size = cx.field(object, "size")?;
    Ok(format!("size = {}", cx.display(&size)))
}

/// 添字アクセスできる配列
pub struct IndexedFormatter {
    key: String,
    object_name: String,
}

impl IndexedFormatter {
    pub fn new(key: &str, object_name: &str) -> Self {
        Self {
            key: key.to_string(),
            object_name: object_name.to_string(),
        }
    }
}

impl Formatter for IndexedFormatter {
    fn type_key(&self) -> &str {
        &self.key
    }

    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn display_value(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<String> {
        Ok(format!("size = {}", size_of(cx, object)?))
    }

    fn children(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<Vec<Variable>> {
        indexed_elements(cx, object, false)
    }
}

/// イテレータで辿るリスト
pub struct IterableFormatter {
    key: String,
    object_name: String,
}

impl IterableFormatter {
    pub fn new(key: &str, object_name: &str) -> Self {
        Self {
            key: key.to_string(),
            object_name: object_name.to_string(),
        }
    }
}

impl Formatter for IterableFormatter {
    fn type_key(&self) -> &str {
        &self.key
    }

    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn display_value(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<String> {
        size_field_display(cx, object)
    }

    fn children(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<Vec<Variable>> {
        let Some(iterator) = cx.invoke(object, "GetIterator", &[])?.object_id() else {
            return Ok(Vec::new());
        };

        let has_next = |cx: &FormatContext<'_>| match cx.invoke(iterator, "HasNext", &[]) {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(err) => {
                debug!("HasNext failed, stopping iteration: {:#}", err);
                false
            }
        };

        // Next が失敗するとイテレータの位置が分からないので、そのノードで打ち切る
        let mut elements = Vec::new();
        while elements.len() < ITERATION_LIMIT && has_next(cx) {
            let value = cx.invoke(iterator, "Next", &[]);
            let failed = value.is_err();
            elements.push(cx.read_variable(&elements.len().to_string(), value));
            if failed {
                break;
            }
        }
        Ok(elements)
    }
}

/// フィールドに保持した別のコンテナへ表示を任せる（スタックなど）
pub struct DelegatingFormatter {
    key: String,
    object_name: String,
    field: String,
    inner: Arc<dyn Formatter>,
}

impl DelegatingFormatter {
    pub fn new(key: &str, object_name: &str, field: &str, inner: Arc<dyn Formatter>) -> Self {
        Self {
            key: key.to_string(),
            object_name: object_name.to_string(),
            field: field.to_string(),
            inner,
        }
    }

    fn inner_object(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<Option<ObjectId>> {
        Ok(cx.field(object, &self.field)?.object_id())
    }
}

impl Formatter for DelegatingFormatter {
    fn type_key(&self) -> &str {
        &self.key
    }

    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn display_value(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<String> {
        match self.inner_object(cx, object)? {
            Some(inner) => self.inner.display_value(cx, inner),
            None => Ok(cx.presenter.naming().null_text().to_string()),
        }
    }

    fn children(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<Vec<Variable>> {
        match self.inner_object(cx, object)? {
            Some(inner) => self.inner.children(cx, inner),
            None => Ok(Vec::new()),
        }
    }
}

/// バケット配列を持つハッシュテーブル
///
/// 子は空でないバケットの先頭ノード。ノード側は [`EntryFormatter`] で表示する。
pub struct BucketFormatter {
    key: String,
    object_name: String,
}

impl BucketFormatter {
    pub fn new(key: &str, object_name: &str) -> Self {
        Self {
            key: key.to_string(),
            object_name: object_name.to_string(),
        }
    }
}

impl Formatter for BucketFormatter {
    fn type_key(&self) -> &str {
        &self.key
    }

    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn display_value(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<String> {
        size_field_display(cx, object)
    }

    fn children(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<Vec<Variable>> {
        match cx.field(object, "array")?.object_id() {
            Some(buckets) => indexed_elements(cx, buckets, true),
            None => Ok(Vec::new()),
        }
    }
}

/// ハッシュテーブルのノード（`key => value`）
pub struct EntryFormatter {
    key: String,
    object_name: String,
}

impl EntryFormatter {
    pub fn new(key: &str, object_name: &str) -> Self {
        Self {
            key: key.to_string(),
            object_name: object_name.to_string(),
        }
    }
}

impl Formatter for EntryFormatter {
    fn type_key(&self) -> &str {
        &self.key
    }

    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn display_value(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<String> {
        let key = cx.field(object, "key")?;
        let value = cx.field(object, "value")?;
        Ok(format!("{} => {}", cx.display(&key), cx.display(&value)))
    }

    fn children(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<Vec<Variable>> {
        Ok(["key", "value", "next"]
            .into_iter()
            .map(|name| cx.read_variable(name, cx.field(object, name)))
            .collect())
    }
}
