//! 命名規則
//!
//! 型名と変数名を表示用の文字列へ写像する。
//! 命名規則を差し替えてもラベルが変わるだけで、ツリーの構造は変わらない。

use kanshi_target::ObjectId;

/// 表示上プリミティブとして扱う型
const PRIMITIVE_TYPES: &[&str] = &[
    "int",
    "long",
    "float",
    "double",
    "boolean",
    "char",
    "java.lang.String",
];

/// プリミティブとして扱う型か判定する
pub fn is_primitive_type(type_name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&type_name)
}

/// 型名・変数名の表示規則
pub trait NamingConvention: Send + Sync {
    /// レシーバを表す合成エントリの名前
    fn this_name(&self) -> &str;

    /// null値の表示
    fn null_text(&self) -> &str;

    /// プリミティブ型のラベル（プリミティブでなければ `None`）
    fn primitive_name(&self, type_name: &str) -> Option<String>;

    /// オブジェクト型のラベル
    fn object_name(&self, type_name: &str) -> String;

    /// フィールド・変数名のラベル
    fn variable_name(&self, name: &str) -> String;

    /// 専用フォーマッタを持たないオブジェクトの値表示
    fn object_value(&self, type_name: &str, object: ObjectId) -> String;
}

/// ランタイムの名前をそのまま使う命名規則
#[derive(Debug, Clone, Copy, Default)]
pub struct RawNaming;

impl NamingConvention for RawNaming {
    fn this_name(&self) -> &str {
        "this"
    }

    fn null_text(&self) -> &str {
        "null"
    }

    fn primitive_name(&self, type_name: &str) -> Option<String> {
        is_primitive_type(type_name).then(|| type_name.to_string())
    }

    fn object_name(&self, type_name: &str) -> String {
        type_name.to_string()
    }

    fn variable_name(&self, name: &str) -> String {
        name.to_string()
    }

    fn object_value(&self, type_name: &str, object: ObjectId) -> String {
        format!("instance of {}(id={})", type_name, object)
    }
}

/// 初学者向け言語の語彙に寄せた命名規則
///
/// パッケージの先頭要素を落とし、継承フィールドの印（`a_b__`）を
/// `parent:a.b` に書き換える。
#[derive(Debug, Clone, Copy, Default)]
pub struct FriendlyNaming;

impl NamingConvention for FriendlyNaming {
    fn this_name(&self) -> &str {
        "me"
    }

    fn null_text(&self) -> &str {
        "undefined"
    }

    fn primitive_name(&self, type_name: &str) -> Option<String> {
        let label = match type_name {
            "int" | "long" => "integer",
            "float" | "double" => "number",
            "boolean" => "boolean",
            "char" | "java.lang.String" => "text",
            _ => return None,
        };
        Some(label.to_string())
    }

    fn object_name(&self, type_name: &str) -> String {
        if type_name == "hidden_" {
            return "Hidden".to_string();
        }
        let name = match type_name.split_once('.') {
            Some((_, rest)) => rest,
            None => type_name,
        };
        name.strip_suffix('_').unwrap_or(name).to_string()
    }

    fn variable_name(&self, name: &str) -> String {
        match name.strip_suffix("__") {
            Some(inner) => format!("parent:{}", inner.replace('_', ".")),
            None => name.to_string(),
        }
    }

    fn object_value(&self, _type_name: &str, object: ObjectId) -> String {
        format!("#{}", object)
    }
}
