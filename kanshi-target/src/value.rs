//! ターゲット内の値

use std::fmt;

/// ターゲット内オブジェクトのID
///
/// 同一性の確認と再問い合わせにのみ使い、所有はしない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ターゲットから読み出した値
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// 文字列（`java.lang.String`）は内容ごと受け取る
    Text(String),
    Object(ObjectId),
}

impl Value {
    /// 値そのものが持つ型名（オブジェクトとnullはランタイムに問い合わせる必要がある）
    pub fn primitive_type_name(&self) -> Option<&'static str> {
        match self {
            Value::Bool(_) => Some("boolean"),
            Value::Char(_) => Some("char"),
            Value::Int(_) => Some("int"),
            Value::Long(_) => Some("long"),
            Value::Float(_) => Some("float"),
            Value::Double(_) => Some("double"),
            Value::Text(_) => Some("java.lang.String"),
            Value::Null | Value::Object(_) => None,
        }
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::Object(id) => write!(f, "#{}", id),
        }
    }
}

/// フレーム内で見えるローカル変数・引数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariableInfo {
    pub name: String,
    /// 宣言型の名前
    pub type_name: String,
}

impl LocalVariableInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// オブジェクトのフィールド（継承したものを含む、宣言順）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub type_name: String,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}
