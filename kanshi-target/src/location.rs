//! コード単位とソース位置

use std::fmt;

/// コード単位（クラス）の完全修飾名
///
/// `foo.bar.Baz` と `foo/bar/Baz` のどちらで作成しても同じ名前として扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitName(String);

impl UnitName {
    /// 名前を作成する（区切り文字はドットに正規化する）
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().replace('/', "."))
    }

    /// `foo.bar.Baz` 形式の名前
    pub fn dot_name(&self) -> &str {
        &self.0
    }

    /// `foo/bar/Baz` 形式の名前
    pub fn qualified_name(&self) -> String {
        self.0.replace('.', "/")
    }

    /// パッケージ部分を除いた名前
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for UnitName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// ロード済みコード単位のハンドル
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitHandle {
    pub id: u64,
    pub name: UnitName,
}

impl UnitHandle {
    pub fn new(id: u64, name: impl Into<UnitName>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// 実行可能なソース位置
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub unit: UnitName,
    pub method: String,
    pub line: u32,
}

impl Location {
    pub fn new(unit: impl Into<UnitName>, method: impl Into<String>, line: u32) -> Self {
        Self {
            unit: unit.into(),
            method: method.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.unit, self.method, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_name_forms() {
        let name = UnitName::new("quorum/Main");
        assert_eq!(name.dot_name(), "quorum.Main");
        assert_eq!(name.qualified_name(), "quorum/Main");
        assert_eq!(name.simple_name(), "Main");
        assert_eq!(name, UnitName::from("quorum.Main"));
    }

    #[test]
    fn test_location_display() {
        let loc = Location::new("quorum.Main", "Main", 12);
        assert_eq!(loc.to_string(), "quorum.Main.Main:12");
    }
}
