//! 表示用の変数

use kanshi_target::ObjectId;

/// 変数ツリーのノード
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Variable {
    pub name: String,
    pub type_name: String,
    /// 表示用の値
    pub value: String,
    pub is_field: bool,
    pub is_primitive: bool,
    /// 親クラスから継承したフィールド
    pub is_parent: bool,
    pub is_watch_expression: bool,
    /// 元になったオブジェクト（展開時の再問い合わせにだけ使う）
    pub object: Option<ObjectId>,
}

/// 変数ビューの列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableColumn {
    Name,
    Type,
    Value,
}

impl Variable {
    /// 子を持たないノードか判定する
    pub fn is_leaf(&self) -> bool {
        self.is_primitive || self.object.is_none()
    }

    /// 列に対応する表示文字列を取得する
    pub fn value_at(&self, column: VariableColumn) -> &str {
        match column {
            VariableColumn::Name => &self.name,
            VariableColumn::Type => &self.type_name,
            VariableColumn::Value => &self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_at() {
        let var = Variable {
            name: "count".into(),
            type_name: "int".into(),
            value: "3".into(),
            is_primitive: true,
            ..Default::default()
        };
        assert_eq!(var.value_at(VariableColumn::Name), "count");
        assert_eq!(var.value_at(VariableColumn::Type), "int");
        assert_eq!(var.value_at(VariableColumn::Value), "3");
        assert!(var.is_leaf());
    }

    #[test]
    fn test_null_object_is_leaf() {
        let var = Variable::default();
        assert!(var.is_leaf());

        let obj = Variable {
            object: Some(ObjectId(1)),
            ..Default::default()
        };
        assert!(!obj.is_leaf());
    }
}
