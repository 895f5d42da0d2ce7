//! 日付・ファイルのフォーマッタ
//!
//! 引数なしのアクセサを順に呼び出し、`Method()` という名前の子として並べる。

use crate::{FormatContext, Formatter, Result, Variable};
use kanshi_target::ObjectId;

/// 引数なしアクセサの結果を子として見せるフォーマッタ
pub struct ProbeFormatter {
    key: String,
    object_name: String,
    probes: Vec<&'static str>,
    /// 表示値に使うアクセサ（`None` なら通常のオブジェクト表示）
    display_probe: Option<&'static str>,
}

impl ProbeFormatter {
    pub fn new(
        key: &str,
        object_name: &str,
        probes: Vec<&'static str>,
        display_probe: Option<&'static str>,
    ) -> Self {
        Self {
            key: key.to_string(),
            object_name: object_name.to_string(),
            probes,
            display_probe,
        }
    }

    pub fn date_time() -> Self {
        Self::new(
            "quorum.Libraries.System.DateTime",
            "Libraries.System.DateTime",
            vec![
                "GetYear",
                "GetMonth",
                "GetDayOfMonth",
                "GetDayOfWeek",
                "GetHour",
                "GetMinute",
                "GetSecond",
                "GetTimeZone",
                "IsDaylightSavings",
                "GetEpochTime",
            ],
            None,
        )
    }

    pub fn file() -> Self {
        Self::new(
            "quorum.Libraries.System.File",
            "Libraries.System.File",
            vec![
                "GetWorkingDirectory",
                "GetPath",
                "GetAbsolutePath",
                "Exists",
                "IsFile",
                "IsDirectory",
                "IsHidden",
                "GetFileName",
                "GetFileExtension",
                "GetParentDirectory",
                "GetFileSize",
                "GetLastModifiedDate",
            ],
            Some("GetFileName"),
        )
    }
}

impl Formatter for ProbeFormatter {
    fn type_key(&self) -> &str {
        &self.key
    }

    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn display_value(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<String> {
        match self.display_probe {
            Some(method) => Ok(cx.display(&cx.invoke(object, method, &[])?)),
            None => Ok(cx.presenter.naming().object_value(&self.key, object)),
        }
    }

    fn children(&self, cx: &FormatContext<'_>, object: ObjectId) -> Result<Vec<Variable>> {
        Ok(self
            .probes
            .iter()
            .map(|method| {
                let value = cx.invoke(object, method, &[]);
                cx.read_variable(&format!("{}()", method), value)
            })
            .collect())
    }
}
