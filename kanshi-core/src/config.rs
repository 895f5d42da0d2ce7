//! セッション設定
//!
//! TOMLで記述し、省略した項目は既定値になる。
//!
//! ```toml
//! naming = "friendly"
//! step_exclusions = ["java.*", "sun.*"]
//! frame_exclusions = ["plugins.quorum.*"]
//! ```

use crate::DebuggerError;
use kanshi_view::{FormatterRegistry, FriendlyNaming, MarkerFilter, Presenter, RawNaming};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// ステップ・ロード通知・例外通知から除外する既定のパターン
const DEFAULT_EXCLUSIONS: &[&str] = &[
    "java.*",
    "sun.*",
    "javax.*",
    "com.apple.*",
    "apple.*",
    "org.sodbeans.*",
    "com.sun.*",
    "plugins.quorum.*",
    "org.glassfish.*",
    "org.apache.*",
    "web.servlet.*",
    "antlr.*",
];

/// 変数ビューの命名規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStyle {
    /// ランタイムの名前をそのまま表示する
    #[default]
    Raw,
    Friendly,
}

/// デバッガセッションの設定
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub step_exclusions: Vec<String>,
    /// コールスタックに表示しないコード単位のパターン
    pub frame_exclusions: Vec<String>,
    pub hidden_field_prefixes: Vec<String>,
    /// 継承フィールドを表す名前の接尾辞
    pub parent_field_suffix: String,
    pub naming: NamingStyle,
    /// 例外オブジェクトからメッセージを読むフィールド
    pub exception_message_field: String,
    pub event_thread_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            step_exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            frame_exclusions: Vec::new(),
            hidden_field_prefixes: vec!["hidden_".to_string()],
            parent_field_suffix: "__".to_string(),
            naming: NamingStyle::default(),
            exception_message_field: "errorMessage".to_string(),
            event_thread_name: "kanshi-events".to_string(),
        }
    }
}

impl SessionConfig {
    /// TOML文字列から設定を読み込む
    pub fn from_toml_str(s: &str) -> Result<Self, DebuggerError> {
        Ok(toml::from_str(s)?)
    }

    /// TOMLファイルから設定を読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DebuggerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DebuggerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// 設定に従った変数の見せ方を組み立てる
    pub fn presenter(&self) -> Presenter {
        let filter = MarkerFilter::new(
            self.hidden_field_prefixes.clone(),
            self.parent_field_suffix.clone(),
            self.frame_exclusions.clone(),
        );
        let naming: Arc<dyn kanshi_view::NamingConvention> = match self.naming {
            NamingStyle::Raw => Arc::new(RawNaming),
            NamingStyle::Friendly => Arc::new(FriendlyNaming),
        };
        Presenter::new(naming, Arc::new(filter), FormatterRegistry::with_defaults())
    }
}
