//! フィールドとスタックフレームの可視性

use kanshi_target::{matches_class_filter, FrameInfo};

/// どのフィールド・フレームを利用者に見せるかの判定
pub trait VisibilityFilter: Send + Sync {
    fn is_visible_field(&self, name: &str) -> bool;

    /// 継承元の状態を表すフィールドか判定する
    fn is_parent_field(&self, name: &str) -> bool;

    fn is_visible_frame(&self, frame: &FrameInfo) -> bool;
}

/// 名前の印で判定するフィルタ
#[derive(Debug, Clone)]
pub struct MarkerFilter {
    hidden_prefixes: Vec<String>,
    parent_suffix: String,
    frame_exclusions: Vec<String>,
}

impl MarkerFilter {
    pub fn new(
        hidden_prefixes: Vec<String>,
        parent_suffix: impl Into<String>,
        frame_exclusions: Vec<String>,
    ) -> Self {
        Self {
            hidden_prefixes,
            parent_suffix: parent_suffix.into(),
            frame_exclusions,
        }
    }
}

impl Default for MarkerFilter {
    fn default() -> Self {
        Self::new(vec!["hidden_".to_string()], "__", Vec::new())
    }
}

impl VisibilityFilter for MarkerFilter {
    fn is_visible_field(&self, name: &str) -> bool {
        !self.hidden_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    fn is_parent_field(&self, name: &str) -> bool {
        !self.parent_suffix.is_empty() && name.ends_with(self.parent_suffix.as_str())
    }

    fn is_visible_frame(&self, frame: &FrameInfo) -> bool {
        !self
            .frame_exclusions
            .iter()
            .any(|p| matches_class_filter(p, frame.unit.dot_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let filter = MarkerFilter::default();
        assert!(filter.is_visible_field("count"));
        assert!(!filter.is_visible_field("hidden_cache"));
        assert!(filter.is_parent_field("Libraries_Shape__"));
        assert!(!filter.is_parent_field("count"));
    }

    #[test]
    fn test_frame_exclusions() {
        let filter = MarkerFilter::new(Vec::new(), "__", vec!["plugins.*".to_string()]);
        assert!(filter.is_visible_frame(&FrameInfo::new("Main", "quorum.Main", 3)));
        assert!(!filter.is_visible_frame(&FrameInfo::new("Run", "plugins.quorum.Loader", 9)));
    }
}
