//! パース関連のユーティリティ関数

use crate::{Breakpoint, DebuggerError};

/// `unit:line` または `unit:line:count` 形式のブレークポイント指定をパース
///
/// # Examples
/// ```
/// use kanshi_core::parse::parse_breakpoint;
///
/// let bp = parse_breakpoint("quorum.Main:12").unwrap();
/// assert_eq!(bp.line, 12);
/// assert_eq!(bp.hit_count, None);
/// ```
pub fn parse_breakpoint(s: &str) -> Result<Breakpoint, DebuggerError> {
    let invalid = || DebuggerError::InvalidBreakpoint(s.to_string());
    let mut parts = s.trim().split(':');

    let unit = parts.next().filter(|u| !u.is_empty()).ok_or_else(invalid)?;
    let line = parts
        .next()
        .and_then(|l| l.trim().parse::<u32>().ok())
        .filter(|l| *l > 0)
        .ok_or_else(invalid)?;
    let hit_count = match parts.next() {
        Some(count) => Some(
            count
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(invalid)?,
        ),
        None => None,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }

    let bp = Breakpoint::new(unit, line);
    Ok(match hit_count {
        Some(count) => bp.with_hit_count(count),
        None => bp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_breakpoint_line() {
        let bp = parse_breakpoint("quorum/Main:7").unwrap();
        assert_eq!(bp.unit.dot_name(), "quorum.Main");
        assert_eq!(bp.line, 7);
        assert_eq!(bp.hit_count, None);
    }

    #[test]
    fn test_parse_breakpoint_count() {
        let bp = parse_breakpoint("quorum.Main:7:3").unwrap();
        assert_eq!(bp.hit_count, Some(3));
    }

    #[test]
    fn test_parse_breakpoint_invalid() {
        assert!(parse_breakpoint("quorum.Main").is_err());
        assert!(parse_breakpoint(":3").is_err());
        assert!(parse_breakpoint("quorum.Main:x").is_err());
        assert!(parse_breakpoint("quorum.Main:0").is_err());
        assert!(parse_breakpoint("quorum.Main:3:0").is_err());
        assert!(parse_breakpoint("quorum.Main:3:1:2").is_err());
    }
}
