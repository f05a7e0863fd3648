//! Inline format kinds applied by toolbar controls

use std::fmt;
use std::str::FromStr;

use crate::error::EditorError;

/// The inline formats a word can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Bold,
    Italic,
    Underline,
}

impl FormatKind {
    pub const ALL: [FormatKind; 3] = [FormatKind::Bold, FormatKind::Italic, FormatKind::Underline];

    /// CSS class placed on the format wrapper
    pub fn class_name(&self) -> &'static str {
        match self {
            FormatKind::Bold => "bold",
            FormatKind::Italic => "italic",
            FormatKind::Underline => "underline",
        }
    }
}

impl FromStr for FormatKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bold" => Ok(FormatKind::Bold),
            "italic" => Ok(FormatKind::Italic),
            "underline" => Ok(FormatKind::Underline),
            other => Err(EditorError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_formats() {
        for kind in FormatKind::ALL {
            assert_eq!(kind.class_name().parse::<FormatKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("Bold".parse::<FormatKind>().is_err());
        assert!("strike".parse::<FormatKind>().is_err());
    }
}
