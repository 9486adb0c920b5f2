//! Indentation configuration for emitted source.

use serde::Deserialize;

/// Indentation unit for one nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indent {
    /// Spaces with the specified width (e.g., 2 or 4).
    Spaces(u8),
    /// Tab character.
    Tab,
}

impl Indent {
    /// 2-space indentation (Kotlin default).
    pub const KOTLIN: Self = Self::Spaces(2);

    /// 4-space indentation.
    pub const WIDE: Self = Self::Spaces(4);

    /// The string emitted for one indent level.
    pub fn unit(&self) -> String {
        match self {
            Self::Spaces(n) => " ".repeat(usize::from(*n)),
            Self::Tab => "\t".to_string(),
        }
    }

    /// Column width of one indent level. A tab counts as one column.
    pub fn width(&self) -> usize {
        match self {
            Self::Spaces(n) => usize::from(*n),
            Self::Tab => 1,
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::KOTLIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_unit() {
        assert_eq!(Indent::Spaces(2).unit(), "  ");
        assert_eq!(Indent::Spaces(4).unit(), "    ");
        assert_eq!(Indent::Spaces(3).unit(), "   ");
        assert_eq!(Indent::Tab.unit(), "\t");
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(Indent::Spaces(8).width(), 8);
        assert_eq!(Indent::Tab.width(), 1);
    }

    #[test]
    fn test_default() {
        assert_eq!(Indent::default(), Indent::KOTLIN);
    }
}
