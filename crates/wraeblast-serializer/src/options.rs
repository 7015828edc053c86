//! Output formatting options

use serde::{Deserialize, Serialize};

/// Serializer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    /// Spaces per indentation level when `soft_tabs` is set
    pub indent: usize,
    /// Indent with spaces instead of a tab
    pub soft_tabs: bool,
    /// Omit the alpha channel of fully opaque colors
    pub use_default_opacity: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            soft_tabs: true,
            use_default_opacity: true,
        }
    }
}

impl SerializerOptions {
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_soft_tabs(mut self, soft_tabs: bool) -> Self {
        self.soft_tabs = soft_tabs;
        self
    }

    pub fn with_default_opacity(mut self, use_default_opacity: bool) -> Self {
        self.use_default_opacity = use_default_opacity;
        self
    }

    /// Leading whitespace for condition and action lines
    pub fn indentation(&self) -> String {
        if self.soft_tabs && self.indent > 0 {
            " ".repeat(self.indent)
        } else {
            "\t".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        assert_eq!(SerializerOptions::default().indentation(), "    ");
        assert_eq!(SerializerOptions::default().with_indent(2).indentation(), "  ");
        assert_eq!(
            SerializerOptions::default().with_soft_tabs(false).indentation(),
            "\t"
        );
        assert_eq!(SerializerOptions::default().with_indent(0).indentation(), "\t");
    }
}
