//! Line and block types shared by the parsing stages

use crate::parser::SectionType;
use serde::{Deserialize, Serialize};

/// A line exactly as read from the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    /// 0-based position in the file
    pub index: usize,
    pub text: String,
}

/// Structural role of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRole {
    /// Starts at column 0
    TopLevel,
    /// Indented under a top-level line
    SubLevel,
    /// Vendor comment marker (`!`, `#`, `;`)
    Comment,
    /// Empty or whitespace-only
    Blank,
}

/// A raw line tagged with its role and indentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub index: usize,
    pub text: String,
    pub role: LineRole,
    /// Length of the leading whitespace run, one unit per character
    pub indent_depth: usize,
}

/// A classified line after secret redaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedLine {
    pub index: usize,
    pub text: String,
    pub role: LineRole,
    pub indent_depth: usize,
    /// Number of secret spans replaced on this line
    #[serde(default)]
    pub redactions: usize,
}

/// A maximal run of lines belonging to one logical feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBlock {
    /// Index of the first line (inclusive)
    pub start_line: usize,
    /// Index of the last line (inclusive)
    pub end_line: usize,
    /// Trimmed text of the line that opened the block
    pub header: String,
    /// Every line from `start_line` to `end_line`, header included
    pub body: Vec<RedactedLine>,
    pub section_type: SectionType,
}

impl ConfigBlock {
    /// Body lines joined with newlines, original indentation kept
    pub fn text(&self) -> String {
        self.body
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any body line had a secret redacted
    pub fn has_secret(&self) -> bool {
        self.body.iter().any(|line| line.redactions > 0)
    }
}
