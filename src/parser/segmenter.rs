//! Block segmentation
//!
//! A two-state machine over the redacted line stream. Lines before the
//! first recognized block opener form the preamble. Once inside a block,
//! every top-level line closes the current block and opens the next one;
//! top-level lines that are not openers get a block of their own typed
//! `global`. Everything else attaches to the block that is open.

use crate::parser::{ConfigBlock, LineRole, RedactedLine, SectionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmenterState {
    Preamble,
    InBlock,
}

/// Lines collected for the block currently open
struct OpenBlock {
    lines: Vec<RedactedLine>,
    section_type: SectionType,
    is_preamble: bool,
}

impl OpenBlock {
    fn preamble() -> Self {
        Self {
            lines: Vec::new(),
            section_type: SectionType::Unknown,
            is_preamble: true,
        }
    }

    fn opened_by(line: RedactedLine, section_type: SectionType) -> Self {
        Self {
            lines: vec![line],
            section_type,
            is_preamble: false,
        }
    }

    fn close(self) -> Option<ConfigBlock> {
        let start_line = self.lines.first()?.index;
        let end_line = self.lines.last()?.index;

        let header = if self.is_preamble {
            self.lines
                .iter()
                .find(|l| l.role == LineRole::TopLevel)
                .map(|l| l.text.trim().to_string())
                .unwrap_or_default()
        } else {
            self.lines[0].text.trim().to_string()
        };

        Some(ConfigBlock {
            start_line,
            end_line,
            header,
            section_type: self.section_type,
            body: self.lines,
        })
    }
}

/// Group redacted lines into blocks that partition the file
///
/// Empty input yields a single empty preamble block.
pub fn segment(lines: Vec<RedactedLine>) -> Vec<ConfigBlock> {
    if lines.is_empty() {
        return vec![ConfigBlock {
            start_line: 0,
            end_line: 0,
            header: String::new(),
            body: Vec::new(),
            section_type: SectionType::Unknown,
        }];
    }

    let mut state = SegmenterState::Preamble;
    let mut blocks = Vec::new();
    let mut current = OpenBlock::preamble();

    for line in lines {
        if line.role != LineRole::TopLevel {
            current.lines.push(line);
            continue;
        }

        let opener = SectionType::from_header(&line.text);
        match (state, opener) {
            (SegmenterState::Preamble, None) => current.lines.push(line),
            (SegmenterState::Preamble, Some(section)) => {
                blocks.extend(current.close());
                current = OpenBlock::opened_by(line, section);
                state = SegmenterState::InBlock;
            }
            (SegmenterState::InBlock, opener) => {
                blocks.extend(current.close());
                current = OpenBlock::opened_by(line, opener.unwrap_or(SectionType::Global));
            }
        }
    }

    blocks.extend(current.close());

    tracing::debug!(blocks = blocks.len(), "Segmented config");
    blocks
}
