//! Config text parsing
//!
//! - Line classification (top-level, sub-level, comment, blank)
//! - Section typing through a fixed block-opener table
//! - Segmentation of redacted lines into blocks that partition the file

mod classifier;
mod section;
mod segmenter;
mod types;

pub use classifier::{classify, classify_line, split_lines};
pub use section::SectionType;
pub use segmenter::segment;
pub use types::{ClassifiedLine, ConfigBlock, LineRole, RawLine, RedactedLine};
