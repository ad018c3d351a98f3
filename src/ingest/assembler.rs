//! Chunk assembly
//!
//! One chunk per block, in file order. Every chunk carries the file-level
//! metadata so retrieval can filter on file id, role or section.

use crate::metadata::FileMetadata;
use crate::parser::{ConfigBlock, SectionType};
use crate::redaction::Redactor;
use serde::{Deserialize, Serialize};

/// Identity of a chunk within the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub file_id: String,
    pub start_line: usize,
}

/// Retrieval unit: one redacted block plus file metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub block: ConfigBlock,
    pub metadata: FileMetadata,
    pub section_type: SectionType,
}

impl Chunk {
    pub fn key(&self) -> ChunkKey {
        ChunkKey {
            file_id: self.metadata.file_id.clone(),
            start_line: self.block.start_line,
        }
    }

    /// Block text used for embedding and display
    pub fn text(&self) -> String {
        self.block.text()
    }

    pub fn header(&self) -> &str {
        &self.block.header
    }

    pub fn has_secret(&self) -> bool {
        self.block.has_secret()
    }

    /// Citation in the form `file:lines start-end`, 1-based for humans
    pub fn citation(&self) -> String {
        format!(
            "{}:{}-{}",
            self.metadata.display_name(),
            self.block.start_line + 1,
            self.block.end_line + 1
        )
    }
}

/// Attach metadata to blocks, re-running redaction over each line
pub fn assemble_chunks(
    blocks: Vec<ConfigBlock>,
    metadata: &FileMetadata,
    redactor: &Redactor,
) -> Vec<Chunk> {
    blocks
        .into_iter()
        .map(|mut block| {
            // Idempotent pass; counts from the first pass are kept
            for line in &mut block.body {
                let redacted = redactor.redact(&line.text);
                line.redactions += redacted.count;
                line.text = redacted.text;
            }
            block.header = redactor.redact(&block.header).text;

            Chunk {
                section_type: block.section_type,
                block,
                metadata: metadata.clone(),
            }
        })
        .collect()
}
