//! Chunk storage abstraction
//!
//! The [`ChunkStore`] trait is the seam between the ingestion pipeline and
//! whatever vector index holds embedded chunks. Searches are always scoped
//! by a [`SearchFilter`]; there is no call that searches several named files
//! at once and merges them.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

mod memory;

pub use memory::InMemoryStore;

use crate::error::Result;
use crate::ingest::Chunk;
use crate::metadata::Role;
use crate::parser::SectionType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A chunk with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Metadata filter applied before ranking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Exact file id match
    pub file_id: Option<String>,
    pub section_type: Option<SectionType>,
    pub role: Option<Role>,
}

impl SearchFilter {
    /// Filter scoped to a single file
    pub fn file(file_id: impl Into<String>) -> Self {
        Self {
            file_id: Some(file_id.into()),
            ..Self::default()
        }
    }

    pub fn with_section(mut self, section_type: Option<SectionType>) -> Self {
        self.section_type = section_type;
        self
    }

    pub fn with_role(mut self, role: Option<Role>) -> Self {
        self.role = role;
        self
    }

    pub fn matches(&self, chunk: &Chunk) -> bool {
        self.file_id
            .as_deref()
            .map_or(true, |id| chunk.metadata.file_id == id)
            && self.section_type.map_or(true, |s| chunk.section_type == s)
            && self.role.map_or(true, |r| chunk.metadata.role == r)
    }
}

/// Storage backend for embedded chunks
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert or overwrite chunks keyed by `(file_id, start_line)`
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Drop every chunk of `file_id`, then insert `chunks`
    async fn replace_file(&self, file_id: &str, chunks: &[Chunk]) -> Result<()>;

    /// Drop every chunk of `file_id`, returning how many were removed
    async fn remove_file(&self, file_id: &str) -> Result<usize>;

    /// All chunks of `file_id` in line order
    async fn file_chunks(&self, file_id: &str) -> Result<Vec<Chunk>>;

    /// Up to `limit` chunks matching `filter`, best first
    async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>>;
}
