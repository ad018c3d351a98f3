//! In-memory [`ChunkStore`] implementation.
//!
//! Chunks and their vectors live in an `ahash` map behind
//! `std::sync::RwLock`. Vector search is brute-force cosine similarity over
//! the chunks that pass the filter.

use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use async_trait::async_trait;

use crate::embedding::{cosine_similarity, EmbeddingProvider};
use crate::error::{NetcfgError, Result};
use crate::ingest::{Chunk, ChunkKey};

use super::{ChunkStore, ScoredChunk, SearchFilter};

struct StoredChunk {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// In-memory store backed by an embedding provider
pub struct InMemoryStore {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<AHashMap<ChunkKey, StoredChunk>>,
}

impl InMemoryStore {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(AHashMap::new()),
        }
    }

    /// Number of stored chunks across all files
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embed chunk texts; empty blocks get a zero vector and never match
    fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<StoredChunk>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text()).collect();
        let non_empty: Vec<String> = texts.iter().filter(|t| !t.trim().is_empty()).cloned().collect();
        let mut vectors = self.embedder.embed_batch(&non_empty)?.into_iter();

        chunks
            .iter()
            .zip(&texts)
            .map(|(chunk, text)| {
                let vector = if text.trim().is_empty() {
                    vec![0.0; self.embedder.dimension()]
                } else {
                    vectors.next().ok_or_else(|| {
                        NetcfgError::Embedding("provider returned too few vectors".to_string())
                    })?
                };
                Ok(StoredChunk {
                    chunk: chunk.clone(),
                    vector,
                })
            })
            .collect()
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, AHashMap<ChunkKey, StoredChunk>>> {
        self.entries
            .write()
            .map_err(|_| NetcfgError::Store("chunk map lock poisoned".to_string()))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, AHashMap<ChunkKey, StoredChunk>>> {
        self.entries
            .read()
            .map_err(|_| NetcfgError::Store("chunk map lock poisoned".to_string()))
    }
}

#[async_trait]
impl ChunkStore for InMemoryStore {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        let stored = self.embed_chunks(chunks)?;
        let mut entries = self.write()?;
        for entry in stored {
            entries.insert(entry.chunk.key(), entry);
        }
        Ok(())
    }

    async fn replace_file(&self, file_id: &str, chunks: &[Chunk]) -> Result<()> {
        if let Some(stray) = chunks.iter().find(|c| c.metadata.file_id != file_id) {
            return Err(NetcfgError::Store(format!(
                "chunk from '{}' passed to replace_file('{}')",
                stray.metadata.file_id, file_id
            )));
        }

        let stored = self.embed_chunks(chunks)?;
        let mut entries = self.write()?;
        entries.retain(|key, _| key.file_id != file_id);
        for entry in stored {
            entries.insert(entry.chunk.key(), entry);
        }
        Ok(())
    }

    async fn remove_file(&self, file_id: &str) -> Result<usize> {
        let mut entries = self.write()?;
        let before = entries.len();
        entries.retain(|key, _| key.file_id != file_id);
        Ok(before - entries.len())
    }

    async fn file_chunks(&self, file_id: &str) -> Result<Vec<Chunk>> {
        let entries = self.read()?;
        let mut chunks: Vec<Chunk> = entries
            .values()
            .filter(|e| e.chunk.metadata.file_id == file_id)
            .map(|e| e.chunk.clone())
            .collect();
        chunks.sort_by_key(|c| c.block.start_line);
        Ok(chunks)
    }

    async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed(query)?;
        let entries = self.read()?;

        let mut scored: Vec<ScoredChunk> = entries
            .values()
            .filter(|e| filter.matches(&e.chunk))
            .map(|e| ScoredChunk {
                chunk: e.chunk.clone(),
                score: cosine_similarity(&query_vec, &e.vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.key().cmp(&b.chunk.key()))
        });
        scored.truncate(limit);

        Ok(scored)
    }
}
