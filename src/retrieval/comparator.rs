//! Dual-retrieval comparator
//!
//! Runs one file-scoped search per role and pairs the results. The two
//! searches never share a filter and their results are never merged.

use crate::error::{NetcfgError, Result};
use crate::metadata::Role;
use crate::parser::SectionType;
use crate::retrieval::{ComparisonContext, Degraded, DegradedReason};
use crate::store::{ChunkStore, ScoredChunk, SearchFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A golden-vs-candidate retrieval request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareRequest {
    pub query: String,
    pub golden_file_id: String,
    pub candidate_file_id: String,
    /// Chunks kept per role
    pub top_k: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_type: Option<SectionType>,
}

impl CompareRequest {
    pub fn new(
        query: impl Into<String>,
        golden_file_id: impl Into<String>,
        candidate_file_id: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            query: query.into(),
            golden_file_id: golden_file_id.into(),
            candidate_file_id: candidate_file_id.into(),
            top_k,
            section_type: None,
        }
    }

    pub fn with_section(mut self, section_type: Option<SectionType>) -> Self {
        self.section_type = section_type;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.golden_file_id == self.candidate_file_id {
            return Err(NetcfgError::InvalidRequest(format!(
                "golden and candidate are the same file '{}'",
                self.golden_file_id
            )));
        }
        if self.top_k == 0 {
            return Err(NetcfgError::InvalidRequest(
                "top_k must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds [`ComparisonContext`]s from two independent store searches
pub struct DualRetrievalComparator {
    store: Arc<dyn ChunkStore>,
}

impl DualRetrievalComparator {
    pub fn new(store: Arc<dyn ChunkStore>) -> Self {
        Self { store }
    }

    /// Retrieve both role sequences for `request`
    ///
    /// A role whose search fails or returns nothing is flagged degraded and
    /// the other role still proceeds. Only both searches failing is an error.
    pub async fn compare(&self, request: &CompareRequest) -> Result<ComparisonContext> {
        request.validate()?;

        let (golden, candidate) = tokio::join!(
            self.retrieve(request, Role::Golden, &request.golden_file_id),
            self.retrieve(request, Role::Candidate, &request.candidate_file_id),
        );

        let (golden_chunks, candidate_chunks, degraded) = match (golden, candidate) {
            (Err(g), Err(c)) => {
                return Err(NetcfgError::Store(format!(
                    "both retrievals failed (golden: {}; candidate: {})",
                    g, c
                )));
            }
            (golden, candidate) => {
                let (golden_chunks, golden_flag) = Self::settle(Role::Golden, golden);
                let (candidate_chunks, candidate_flag) = Self::settle(Role::Candidate, candidate);
                (
                    golden_chunks,
                    candidate_chunks,
                    Degraded {
                        golden: golden_flag,
                        candidate: candidate_flag,
                    },
                )
            }
        };

        tracing::info!(
            golden = %request.golden_file_id,
            candidate = %request.candidate_file_id,
            golden_chunks = golden_chunks.len(),
            candidate_chunks = candidate_chunks.len(),
            degraded = degraded.any(),
            "Comparison context built"
        );

        Ok(ComparisonContext {
            query: request.query.clone(),
            golden_file_id: request.golden_file_id.clone(),
            candidate_file_id: request.candidate_file_id.clone(),
            golden_chunks,
            candidate_chunks,
            degraded,
        })
    }

    /// One role's search, scoped to exactly one file
    async fn retrieve(
        &self,
        request: &CompareRequest,
        role: Role,
        file_id: &str,
    ) -> Result<Vec<ScoredChunk>> {
        let filter = SearchFilter::file(file_id).with_section(request.section_type);
        let results = self
            .store
            .search(&request.query, &filter, request.top_k)
            .await?;

        let mut kept: Vec<ScoredChunk> = results
            .into_iter()
            .filter(|scored| {
                let matches = scored.chunk.metadata.file_id == file_id;
                if !matches {
                    tracing::warn!(
                        role = %role,
                        expected = file_id,
                        got = %scored.chunk.metadata.file_id,
                        "Dropping chunk from another file"
                    );
                }
                matches
            })
            .collect();

        rank(&mut kept);
        kept.truncate(request.top_k);
        Ok(kept)
    }

    fn settle(
        role: Role,
        result: Result<Vec<ScoredChunk>>,
    ) -> (Vec<ScoredChunk>, Option<DegradedReason>) {
        match result {
            Ok(chunks) if chunks.is_empty() => {
                tracing::warn!(role = %role, "Retrieval returned no chunks");
                (chunks, Some(DegradedReason::Empty))
            }
            Ok(chunks) => (chunks, None),
            Err(e) => {
                tracing::warn!(role = %role, error = %e, "Retrieval failed");
                (Vec::new(), Some(DegradedReason::Failed(e.to_string())))
            }
        }
    }
}

/// Score descending, ties by ascending start line
pub fn rank(chunks: &mut [ScoredChunk]) {
    chunks.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.chunk.block.start_line.cmp(&b.chunk.block.start_line))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::embedding::HashingEmbedder;
    use crate::ingest::{parse_config, Chunk};
    use crate::metadata::FileContext;
    use crate::redaction::Redactor;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;

    fn chunks(file_id: &str, role: Role, text: &str) -> Vec<Chunk> {
        parse_config(
            text,
            &FileContext::new(file_id, role),
            &Redactor::builtin().unwrap(),
            &ParserConfig::default(),
        )
        .chunks
    }

    async fn loaded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new(Arc::new(HashingEmbedder::new(512).unwrap())));
        store
            .upsert(&chunks("g", Role::Golden, "hostname G\nvlan 10\n name Sales"))
            .await
            .unwrap();
        store
            .upsert(&chunks("c", Role::Candidate, "hostname C\nvlan 10\n name Sales-Dept"))
            .await
            .unwrap();
        store
    }

    /// Returns every stored chunk regardless of filter
    struct LeakyStore(Arc<InMemoryStore>);

    #[async_trait]
    impl ChunkStore for LeakyStore {
        async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
            self.0.upsert(chunks).await
        }
        async fn replace_file(&self, file_id: &str, chunks: &[Chunk]) -> Result<()> {
            self.0.replace_file(file_id, chunks).await
        }
        async fn remove_file(&self, file_id: &str) -> Result<usize> {
            self.0.remove_file(file_id).await
        }
        async fn file_chunks(&self, file_id: &str) -> Result<Vec<Chunk>> {
            self.0.file_chunks(file_id).await
        }
        async fn search(
            &self,
            query: &str,
            _filter: &SearchFilter,
            limit: usize,
        ) -> Result<Vec<ScoredChunk>> {
            self.0.search(query, &SearchFilter::default(), limit).await
        }
    }

    #[tokio::test]
    async fn test_roles_are_isolated() {
        let comparator = DualRetrievalComparator::new(loaded_store().await);
        let context = comparator
            .compare(&CompareRequest::new("vlan name", "g", "c", 5))
            .await
            .unwrap();

        assert_eq!(context.golden_chunks.len(), 2);
        assert_eq!(context.candidate_chunks.len(), 2);
        assert!(context
            .golden_chunks
            .iter()
            .all(|s| s.chunk.metadata.file_id == "g"));
        assert!(context
            .candidate_chunks
            .iter()
            .all(|s| s.chunk.metadata.file_id == "c"));
        assert!(!context.degraded.any());
    }

    #[tokio::test]
    async fn test_leaked_chunks_are_dropped() {
        let comparator =
            DualRetrievalComparator::new(Arc::new(LeakyStore(loaded_store().await)));
        let context = comparator
            .compare(&CompareRequest::new("vlan", "g", "c", 10))
            .await
            .unwrap();

        assert!(context
            .golden_chunks
            .iter()
            .all(|s| s.chunk.metadata.file_id == "g"));
        assert!(context
            .candidate_chunks
            .iter()
            .all(|s| s.chunk.metadata.file_id == "c"));
    }

    #[tokio::test]
    async fn test_section_filter() {
        let comparator = DualRetrievalComparator::new(loaded_store().await);
        let request =
            CompareRequest::new("sales", "g", "c", 5).with_section(Some(SectionType::Vlan));
        let context = comparator.compare(&request).await.unwrap();

        assert_eq!(context.golden_chunks.len(), 1);
        assert_eq!(context.golden_chunks[0].chunk.section_type, SectionType::Vlan);
    }

    #[tokio::test]
    async fn test_unknown_file_is_degraded_empty() {
        let comparator = DualRetrievalComparator::new(loaded_store().await);
        let context = comparator
            .compare(&CompareRequest::new("vlan", "g", "missing", 5))
            .await
            .unwrap();

        assert_eq!(context.degraded.candidate, Some(DegradedReason::Empty));
        assert!(context.degraded.golden.is_none());
        assert!(!context.golden_chunks.is_empty());
    }

    #[tokio::test]
    async fn test_same_file_rejected() {
        let comparator = DualRetrievalComparator::new(loaded_store().await);
        let err = comparator
            .compare(&CompareRequest::new("vlan", "g", "g", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, NetcfgError::InvalidRequest(_)));
    }

    #[test]
    fn test_rank_breaks_ties_by_start_line() {
        let base = chunks("g", Role::Golden, "vlan 1\nvlan 2\nvlan 3");
        let mut scored: Vec<ScoredChunk> = base
            .into_iter()
            .rev()
            .map(|chunk| ScoredChunk { chunk, score: 0.5 })
            .collect();
        rank(&mut scored);
        let starts: Vec<usize> = scored.iter().map(|s| s.chunk.block.start_line).collect();
        assert_eq!(starts, vec![0, 1, 2]);
    }
}
