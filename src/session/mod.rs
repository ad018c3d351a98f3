//! Session management
//!
//! A [`Session`] is the caller-owned context for one working set of config
//! files: configuration, redaction rules, the chunk store and the table of
//! ingested files. Nothing here is global; two sessions never share state
//! unless they are handed the same store.

use crate::config::Config;
use crate::embedding::build_provider;
use crate::error::{NetcfgError, Result};
use crate::fingerprint::{compare_identity, fingerprint_bytes, Fingerprint};
use crate::ingest::{parse_config, ParsedConfig};
use crate::metadata::{FileContext, Role, Vendor};
use crate::patterns::PatternRegistry;
use crate::redaction::Redactor;
use crate::retrieval::{
    quick_diff, rank, CompareRequest, ComparisonContext, DiffStatus, DualRetrievalComparator,
    LlmClient, LlmContext, QuickDiff,
};
use crate::store::{ChunkStore, InMemoryStore, ScoredChunk, SearchFilter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// How a comparison is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Deterministic header-by-header diff, no LLM
    #[default]
    Quick,
    /// Role-labeled context handed to the LLM
    Deep,
}

impl FromStr for CompareMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(CompareMode::Quick),
            "deep" => Ok(CompareMode::Deep),
            other => Err(format!("unknown compare mode '{}' (expected quick or deep)", other)),
        }
    }
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompareMode::Quick => "quick",
            CompareMode::Deep => "deep",
        })
    }
}

/// One file known to the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestedFile {
    pub file_id: String,
    pub filename: Option<String>,
    pub role: Role,
    pub fingerprint: Fingerprint,
    pub hostname: Option<String>,
    pub vendor: Vendor,
    pub chunk_count: usize,
    pub redaction_count: usize,
    pub ingested_at: DateTime<Utc>,
}

/// Result of an ingest call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Parsed and written to the store
    Indexed(IngestedFile),
    /// Same bytes already indexed under the same role; nothing done
    Unchanged(IngestedFile),
}

impl IngestOutcome {
    pub fn file(&self) -> &IngestedFile {
        match self {
            IngestOutcome::Indexed(f) | IngestOutcome::Unchanged(f) => f,
        }
    }

    pub fn was_indexed(&self) -> bool {
        matches!(self, IngestOutcome::Indexed(_))
    }
}

/// Result of a golden-vs-candidate comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CompareOutcome {
    /// Fingerprints match; no retrieval was run
    Identical { fingerprint: Fingerprint },
    Compared {
        context: ComparisonContext,
        /// Present in quick mode
        #[serde(default, skip_serializing_if = "Option::is_none")]
        diff: Option<QuickDiff>,
    },
}

/// Caller-owned working context
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    config: Config,
    redactor: Redactor,
    store: Arc<dyn ChunkStore>,
    files: BTreeMap<String, IngestedFile>,
}

impl Session {
    /// Session with an in-memory store and the configured embedder
    pub fn new(config: Config) -> Result<Self> {
        let embedder = build_provider(&config.embedding)?;
        let store: Arc<dyn ChunkStore> = Arc::new(InMemoryStore::new(embedder));
        Self::with_store(config, store)
    }

    /// Session over a caller-supplied store
    pub fn with_store(config: Config, store: Arc<dyn ChunkStore>) -> Result<Self> {
        let registry = match &config.redaction.rules_file {
            Some(path) => PatternRegistry::from_rules_file(path)?,
            None => PatternRegistry::builtin()?,
        };
        tracing::debug!(rules = registry.redaction_rules.len(), "Redaction rules loaded");

        Ok(Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            config,
            redactor: Redactor::new(Arc::new(registry)),
            store,
            files: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub fn store(&self) -> Arc<dyn ChunkStore> {
        Arc::clone(&self.store)
    }

    /// Ingested files ordered by file id
    pub fn files(&self) -> impl Iterator<Item = &IngestedFile> {
        self.files.values()
    }

    pub fn file(&self, file_id: &str) -> Option<&IngestedFile> {
        self.files.get(file_id)
    }

    /// Parse `text` without touching the store
    pub fn parse(&self, text: &str, context: &FileContext) -> ParsedConfig {
        parse_config(text, context, &self.redactor, &self.config.parser)
    }

    /// Ingest raw bytes under `file_id`
    ///
    /// The fingerprint is taken first; bytes already indexed under the same
    /// role are skipped. Otherwise the file's chunks replace whatever the
    /// store held for that id.
    pub async fn ingest_bytes(
        &mut self,
        bytes: &[u8],
        file_id: &str,
        filename: Option<&str>,
        role: Role,
    ) -> Result<IngestOutcome> {
        let fingerprint = fingerprint_bytes(bytes);

        if let Some(existing) = self.files.get(file_id) {
            if existing.role == role && compare_identity(&existing.fingerprint, &fingerprint) {
                tracing::debug!(file_id, fingerprint = fingerprint.short(), "Unchanged, skipping");
                return Ok(IngestOutcome::Unchanged(existing.clone()));
            }
        }

        let text = std::str::from_utf8(bytes).map_err(|e| NetcfgError::Decode {
            name: file_id.to_string(),
            source: e,
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut context = FileContext::new(file_id, role).with_fingerprint(fingerprint.clone());
        context.filename = filename.map(str::to_string);
        let parsed = self.parse(text, &context);

        self.store.replace_file(file_id, &parsed.chunks).await?;

        let file = IngestedFile {
            file_id: file_id.to_string(),
            filename: parsed.metadata.filename.clone(),
            role,
            fingerprint,
            hostname: parsed.metadata.hostname.clone(),
            vendor: parsed.metadata.vendor,
            chunk_count: parsed.chunks.len(),
            redaction_count: parsed.redaction_count(),
            ingested_at: Utc::now(),
        };

        tracing::info!(
            file_id,
            role = %role,
            chunks = file.chunk_count,
            redactions = file.redaction_count,
            fingerprint = file.fingerprint.short(),
            "Ingested config"
        );

        self.files.insert(file_id.to_string(), file.clone());
        Ok(IngestOutcome::Indexed(file))
    }

    /// Ingest a file from disk; its path is the file id
    pub async fn ingest_file(&mut self, path: &Path, role: Role) -> Result<IngestOutcome> {
        let bytes = std::fs::read(path).map_err(|e| NetcfgError::IdentityUnavailable {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file_id = path.to_string_lossy().to_string();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());

        self.ingest_bytes(&bytes, &file_id, filename.as_deref(), role)
            .await
    }

    /// Forget a file and drop its chunks
    pub async fn remove_file(&mut self, file_id: &str) -> Result<bool> {
        let removed = self.store.remove_file(file_id).await?;
        Ok(self.files.remove(file_id).is_some() || removed > 0)
    }

    /// Single-sequence retrieval for question answering
    pub async fn ask(
        &self,
        query: &str,
        top_k: Option<usize>,
        filter: &SearchFilter,
    ) -> Result<Vec<ScoredChunk>> {
        let top_k = top_k.unwrap_or(self.config.retrieval.top_k);
        let mut results = self.store.search(query, filter, top_k).await?;
        rank(&mut results);
        Ok(results)
    }

    /// Compare two ingested files
    ///
    /// Identical fingerprints short-circuit before any retrieval. Quick mode
    /// diffs every chunk of both files (narrowed by the request's section
    /// filter); the diff is skipped when either role's retrieval failed.
    pub async fn compare(
        &self,
        request: &CompareRequest,
        mode: CompareMode,
    ) -> Result<CompareOutcome> {
        let golden = self.require(&request.golden_file_id)?;
        let candidate = self.require(&request.candidate_file_id)?;

        if golden.file_id != candidate.file_id
            && compare_identity(&golden.fingerprint, &candidate.fingerprint)
        {
            tracing::info!(
                golden = %golden.file_id,
                candidate = %candidate.file_id,
                "Files are identical, skipping comparison"
            );
            return Ok(CompareOutcome::Identical {
                fingerprint: golden.fingerprint.clone(),
            });
        }

        let comparator = DualRetrievalComparator::new(self.store());
        let context = comparator.compare(request).await?;
        let diff = match mode {
            CompareMode::Quick => self.whole_file_diff(request, &context).await,
            CompareMode::Deep => None,
        };

        Ok(CompareOutcome::Compared { context, diff })
    }

    async fn whole_file_diff(
        &self,
        request: &CompareRequest,
        context: &ComparisonContext,
    ) -> Option<QuickDiff> {
        if context.degraded.has_failure() {
            tracing::warn!(
                golden = %request.golden_file_id,
                candidate = %request.candidate_file_id,
                "Retrieval failed, skipping quick diff"
            );
            return None;
        }

        let (golden, candidate) = tokio::join!(
            self.store.file_chunks(&request.golden_file_id),
            self.store.file_chunks(&request.candidate_file_id)
        );
        let (mut golden, mut candidate) = match (golden, candidate) {
            (Ok(golden), Ok(candidate)) => (golden, candidate),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Could not load file chunks, skipping quick diff");
                return None;
            }
        };

        if let Some(section) = request.section_type {
            golden.retain(|c| c.section_type == section);
            candidate.retain(|c| c.section_type == section);
        }

        let diff = quick_diff(&golden, &candidate);
        tracing::debug!(
            rows = diff.rows.len(),
            changed = diff.count(DiffStatus::Changed),
            missing = diff.count(DiffStatus::Missing),
            extra = diff.count(DiffStatus::Extra),
            "Quick diff"
        );
        Some(diff)
    }

    /// Answer a question over retrieved chunks with the LLM collaborator
    pub async fn answer(
        &self,
        llm: &dyn LlmClient,
        query: &str,
        top_k: Option<usize>,
        filter: &SearchFilter,
    ) -> Result<String> {
        let chunks = self.ask(query, top_k, filter).await?;
        llm.complete(query, &LlmContext::Single { chunks }).await
    }

    /// Report a comparison: quick mode renders the diff table, deep mode
    /// asks the LLM over the role-labeled context
    pub async fn answer_compare(
        &self,
        llm: &dyn LlmClient,
        request: &CompareRequest,
        mode: CompareMode,
    ) -> Result<String> {
        match self.compare(request, mode).await? {
            CompareOutcome::Identical { fingerprint } => Ok(format!(
                "{} and {} are identical (fingerprint {}).",
                request.golden_file_id,
                request.candidate_file_id,
                fingerprint.short()
            )),
            CompareOutcome::Compared {
                diff: Some(diff), ..
            } => Ok(diff.render_markdown()),
            CompareOutcome::Compared { context, diff: None } => match mode {
                CompareMode::Deep => {
                    llm.complete(&request.query, &LlmContext::Comparison { context })
                        .await
                }
                CompareMode::Quick => Ok(context.render()),
            },
        }
    }

    fn require(&self, file_id: &str) -> Result<&IngestedFile> {
        self.files.get(file_id).ok_or_else(|| {
            NetcfgError::InvalidRequest(format!("file '{}' has not been ingested", file_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn session() -> Session {
        Session::new(Config::default()).unwrap()
    }

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(&self, query: &str, context: &LlmContext) -> Result<String> {
            Ok(format!("{}\n{}", query, context.render()))
        }
    }

    #[tokio::test]
    async fn test_ingest_then_unchanged() {
        let mut session = session();
        let bytes = b"hostname R1\ninterface Gi1\n shutdown\n";

        let first = session
            .ingest_bytes(bytes, "r1", Some("r1.cfg"), Role::Golden)
            .await
            .unwrap();
        assert!(first.was_indexed());
        assert_eq!(first.file().chunk_count, 2);
        assert_eq!(first.file().hostname.as_deref(), Some("R1"));

        let second = session
            .ingest_bytes(bytes, "r1", Some("r1.cfg"), Role::Golden)
            .await
            .unwrap();
        assert!(!second.was_indexed());

        // Role change forces a re-index
        let third = session
            .ingest_bytes(bytes, "r1", Some("r1.cfg"), Role::Candidate)
            .await
            .unwrap();
        assert!(third.was_indexed());
        assert_eq!(session.file("r1").unwrap().role, Role::Candidate);
    }

    #[tokio::test]
    async fn test_reingest_replaces_chunks() {
        let mut session = session();
        session
            .ingest_bytes(b"vlan 1\nvlan 2\nvlan 3", "f", None, Role::Golden)
            .await
            .unwrap();
        session
            .ingest_bytes(b"vlan 1", "f", None, Role::Golden)
            .await
            .unwrap();

        let chunks = session.store().file_chunks("f").await.unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[tokio::test]
    async fn test_non_utf8_rejected() {
        let mut session = session();
        let err = session
            .ingest_bytes(&[0x68, 0xff, 0xfe], "bad", None, Role::Golden)
            .await
            .unwrap_err();
        assert!(matches!(err, NetcfgError::Decode { .. }));
        assert!(session.file("bad").is_none());
    }

    #[tokio::test]
    async fn test_identical_files_short_circuit() {
        let mut session = session();
        let bytes = b"hostname R1\nvlan 10\n name Sales\n";
        session.ingest_bytes(bytes, "g", None, Role::Golden).await.unwrap();
        session.ingest_bytes(bytes, "c", None, Role::Candidate).await.unwrap();

        let outcome = session
            .compare(&CompareRequest::new("vlans", "g", "c", 5), CompareMode::Quick)
            .await
            .unwrap();
        assert!(matches!(outcome, CompareOutcome::Identical { .. }));

        let text = session
            .answer_compare(&EchoLlm, &CompareRequest::new("vlans", "g", "c", 5), CompareMode::Deep)
            .await
            .unwrap();
        assert!(text.contains("identical"));
    }

    #[tokio::test]
    async fn test_compare_unknown_file() {
        let session = session();
        let err = session
            .compare(&CompareRequest::new("q", "g", "c", 5), CompareMode::Quick)
            .await
            .unwrap_err();
        assert!(matches!(err, NetcfgError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_deep_compare_goes_to_llm() {
        let mut session = session();
        session
            .ingest_bytes(b"vlan 10\n name Sales\n", "g", None, Role::Golden)
            .await
            .unwrap();
        session
            .ingest_bytes(b"vlan 10\n name Sales-Dept\n", "c", None, Role::Candidate)
            .await
            .unwrap();

        let text = session
            .answer_compare(&EchoLlm, &CompareRequest::new("vlan names", "g", "c", 5), CompareMode::Deep)
            .await
            .unwrap();
        assert!(text.starts_with("vlan names\n=== GOLDEN CONFIG (g) ==="));
        assert!(text.contains("=== CANDIDATE CONFIG (c) ==="));
    }

    #[tokio::test]
    async fn test_ask_with_llm() {
        let mut session = session();
        session
            .ingest_bytes(b"ntp server 192.0.2.1\n", "r1", None, Role::Unspecified)
            .await
            .unwrap();

        let text = session
            .answer(&EchoLlm, "ntp", None, &SearchFilter::default())
            .await
            .unwrap();
        assert!(text.contains("ntp server 192.0.2.1"));
    }

    #[test]
    fn test_compare_mode_from_str() {
        assert_eq!("Deep".parse::<CompareMode>().unwrap(), CompareMode::Deep);
        assert!("fast".parse::<CompareMode>().is_err());
    }
}
