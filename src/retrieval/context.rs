//! Contexts handed to the LLM collaborator
//!
//! A [`ComparisonContext`] keeps the golden and candidate sequences apart
//! from retrieval all the way to the rendered prompt text.

use crate::error::Result;
use crate::metadata::Role;
use crate::store::ScoredChunk;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Why one role of a comparison has less context than requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "message")]
pub enum DegradedReason {
    /// Retrieval succeeded but returned nothing
    Empty,
    /// Retrieval failed; the store's message is kept
    Failed(String),
}

/// Per-role degraded flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degraded {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub golden: Option<DegradedReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<DegradedReason>,
}

impl Degraded {
    pub fn any(&self) -> bool {
        self.golden.is_some() || self.candidate.is_some()
    }

    /// True when a role's retrieval errored, as opposed to coming back empty
    pub fn has_failure(&self) -> bool {
        [&self.golden, &self.candidate]
            .iter()
            .any(|r| matches!(r, Some(DegradedReason::Failed(_))))
    }

    pub fn for_role(&self, role: Role) -> Option<&DegradedReason> {
        match role {
            Role::Golden => self.golden.as_ref(),
            Role::Candidate => self.candidate.as_ref(),
            Role::Unspecified => None,
        }
    }
}

/// Two role-scoped retrieval results for one comparison request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonContext {
    pub query: String,
    pub golden_file_id: String,
    pub candidate_file_id: String,
    pub golden_chunks: Vec<ScoredChunk>,
    pub candidate_chunks: Vec<ScoredChunk>,
    #[serde(default)]
    pub degraded: Degraded,
}

impl ComparisonContext {
    pub fn chunks(&self, role: Role) -> &[ScoredChunk] {
        match role {
            Role::Golden => &self.golden_chunks,
            Role::Candidate => &self.candidate_chunks,
            Role::Unspecified => &[],
        }
    }

    /// Prompt text with separately labeled GOLDEN and CANDIDATE sections
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (role, file_id) in [
            (Role::Golden, &self.golden_file_id),
            (Role::Candidate, &self.candidate_file_id),
        ] {
            let _ = writeln!(
                out,
                "=== {} CONFIG ({}) ===",
                role.as_str().to_ascii_uppercase(),
                file_id
            );
            match self.degraded.for_role(role) {
                Some(DegradedReason::Failed(message)) => {
                    let _ = writeln!(out, "(retrieval failed: {})", message);
                }
                Some(DegradedReason::Empty) => {
                    let _ = writeln!(out, "(no matching sections retrieved)");
                }
                None => out.push_str(&render_chunks(self.chunks(role))),
            }
            out.push('\n');
        }
        out.truncate(out.trim_end().len());
        out
    }
}

/// Cited block text, one entry per chunk
pub fn render_chunks(chunks: &[ScoredChunk]) -> String {
    let mut out = String::new();
    for scored in chunks {
        let _ = writeln!(
            out,
            "[{} | {}]\n{}\n",
            scored.chunk.citation(),
            scored.chunk.section_type,
            scored.chunk.text()
        );
    }
    out
}

/// What the LLM is asked to answer over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LlmContext {
    /// Plain question answering over one retrieval
    Single { chunks: Vec<ScoredChunk> },
    /// Golden-vs-candidate comparison
    Comparison { context: ComparisonContext },
}

impl LlmContext {
    pub fn render(&self) -> String {
        match self {
            LlmContext::Single { chunks } => {
                let rendered = render_chunks(chunks);
                rendered.trim_end().to_string()
            }
            LlmContext::Comparison { context } => context.render(),
        }
    }
}

/// LLM collaborator
///
/// Prompt wording and model choice belong to the implementation; the crate
/// only guarantees the context it passes is correctly scoped.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, query: &str, context: &LlmContext) -> Result<String>;
}
