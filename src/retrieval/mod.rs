//! Retrieval for question answering and golden-vs-candidate comparison
//!
//! - `comparator`: two file-scoped searches run concurrently and paired
//! - `context`: role-labeled contexts and the LLM collaborator seam
//! - `diff`: deterministic header-by-header quick diff

mod comparator;
mod context;
mod diff;

pub use comparator::{rank, CompareRequest, DualRetrievalComparator};
pub use context::{
    render_chunks, ComparisonContext, Degraded, DegradedReason, LlmClient, LlmContext,
};
pub use diff::{quick_diff, DiffRow, DiffStatus, QuickDiff, PREAMBLE_HEADER};
