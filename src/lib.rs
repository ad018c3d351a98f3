//! netcfg - network configuration parsing and comparison for RAG workflows
//!
//! Turns Cisco and Aruba configuration text into redacted, metadata-tagged
//! blocks, and builds role-isolated golden-vs-candidate retrieval contexts
//! for an LLM to compare.

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod fingerprint;
pub mod ingest;
pub mod metadata;
pub mod parser;
pub mod patterns;
pub mod redaction;
pub mod retrieval;
pub mod session;
pub mod store;

pub use error::{NetcfgError, Result};
