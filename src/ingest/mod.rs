//! Config ingestion pipeline
//!
//! `parse_config` runs classification, redaction, segmentation, metadata
//! extraction and chunk assembly over one decoded file. The pipeline is pure:
//! the same text and context always produce the same chunks.

mod assembler;

pub use assembler::{assemble_chunks, Chunk, ChunkKey};

use crate::config::ParserConfig;
use crate::fingerprint::fingerprint_bytes;
use crate::metadata::{extract_file_metadata, FileContext, FileMetadata};
use crate::parser::{classify, segment};
use crate::redaction::Redactor;
use serde::{Deserialize, Serialize};

/// Output of parsing one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedConfig {
    pub metadata: FileMetadata,
    pub chunks: Vec<Chunk>,
}

impl ParsedConfig {
    /// Total secrets replaced across all chunks
    pub fn redaction_count(&self) -> usize {
        self.chunks
            .iter()
            .flat_map(|c| c.block.body.iter())
            .map(|l| l.redactions)
            .sum()
    }
}

/// Parse decoded config text into redacted, metadata-tagged chunks
///
/// The context's fingerprint is used when present; otherwise the text itself
/// is fingerprinted.
pub fn parse_config(
    text: &str,
    context: &FileContext,
    redactor: &Redactor,
    config: &ParserConfig,
) -> ParsedConfig {
    let classified = classify(text);
    let line_count = classified.len();
    let redacted = redactor.redact_lines(classified);
    let blocks = segment(redacted);

    let fingerprint = context
        .fingerprint
        .clone()
        .unwrap_or_else(|| fingerprint_bytes(text.as_bytes()));
    let metadata =
        extract_file_metadata(&blocks, context, fingerprint, config.metadata_scan_lines);
    let chunks = assemble_chunks(blocks, &metadata, redactor);

    tracing::debug!(
        file_id = %metadata.file_id,
        lines = line_count,
        chunks = chunks.len(),
        vendor = %metadata.vendor,
        "Parsed config"
    );

    ParsedConfig { metadata, chunks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Role, Vendor};
    use crate::parser::SectionType;

    const REFERENCE: &str = "hostname R1\ninterface Gi1/0/1\n description uplink\n ip address 10.0.0.1 255.255.255.0\n!\nvlan 10\n name DATA\n!";

    fn parse(text: &str) -> ParsedConfig {
        parse_config(
            text,
            &FileContext::new("golden.cfg", Role::Golden),
            &Redactor::builtin().unwrap(),
            &ParserConfig::default(),
        )
    }

    #[test]
    fn test_reference_config() {
        let parsed = parse(REFERENCE);

        assert_eq!(parsed.metadata.hostname.as_deref(), Some("R1"));
        assert_eq!(parsed.chunks.len(), 3);

        let spans: Vec<(usize, usize, SectionType)> = parsed
            .chunks
            .iter()
            .map(|c| (c.block.start_line, c.block.end_line, c.section_type))
            .collect();
        assert_eq!(
            spans,
            vec![
                (0, 0, SectionType::Unknown),
                (1, 4, SectionType::Interface),
                (5, 7, SectionType::Vlan),
            ]
        );
        assert!(parsed.chunks.iter().all(|c| c.metadata.role == Role::Golden));
    }

    #[test]
    fn test_chunks_carry_content_hash() {
        let parsed = parse(REFERENCE);
        let expected = fingerprint_bytes(REFERENCE.as_bytes());
        assert!(parsed
            .chunks
            .iter()
            .all(|c| c.metadata.fingerprint == expected));

        // A fingerprint of the original bytes takes precedence
        let original = fingerprint_bytes(b"\xef\xbb\xbfhostname R1");
        let parsed = parse_config(
            "hostname R1",
            &FileContext::new("bom.cfg", Role::Candidate).with_fingerprint(original.clone()),
            &Redactor::builtin().unwrap(),
            &ParserConfig::default(),
        );
        assert_eq!(parsed.metadata.fingerprint, original);
        assert_eq!(parsed.chunks[0].metadata.fingerprint, original);
    }

    #[test]
    fn test_secrets_never_reach_chunks() {
        let parsed = parse("hostname R1\nusername admin password 7 094F471A1A0A\nsnmp-server community topsecret RO");

        assert_eq!(parsed.redaction_count(), 2);
        for chunk in &parsed.chunks {
            let text = chunk.text();
            assert!(!text.contains("094F471A1A0A"));
            assert!(!text.contains("topsecret"));
        }
        let user = parsed
            .chunks
            .iter()
            .find(|c| c.section_type == SectionType::User)
            .unwrap();
        assert_eq!(user.text(), "username admin password 7 <REDACTED:TYPE7>");
        assert!(user.has_secret());
    }

    #[test]
    fn test_deterministic() {
        let text = "version 15.2\nhostname X\ninterface Gi1\n shutdown\nrouter ospf 1\n network 10.0.0.0 0.255.255.255 area 0";
        let a = serde_json::to_string(&parse(text)).unwrap();
        let b = serde_json::to_string(&parse(text)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_text_yields_single_empty_chunk() {
        let parsed = parse("");
        assert_eq!(parsed.chunks.len(), 1);
        assert!(parsed.chunks[0].block.body.is_empty());
        assert_eq!(parsed.metadata.vendor, Vendor::Unknown);
    }
}
