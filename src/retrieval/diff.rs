//! Quick diff of two files
//!
//! Pairs golden and candidate blocks by normalized header and classifies
//! each header without involving an LLM. Comment and blank lines are ignored
//! when bodies are compared. The preamble of each file is keyed under
//! [`PREAMBLE_HEADER`] so a changed `hostname` reads as one changed row.

use crate::ingest::Chunk;
use crate::parser::{ConfigBlock, LineRole, SectionType};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header shared by the preamble blocks of both files
pub const PREAMBLE_HEADER: &str = "(preamble)";

/// Outcome for one header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    /// Same body in both files
    Match,
    /// Present in both, bodies differ
    Changed,
    /// Golden only
    Missing,
    /// Candidate only
    Extra,
}

impl DiffStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DiffStatus::Match => "MATCH",
            DiffStatus::Changed => "CHANGED",
            DiffStatus::Missing => "MISSING in candidate",
            DiffStatus::Extra => "EXTRA in candidate",
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRow {
    /// Normalized header, or [`PREAMBLE_HEADER`]
    pub header: String,
    pub section_type: SectionType,
    pub status: DiffStatus,
    pub golden: Option<String>,
    pub candidate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickDiff {
    pub rows: Vec<DiffRow>,
}

impl QuickDiff {
    pub fn count(&self, status: DiffStatus) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }

    /// True when every header matched
    pub fn is_clean(&self) -> bool {
        self.rows.iter().all(|r| r.status == DiffStatus::Match)
    }

    pub fn status_of(&self, header: &str) -> Option<DiffStatus> {
        let header = normalize_header(header);
        self.rows
            .iter()
            .find(|r| r.header == header)
            .map(|r| r.status)
    }

    /// Markdown table, one row per header
    pub fn render_markdown(&self) -> String {
        let mut lines = vec![
            "| Feature | Golden | Candidate | Status |".to_string(),
            "|---|---|---|---|".to_string(),
        ];
        for row in &self.rows {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                escape_cell(&row.header),
                row.golden.as_deref().map_or("NOT FOUND".to_string(), escape_cell),
                row.candidate.as_deref().map_or("NOT FOUND".to_string(), escape_cell),
                row.status
            ));
        }
        lines.join("\n")
    }
}

/// Collapse whitespace and lowercase
fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

fn normalize_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " / ")
}

struct Side {
    section_type: SectionType,
    first_line: usize,
    /// Display text, trailing whitespace trimmed
    lines: Vec<String>,
    /// Whitespace-collapsed text used for equality
    normalized: Vec<String>,
}

fn diff_key(chunk: &Chunk) -> String {
    match chunk.section_type {
        SectionType::Unknown => PREAMBLE_HEADER.to_string(),
        _ => normalize_header(&chunk.block.header),
    }
}

fn is_significant(block: &ConfigBlock) -> bool {
    block
        .body
        .iter()
        .any(|l| matches!(l.role, LineRole::TopLevel | LineRole::SubLevel))
}

/// Group significant body lines by header, in line order
fn group(chunks: &[Chunk]) -> AHashMap<String, Side> {
    let mut ordered: Vec<&Chunk> = chunks.iter().filter(|c| is_significant(&c.block)).collect();
    ordered.sort_by_key(|c| c.block.start_line);

    let mut groups: AHashMap<String, Side> = AHashMap::new();
    for chunk in ordered {
        let block = &chunk.block;
        let side = groups.entry(diff_key(chunk)).or_insert_with(|| Side {
            section_type: chunk.section_type,
            first_line: block.start_line,
            lines: Vec::new(),
            normalized: Vec::new(),
        });
        for line in block
            .body
            .iter()
            .filter(|l| matches!(l.role, LineRole::TopLevel | LineRole::SubLevel))
        {
            side.lines.push(line.text.trim_end().to_string());
            side.normalized.push(normalize_line(&line.text));
        }
    }
    groups
}

/// Compare the chunks of two files header by header
///
/// Rows are sorted by header, so chunk order in the inputs does not matter.
pub fn quick_diff(golden: &[Chunk], candidate: &[Chunk]) -> QuickDiff {
    let mut golden = group(golden);
    let mut candidate = group(candidate);

    let mut headers: Vec<String> = golden.keys().chain(candidate.keys()).cloned().collect();
    headers.sort();
    headers.dedup();

    let rows = headers
        .into_iter()
        .map(|header| {
            let g = golden.remove(&header);
            let c = candidate.remove(&header);
            let status = match (&g, &c) {
                (Some(g), Some(c)) if g.normalized == c.normalized => DiffStatus::Match,
                (Some(_), Some(_)) => DiffStatus::Changed,
                (Some(_), None) => DiffStatus::Missing,
                (None, _) => DiffStatus::Extra,
            };
            let section_type = g
                .as_ref()
                .or(c.as_ref())
                .map_or(SectionType::Unknown, |s| s.section_type);

            tracing::trace!(
                header = %header,
                status = %status,
                golden_line = g.as_ref().map(|s| s.first_line),
                candidate_line = c.as_ref().map(|s| s.first_line),
                "Diff row"
            );

            DiffRow {
                header,
                section_type,
                status,
                golden: g.map(|s| s.lines.join("\n")),
                candidate: c.map(|s| s.lines.join("\n")),
            }
        })
        .collect();

    QuickDiff { rows }
}
