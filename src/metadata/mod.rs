//! File-level metadata extraction
//!
//! Derives the hostname and vendor of a config file from its segmented
//! blocks. The role (golden or candidate) is always supplied by the caller.

use crate::fingerprint::Fingerprint;
use crate::parser::{ConfigBlock, LineRole, RedactedLine, SectionType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of leading lines scanned for vendor markers
pub const DEFAULT_SCAN_LINES: usize = 50;

/// Device vendor family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Cisco,
    Aruba,
    Unknown,
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Vendor::Cisco => "cisco",
            Vendor::Aruba => "aruba",
            Vendor::Unknown => "unknown",
        })
    }
}

/// Role of a file in a golden-vs-candidate comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Golden,
    Candidate,
    #[default]
    Unspecified,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Golden => "golden",
            Role::Candidate => "candidate",
            Role::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "golden" => Ok(Role::Golden),
            "candidate" => Ok(Role::Candidate),
            "unspecified" | "" => Ok(Role::Unspecified),
            other => Err(format!(
                "unknown role '{}' (expected golden, candidate or unspecified)",
                other
            )),
        }
    }
}

/// Caller-supplied identity of the file being parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    pub file_id: String,
    pub role: Role,
    pub filename: Option<String>,
    /// Fingerprint of the original bytes, when the caller has them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
}

impl FileContext {
    pub fn new(file_id: impl Into<String>, role: Role) -> Self {
        Self {
            file_id: file_id.into(),
            role,
            filename: None,
            fingerprint: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }
}

/// Metadata shared by every chunk of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub hostname: Option<String>,
    pub vendor: Vendor,
    pub file_id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Content hash of the file the chunk came from
    pub fingerprint: Fingerprint,
}

impl FileMetadata {
    /// Name used when citing this file: filename if known, else the file id
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or(&self.file_id)
    }
}

/// Extract hostname and vendor for a segmented file
pub fn extract_file_metadata(
    blocks: &[ConfigBlock],
    context: &FileContext,
    fingerprint: Fingerprint,
    scan_lines: usize,
) -> FileMetadata {
    let hostname = find_hostname(blocks, scan_lines);
    let vendor = detect_vendor(
        blocks
            .iter()
            .flat_map(|b| b.body.iter())
            .take_while(|l| l.index < scan_lines),
    );

    if vendor == Vendor::Unknown {
        tracing::debug!(file_id = %context.file_id, "Unrecognized vendor");
    }

    FileMetadata {
        hostname,
        vendor,
        file_id: context.file_id.clone(),
        role: context.role,
        filename: context.filename.clone(),
        fingerprint,
    }
}

/// First `hostname <token>` among preamble lines and early block headers
fn find_hostname(blocks: &[ConfigBlock], scan_lines: usize) -> Option<String> {
    let preamble = blocks
        .first()
        .filter(|b| b.section_type == SectionType::Unknown)
        .map(|b| b.body.as_slice())
        .unwrap_or_default();

    let preamble_lines = preamble
        .iter()
        .filter(|l| l.role == LineRole::TopLevel)
        .map(|l| l.text.as_str());

    let early_headers = blocks
        .iter()
        .filter(|b| b.start_line < scan_lines)
        .map(|b| b.header.as_str());

    preamble_lines.chain(early_headers).find_map(parse_hostname)
}

fn parse_hostname(line: &str) -> Option<String> {
    let mut tokens = line.split_whitespace();
    if !tokens.next()?.eq_ignore_ascii_case("hostname") {
        return None;
    }
    let name = tokens.next()?.trim_matches(|c| c == '"' || c == '\'');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Prefix markers of Cisco IOS/IOS-XE/NX-OS configs (lowercase)
const CISCO_PREFIXES: &[&str] = &[
    "current configuration",
    "building configuration",
    "! last configuration change",
    "! nvram config last updated",
    "service timestamps",
    "service password-encryption",
    "boot-start-marker",
    "boot-end-marker",
    "ip cef",
    "no ip domain-lookup",
    "line vty",
    "line con 0",
];

/// Prefix markers of ArubaOS-CX / ArubaOS-Switch configs (lowercase)
const ARUBA_PREFIXES: &[&str] = &[
    "!version arubaos",
    "!export-password",
    "; j",
    "module 1 type",
    "vsf member",
    "ssh server vrf",
    "https-server vrf",
    "user admin group administrators",
    "password manager",
    "console idle-timeout",
];

/// Substring markers (lowercase)
const CISCO_SUBSTRINGS: &[&str] = &["cisco"];
const ARUBA_SUBSTRINGS: &[&str] = &["arubaos", "aos-cx", "configuration editor"];

fn detect_vendor<'a>(lines: impl Iterator<Item = &'a RedactedLine>) -> Vendor {
    let mut cisco = 0usize;
    let mut aruba = 0usize;

    for line in lines {
        let lower = line.text.trim().to_ascii_lowercase();
        if lower.is_empty() {
            continue;
        }
        if is_cisco_marker(&lower) {
            cisco += 1;
        }
        if is_aruba_marker(&lower) {
            aruba += 1;
        }
    }

    match cisco.cmp(&aruba) {
        std::cmp::Ordering::Greater => Vendor::Cisco,
        std::cmp::Ordering::Less => Vendor::Aruba,
        std::cmp::Ordering::Equal => Vendor::Unknown,
    }
}

fn is_cisco_marker(lower: &str) -> bool {
    CISCO_PREFIXES.iter().any(|p| lower.starts_with(p))
        || CISCO_SUBSTRINGS.iter().any(|s| lower.contains(s))
        || is_ios_version_line(lower)
}

fn is_aruba_marker(lower: &str) -> bool {
    ARUBA_PREFIXES.iter().any(|p| lower.starts_with(p))
        || ARUBA_SUBSTRINGS.iter().any(|s| lower.contains(s))
}

/// `version 15.2` style line
fn is_ios_version_line(lower: &str) -> bool {
    lower
        .strip_prefix("version ")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}
