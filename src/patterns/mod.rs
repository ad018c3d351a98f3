//! Pattern registry for secret redaction
//!
//! This module provides:
//! - The built-in redaction rule table (Type-7, hashed secrets, SNMP
//!   communities, pre-shared keys, cleartext `password`/`secret`/`key`)
//! - Optional extra rules loaded from a TOML rules file
//! - Candidate secret matching with longest-match overlap resolution
//!
//! Every rule is a regex with a named `secret` group. Only the `secret` span
//! is replaced; the rest of the match stays as context.

use crate::error::{NetcfgError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

/// Placeholder marker prefix; a span containing it is already redacted
pub const PLACEHOLDER_PREFIX: &str = "<REDACTED:";

/// Tokens that qualify a secret (encryption type, encoding) or name the
/// next field, but are never the secret themselves
const QUALIFIERS: &[&str] = &[
    "0",
    "1",
    "2",
    "3",
    "4",
    "5",
    "6",
    "7",
    "8",
    "9",
    "ciphertext",
    "plaintext",
    "encrypted",
    "unencrypted",
    "hidden",
    "ascii-text",
    "hex-text",
    "chain",
    "address",
    "auth-pass",
    "priv-pass",
    "manager",
    "operator",
    "community",
    "version",
    "vrf",
];

/// Redaction rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionRuleConfig {
    pub name: String,
    /// Regex with a named `secret` group
    pub pattern: String,
    /// Placeholder kind, rendered as `<REDACTED:KIND>`
    pub kind: String,
    /// Lower runs first when two rules claim the same span length
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub description: String,
}

fn default_priority() -> u8 {
    100
}

/// Redaction rules file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactionRulesConfig {
    #[serde(default)]
    pub rule: Vec<RedactionRuleConfig>,
}

/// Compiled redaction rule with pre-compiled regex
#[derive(Debug, Clone)]
pub struct CompiledRedactionRule {
    pub name: String,
    pub regex: Regex,
    pub kind: String,
    pub priority: u8,
    pub description: String,
}

impl CompiledRedactionRule {
    /// Placeholder text this rule substitutes for a secret
    pub fn placeholder(&self) -> String {
        format!("{}{}>", PLACEHOLDER_PREFIX, self.kind)
    }
}

/// A secret span claimed by one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretMatch {
    /// Index into [`PatternRegistry::redaction_rules`]
    pub rule: usize,
    /// Byte range of the whole rule match
    pub whole: Range<usize>,
    /// Byte range of the secret inside the match
    pub secret: Range<usize>,
}

/// Built-in rules, in priority order
const BUILTIN_RULES: &[(&str, &str, &str, u8)] = &[
    (
        "type7",
        r"(?i)\b(?:password|secret|key-string|key|md5|authentication-key)\s+7\s+(?P<secret>[0-9a-f]{2,})\b",
        "TYPE7",
        10,
    ),
    (
        "hashed_secret",
        r"(?i)\b(?:secret|password)\s+(?:5|8|9)\s+(?P<secret>[^\s<]\S*)",
        "HASH",
        20,
    ),
    (
        "snmp_community",
        r"(?i)\bsnmp-server\s+community\s+(?:(?:0|7|plaintext|ciphertext)\s+)?(?P<secret>[^\s<]\S*)",
        "SNMP_COMMUNITY",
        30,
    ),
    (
        "snmp_host_community",
        r"(?i)\bsnmp-server\s+host\s+\S+\s+(?:vrf\s+\S+\s+)?(?:(?:informs?|traps?)\s+)?(?:version\s+v?(?:1|2c)\s+)?(?:community\s+)?(?P<secret>[^\s<]\S*)",
        "SNMP_COMMUNITY",
        31,
    ),
    (
        "snmpv3_pass",
        r"(?i)\b(?:auth-pass|priv-pass)\s+(?:(?:plaintext|ciphertext):)?(?P<secret>[^\s<]\S*)",
        "SNMP_AUTH",
        40,
    ),
    (
        "snmpv3_auth",
        r"(?i)\bauth\s+(?:md5|sha\S*)\s+(?P<secret>[^\s<]\S*)",
        "SNMP_AUTH",
        41,
    ),
    (
        "snmpv3_priv",
        r"(?i)\bpriv\s+(?:des|3des|aes(?:\s+\d+)?)\s+(?P<secret>[^\s<]\S*)",
        "SNMP_AUTH",
        42,
    ),
    (
        "pre_shared_key",
        r"(?i)\b(?:pre-shared-key|wpa-passphrase)\s+(?:(?:ascii-text|hex-text|ascii|hex|local|remote|0|6|7)\s+)*(?P<secret>[^\s<]\S*)",
        "PSK",
        50,
    ),
    (
        "aos_switch_password",
        r"(?i)\bpassword\s+(?:manager|operator)\s+(?:user-name\s+\S+\s+)?(?:plaintext|sha1|sha-256)\s+(?P<secret>[^\s<]\S*)",
        "PASSWORD",
        55,
    ),
    (
        "password",
        r"(?i)\bpassword\s+(?:(?:0|6|7|ciphertext|plaintext|encrypted|hidden|unencrypted)\s+)?(?P<secret>[^\s<]\S*)",
        "PASSWORD",
        60,
    ),
    (
        "secret",
        r"(?i)\bsecret\s+(?:(?:0|5|8|9)\s+)?(?P<secret>[^\s<]\S*)",
        "SECRET",
        70,
    ),
    (
        "md5_key",
        r"(?i)\bmd5\s+(?:(?:0|7)\s+)?(?P<secret>[^\s<]\S*)",
        "KEY",
        75,
    ),
    (
        "key",
        r"(?i)\bkey(?:-string)?\s+(?:(?:0|6|7|plaintext|ciphertext)\s+)?(?P<secret>[^\s<]\S*)",
        "KEY",
        80,
    ),
];

/// Pattern registry with all pre-compiled redaction rules
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    /// Redaction rules sorted by priority
    pub redaction_rules: Vec<CompiledRedactionRule>,
    /// Rule lookup by name
    pub rules_by_name: HashMap<String, usize>,
}

impl PatternRegistry {
    /// Registry holding only the built-in rules
    pub fn builtin() -> Result<Self> {
        Self::from_config(Self::builtin_config())
    }

    /// The built-in rule table as configuration values
    pub fn builtin_config() -> RedactionRulesConfig {
        RedactionRulesConfig {
            rule: BUILTIN_RULES
                .iter()
                .map(|(name, pattern, kind, priority)| RedactionRuleConfig {
                    name: name.to_string(),
                    pattern: pattern.to_string(),
                    kind: kind.to_string(),
                    priority: *priority,
                    description: String::new(),
                })
                .collect(),
        }
    }

    /// Built-in rules merged with extra rules from a TOML file
    ///
    /// An extra rule with the same name as a built-in replaces it.
    pub fn from_rules_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| NetcfgError::Io {
            source: e,
            context: format!("Failed to read redaction rules: {:?}", path),
        })?;
        let extra: RedactionRulesConfig = toml::from_str(&content)?;

        let mut config = Self::builtin_config();
        for rule in extra.rule {
            config.rule.retain(|r| r.name != rule.name);
            config.rule.push(rule);
        }

        Self::from_config(config)
    }

    /// Build pattern registry from parsed configuration
    pub fn from_config(config: RedactionRulesConfig) -> Result<Self> {
        let mut redaction_rules: Vec<CompiledRedactionRule> = config
            .rule
            .iter()
            .map(|rc| {
                let regex = Regex::new(&rc.pattern).map_err(|e| NetcfgError::InvalidRule {
                    name: rc.name.clone(),
                    message: e.to_string(),
                })?;

                if !regex.capture_names().any(|n| n == Some("secret")) {
                    return Err(NetcfgError::InvalidRule {
                        name: rc.name.clone(),
                        message: "pattern has no named `secret` group".to_string(),
                    });
                }

                if rc.kind.is_empty() {
                    return Err(NetcfgError::InvalidRule {
                        name: rc.name.clone(),
                        message: "kind cannot be empty".to_string(),
                    });
                }

                Ok(CompiledRedactionRule {
                    name: rc.name.clone(),
                    regex,
                    kind: rc.kind.to_ascii_uppercase(),
                    priority: rc.priority,
                    description: rc.description.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Stable: equal priorities keep file order
        redaction_rules.sort_by_key(|r| r.priority);

        let rules_by_name = redaction_rules
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.name.clone(), idx))
            .collect();

        Ok(Self {
            redaction_rules,
            rules_by_name,
        })
    }

    /// Look up a rule by name
    pub fn rule(&self, name: &str) -> Option<&CompiledRedactionRule> {
        self.rules_by_name
            .get(name)
            .map(|&idx| &self.redaction_rules[idx])
    }

    /// Every candidate secret any rule recognizes in `text`
    ///
    /// Matches whose secret is a qualifier token or already a placeholder are
    /// not candidates. Overlaps are not resolved here.
    pub fn candidate_secrets(&self, text: &str) -> Vec<SecretMatch> {
        self.redaction_rules
            .iter()
            .enumerate()
            .flat_map(|(idx, rule)| {
                rule.regex.captures_iter(text).filter_map(move |caps| {
                    let whole = caps.get(0)?;
                    let secret = caps.name("secret")?;
                    if Self::is_qualifier(secret.as_str())
                        || secret.as_str().contains(PLACEHOLDER_PREFIX)
                    {
                        return None;
                    }
                    Some(SecretMatch {
                        rule: idx,
                        whole: whole.range(),
                        secret: secret.range(),
                    })
                })
            })
            .collect()
    }

    /// Non-overlapping secrets in `text`, ordered by position
    ///
    /// Longest whole match wins among overlapping candidates; equal lengths
    /// fall back to rule priority, then to position.
    pub fn find_secrets(&self, text: &str) -> Vec<SecretMatch> {
        let mut candidates = self.candidate_secrets(text);
        candidates.sort_by(|a, b| {
            b.whole
                .len()
                .cmp(&a.whole.len())
                .then(a.rule.cmp(&b.rule))
                .then(a.whole.start.cmp(&b.whole.start))
        });

        let mut accepted: Vec<SecretMatch> = Vec::new();
        for candidate in candidates {
            let overlaps = accepted.iter().any(|a| {
                candidate.whole.start < a.whole.end && a.whole.start < candidate.whole.end
            });
            if !overlaps {
                accepted.push(candidate);
            }
        }

        accepted.sort_by_key(|m| m.secret.start);
        accepted
    }

    fn is_qualifier(token: &str) -> bool {
        QUALIFIERS.iter().any(|q| q.eq_ignore_ascii_case(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets<'a>(registry: &PatternRegistry, text: &'a str) -> Vec<(&'a str, String)> {
        registry
            .find_secrets(text)
            .into_iter()
            .map(|m| {
                (
                    &text[m.secret.clone()],
                    registry.redaction_rules[m.rule].name.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn test_builtin_rules_compile() {
        let registry = PatternRegistry::builtin().unwrap();
        assert_eq!(registry.redaction_rules.len(), BUILTIN_RULES.len());
        assert!(registry.rule("type7").is_some());
        assert!(registry
            .redaction_rules
            .windows(2)
            .all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn test_type7_beats_generic_password() {
        let registry = PatternRegistry::builtin().unwrap();
        let found = secrets(&registry, "username admin password 7 094F471A1A0A");
        assert_eq!(found, vec![("094F471A1A0A", "type7".to_string())]);
    }

    #[test]
    fn test_multiple_secrets_on_one_line() {
        let registry = PatternRegistry::builtin().unwrap();
        let found = secrets(&registry, "username bob password hunter2 secret 5 $1$abc$xyz");
        assert_eq!(
            found,
            vec![
                ("hunter2", "password".to_string()),
                ("$1$abc$xyz", "hashed_secret".to_string()),
            ]
        );
    }

    #[test]
    fn test_snmp_community() {
        let registry = PatternRegistry::builtin().unwrap();
        let found = secrets(&registry, "snmp-server community s3cr3t RO");
        assert_eq!(found, vec![("s3cr3t", "snmp_community".to_string())]);
    }

    #[test]
    fn test_pre_shared_key_longer_than_key() {
        let registry = PatternRegistry::builtin().unwrap();
        let found = secrets(&registry, " pre-shared-key ascii-text Sup3rS3cret");
        assert_eq!(found, vec![("Sup3rS3cret", "pre_shared_key".to_string())]);
    }

    #[test]
    fn test_snmp_host_community() {
        let registry = PatternRegistry::builtin().unwrap();
        for (line, community) in [
            ("snmp-server host 10.1.1.1 version 2c S3cretComm", "S3cretComm"),
            ("snmp-server host 10.1.1.1 informs version 2c S3cretComm", "S3cretComm"),
            ("snmp-server host 10.1.1.1 vrf mgmt traps version 1 S3cretComm", "S3cretComm"),
            ("snmp-server host 10.1.1.1 S3cretComm", "S3cretComm"),
            ("snmp-server host 10.1.1.1 trap version v2c community S3cretComm", "S3cretComm"),
        ] {
            let found = secrets(&registry, line);
            assert_eq!(
                found,
                vec![(community, "snmp_host_community".to_string())],
                "{line}"
            );
        }

        // v3 hosts name a user, not a community
        assert!(registry
            .find_secrets("snmp-server host 10.1.1.1 version 3 priv nmsuser")
            .is_empty());
    }

    #[test]
    fn test_aos_switch_manager_password() {
        let registry = PatternRegistry::builtin().unwrap();
        let found = secrets(
            &registry,
            "password manager user-name admin plaintext Adm1nPass",
        );
        assert_eq!(found, vec![("Adm1nPass", "aos_switch_password".to_string())]);

        let found = secrets(
            &registry,
            "password operator user-name \"ops\" sha1 \"5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8\"",
        );
        assert_eq!(
            found,
            vec![(
                "\"5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8\"",
                "aos_switch_password".to_string()
            )]
        );

        assert!(registry.find_secrets("password manager").is_empty());
    }

    #[test]
    fn test_type6_password() {
        let registry = PatternRegistry::builtin().unwrap();
        let found = secrets(&registry, "username admin password 6 ZbJ]FEbWLOfQSXgEhRN_");
        assert_eq!(found, vec![("ZbJ]FEbWLOfQSXgEhRN_", "password".to_string())]);
    }

    #[test]
    fn test_qualifier_never_secret() {
        let registry = PatternRegistry::builtin().unwrap();
        assert!(registry.find_secrets("key chain OSPF-KEYS").is_empty());
        assert!(registry
            .find_secrets("username admin password 7 <REDACTED:TYPE7>")
            .is_empty());
    }

    #[test]
    fn test_rule_without_secret_group_rejected() {
        let config = RedactionRulesConfig {
            rule: vec![RedactionRuleConfig {
                name: "bad".to_string(),
                pattern: r"token\s+\S+".to_string(),
                kind: "TOKEN".to_string(),
                priority: 1,
                description: String::new(),
            }],
        };
        let err = PatternRegistry::from_config(config).unwrap_err();
        assert!(matches!(err, NetcfgError::InvalidRule { .. }));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let config = RedactionRulesConfig {
            rule: vec![RedactionRuleConfig {
                name: "broken".to_string(),
                pattern: r"(?P<secret>[".to_string(),
                kind: "X".to_string(),
                priority: 1,
                description: String::new(),
            }],
        };
        assert!(PatternRegistry::from_config(config).is_err());
    }

    #[test]
    fn test_rules_file_merges_with_builtins() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("redaction.toml");
        std::fs::write(
            &path,
            r#"
[[rule]]
name = "api_token"
pattern = '(?i)\bapi-token\s+(?P<secret>[^\s<]\S*)'
kind = "token"
priority = 5
"#,
        )
        .unwrap();

        let registry = PatternRegistry::from_rules_file(&path).unwrap();
        assert_eq!(registry.redaction_rules.len(), BUILTIN_RULES.len() + 1);
        assert_eq!(registry.redaction_rules[0].name, "api_token");
        assert_eq!(registry.redaction_rules[0].placeholder(), "<REDACTED:TOKEN>");
    }
}
