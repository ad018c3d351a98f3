//! Secret redaction
//!
//! Replaces every secret recognized by the [`PatternRegistry`] with a
//! `<REDACTED:KIND>` placeholder. Only the secret token is replaced, so
//! redacted lines keep their keywords and stay comparable across files.
//! Redacting already-redacted text is a no-op.

use crate::parser::{ClassifiedLine, RedactedLine};
use crate::patterns::PatternRegistry;
use std::sync::Arc;

/// Text after redaction, with the number of secrets replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redacted {
    pub text: String,
    pub count: usize,
}

/// Line redactor backed by a shared pattern registry
#[derive(Debug, Clone)]
pub struct Redactor {
    registry: Arc<PatternRegistry>,
}

impl Redactor {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { registry }
    }

    /// Redactor using only the built-in rules
    pub fn builtin() -> crate::Result<Self> {
        Ok(Self::new(Arc::new(PatternRegistry::builtin()?)))
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Redact every recognized secret in `text`
    pub fn redact(&self, text: &str) -> Redacted {
        let secrets = self.registry.find_secrets(text);
        if secrets.is_empty() {
            return Redacted {
                text: text.to_string(),
                count: 0,
            };
        }

        let mut out = String::with_capacity(text.len() + secrets.len() * 16);
        let mut cursor = 0;
        for secret in &secrets {
            out.push_str(&text[cursor..secret.secret.start]);
            out.push_str(&self.registry.redaction_rules[secret.rule].placeholder());
            cursor = secret.secret.end;
        }
        out.push_str(&text[cursor..]);

        Redacted {
            text: out,
            count: secrets.len(),
        }
    }

    /// Redact one classified line, keeping its role and position
    pub fn redact_line(&self, line: ClassifiedLine) -> RedactedLine {
        let Redacted { text, count } = self.redact(&line.text);
        if count > 0 {
            // Never log the secret itself
            tracing::trace!(line = line.index, redactions = count, "Redacted line");
        }

        RedactedLine {
            index: line.index,
            text,
            role: line.role,
            indent_depth: line.indent_depth,
            redactions: count,
        }
    }

    /// Redact a whole classified line stream
    pub fn redact_lines(&self, lines: Vec<ClassifiedLine>) -> Vec<RedactedLine> {
        let redacted: Vec<RedactedLine> =
            lines.into_iter().map(|l| self.redact_line(l)).collect();

        let total: usize = redacted.iter().map(|l| l.redactions).sum();
        tracing::debug!(lines = redacted.len(), redactions = total, "Redaction complete");
        redacted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{classify, LineRole};

    fn redactor() -> Redactor {
        Redactor::builtin().unwrap()
    }

    #[test]
    fn test_type7_password() {
        let r = redactor().redact("username admin password 7 094F471A1A0A");
        assert_eq!(r.text, "username admin password 7 <REDACTED:TYPE7>");
        assert_eq!(r.count, 1);
    }

    #[test]
    fn test_hashed_enable_secret() {
        let r = redactor().redact("enable secret 5 $1$mERr$hx5rVt7rPNoS4wqbXKX7m0");
        assert_eq!(r.text, "enable secret 5 <REDACTED:HASH>");
    }

    #[test]
    fn test_snmp_community_keeps_access_keyword() {
        let r = redactor().redact("snmp-server community N0tPublic RO");
        assert_eq!(r.text, "snmp-server community <REDACTED:SNMP_COMMUNITY> RO");
    }

    #[test]
    fn test_aos_cx_snmpv3_plaintext() {
        let r = redactor()
            .redact("snmpv3 user ops auth sha auth-pass plaintext:AuthPass1 priv aes priv-pass plaintext:PrivPass1");
        assert!(!r.text.contains("AuthPass1"));
        assert!(!r.text.contains("PrivPass1"));
        assert!(r.text.contains("auth-pass plaintext:<REDACTED:SNMP_AUTH>"));
    }

    #[test]
    fn test_psk_and_key_string() {
        let r = redactor().redact(" wpa-passphrase ascii-text W1f1Secret!");
        assert_eq!(r.text, " wpa-passphrase ascii-text <REDACTED:PSK>");

        let r = redactor().redact("  key-string 7 0822455D0A16");
        assert_eq!(r.text, "  key-string 7 <REDACTED:TYPE7>");
    }

    #[test]
    fn test_aos_switch_and_snmp_host_lines() {
        let r = redactor().redact("password manager user-name admin plaintext Adm1nPass");
        assert_eq!(
            r.text,
            "password manager user-name admin plaintext <REDACTED:PASSWORD>"
        );

        let r = redactor().redact("snmp-server host 10.1.1.1 version 2c S3cretComm");
        assert_eq!(
            r.text,
            "snmp-server host 10.1.1.1 version 2c <REDACTED:SNMP_COMMUNITY>"
        );

        let r = redactor().redact("username admin password 6 ZbJ]FEbWLOfQSXgEhRN_");
        assert_eq!(r.text, "username admin password 6 <REDACTED:PASSWORD>");
    }

    #[test]
    fn test_no_secret_unchanged() {
        let text = " ip address 10.0.0.1 255.255.255.0";
        let r = redactor().redact(text);
        assert_eq!(r.text, text);
        assert_eq!(r.count, 0);
    }

    #[test]
    fn test_idempotent() {
        let redactor = redactor();
        let samples = [
            "username admin password 7 094F471A1A0A",
            "username bob secret 9 $9$abcdefgh",
            "snmp-server community public RO",
            "crypto isakmp key MyIsakmpKey address 0.0.0.0",
            " pre-shared-key ascii-text Sup3r",
            "tacacs-server key 0 cleartext",
            " ip ospf message-digest-key 1 md5 OspfKey",
            "user admin group administrators password ciphertext AQBapXyz",
            "snmpv3 user ops auth sha auth-pass plaintext:A1 priv aes priv-pass plaintext:P1",
            "radius-server host 10.9.9.9 key plaintext R4diusK3y vrf mgmt",
            "password manager user-name admin plaintext Adm1nPass",
            "password operator user-name \"ops\" sha1 \"5baa61e4c9b93f3f\"",
            "snmp-server host 10.1.1.1 version 2c S3cretComm",
            "snmp-server host 10.1.1.1 vrf mgmt informs version 2c S3cretComm",
            "snmp-server host 10.1.1.1 trap version v2c community S3cretComm",
            "username admin password 6 ZbJ]FEbWLOfQSXgEhRN_",
        ];
        for sample in samples {
            let once = redactor.redact(sample);
            let twice = redactor.redact(&once.text);
            assert_eq!(once.text, twice.text, "not idempotent for {sample:?}");
            assert_eq!(twice.count, 0);
        }
    }

    #[test]
    fn test_redacted_output_has_no_recognizable_secret() {
        let redactor = redactor();
        let text = "username a password 7 0822455D0A16 secret 5 $1$x$y\nsnmp-server community c RW";
        for line in text.lines() {
            let redacted = redactor.redact(line);
            assert!(redactor.registry().find_secrets(&redacted.text).is_empty());
        }
    }

    #[test]
    fn test_redact_line_keeps_position_and_role() {
        let redactor = redactor();
        let lines = classify("hostname R1\nusername admin password 7 094F471A1A0A");
        let redacted = redactor.redact_lines(lines);

        assert_eq!(redacted.len(), 2);
        assert_eq!(redacted[1].index, 1);
        assert_eq!(redacted[1].role, LineRole::TopLevel);
        assert_eq!(redacted[1].redactions, 1);
        assert_eq!(redacted[0].redactions, 0);
    }
}
