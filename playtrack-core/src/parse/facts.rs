//! Fact extraction
//!
//! Pulls host facts out of free text. Every field has an ordered list of
//! label synonyms; the first label that yields a non-empty value wins. IP
//! fields fall back to scanning for dotted quads when no label is present.
//!
//! Extraction is pure and never fails: a field that cannot be found stays
//! empty and does not affect any other field.

use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

use crate::domain::facts::{DEFAULT_PARTNER_USER, FactField, Facts, ROOT_USER};

/// Label synonyms, in priority order per field
///
/// Each entry is a case-insensitive regex fragment matched at a word boundary
/// and followed by a colon.
const LABELS: &[(FactField, &str)] = &[
    (FactField::Hostname, r"hostname"),
    (FactField::Hostname, r"host"),
    (FactField::System, r"sistema\s+operacional"),
    (FactField::System, r"sistema"),
    (FactField::System, r"system"),
    (FactField::System, r"os"),
    (FactField::PrivateIp, r"ip\s+privado"),
    (FactField::PrivateIp, r"private[_ ]ip"),
    (FactField::PrivateIp, BARE_IP),
    (FactField::PublicIp, r"ip\s+p[úu]blico"),
    (FactField::PublicIp, r"public[_ ]ip"),
    (FactField::PartnerUser, r"usu[áa]rio\s+parceiro"),
    (FactField::PartnerUser, r"parceiro[_ ]user"),
    (FactField::PartnerPassword, r"senha\s+(?:do\s+)?parceiro"),
    (FactField::PartnerPassword, r"parceiro[_ ]password"),
    (FactField::RootPassword, r"senha\s+(?:do\s+)?root"),
    (FactField::RootPassword, r"root[_ ]password"),
];

/// `A senha do usuário X é: [value]`
const NARRATIVE: &[(FactField, &str)] = &[
    (
        FactField::PartnerPassword,
        r"(?i)senha\s+do\s+usu[áa]rio\s+parceiro[^:\n]*:\s*\[([^\]\n]+)\]",
    ),
    (
        FactField::RootPassword,
        r"(?i)senha\s+do\s+usu[áa]rio\s+root[^:\n]*:\s*\[([^\]\n]+)\]",
    ),
];

/// Bare `IP:` also ends `Public IP:`, so it only counts as the private IP
/// when the value is an RFC1918 address
const BARE_IP: &str = r"ip";

struct FieldPattern {
    field: FactField,
    regex: Regex,
    private_only: bool,
}

static PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    let labeled = LABELS.iter().map(|(field, label)| FieldPattern {
        field: *field,
        regex: Regex::new(&format!(r"(?i)\b{label}\s*:[ \t]*([^\n]*)"))
            .expect("constant regex pattern is valid"),
        private_only: *label == BARE_IP,
    });
    let narrative = NARRATIVE.iter().map(|(field, pattern)| FieldPattern {
        field: *field,
        regex: Regex::new(pattern).expect("constant regex pattern is valid"),
        private_only: false,
    });
    labeled.chain(narrative).collect()
});

/// Any label at all, used to cut values where two labels share a line
static ANY_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<&str> = LABELS.iter().map(|(_, label)| *label).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\s*:", alternatives.join("|")))
        .expect("constant regex pattern is valid")
});

static DOTTED_QUAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("constant regex pattern is valid")
});

static SUMMARY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)=+\s*RESUMO\s+DA\s+CONFIGURA(?:ÇÃO|CAO)\s*=+(.*?)(?:={3,}|\z)")
        .expect("constant regex pattern is valid")
});

static HOST_DETAILS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\{\s*"host_details"\s*:\s*\{[^{}]*\}\s*\}"#)
        .expect("constant regex pattern is valid")
});

#[derive(Debug, Deserialize)]
struct HostDetailsEnvelope {
    host_details: HostDetails,
}

#[derive(Debug, Default, Deserialize)]
struct HostDetails {
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default)]
    system: Option<String>,
    #[serde(default)]
    private_ip: Option<String>,
    #[serde(default)]
    public_ip: Option<String>,
}

/// Extracts [`Facts`] from playbook output
#[derive(Debug, Clone, Copy, Default)]
pub struct FactExtractor;

impl FactExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Best-available facts for `text`
    ///
    /// Labeled values take precedence over dotted-quad fallbacks. Account
    /// fields that were not found keep their defaults.
    pub fn extract(&self, text: &str) -> Facts {
        let mut facts = self.extract_labeled(text);
        facts.fill_missing(&self.extract_fallback(text));
        if facts.partner_user.is_empty() {
            facts.partner_user = DEFAULT_PARTNER_USER.to_string();
        }
        facts.root_user = ROOT_USER.to_string();
        facts
    }

    /// Values found under an explicit label only; missing fields are empty
    ///
    /// A `RESUMO DA CONFIGURAÇÃO` block, when present, is searched before
    /// the rest of the text. A `host_details` JSON object fills whatever the
    /// labels left empty.
    pub fn extract_labeled(&self, text: &str) -> Facts {
        let text = unescape_newlines(text);
        let text = text.as_ref();
        let mut facts = Facts::blank();

        let summary = SUMMARY_BLOCK
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str());
        let scopes: Vec<&str> = summary.into_iter().chain(std::iter::once(text)).collect();

        for field in FactField::ALL {
            if let Some(value) = scopes.iter().find_map(|scope| find_labeled(scope, field)) {
                facts.set(field, &value);
            }
        }

        if let Some(details) = host_details(text) {
            facts.fill_missing(&details);
        }

        facts
    }

    /// Heuristic IP values found without any label; other fields are empty
    ///
    /// The private IP is the first RFC1918 address in the text; the public
    /// IP is the first routable address that is not private.
    pub fn extract_fallback(&self, text: &str) -> Facts {
        let mut facts = Facts::blank();
        for addr in DOTTED_QUAD
            .find_iter(text)
            .filter_map(|m| m.as_str().parse::<Ipv4Addr>().ok())
        {
            if addr.is_private() {
                if facts.private_ip.is_empty() {
                    facts.private_ip = addr.to_string();
                }
            } else if is_public(addr) && facts.public_ip.is_empty() {
                facts.public_ip = addr.to_string();
            }
            if !facts.private_ip.is_empty() && !facts.public_ip.is_empty() {
                break;
            }
        }
        facts
    }
}

/// Turns JSON-escaped `\n` sequences (as printed inside ansible `msg`
/// strings) into real line breaks so every label starts a line
fn unescape_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\\n") {
        Cow::Owned(text.replace("\\r\\n", "\n").replace("\\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

fn is_public(addr: Ipv4Addr) -> bool {
    !(addr.is_private()
        || addr.is_loopback()
        || addr.is_unspecified()
        || addr.is_link_local()
        || addr.is_broadcast()
        || addr.is_multicast())
}

fn is_private_addr(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_ok_and(|addr| addr.is_private())
}

/// First non-empty cleaned value for `field`, trying its patterns in order
fn find_labeled(text: &str, field: FactField) -> Option<String> {
    PATTERNS
        .iter()
        .filter(|p| p.field == field)
        .find_map(|pattern| {
            pattern
                .regex
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| clean_value(m.as_str(), field))
                .filter(|value| !pattern.private_only || is_private_addr(value))
                .find(|value| !value.is_empty())
        })
}

/// Normalizes a captured value
///
/// Literal `\n` escapes and markdown bold markers are removed, the value is
/// cut at the next label on the same line and IP fields are reduced to the
/// address itself.
fn clean_value(raw: &str, field: FactField) -> String {
    let mut value = raw.replace("\\n", " ").replace("**", "");
    if let Some(next_label) = ANY_LABEL.find(&value) {
        value.truncate(next_label.start());
    }

    let value = value.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == ',');

    match field {
        FactField::PrivateIp | FactField::PublicIp => DOTTED_QUAD
            .find(value)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| value.to_string()),
        _ => value.to_string(),
    }
}

fn host_details(text: &str) -> Option<Facts> {
    let raw = HOST_DETAILS.find(text)?.as_str();
    let envelope: HostDetailsEnvelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(_) => {
            let flattened: String = raw.chars().filter(|c| !matches!(c, '\n' | '\r' | '\t')).collect();
            serde_json::from_str(&flattened).ok()?
        }
    };

    let details = envelope.host_details;
    let mut facts = Facts::blank();
    facts.set(FactField::Hostname, details.hostname.as_deref().unwrap_or_default());
    facts.set(FactField::System, details.system.as_deref().unwrap_or_default());
    facts.set(FactField::PrivateIp, details.private_ip.as_deref().unwrap_or_default());
    facts.set(FactField::PublicIp, details.public_ip.as_deref().unwrap_or_default());
    Some(facts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASELINE_SUMMARY: &str = "\
Hostname: web01
Sistema: Ubuntu 22.04
IP Privado: 10.0.0.5
IP Público: 203.0.113.9
Senha parceiro: Xk9#mP2qLw
Senha root: Zt7$nQ4rVb
";

    #[test]
    fn test_extract_baseline_summary() {
        let facts = FactExtractor::new().extract(BASELINE_SUMMARY);
        assert_eq!(facts.hostname, "web01");
        assert_eq!(facts.system, "Ubuntu 22.04");
        assert_eq!(facts.private_ip, "10.0.0.5");
        assert_eq!(facts.public_ip, "203.0.113.9");
        assert_eq!(facts.partner_user, "parceiro");
        assert_eq!(facts.partner_password, "Xk9#mP2qLw");
        assert_eq!(facts.root_user, "root");
        assert_eq!(facts.root_password, "Zt7$nQ4rVb");
    }

    #[test]
    fn test_concatenated_labels_are_split() {
        let facts = FactExtractor::new().extract("Hostname: web01 Sistema: Linux IP: 10.0.0.5");
        assert_eq!(facts.hostname, "web01");
        assert_eq!(facts.system, "Linux");
        assert_eq!(facts.private_ip, "10.0.0.5");
    }

    #[test]
    fn test_escaped_newlines_and_markdown() {
        let text = r#"    "msg": "**Hostname:** db02\nSistema: Rocky Linux 9\nIP: 172.20.1.4""#;
        let facts = FactExtractor::new().extract(text);
        assert_eq!(facts.hostname, "db02");
        assert_eq!(facts.system, "Rocky Linux 9");
        assert_eq!(facts.private_ip, "172.20.1.4");
    }

    #[test]
    fn test_narrative_password_form() {
        let text = "A senha do usuário parceiro é: [p4rc-Secret]\nA senha do usuário root é: [r00t-Secret]";
        let facts = FactExtractor::new().extract(text);
        assert_eq!(facts.partner_password, "p4rc-Secret");
        assert_eq!(facts.root_password, "r00t-Secret");
    }

    #[test]
    fn test_ansible_list_item_quotes_are_trimmed() {
        let text = "        \"Senha root: Zt7$nQ4rVb\",\n        \"Usuário parceiro: suporte\",";
        let facts = FactExtractor::new().extract(text);
        assert_eq!(facts.root_password, "Zt7$nQ4rVb");
        assert_eq!(facts.partner_user, "suporte");
    }

    #[test]
    fn test_empty_label_falls_through_to_next_occurrence() {
        let facts = FactExtractor::new().extract("Hostname:\nHostname: app03");
        assert_eq!(facts.hostname, "app03");
    }

    #[test]
    fn test_public_ip_label_is_not_private_ip() {
        let facts = FactExtractor::new().extract("Hostname: web01\nPublic IP: 203.0.113.9");
        assert_eq!(facts.public_ip, "203.0.113.9");
        assert_eq!(facts.private_ip, "");
    }

    #[test]
    fn test_bare_ip_label_after_public_ip() {
        let facts = FactExtractor::new().extract("Public IP: 203.0.113.9\nIP: 10.1.2.3");
        assert_eq!(facts.private_ip, "10.1.2.3");
        assert_eq!(facts.public_ip, "203.0.113.9");
    }

    #[test]
    fn test_private_ip_fallback() {
        let facts = FactExtractor::new().extract("connecting to 192.168.10.20 via 8.8.8.8");
        assert_eq!(facts.private_ip, "192.168.10.20");
        assert_eq!(facts.public_ip, "8.8.8.8");
    }

    #[test]
    fn test_public_fallback_skips_loopback_and_invalid() {
        let facts = FactExtractor::new().extract("ok: [127.0.0.1] 999.1.1.1 then 198.51.100.7");
        assert_eq!(facts.public_ip, "198.51.100.7");
        assert!(facts.private_ip.is_empty());
    }

    #[test]
    fn test_labeled_beats_fallback() {
        let text = "route via 198.51.100.1\nIP Público: 203.0.113.9";
        let facts = FactExtractor::new().extract(text);
        assert_eq!(facts.public_ip, "203.0.113.9");
    }

    #[test]
    fn test_summary_block_is_preferred() {
        let text = "\
Hostname: template-host
=========== RESUMO DA CONFIGURAÇÃO ===========
Hostname: web07
Sistema: Debian 12
==============================================
";
        let facts = FactExtractor::new().extract(text);
        assert_eq!(facts.hostname, "web07");
        assert_eq!(facts.system, "Debian 12");
    }

    #[test]
    fn test_host_details_json() {
        let text = r#"
ok: [[127.0.0.1]]
{
"host_details": {
"hostname": "DIEGO",
"private_ip": "172.25.9.251",
"public_ip": "128.201.194.157",
"system": "Ubuntu 22.04 (Debian)"
}
}
"#;
        let facts = FactExtractor::new().extract(text);
        assert_eq!(facts.hostname, "DIEGO");
        assert_eq!(facts.private_ip, "172.25.9.251");
        assert_eq!(facts.public_ip, "128.201.194.157");
        assert_eq!(facts.system, "Ubuntu 22.04 (Debian)");
    }

    #[test]
    fn test_missing_field_does_not_disturb_others() {
        let facts = FactExtractor::new().extract("Senha root: only-this");
        assert_eq!(facts.root_password, "only-this");
        assert!(facts.hostname.is_empty());
        assert!(facts.system.is_empty());
        assert!(facts.partner_password.is_empty());
        assert_eq!(facts.partner_user, "parceiro");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let extractor = FactExtractor::new();
        assert_eq!(
            extractor.extract(BASELINE_SUMMARY),
            extractor.extract(BASELINE_SUMMARY)
        );
    }
}
