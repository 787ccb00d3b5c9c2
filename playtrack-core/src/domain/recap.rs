//! PLAY RECAP counters

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static RECAP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\**\s*(\S+?)\s*:\s*(ok=\d+.*)$").expect("constant regex pattern is valid")
});

static COUNTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ok|changed|unreachable|failed|skipped|rescued|ignored)=(\d+)")
        .expect("constant regex pattern is valid")
});

/// Final per-host counters printed under PLAY RECAP
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapStats {
    pub ok: u32,
    pub changed: u32,
    pub unreachable: u32,
    pub failed: u32,
    pub skipped: u32,
    pub rescued: u32,
    pub ignored: u32,
}

impl RecapStats {
    /// Parses a recap line such as `web01 : ok=2 changed=1 unreachable=0 failed=0`
    ///
    /// Returns the host token as printed and the counters; counters missing
    /// from the line stay at zero.
    pub fn parse_line(line: &str) -> Option<(String, RecapStats)> {
        let caps = RECAP_LINE.captures(line)?;
        let host = caps.get(1)?.as_str().to_string();
        let mut stats = RecapStats::default();

        for counter in COUNTER.captures_iter(caps.get(2)?.as_str()) {
            let value = counter[2].parse::<u32>().unwrap_or_default();
            match counter[1].to_ascii_lowercase().as_str() {
                "ok" => stats.ok = value,
                "changed" => stats.changed = value,
                "unreachable" => stats.unreachable = value,
                "failed" => stats.failed = value,
                "skipped" => stats.skipped = value,
                "rescued" => stats.rescued = value,
                "ignored" => stats.ignored = value,
                _ => {}
            }
        }

        Some((host, stats))
    }

    /// No failures and the host stayed reachable
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.unreachable == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_recap_line() {
        let (host, stats) = RecapStats::parse_line(
            "web01                      : ok=6    changed=2    unreachable=0    failed=1    skipped=3    rescued=0    ignored=1",
        )
        .unwrap();
        assert_eq!(host, "web01");
        assert_eq!(stats.ok, 6);
        assert_eq!(stats.changed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 3);
        assert_eq!(stats.ignored, 1);
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_parse_partial_recap_line() {
        let (host, stats) = RecapStats::parse_line("10.0.0.5 : ok=2 changed=1").unwrap();
        assert_eq!(host, "10.0.0.5");
        assert_eq!(stats.ok, 2);
        assert_eq!(stats.changed, 1);
        assert!(stats.is_clean());
    }

    #[test]
    fn test_non_recap_lines() {
        assert!(RecapStats::parse_line("PLAY RECAP *****").is_none());
        assert!(RecapStats::parse_line("Hostname: web01").is_none());
        assert!(RecapStats::parse_line("").is_none());
    }
}
