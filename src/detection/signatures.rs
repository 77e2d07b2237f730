//! Ordered payload signature matching
//!
//! A signature scanner holds a fixed, ordered list of `(label, matcher)`
//! rules and evaluates them in sequence against one payload, stopping at
//! the first hit. Keeping the rules as an explicit list makes the
//! precedence auditable and testable away from any I/O.

use regex::Regex;

/// How a single signature matches a payload
#[derive(Debug)]
pub enum Matcher {
    /// Literal byte subsequence, matched on raw bytes
    Substring(&'static str),
    /// Pattern over the payload interpreted as text
    Regex(Regex),
    /// Combined rule: matches if any of the alternatives matches
    AnyRegex(Vec<Regex>),
}

impl Matcher {
    /// Return the matched text, if this matcher hits the payload
    fn find(&self, payload: &[u8]) -> Option<String> {
        match self {
            Matcher::Substring(needle) => {
                let needle_bytes = needle.as_bytes();
                payload
                    .windows(needle_bytes.len())
                    .any(|window| window == needle_bytes)
                    .then(|| (*needle).to_string())
            }
            Matcher::Regex(pattern) => {
                let text = String::from_utf8_lossy(payload);
                pattern.find(&text).map(|m| m.as_str().to_string())
            }
            Matcher::AnyRegex(patterns) => {
                let text = String::from_utf8_lossy(payload);
                patterns
                    .iter()
                    .find_map(|pattern| pattern.find(&text).map(|m| m.as_str().to_string()))
            }
        }
    }
}

/// A named signature rule
#[derive(Debug)]
pub struct Signature {
    label: &'static str,
    matcher: Matcher,
    /// A suppressed rule still wins precedence but yields no match
    suppressed: bool,
}

impl Signature {
    pub fn new(label: &'static str, matcher: Matcher) -> Self {
        Signature {
            label,
            matcher,
            suppressed: false,
        }
    }

    /// Rule that consumes its match without producing one.
    /// Reserved behavior, kept deliberately (see DESIGN.md).
    pub fn suppressed(label: &'static str, matcher: Matcher) -> Self {
        Signature {
            label,
            matcher,
            suppressed: true,
        }
    }
}

/// Result of a signature scan: at most one per input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMatch {
    pub label: &'static str,
    /// The text the winning matcher matched
    pub text: String,
}

/// Ordered first-match-wins signature scanner
pub struct SignatureScanner {
    rules: Vec<Signature>,
}

impl SignatureScanner {
    pub fn with_rules(rules: Vec<Signature>) -> Self {
        SignatureScanner { rules }
    }

    /// Canonical rule set for packet payloads: tool fingerprints first,
    /// then the combined credit-card leak rule.
    pub fn packet_rules() -> Result<Self, regex::Error> {
        Ok(SignatureScanner::with_rules(vec![
            Signature::new("Nmap scan", Matcher::Substring("Nmap")),
            Signature::new("Nikto scan", Matcher::Substring("Nikto")),
            Signature::new(
                "Credit card leak",
                Matcher::AnyRegex(vec![
                    Regex::new(r"4\d{3}(\s|-)?\d{4}(\s|-)?\d{4}(\s|-)?\d{4}")?,
                    Regex::new(r"5\d{3}(\s|-)?\d{4}(\s|-)?\d{4}(\s|-)?\d{4}")?,
                    Regex::new(r"6011(\s|-)?\d{4}(\s|-)?\d{4}(\s|-)?\d{4}")?,
                    Regex::new(r"3\d{3}(\s|-)?\d{6}(\s|-)?\d{5}")?,
                ]),
            ),
        ]))
    }

    /// Rule set for fields extracted from access-log records.
    ///
    /// The Nmap rule is suppressed: it is detected but intentionally not
    /// reported, and still shadows the rules below it.
    pub fn log_field_rules() -> Result<Self, regex::Error> {
        Ok(SignatureScanner::with_rules(vec![
            Signature::new("phpMyAdmin violation", Matcher::Substring("phpmyadmin")),
            Signature::new(
                "Possible shellcode",
                Matcher::Regex(Regex::new(r"(\\x[0-9a-fA-F]{2}){10,}")?),
            ),
            Signature::suppressed("Nmap scan", Matcher::Substring("Nmap")),
            Signature::new("Nikto scan", Matcher::Substring("nikto")),
            Signature::new("Masscan scan", Matcher::Substring("masscan")),
        ]))
    }

    /// Evaluate the rules in order against one payload.
    ///
    /// Later rules are not evaluated once one matches, even when several
    /// would. A suppressed winner returns `None`.
    pub fn scan(&self, payload: &[u8]) -> Option<SignatureMatch> {
        for rule in &self.rules {
            if let Some(text) = rule.matcher.find(payload) {
                if rule.suppressed {
                    log::debug!("signature '{}' matched but is suppressed", rule.label);
                    return None;
                }
                return Some(SignatureMatch {
                    label: rule.label,
                    text,
                });
            }
        }
        None
    }
}
