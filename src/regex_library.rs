/// Canonical regex classes for per-token classification
///
/// Every whitespace-delimited token is checked against an ordered list of
/// named classes. The first class whose pattern matches the whole token wins,
/// so an IPv4-looking token resolves to IPV4 before NUMBER is ever tried.
///
/// Order: TIMESTAMP, IPV4, HEX, NUMBER, LOGLEVEL, UUID, PATH
use crate::error::{MinerError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexClass {
    pub name: String,
    pub pattern: String,
    pub description: String,
}

impl RegexClass {
    pub fn new(name: &str, pattern: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            description: description.to_string(),
        }
    }
}

/// The canonical class list, in priority order
pub fn canonical_classes() -> Vec<RegexClass> {
    vec![
        RegexClass::new(
            "TIMESTAMP",
            r"^\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2}$",
            "ISO8601 timestamp",
        ),
        RegexClass::new("IPV4", r"^(?:\d{1,3}\.){3}\d{1,3}$", "IPv4 address"),
        RegexClass::new("HEX", r"^0x[0-9a-fA-F]+$", "Hexadecimal identifier"),
        RegexClass::new("NUMBER", r"^-?\d+(?:\.\d+)?$", "Numeric literal"),
        RegexClass::new(
            "LOGLEVEL",
            r"^(TRACE|DEBUG|INFO|WARN|ERROR|FATAL)$",
            "Log level token",
        ),
        RegexClass::new(
            "UUID",
            r"^[0-9a-fA-F]{8}(?:-[0-9a-fA-F]{4}){3}-[0-9a-fA-F]{12}$",
            "UUID identifier",
        ),
        RegexClass::new("PATH", r"^(?:/[^\s]*)$", "Unix path"),
    ]
}

static CANONICAL: Lazy<RegexRegistry> = Lazy::new(RegexRegistry::build_canonical);

/// Ordered, compiled set of regex classes
#[derive(Debug, Clone)]
pub struct RegexRegistry {
    classes: Vec<(RegexClass, Regex)>,
}

impl RegexRegistry {
    /// Compile a custom ordered class list
    pub fn new(classes: Vec<RegexClass>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(classes.len());
        for class in classes {
            let regex = compile_full_match(&class.pattern)?;
            compiled.push((class, regex));
        }
        Ok(Self { classes: compiled })
    }

    /// Shared instance of the canonical registry
    pub fn canonical() -> &'static RegexRegistry {
        &CANONICAL
    }

    fn build_canonical() -> Self {
        let classes = canonical_classes()
            .into_iter()
            .map(|class| {
                let regex = compile_full_match(&class.pattern)
                    .unwrap_or_else(|e| panic!("canonical class {} must compile: {}", class.name, e));
                (class, regex)
            })
            .collect();
        Self { classes }
    }

    /// Name of the first class that fully matches `token`
    pub fn classify(&self, token: &str) -> Option<&str> {
        self.classes
            .iter()
            .find(|(_, regex)| regex.is_match(token))
            .map(|(class, _)| class.name.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &RegexClass> {
        self.classes.iter().map(|(class, _)| class)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for RegexRegistry {
    fn default() -> Self {
        CANONICAL.clone()
    }
}

/// Classify against the canonical registry
pub fn classify_token(token: &str) -> Option<&'static str> {
    RegexRegistry::canonical().classify(token)
}

// Wrapping keeps full-token semantics even for unanchored custom patterns.
fn compile_full_match(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| MinerError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Check that every pattern compiles, rejecting `.*` in strict mode
pub fn validate_patterns<'a, I>(patterns: I, strict: bool) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut validated = Vec::new();
    for pattern in patterns {
        if strict && pattern.contains(".*") {
            return Err(MinerError::StrictModeRejected {
                pattern: pattern.to_string(),
            });
        }
        Regex::new(pattern).map_err(|source| MinerError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        validated.push(pattern.to_string());
    }
    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let names: Vec<&str> = RegexRegistry::canonical()
            .classes()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["TIMESTAMP", "IPV4", "HEX", "NUMBER", "LOGLEVEL", "UUID", "PATH"]
        );
    }

    #[test]
    fn test_classify_known_classes() {
        assert_eq!(classify_token("2024-01-01 00:00:00"), Some("TIMESTAMP"));
        assert_eq!(classify_token("2024-01-01T00:00:00"), Some("TIMESTAMP"));
        assert_eq!(classify_token("192.168.1.10"), Some("IPV4"));
        assert_eq!(classify_token("0xdeadBEEF"), Some("HEX"));
        assert_eq!(classify_token("-42"), Some("NUMBER"));
        assert_eq!(classify_token("0.5"), Some("NUMBER"));
        assert_eq!(classify_token("WARN"), Some("LOGLEVEL"));
        assert_eq!(
            classify_token("550e8400-e29b-41d4-a716-446655440000"),
            Some("UUID")
        );
        assert_eq!(classify_token("/var/log/syslog"), Some("PATH"));
    }

    #[test]
    fn test_full_token_match_only() {
        assert_eq!(classify_token("42ms"), None);
        assert_eq!(classify_token("task-42"), None);
        assert_eq!(classify_token("INFO:"), None);
        assert_eq!(classify_token("info"), None);
        assert_eq!(classify_token("var/log"), None);
    }

    #[test]
    fn test_earlier_class_wins() {
        let registry = RegexRegistry::new(vec![
            RegexClass::new("DIGITS", r"\d+", ""),
            RegexClass::new("NUMBER", r"-?\d+(?:\.\d+)?", ""),
        ])
        .unwrap();
        assert_eq!(registry.classify("123"), Some("DIGITS"));
        assert_eq!(registry.classify("-123"), Some("NUMBER"));

        let swapped = RegexRegistry::new(vec![
            RegexClass::new("NUMBER", r"-?\d+(?:\.\d+)?", ""),
            RegexClass::new("DIGITS", r"\d+", ""),
        ])
        .unwrap();
        assert_eq!(swapped.classify("123"), Some("NUMBER"));
    }

    #[test]
    fn test_custom_pattern_is_anchored() {
        let registry = RegexRegistry::new(vec![RegexClass::new("WORD", r"[a-z]+", "")]).unwrap();
        assert_eq!(registry.classify("abc"), Some("WORD"));
        assert_eq!(registry.classify("abc1"), None);
    }

    #[test]
    fn test_invalid_class_pattern() {
        let result = RegexRegistry::new(vec![RegexClass::new("BAD", r"(unclosed", "")]);
        assert!(matches!(result, Err(MinerError::InvalidPattern { .. })));
    }

    #[test]
    fn test_validate_strict_blocks_greedy() {
        let err = validate_patterns([".*"], true).unwrap_err();
        assert!(err.to_string().contains("Strict mode"));
        assert!(validate_patterns([".*"], false).is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let err = validate_patterns([r"\d+", r"[a-"], false).unwrap_err();
        assert!(matches!(err, MinerError::InvalidPattern { ref pattern, .. } if pattern == "[a-"));
    }
}
