use crate::regex_library::RegexRegistry;

/// Unicode whitespace plus the ASCII file, group, record and unit separators
pub fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Split a line on runs of whitespace
///
/// Leading and trailing whitespace is dropped; an empty or whitespace-only
/// line yields no tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(is_separator).filter(|tok| !tok.is_empty()).collect()
}

/// Rewrite every token matching a registry class to `<CLASS>`
pub fn apply_token_classes(tokens: &[&str], registry: &RegexRegistry) -> Vec<String> {
    tokens
        .iter()
        .map(|token| match registry.classify(token) {
            Some(class) => format!("<{}>", class),
            None => (*token).to_string(),
        })
        .collect()
}

/// Tokenize and classify in one step
pub fn normalize(line: &str, registry: &RegexRegistry) -> Vec<String> {
    apply_token_classes(&tokenize(line), registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_whitespace_runs() {
        assert_eq!(tokenize("  a\tb   c \n"), vec!["a", "b", "c"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t \n").is_empty());
    }

    #[test]
    fn test_tokenize_splits_on_ascii_separators() {
        assert_eq!(tokenize("a\x1fb\x1cc"), vec!["a", "b", "c"]);
        assert_eq!(tokenize("a\u{a0}b\u{2003}c"), vec!["a", "b", "c"]);
        assert!(tokenize("\x1d\x1e").is_empty());
    }

    #[test]
    fn test_apply_token_classes() {
        let registry = RegexRegistry::canonical();
        let tokens = tokenize("ERROR conn from 10.0.0.5 took 45 ms at /tmp/x");
        assert_eq!(
            apply_token_classes(&tokens, registry),
            vec![
                "<LOGLEVEL>", "conn", "from", "<IPV4>", "took", "<NUMBER>", "ms", "at", "<PATH>"
            ]
        );
    }

    #[test]
    fn test_unmatched_tokens_pass_through() {
        let registry = RegexRegistry::canonical();
        assert_eq!(
            normalize("Worker-1 0.5s <*>", registry),
            vec!["Worker-1", "0.5s", "<*>"]
        );
    }

    #[test]
    fn test_split_timestamp_is_not_a_timestamp_token() {
        // The space inside an ISO timestamp splits it into two tokens.
        let registry = RegexRegistry::canonical();
        assert_eq!(
            normalize("2024-01-01 00:00:00", registry),
            vec!["2024-01-01", "00:00:00"]
        );
        assert_eq!(normalize("2024-01-01T00:00:00", registry), vec!["<TIMESTAMP>"]);
    }
}
