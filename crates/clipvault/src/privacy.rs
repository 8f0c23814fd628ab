//! Privacy filter for captured content.
//!
//! Content matching any configured pattern is dropped before it reaches the
//! store. Patterns are either plain substrings (matched case-insensitively)
//! or regexes, selected at construction time.

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

/// Pattern-based exclusion of sensitive content.
#[derive(Debug)]
pub struct PrivacyFilter {
    use_regex: bool,
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl PrivacyFilter {
    /// Build a filter from the given patterns.
    ///
    /// In regex mode every non-blank pattern is compiled up front; blank
    /// patterns are skipped without error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if any non-blank regex pattern fails
    /// to compile. Callers should abort startup on this error.
    pub fn new(patterns: Vec<String>, use_regex: bool) -> Result<Self> {
        let mut compiled = Vec::new();
        if use_regex {
            for pattern in &patterns {
                if pattern.trim().is_empty() {
                    continue;
                }
                let re = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                compiled.push(re);
            }
        }
        Ok(Self {
            use_regex,
            patterns,
            compiled,
        })
    }

    /// Check whether content should be dropped instead of captured.
    ///
    /// Trimmed-empty content is always ignored (there is nothing to capture).
    #[must_use]
    pub fn should_ignore(&self, content: &str) -> bool {
        let s = content.trim();
        if s.is_empty() {
            return true;
        }

        if self.use_regex {
            for re in &self.compiled {
                if re.is_match(s) {
                    debug!(pattern = %re.as_str(), "content ignored by privacy pattern");
                    return true;
                }
            }
            return false;
        }

        let low = s.to_lowercase();
        for pattern in &self.patterns {
            let p = pattern.trim().to_lowercase();
            if p.is_empty() {
                continue;
            }
            if low.contains(&p) {
                debug!(pattern = %p, "content ignored by privacy pattern");
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_mode() {
        let pf = PrivacyFilter::new(
            vec!["token=".to_string(), "password=".to_string()],
            false,
        )
        .unwrap();

        assert!(pf.should_ignore("my token=abc123"));
        assert!(!pf.should_ignore("just some harmless text"));
    }

    #[test]
    fn test_substring_mode_is_case_insensitive() {
        let pf = PrivacyFilter::new(vec!["Token=".to_string()], false).unwrap();
        assert!(pf.should_ignore("MY TOKEN=ABC"));
    }

    #[test]
    fn test_regex_mode() {
        let pf = PrivacyFilter::new(
            vec![r"(?i)authorization:\s*bearer\s+\S+".to_string()],
            true,
        )
        .unwrap();

        assert!(pf.should_ignore("Authorization: Bearer abc.def.ghi"));
        assert!(!pf.should_ignore("authorization pending"));
    }

    #[test]
    fn test_regex_mode_invalid_pattern_fails_construction() {
        let result = PrivacyFilter::new(vec![r"[unclosed".to_string()], true);
        assert!(matches!(result, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_blank_patterns_skipped() {
        let pf = PrivacyFilter::new(
            vec![String::new(), "   ".to_string(), "secret=".to_string()],
            true,
        )
        .unwrap();
        assert_eq!(pf.compiled.len(), 1);
        assert!(pf.should_ignore("secret=hunter2"));
    }

    #[test]
    fn test_blank_patterns_never_match_everything() {
        let pf = PrivacyFilter::new(vec!["  ".to_string()], false).unwrap();
        assert!(!pf.should_ignore("anything at all"));
    }

    #[test]
    fn test_empty_content_always_ignored() {
        let pf = PrivacyFilter::new(Vec::new(), false).unwrap();
        assert!(pf.should_ignore(""));
        assert!(pf.should_ignore("  \n\t "));
    }
}
