//! Content type detection for captured snippets.
//!
//! A deterministic, precedence-ordered heuristic: URL, then command, then
//! code, then plain text. It is a best-effort classifier, not a parser; the
//! precedence order is part of the contract so classification stays
//! reproducible.

use url::Url;

use crate::item::ContentType;

/// Classify normalized text into a [`ContentType`].
#[must_use]
pub fn detect_type(content: &str) -> ContentType {
    let s = content.trim();
    if s.is_empty() {
        return ContentType::Text;
    }

    if let Ok(u) = Url::parse(s) {
        if !u.scheme().is_empty() && u.has_host() {
            return ContentType::Url;
        }
    }

    if looks_like_command(s) {
        return ContentType::Command;
    }

    if looks_like_code(s) {
        return ContentType::Code;
    }

    ContentType::Text
}

/// Starts with a shell prompt, or contains flags/pipes/chaining.
fn looks_like_command(s: &str) -> bool {
    if s.starts_with("$ ") || s.starts_with("sudo ") {
        return true;
    }
    s.contains(" --") || s.contains(" | ") || s.contains(" && ")
}

/// Braces, common keywords, or statement-looking punctuation.
fn looks_like_code(s: &str) -> bool {
    if s.contains('{') && s.contains('}') {
        return true;
    }
    if s.contains("function ") || s.contains("package ") || s.contains("import ") {
        return true;
    }
    s.contains(';') && s.contains('=')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_empty_is_text() {
        assert_eq!(detect_type(""), ContentType::Text);
        assert_eq!(detect_type("   "), ContentType::Text);
    }

    #[test]
    fn test_detect_url() {
        assert_eq!(detect_type("https://example.com/path"), ContentType::Url);
        assert_eq!(
            detect_type("http://localhost:8080/api?q=1"),
            ContentType::Url
        );
    }

    #[test]
    fn test_detect_not_url_without_host() {
        // bare words and scheme-less paths are not URLs
        assert_eq!(detect_type("example.com/path"), ContentType::Text);
    }

    #[test]
    fn test_detect_command() {
        assert_eq!(
            detect_type("sudo apt update && sudo apt upgrade"),
            ContentType::Command
        );
        assert_eq!(detect_type("$ ls -la"), ContentType::Command);
        assert_eq!(detect_type("grep foo --color"), ContentType::Command);
        assert_eq!(detect_type("cat file | wc -l"), ContentType::Command);
    }

    #[test]
    fn test_detect_code() {
        assert_eq!(
            detect_type("package main\n\nfunc main() { }"),
            ContentType::Code
        );
        assert_eq!(detect_type("function greet() print('hi')"), ContentType::Code);
        assert_eq!(detect_type("let x = 1; let y = 2;"), ContentType::Code);
        assert_eq!(detect_type("import os"), ContentType::Code);
    }

    #[test]
    fn test_detect_plain_text() {
        assert_eq!(
            detect_type("just some harmless text"),
            ContentType::Text
        );
    }

    #[test]
    fn test_detect_command_beats_code() {
        // contains both " && " and braces: command wins by precedence
        assert_eq!(
            detect_type("make build && echo {done}"),
            ContentType::Command
        );
    }

    #[test]
    fn test_detect_url_beats_command() {
        // a URL never contains the spaced command markers, but scheme+host
        // must win over the substring heuristics below it
        assert_eq!(detect_type("https://example.com/a--b"), ContentType::Url);
    }
}
