//! Text normalization for captured snippets.
//!
//! Every capture passes through [`normalize`] before fingerprinting and
//! storage, so that whitespace-only variations of the same text collapse to
//! one canonical form.

/// Maximum normalized content length in bytes.
///
/// Bounds row size and fingerprinting cost for pathological captures.
pub const MAX_CONTENT_LEN: usize = 32_000;

/// Canonicalize raw captured text.
///
/// Trims leading/trailing whitespace, collapses any run of whitespace
/// (newlines and tabs included) to a single space, and truncates to
/// [`MAX_CONTENT_LEN`] bytes on a character boundary. Idempotent: a trailing
/// space left by truncation is trimmed again.
///
/// Empty or all-whitespace input normalizes to the empty string.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(trimmed.len().min(MAX_CONTENT_LEN));
    let mut in_space = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        out.push(c);
    }

    if out.len() > MAX_CONTENT_LEN {
        let mut end = MAX_CONTENT_LEN;
        while !out.is_char_boundary(end) {
            end -= 1;
        }
        out.truncate(end);
        out.truncate(out.trim_end().len());
    }

    out
}
