//! Content fingerprinting for deduplication.
//!
//! The fingerprint is the dedupe identity key: two captures with equal
//! fingerprints are the same logical item and collapse to one stored row.

/// Compute the fingerprint of normalized content.
///
/// Empty input maps to the empty string, a sentinel that never matches
/// anything and so disables deduplication. Non-empty input maps to the
/// hex-encoded BLAKE3 hash of the bytes, stable across runs and backends.
#[must_use]
pub fn fingerprint(normalized: &str) -> String {
    if normalized.is_empty() {
        return String::new();
    }
    blake3::hash(normalized.as_bytes()).to_hex().to_string()
}
