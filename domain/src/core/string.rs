//! String utilities for the domain layer.

/// Maximum bytes of vendor error text kept on a probe outcome.
pub const MAX_ERROR_DETAIL_BYTES: usize = 512;

/// Normalize vendor error text for storage on an outcome.
///
/// Collapses runs of whitespace (multi-line JSON bodies are common) and
/// truncates to `max_len` bytes at a UTF-8 boundary, appending `...` when
/// anything was cut.
pub fn condense_detail(s: &str, max_len: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() <= max_len {
        return collapsed;
    }
    let mut end = max_len.saturating_sub(3).min(collapsed.len());
    while end > 0 && !collapsed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &collapsed[..end])
}
