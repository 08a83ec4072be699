// Comparison keys for free-text fields.
// Display fields are never rewritten; keys are only used for equality,
// edit distance, and identifier slugs.

/// Lower-case, collapse every run of non letter/digit characters to a single
/// space, trim. Total: empty input yields an empty key.
pub fn normalize(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    let mut pending_space = false;

    // Lower-case first: some lowercase mappings emit combining marks, which
    // must then be treated as separators like any other non-alphanumeric.
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_space && !key.is_empty() {
                key.push(' ');
            }
            pending_space = false;
            key.push(c);
        } else {
            pending_space = true;
        }
    }

    key
}

/// Comparison key with its internal spaces replaced by hyphens.
pub fn slug(text: &str) -> String {
    normalize(text).replace(' ', "-")
}
