//! Statement splitting for change-scripts.
//!
//! Generated change-scripts separate independently executable statements with
//! a literal marker line. The split is purely textual: a marker inside a
//! string literal or comment still splits, so script authors must keep the
//! marker out of literals.

/// Marker emitted between statements by the schema generator
pub const DEFAULT_BREAKPOINT: &str = "--> statement-breakpoint";

/// Split `text` on the default breakpoint marker.
pub fn split(text: &str) -> Vec<String> {
    split_statements(text, DEFAULT_BREAKPOINT)
}

/// Split `text` on `marker`, trimming each piece and dropping empty ones.
///
/// Order is preserved. An empty marker yields the whole (trimmed) text as a
/// single statement.
pub fn split_statements(text: &str, marker: &str) -> Vec<String> {
    if marker.is_empty() {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    text.split(marker)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// First line of a statement, shortened to `max_chars`, for error messages.
pub fn preview(statement: &str, max_chars: usize) -> String {
    let first_line = statement.lines().next().unwrap_or("").trim();
    if first_line.chars().count() <= max_chars && !statement.trim().contains('\n') {
        return first_line.to_string();
    }
    let truncated: String = first_line.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
