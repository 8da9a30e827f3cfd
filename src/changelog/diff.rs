/*!
 * Extraction of newly added changelog entries.
 *
 * Changelogs grow at the top, so the new material is approximated by the
 * leading block of the new document sized to the net line growth. This is a
 * line-count heuristic, not a diff: an edit that does not grow the document
 * yields nothing, which makes the caller fall back to a full translation.
 */

/// Extra lines taken after the estimated new block
pub const SAFETY_MARGIN_LINES: usize = 50;

/// How many leading lines are searched for the top-level title
pub const HEADER_SCAN_LINES: usize = 10;

/// Number of lines up to and including the top-level `# ` title, or 0 when
/// none of the first [`HEADER_SCAN_LINES`] lines is a title.
pub fn header_line_count(lines: &[&str]) -> usize {
    lines
        .iter()
        .take(HEADER_SCAN_LINES)
        .position(|line| line.trim().starts_with("# "))
        .map_or(0, |index| index + 1)
}

/// Half-open line range `[start, end)` of `new_document` holding the new
/// entries, or `None` when the document did not grow.
pub fn new_entries_range(old_document: &str, new_document: &str) -> Option<(usize, usize)> {
    let old_count = old_document.lines().count();
    let new_lines: Vec<&str> = new_document.lines().collect();

    if new_lines.len() <= old_count {
        return None;
    }
    let delta = new_lines.len() - old_count;

    let start = header_line_count(&new_lines);
    let end = (delta + start + SAFETY_MARGIN_LINES).min(new_lines.len());
    Some((start, end))
}

/// Leading block of `new_document` that was added since `old_document`.
///
/// The block over-extracts by up to [`SAFETY_MARGIN_LINES`] lines, so its
/// tail may repeat entries that were already translated.
pub fn extract_new_entries(old_document: &str, new_document: &str) -> Option<String> {
    let (start, end) = new_entries_range(old_document, new_document)?;
    let lines: Vec<&str> = new_document.lines().collect();
    Some(lines[start..end].join("\n"))
}
