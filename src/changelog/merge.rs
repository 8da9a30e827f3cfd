/*!
 * Merging translated output into the accumulated translated changelog.
 *
 * The translated document is a regenerated header followed by a body that
 * accumulates translated fragments, newest first. The header-stripped body is
 * stored on its own, so appending never has to search the headered file for
 * the end of the header unless the body copy is gone.
 */

use chrono::{DateTime, Local};
use log::{debug, warn};

use crate::artifacts::ArtifactStore;
use crate::changelog::versions::count_versions;
use crate::errors::StoreError;

/// Marks the end of the generated header in the headered artifact
pub const HEADER_TERMINATOR: &str = "---\n\n";

/// Placed between a new fragment and the existing body
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Translated changelog split into its generated header and accumulated body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedDocument {
    pub header: String,
    pub body: String,
}

impl TranslatedDocument {
    /// Full headered text
    pub fn render(&self) -> String {
        format!("{}{}", self.header, self.body)
    }
}

/// Per-save header values
#[derive(Debug, Clone)]
pub struct HeaderInfo {
    pub generated_at: DateTime<Local>,
    /// Version sections in the source document
    pub versions_total: usize,
}

impl HeaderInfo {
    pub fn now(versions_total: usize) -> Self {
        Self {
            generated_at: Local::now(),
            versions_total,
        }
    }
}

/// Version-count line for a body translated from a source with
/// `versions_total` sections, e.g. "Covers the 20 most recent of 143 versions".
///
/// `None` when the source has no version sections.
pub fn version_note(body: &str, versions_total: usize) -> Option<String> {
    if versions_total == 0 {
        return None;
    }
    let included = count_versions(body).min(versions_total);
    if included == 0 || included == versions_total {
        Some(format!("Covers all {} versions", versions_total))
    } else {
        Some(format!(
            "Covers the {} most recent of {} versions",
            included, versions_total
        ))
    }
}

/// How an incremental merge was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    /// Fragment prepended to the stored body
    Prepended,
    /// Fragment prepended to a body recovered from the headered artifact
    RecoveredFromHeadered,
    /// No earlier artifact, the fragment was saved as a new document
    SavedAsNew,
}

/// Split a headered artifact at the first header terminator.
/// Returns `None` when the terminator is missing.
pub fn split_header(artifact: &str) -> Option<(&str, &str)> {
    let end = artifact.find(HEADER_TERMINATOR)? + HEADER_TERMINATOR.len();
    Some(artifact.split_at(end))
}

/// New fragment first, then everything accumulated so far
pub fn prepend_fragment(fragment: &str, body: &str) -> String {
    format!("{}{}{}", fragment, FRAGMENT_SEPARATOR, body)
}

/// Builds headers and writes translated documents through an [`ArtifactStore`]
#[derive(Debug, Clone)]
pub struct DocumentMerger {
    title: String,
    source_url: String,
}

impl DocumentMerger {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
        }
    }

    /// Generate a fresh header for `body` ending with [`HEADER_TERMINATOR`]
    pub fn render_header(&self, info: &HeaderInfo, body: &str) -> String {
        let mut header = format!(
            "# {}\n\n> Last updated: {}  \n> Source: {}",
            self.title,
            info.generated_at.format("%Y-%m-%d %H:%M"),
            self.source_url
        );
        if let Some(note) = version_note(body, info.versions_total) {
            header.push_str("  \n> ");
            header.push_str(&note);
        }
        header.push_str("\n\n");
        header.push_str(HEADER_TERMINATOR);
        header
    }

    /// Replace the translated document with `body` under a new header
    pub fn save(
        &self,
        store: &dyn ArtifactStore,
        body: &str,
        info: &HeaderInfo,
    ) -> Result<TranslatedDocument, StoreError> {
        let document = TranslatedDocument {
            header: self.render_header(info, body),
            body: body.to_string(),
        };
        store.write(&document)?;
        debug!("Saved translated document ({} chars)", document.body.len());
        Ok(document)
    }

    /// Prepend `fragment` to the existing body under a new header.
    ///
    /// Falls back to [`DocumentMerger::save`] when nothing was translated before.
    pub fn append(
        &self,
        store: &dyn ArtifactStore,
        fragment: &str,
        info: &HeaderInfo,
    ) -> Result<(TranslatedDocument, MergeKind), StoreError> {
        let (existing_body, kind) = match store.read_body()? {
            Some(body) => (body, MergeKind::Prepended),
            None => match store.read_document()? {
                Some(headered) => {
                    warn!("Header-stripped artifact missing, recovering body from the headered artifact");
                    let body = match split_header(&headered) {
                        Some((_, body)) => body.to_string(),
                        None => headered,
                    };
                    (body, MergeKind::RecoveredFromHeadered)
                }
                None => {
                    warn!("No previous translation found, saving the fragment as a new document");
                    let document = self.save(store, fragment, info)?;
                    return Ok((document, MergeKind::SavedAsNew));
                }
            },
        };

        let body = prepend_fragment(fragment, &existing_body);
        let document = TranslatedDocument {
            header: self.render_header(info, &body),
            body,
        };
        store.write(&document)?;
        debug!(
            "Prepended {} chars to {} chars of existing translation",
            fragment.len(),
            existing_body.len()
        );
        Ok((document, kind))
    }
}
