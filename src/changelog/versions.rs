/*!
 * Version section handling for full translations.
 *
 * A changelog is a preamble followed by `## <version>` sections, newest
 * first. A full translation can be capped to the most recent sections.
 */

/// Full-translation input after applying the version cap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLimited {
    /// Text to translate
    pub text: String,
    /// Version sections included
    pub versions_included: usize,
    /// Version sections in the whole document
    pub versions_total: usize,
}

impl VersionLimited {
    /// Whether older sections were cut off
    pub fn is_truncated(&self) -> bool {
        self.versions_included < self.versions_total
    }
}

fn is_version_heading(line: &str) -> bool {
    line.trim_start().starts_with("## ")
}

/// Number of `## ` version sections in a document
pub fn count_versions(document: &str) -> usize {
    document.lines().filter(|line| is_version_heading(line)).count()
}

/// Keep the preamble and the first `max_versions` version sections.
/// `None` keeps everything.
pub fn limit_versions(document: &str, max_versions: Option<usize>) -> VersionLimited {
    let versions_total = count_versions(document);
    let Some(max_versions) = max_versions.filter(|max| *max < versions_total) else {
        return VersionLimited {
            text: document.to_string(),
            versions_included: versions_total,
            versions_total,
        };
    };

    let mut kept = Vec::new();
    let mut seen = 0;
    for line in document.lines() {
        if is_version_heading(line) {
            seen += 1;
            if seen > max_versions {
                break;
            }
        }
        kept.push(line);
    }

    VersionLimited {
        text: kept.join("\n").trim_end().to_string(),
        versions_included: max_versions,
        versions_total,
    }
}
