/*!
 * Incremental translation decision engine.
 *
 * - `fingerprint`: content digests and change detection
 * - `diff`: heuristic extraction of newly added entries
 * - `versions`: capping full translations to recent version sections
 * - `policy`: full vs. incremental strategy selection
 * - `merge`: header/body document merging
 */

pub mod diff;
pub mod fingerprint;
pub mod merge;
pub mod policy;
pub mod versions;

pub use self::diff::extract_new_entries;
pub use self::fingerprint::{Fingerprint, has_changed};
pub use self::merge::{DocumentMerger, HeaderInfo, MergeKind, TranslatedDocument};
pub use self::policy::{Decision, FullReason, Strategy};
pub use self::versions::{VersionLimited, count_versions, limit_versions};
