/*!
 * Persisted run state.
 *
 * The state consists of the fingerprint and raw text of the last handled
 * document plus the cycle counter of the translation policy. It is loaded
 * once at the start of a run and committed at most once, after the
 * translated artifacts were written.
 */

use std::path::PathBuf;

use log::warn;
use parking_lot::RwLock;

use crate::changelog::fingerprint::Fingerprint;
use crate::errors::StoreError;
use crate::file_utils::FileManager;

/// State carried from one run to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub last_fingerprint: Option<Fingerprint>,
    pub last_raw_document: Option<String>,
    pub translation_cycle_count: u32,
}

impl PersistedState {
    /// Drop a fingerprint that does not belong to the stored raw document.
    ///
    /// A run interrupted between its two commit writes leaves the new raw
    /// document next to the old fingerprint; clearing the fingerprint makes
    /// the next run treat the document as changed.
    fn reconciled(mut self) -> Self {
        let consistent = match (&self.last_fingerprint, &self.last_raw_document) {
            (Some(fingerprint), Some(document)) => Fingerprint::of(document) == *fingerprint,
            (Some(_), None) => false,
            (None, _) => true,
        };
        if !consistent {
            warn!("Stored fingerprint does not match the stored document, treating source as changed");
            self.last_fingerprint = None;
        }
        self
    }
}

/// Read/commit access to the persisted state
pub trait StateStore: Send + Sync {
    /// Load the state left by the last successful run
    fn load(&self) -> Result<PersistedState, StoreError>;

    /// Record `document` as handled and store the new cycle counter.
    ///
    /// The raw document is written before its fingerprint.
    fn commit(&self, document: &str, cycle_count: u32) -> Result<(), StoreError>;

    /// Forget everything, the next run behaves like the first one
    fn clear(&self) -> Result<(), StoreError>;
}

/// File names used by [`FileStateStore`]
pub const FINGERPRINT_FILE: &str = "last_fingerprint.txt";
pub const RAW_DOCUMENT_FILE: &str = "previous_changelog.md";
pub const COUNTER_FILE: &str = "translation_count.txt";

/// State kept as three files in one directory
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn load_counter(&self) -> Result<u32, StoreError> {
        let path = self.path(COUNTER_FILE);
        let Some(content) = FileManager::read_optional(&path)? else {
            return Ok(0);
        };
        Ok(content.trim().parse().unwrap_or_else(|_| {
            warn!("Unreadable translation counter in {:?}, starting from 0", path);
            0
        }))
    }

    fn load_fingerprint(&self) -> Result<Option<Fingerprint>, StoreError> {
        let path = self.path(FINGERPRINT_FILE);
        Ok(FileManager::read_optional(&path)?.and_then(|content| {
            let fingerprint = Fingerprint::from_hex(&content);
            if fingerprint.is_none() {
                warn!("Ignoring malformed fingerprint in {:?}", path);
            }
            fingerprint
        }))
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<PersistedState, StoreError> {
        let state = PersistedState {
            last_fingerprint: self.load_fingerprint()?,
            last_raw_document: FileManager::read_optional(self.path(RAW_DOCUMENT_FILE))?,
            translation_cycle_count: self.load_counter()?,
        };
        Ok(state.reconciled())
    }

    fn commit(&self, document: &str, cycle_count: u32) -> Result<(), StoreError> {
        FileManager::write_atomic(self.path(RAW_DOCUMENT_FILE), document)?;
        FileManager::write_atomic(self.path(FINGERPRINT_FILE), Fingerprint::of(document).as_str())?;
        FileManager::write_atomic(self.path(COUNTER_FILE), &cycle_count.to_string())
    }

    fn clear(&self) -> Result<(), StoreError> {
        for name in [FINGERPRINT_FILE, RAW_DOCUMENT_FILE, COUNTER_FILE] {
            FileManager::remove_if_exists(self.path(name))?;
        }
        Ok(())
    }
}

/// In-memory state store for tests
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: RwLock<PersistedState>,
    commits: RwLock<usize>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded as if `document` had been handled
    pub fn with_document(document: &str, cycle_count: u32) -> Self {
        Self {
            state: RwLock::new(PersistedState {
                last_fingerprint: Some(Fingerprint::of(document)),
                last_raw_document: Some(document.to_string()),
                translation_cycle_count: cycle_count,
            }),
            commits: RwLock::new(0),
        }
    }

    /// Current state without reconciliation
    pub fn snapshot(&self) -> PersistedState {
        self.state.read().clone()
    }

    /// Number of commits made
    pub fn commit_count(&self) -> usize {
        *self.commits.read()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<PersistedState, StoreError> {
        Ok(self.snapshot().reconciled())
    }

    fn commit(&self, document: &str, cycle_count: u32) -> Result<(), StoreError> {
        let mut state = self.state.write();
        state.last_raw_document = Some(document.to_string());
        state.last_fingerprint = Some(Fingerprint::of(document));
        state.translation_cycle_count = cycle_count;
        *self.commits.write() += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.state.write() = PersistedState::default();
        Ok(())
    }
}
