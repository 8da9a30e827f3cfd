/*!
 * Storage for the translated changelog artifacts.
 *
 * Two artifacts are kept: the headered document and a header-stripped copy
 * of the body for republishing. The body copy doubles as the structured
 * record of the accumulated translation.
 */

use std::path::PathBuf;

use parking_lot::RwLock;

use crate::changelog::merge::TranslatedDocument;
use crate::errors::StoreError;
use crate::file_utils::FileManager;

/// Where translated documents are read from and written to
pub trait ArtifactStore: Send + Sync {
    /// Header-stripped body of the last saved document
    fn read_body(&self) -> Result<Option<String>, StoreError>;

    /// Headered text of the last saved document
    fn read_document(&self) -> Result<Option<String>, StoreError>;

    /// Persist both artifacts
    fn write(&self, document: &TranslatedDocument) -> Result<(), StoreError>;

    /// Human readable artifact locations, headered artifact first
    fn locations(&self) -> Vec<String>;
}

/// File-backed artifact store
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    document_path: PathBuf,
    body_path: PathBuf,
}

impl FileArtifactStore {
    pub fn new(document_path: impl Into<PathBuf>, body_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: document_path.into(),
            body_path: body_path.into(),
        }
    }
}

impl ArtifactStore for FileArtifactStore {
    fn read_body(&self) -> Result<Option<String>, StoreError> {
        FileManager::read_optional(&self.body_path)
    }

    fn read_document(&self) -> Result<Option<String>, StoreError> {
        FileManager::read_optional(&self.document_path)
    }

    fn write(&self, document: &TranslatedDocument) -> Result<(), StoreError> {
        // Body first: it is what the next append reads.
        FileManager::write_atomic(&self.body_path, &document.body)?;
        FileManager::write_atomic(&self.document_path, &document.render())
    }

    fn locations(&self) -> Vec<String> {
        vec![
            self.document_path.display().to_string(),
            self.body_path.display().to_string(),
        ]
    }
}

#[derive(Debug, Default)]
struct MemoryArtifacts {
    document: Option<String>,
    body: Option<String>,
}

/// In-memory artifact store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    inner: RwLock<MemoryArtifacts>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding only a headered document, as left by an older layout
    pub fn with_document_only(document: &str) -> Self {
        Self {
            inner: RwLock::new(MemoryArtifacts {
                document: Some(document.to_string()),
                body: None,
            }),
        }
    }

    pub fn document(&self) -> Option<String> {
        self.inner.read().document.clone()
    }

    pub fn body(&self) -> Option<String> {
        self.inner.read().body.clone()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn read_body(&self) -> Result<Option<String>, StoreError> {
        Ok(self.body())
    }

    fn read_document(&self) -> Result<Option<String>, StoreError> {
        Ok(self.document())
    }

    fn write(&self, document: &TranslatedDocument) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        inner.body = Some(document.body.clone());
        inner.document = Some(document.render());
        Ok(())
    }

    fn locations(&self) -> Vec<String> {
        vec!["memory:document".to_string(), "memory:body".to_string()]
    }
}
