//! Scenario store - on-disk persistence for the scenario document
//!
//! The store is a plain read-modify-write boundary:
//! - no locking between processes
//! - no temp-file/rename, so a crash mid-write can truncate the file
//! - last writer wins

use crate::document::ScenarioDocument;
use crate::error::StoreError;
use std::path::{Path, PathBuf};

/// Owns the location of the scenario document
#[derive(Debug, Clone)]
pub struct ScenarioStore {
    path: PathBuf,
}

impl ScenarioStore {
    /// Create store for a file path
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File path backing this store
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the document
    ///
    /// # Errors
    /// - `StoreError::Read` if the file cannot be read (including missing)
    /// - `StoreError::Decode` if the contents are not a scenario document
    pub async fn load(&self) -> Result<ScenarioDocument, StoreError> {
        let source = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StoreError::read(&self.path, e))?;

        let document = ScenarioDocument::from_yaml_str(&source)
            .map_err(|e| StoreError::decode(&self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            scripts = document.len(),
            "Loaded scenario"
        );
        Ok(document)
    }

    /// Encode and overwrite the document
    ///
    /// # Errors
    /// - `StoreError::Encode` if serialization fails
    /// - `StoreError::Write` if the file cannot be written
    pub async fn save(&self, document: &ScenarioDocument) -> Result<(), StoreError> {
        let yaml = document.to_yaml_string().map_err(StoreError::Encode)?;

        tokio::fs::write(&self.path, yaml)
            .await
            .map_err(|e| StoreError::write(&self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            scripts = document.len(),
            "Saved scenario"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ScriptEntry;

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScenarioStore::new(dir.path().join("absent.yaml"));

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "scripts: [ { script_id: 1, ").unwrap();

        let err = ScenarioStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScenarioStore::new(dir.path().join("scenarios.yaml"));
        let doc = ScenarioDocument::new(vec![
            ScriptEntry::new("intro").with_field("title", "Hello"),
            ScriptEntry::new("outro"),
        ]);

        store.save(&doc).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn save_of_load_preserves_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.yaml");
        std::fs::write(
            &path,
            "# comment dropped on rewrite\nname: demo\nscripts:\n  - script_id: a\n    cues: [1, 2, 3]\n",
        )
        .unwrap();
        let store = ScenarioStore::new(&path);

        let first = store.load().await.unwrap();
        store.save(&first).await.unwrap();
        let second = store.load().await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScenarioStore::new(dir.path().join("nope").join("scenarios.yaml"));

        let err = store.save(&ScenarioDocument::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }
}
