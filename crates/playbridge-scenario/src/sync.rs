//! One scenario synchronization cycle: load, apply, save.

use crate::document::ScriptChangeEvent;
use crate::engine::apply_change;
use crate::error::StoreError;
use crate::store::ScenarioStore;
use serde::Serialize;

/// What a synchronization cycle did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Identifier carried by the change
    pub script_id: String,
    /// Whether the identifier matched a script
    pub found: bool,
    /// Whether any field value changed
    pub changed: bool,
}

/// Applies script changes to the persisted scenario
#[derive(Debug, Clone)]
pub struct ScenarioSync {
    store: ScenarioStore,
}

impl ScenarioSync {
    /// Create synchronizer over a store
    #[inline]
    #[must_use]
    pub fn new(store: ScenarioStore) -> Self {
        Self { store }
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &ScenarioStore {
        &self.store
    }

    /// Load the scenario, apply `change`, and write it back
    ///
    /// The document is rewritten even when no script matched.
    ///
    /// # Errors
    /// Any [`StoreError`] from the load or the save
    pub async fn apply(&self, change: &ScriptChangeEvent) -> Result<SyncReport, StoreError> {
        let document = self.store.load().await?;

        let duplicates = document.duplicate_ids();
        if !duplicates.is_empty() {
            tracing::warn!(?duplicates, "Scenario contains duplicate script ids");
        }

        let outcome = apply_change(&document, change);
        self.store.save(&outcome.document).await?;

        Ok(SyncReport {
            script_id: change.script_id.clone(),
            found: outcome.found,
            changed: outcome.changed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ScenarioDocument, ScriptEntry};
    use serde_yaml::Value;

    async fn seeded_sync(dir: &tempfile::TempDir) -> ScenarioSync {
        let store = ScenarioStore::new(dir.path().join("scenarios.yaml"));
        store
            .save(&ScenarioDocument::new(vec![
                ScriptEntry::new("s1").with_field("title", "old"),
            ]))
            .await
            .unwrap();
        ScenarioSync::new(store)
    }

    #[tokio::test]
    async fn applies_and_persists_change() {
        let dir = tempfile::tempdir().unwrap();
        let sync = seeded_sync(&dir).await;

        let report = sync
            .apply(&ScriptChangeEvent::new("s1").with_field("title", "new"))
            .await
            .unwrap();

        assert!(report.found);
        assert!(report.changed);
        let stored = sync.store().load().await.unwrap();
        assert_eq!(stored.find("s1").unwrap().field("title"), Some(&Value::from("new")));
    }

    #[tokio::test]
    async fn unmatched_change_still_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let sync = seeded_sync(&dir).await;
        let path = sync.store().path().to_path_buf();
        // hand-written layout the encoder never produces
        let before = "# edited by hand\nscripts: [{script_id: s1, title: old}]\n";
        std::fs::write(&path, before).unwrap();

        let report = sync.apply(&ScriptChangeEvent::new("ghost")).await.unwrap();

        assert!(!report.found);
        assert!(!report.changed);
        let after = std::fs::read_to_string(&path).unwrap();
        assert_ne!(after, before);
        assert_eq!(
            ScenarioDocument::from_yaml_str(before).unwrap(),
            ScenarioDocument::from_yaml_str(&after).unwrap()
        );
    }

    #[tokio::test]
    async fn missing_scenario_fails_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let sync = ScenarioSync::new(ScenarioStore::new(dir.path().join("none.yaml")));

        let err = sync.apply(&ScriptChangeEvent::new("s1")).await.unwrap_err();

        assert!(matches!(err, StoreError::Read { .. }));
        assert!(!sync.store().path().exists());
    }
}
