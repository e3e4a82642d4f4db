//! Playbridge Scenario
//!
//! The persisted side of the bridge: the scenario document that drives UI
//! scripting, and the routine that folds script-change events into it.
//!
//! # Core Operations
//!
//! - **Load**: read and decode the scenario document from disk
//! - **Apply**: merge a script change into a document (pure, no I/O)
//! - **Save**: encode the document and overwrite the file
//!
//! # Architecture
//!
//! ```text
//! ScriptChangeEvent ─┐
//!                    ▼
//! File → ScenarioStore::load → apply_change → ScenarioStore::save → File
//!         \____________________ ScenarioSync ____________________/
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use playbridge_scenario::{ScenarioStore, ScenarioSync, ScriptChangeEvent};
//!
//! # async fn example(change: ScriptChangeEvent) -> Result<(), Box<dyn std::error::Error>> {
//! let sync = ScenarioSync::new(ScenarioStore::new("scenarios.yaml"));
//! let report = sync.apply(&change).await?;
//! println!("found: {}, changed: {}", report.found, report.changed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod engine;
pub mod error;
pub mod store;
pub mod sync;

pub use document::{Fields, ScenarioDocument, ScriptChangeEvent, ScriptEntry};
pub use engine::{apply_change, ApplyOutcome};
pub use error::StoreError;
pub use store::ScenarioStore;
pub use sync::{ScenarioSync, SyncReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
