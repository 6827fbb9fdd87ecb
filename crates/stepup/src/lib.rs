//! # stepup
//!
//! Version-gated migration sequencing with pluggable progress storage.
//!
//! ## Features
//!
//! - **Ordered execution**: steps are registered per semantic version and
//!   always applied in ascending version order, regardless of registration
//!   order
//! - **Resumable progress**: the last completed version is persisted after
//!   every successful step, so an interrupted sequence picks up exactly
//!   where it stopped
//! - **Halt on failure**: a failing step stops the batch without touching
//!   the marker; the next run retries it first
//! - **Pluggable storage**: any [`KeyValueBackend`] works; in-memory and
//!   atomic JSON-file backends ship in the crate
//! - **Optional observer**: per-step success/failure and end-of-run
//!   callbacks
//!
//! ## Quick Start
//!
//! ```rust
//! use stepup::{MemoryBackend, Migrator, Version};
//!
//! let current = Version::parse("1.1.0").unwrap();
//! let mut migrator = Migrator::new(MemoryBackend::new(), current);
//!
//! // First launch ever: record where this installation starts.
//! migrator.set_initial_version("1.0.0").unwrap();
//!
//! migrator
//!     .register("1.1.0", || {
//!         // rebuild caches, move files, rewrite settings...
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! if migrator.should_migrate().unwrap() {
//!     let report = migrator.run().unwrap();
//!     assert!(report.is_completed());
//! }
//! assert_eq!(migrator.last_migrated_version().unwrap(), Some(current));
//! ```

pub mod backends;
pub mod config;
pub mod engine;
pub mod error;
pub mod observer;
pub mod registry;
pub mod store;
pub mod version;

pub use backends::{FileBackend, MemoryBackend};
pub use config::MigratorConfig;
pub use engine::{EngineState, Migrator, RunOutcome, RunReport, VersionProvider};
pub use error::{MigrateError, MigrateResult, StepError, StepResult};
pub use observer::MigrationObserver;
pub use registry::{HandlerRegistry, MigrationStep};
pub use store::{KeyValueBackend, ProgressStore};
pub use version::Version;
