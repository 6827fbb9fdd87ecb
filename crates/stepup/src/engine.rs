//! The migration engine: due-step selection, ordered execution, progress
//! tracking, and outcome notification.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::MigratorConfig;
use crate::error::{MigrateResult, StepError};
use crate::observer::MigrationObserver;
use crate::registry::{HandlerRegistry, MigrationStep};
use crate::store::{KeyValueBackend, ProgressStore};
use crate::version::Version;

/// Supplies the version of the running application.
///
/// Injected rather than read from a global so tests (and unusual hosts) can
/// substitute any value.
pub trait VersionProvider {
    fn current_version(&self) -> Version;
}

/// The common case: the application version is a fixed value.
impl VersionProvider for Version {
    fn current_version(&self) -> Version {
        *self
    }
}

/// Engine lifecycle within one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No run has started.
    Idle,
    /// A run is executing.
    Running,
    /// The last run applied every due step.
    Completed,
    /// The last run stopped at a failing step.
    Halted,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every due step was applied.
    Completed,
    /// The step for `version` failed; nothing after it executed and the
    /// marker was not advanced past the last success.
    Halted { version: Version, error: StepError },
}

/// Summary of one [`Migrator::run`] invocation.
#[derive(Debug)]
pub struct RunReport {
    /// Versions whose steps were applied, in execution order.
    pub applied: Vec<Version>,
    pub outcome: RunOutcome,
    pub execution_time_ms: u128,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }
}

/// Sequences registered migration steps against the persisted marker.
///
/// Steps whose version lies in the half-open window
/// `(last migrated, current application version]` are due; a run executes
/// them in ascending version order, persisting the marker after each
/// success. The first failure halts the run without advancing the marker,
/// so the next run retries the failed version first.
///
/// Not reentrant: the host must serialize calls to [`run`](Migrator::run).
pub struct Migrator {
    store: ProgressStore,
    registry: HandlerRegistry,
    provider: Box<dyn VersionProvider>,
    observer: Option<Arc<dyn MigrationObserver>>,
    state: EngineState,
}

impl Migrator {
    /// Create an engine over `backend` with the default marker key.
    pub fn new(
        backend: impl KeyValueBackend + 'static,
        provider: impl VersionProvider + 'static,
    ) -> Self {
        Self::with_config(backend, provider, MigratorConfig::default())
    }

    pub fn with_config(
        backend: impl KeyValueBackend + 'static,
        provider: impl VersionProvider + 'static,
        config: MigratorConfig,
    ) -> Self {
        Self {
            store: ProgressStore::with_config(backend, &config),
            registry: HandlerRegistry::new(),
            provider: Box::new(provider),
            observer: None,
            state: EngineState::Idle,
        }
    }

    /// Install the notification observer.
    pub fn set_observer(&mut self, observer: Arc<dyn MigrationObserver>) {
        self.observer = Some(observer);
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Register `step` to run when the application first reaches `version`.
    ///
    /// Fails fast on an unparsable version string or a version that already
    /// has a step registered.
    pub fn register(
        &mut self,
        version: &str,
        step: impl MigrationStep + 'static,
    ) -> MigrateResult<()> {
        let version = Version::parse(version)?;
        self.registry.register(version, Box::new(step))
    }

    /// Bootstrap the marker on first launch. A no-op once any marker exists,
    /// so a late call cannot clobber real progress.
    pub fn set_initial_version(&self, version: &str) -> MigrateResult<()> {
        let version = Version::parse(version)?;
        self.store.set_initial(version)
    }

    /// The last successfully migrated version, if any migration ever ran.
    pub fn last_migrated_version(&self) -> MigrateResult<Option<Version>> {
        self.store.last_migrated()
    }

    /// Cheap pre-check: is the application ahead of the marker?
    ///
    /// An unset marker counts as older than any version. This does not
    /// consult the registry, so `true` can still mean a run with nothing
    /// to do.
    pub fn should_migrate(&self) -> MigrateResult<bool> {
        let current = self.provider.current_version();
        Ok(match self.store.last_migrated()? {
            Some(marker) => current > marker,
            None => true,
        })
    }

    /// Execute every due step in ascending version order.
    ///
    /// The marker advances after each success. The first failure halts the
    /// run: the failing version is not persisted and later steps do not
    /// execute. Step failures are reported through the observer and in the
    /// returned [`RunReport`]; `Err` is reserved for store failures.
    pub fn run(&mut self) -> MigrateResult<RunReport> {
        let started = Instant::now();
        self.state = EngineState::Running;

        let current = self.provider.current_version();
        let marker = self.store.last_migrated()?;
        let due = self.registry.due(marker, current);
        debug!(
            %current,
            marker = marker.map(|m| m.to_string()).as_deref().unwrap_or("unset"),
            due = due.len(),
            "selected due migration steps"
        );

        let mut applied = Vec::new();
        for version in due {
            let result = match self.registry.run_step(&version) {
                Some(result) => result,
                None => continue,
            };

            match result {
                Ok(()) => {
                    self.store.advance(version)?;
                    info!(%version, "migration step applied");
                    if let Some(observer) = &self.observer {
                        observer.on_step_succeeded(&version);
                    }
                    applied.push(version);
                }
                Err(error) => {
                    warn!(%version, %error, "migration step failed, halting run");
                    if let Some(observer) = &self.observer {
                        observer.on_step_failed(&version, &error);
                    }
                    self.state = EngineState::Halted;
                    return Ok(RunReport {
                        applied,
                        outcome: RunOutcome::Halted { version, error },
                        execution_time_ms: started.elapsed().as_millis(),
                    });
                }
            }
        }

        info!(applied = applied.len(), "migration run completed");
        self.state = EngineState::Completed;
        if let Some(observer) = &self.observer {
            observer.on_all_completed();
        }
        Ok(RunReport {
            applied,
            outcome: RunOutcome::Completed,
            execution_time_ms: started.elapsed().as_millis(),
        })
    }

    /// Clear persisted progress entirely. Test/bootstrap use.
    pub fn reset(&self) -> MigrateResult<()> {
        self.store.reset()
    }
}
