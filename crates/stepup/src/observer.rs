//! Observer notifications for migration runs.

use crate::error::StepError;
use crate::version::Version;

/// Receives per-step and end-of-run notifications from the engine.
///
/// Every method has a no-op default, so implementers opt into whichever
/// subset they care about. Callbacks run synchronously on the engine's
/// thread, in the order steps are processed; the engine works fine with no
/// observer installed at all.
pub trait MigrationObserver {
    /// A step completed and the marker advanced to `version`.
    fn on_step_succeeded(&self, version: &Version) {
        let _ = version;
    }

    /// The step for `version` failed; the run halts after this call.
    fn on_step_failed(&self, version: &Version, error: &StepError) {
        let _ = (version, error);
    }

    /// Every due step completed, or there were none to begin with.
    fn on_all_completed(&self) {}
}
