//! Registered migration steps, keyed and ordered by version.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included};

use crate::error::{MigrateError, MigrateResult, StepResult};
use crate::version::Version;

/// A unit of migration work. Either completes or fails with an opaque error.
///
/// Any `FnMut() -> StepResult` closure is a step, so handlers can be
/// registered inline:
///
/// ```rust
/// use stepup::{HandlerRegistry, StepResult, Version};
///
/// let mut registry = HandlerRegistry::new();
/// registry
///     .register(Version::new(1, 1, 0), Box::new(|| -> StepResult { Ok(()) }))
///     .unwrap();
/// ```
pub trait MigrationStep {
    fn apply(&mut self) -> StepResult;
}

impl<F> MigrationStep for F
where
    F: FnMut() -> StepResult,
{
    fn apply(&mut self) -> StepResult {
        self()
    }
}

/// Maps versions to their migration steps.
///
/// Registration order is irrelevant; execution order is always ascending
/// version order, which the `BTreeMap` keys provide directly.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: BTreeMap<Version, Box<dyn MigrationStep>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `step` with `version`. At most one step per version;
    /// a second registration for the same version is refused.
    pub fn register(
        &mut self,
        version: Version,
        step: Box<dyn MigrationStep>,
    ) -> MigrateResult<()> {
        if self.entries.contains_key(&version) {
            return Err(MigrateError::DuplicateRegistration(version));
        }
        self.entries.insert(version, step);
        Ok(())
    }

    /// Versions with registered steps in `(after, up_to]`, ascending.
    ///
    /// Everything at or before `after` has already run; everything beyond
    /// `up_to` has not been reached yet. `after: None` means no migration
    /// has ever completed, so the window is everything up to `up_to`.
    pub fn due(&self, after: Option<Version>, up_to: Version) -> Vec<Version> {
        match after {
            Some(after) if after >= up_to => Vec::new(),
            Some(after) => self
                .entries
                .range((Excluded(after), Included(up_to)))
                .map(|(version, _)| *version)
                .collect(),
            None => self
                .entries
                .range(..=up_to)
                .map(|(version, _)| *version)
                .collect(),
        }
    }

    /// Execute the step registered for `version`, if any.
    pub fn run_step(&mut self, version: &Version) -> Option<StepResult> {
        self.entries.get_mut(version).map(|step| step.apply())
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.entries.contains_key(version)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn noop() -> Box<dyn MigrationStep> {
        Box::new(|| -> StepResult { Ok(()) })
    }

    fn registry_with(versions: &[&str]) -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        for version in versions {
            registry.register(v(version), noop()).unwrap();
        }
        registry
    }

    #[test]
    fn duplicate_registration_is_refused() {
        let mut registry = registry_with(&["1.0.0"]);

        let err = registry.register(v("1.0.0"), noop()).unwrap_err();
        assert!(matches!(
            err,
            MigrateError::DuplicateRegistration(version) if version == v("1.0.0")
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn due_window_excludes_after_and_includes_up_to() {
        let registry = registry_with(&["0.8.0", "0.9.0", "1.0.0", "1.1.0"]);

        let due = registry.due(Some(v("0.8.0")), v("1.0.0"));
        assert_eq!(due, vec![v("0.9.0"), v("1.0.0")]);
    }

    #[test]
    fn due_without_marker_takes_everything_up_to_current() {
        let registry = registry_with(&["0.9.0", "1.0.0", "2.0.0"]);

        let due = registry.due(None, v("1.0.0"));
        assert_eq!(due, vec![v("0.9.0"), v("1.0.0")]);
    }

    #[test]
    fn due_is_sorted_regardless_of_registration_order() {
        let registry = registry_with(&["1.0.1", "0.8.1", "1.0.0", "0.9.0"]);

        let due = registry.due(None, v("2.0.0"));
        assert_eq!(due, vec![v("0.8.1"), v("0.9.0"), v("1.0.0"), v("1.0.1")]);
    }

    #[test]
    fn due_is_empty_when_marker_reaches_current() {
        let registry = registry_with(&["1.0.0"]);

        assert!(registry.due(Some(v("1.0.0")), v("1.0.0")).is_empty());
        // Marker beyond current (downgraded application) is also empty.
        assert!(registry.due(Some(v("2.0.0")), v("1.0.0")).is_empty());
    }

    #[test]
    fn run_step_executes_registered_entry() {
        let mut registry = registry_with(&["1.0.0"]);

        assert!(matches!(registry.run_step(&v("1.0.0")), Some(Ok(()))));
        assert!(registry.run_step(&v("9.9.9")).is_none());
    }

    #[test]
    fn run_step_surfaces_failures() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(
                v("1.0.0"),
                Box::new(|| -> StepResult { Err("disk full".into()) }),
            )
            .unwrap();

        let result = registry.run_step(&v("1.0.0")).unwrap();
        assert_eq!(result.unwrap_err().to_string(), "disk full");
    }
}
