//! Mapping from kernel failures to recovery actions.

use drift_core::{ErrorCode, KernelError, Particle};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What the driver does with a particle whose kernel failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    /// Re-run the step with the (possibly updated) particle.
    Repeat,
    /// Remove the particle and continue with the others.
    Delete,
    /// Stop execution and return the error.
    Abort,
}

/// Decides how to recover from a kernel error.
///
/// A policy may modify the particle before a [`RecoveryAction::Repeat`],
/// e.g. to move it back inside the domain.
pub trait RecoveryPolicy {
    /// Action for `error`, raised while advancing `particle`.
    fn recover(&self, particle: &mut Particle, error: &KernelError) -> RecoveryAction;
}

/// Per-[`ErrorCode`] recovery table. Codes without an entry abort.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecoveryMap {
    actions: IndexMap<ErrorCode, RecoveryAction>,
}

impl RecoveryMap {
    /// A map that aborts on every error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the action for `code`.
    pub fn with(mut self, code: ErrorCode, action: RecoveryAction) -> Self {
        self.set(code, action);
        self
    }

    /// Set the action for `code`.
    pub fn set(&mut self, code: ErrorCode, action: RecoveryAction) {
        self.actions.insert(code, action);
    }

    /// Action for `code`.
    pub fn action_for(&self, code: ErrorCode) -> RecoveryAction {
        self.actions
            .get(&code)
            .copied()
            .unwrap_or(RecoveryAction::Abort)
    }

    /// Delete particles that leave the spatial domain; abort otherwise.
    pub fn delete_out_of_bounds() -> Self {
        Self::new().with(ErrorCode::ErrorOutOfBounds, RecoveryAction::Delete)
    }
}

impl RecoveryPolicy for RecoveryMap {
    fn recover(&self, _particle: &mut Particle, error: &KernelError) -> RecoveryAction {
        self.action_for(error.code())
    }
}
