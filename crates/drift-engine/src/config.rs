//! Execution configuration.
//!
//! [`ExecutionConfig`] is plain data with serde support so that drivers can
//! load it from JSON; [`validate()`](ExecutionConfig::validate) checks it
//! before any particle moves.

use drift_core::ConfigError;
use drift_kernel::RecoveryMap;
use serde::{Deserialize, Serialize};

/// When an execution stops.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionEnd {
    /// Advance each particle by this many seconds (in the direction of `dt`).
    Runtime(f64),
    /// Advance each particle to this absolute time.
    EndTime(f64),
}

impl ExecutionEnd {
    /// Target time for a particle currently at `time`, integrating with
    /// step sign `direction`.
    pub fn target(self, time: f64, direction: f64) -> f64 {
        match self {
            Self::Runtime(runtime) => time + direction * runtime,
            Self::EndTime(end) => end,
        }
    }
}

/// Which driver [`ParticleSet::run`](crate::ParticleSet::run) dispatches to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Dynamic dispatch through `&dyn Kernel`.
    #[default]
    Interpreted,
    /// Monomorphised over the concrete kernel type.
    Compiled,
}

/// Parameters of one [`ParticleSet`](crate::ParticleSet) execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Step size in seconds; negative integrates backward. Default: 1.0.
    pub dt: f64,
    /// Stop condition. Default: a runtime of zero.
    pub end: ExecutionEnd,
    /// Driver selection for [`run`](crate::ParticleSet::run).
    pub mode: ExecutionMode,
    /// Repeats allowed within one step before execution fails. Default: 100.
    pub max_repeats: u32,
    /// Recovery actions by error code. Default: abort on every error.
    pub recovery: RecoveryMap,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            end: ExecutionEnd::Runtime(0.0),
            mode: ExecutionMode::Interpreted,
            max_repeats: 100,
            recovery: RecoveryMap::default(),
        }
    }
}

impl ExecutionConfig {
    /// Config stepping by `dt` until `end`.
    pub fn new(dt: f64, end: ExecutionEnd) -> Self {
        Self {
            dt,
            end,
            ..Self::default()
        }
    }

    /// Builder: set the driver mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: set the recovery map.
    pub fn with_recovery(mut self, recovery: RecoveryMap) -> Self {
        self.recovery = recovery;
        self
    }

    /// Builder: set the repeat limit.
    pub fn with_max_repeats(mut self, max_repeats: u32) -> Self {
        self.max_repeats = max_repeats;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dt.is_finite() || self.dt == 0.0 {
            return Err(ConfigError::invalid(
                "dt",
                format!("must be finite and non-zero, got {}", self.dt),
            ));
        }
        match self.end {
            ExecutionEnd::Runtime(r) if !r.is_finite() || r < 0.0 => {
                return Err(ConfigError::invalid(
                    "runtime",
                    format!("must be finite and non-negative, got {r}"),
                ));
            }
            ExecutionEnd::EndTime(t) if !t.is_finite() => {
                return Err(ConfigError::invalid(
                    "endtime",
                    format!("must be finite, got {t}"),
                ));
            }
            _ => {}
        }
        if self.max_repeats == 0 {
            return Err(ConfigError::invalid("max_repeats", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::ErrorCode;
    use drift_kernel::RecoveryAction;

    #[test]
    fn default_is_valid() {
        assert!(ExecutionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            (ExecutionConfig::new(0.0, ExecutionEnd::Runtime(1.0)), "dt"),
            (ExecutionConfig::new(f64::NAN, ExecutionEnd::Runtime(1.0)), "dt"),
            (ExecutionConfig::new(1.0, ExecutionEnd::Runtime(-1.0)), "runtime"),
            (
                ExecutionConfig::new(1.0, ExecutionEnd::EndTime(f64::INFINITY)),
                "endtime",
            ),
            (
                ExecutionConfig::new(1.0, ExecutionEnd::Runtime(1.0)).with_max_repeats(0),
                "max_repeats",
            ),
        ];
        for (cfg, field) in cases {
            match cfg.validate() {
                Err(ConfigError::Invalid { name, .. }) => assert_eq!(name, field),
                other => panic!("expected {field} error, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_dt_is_backward() {
        let cfg = ExecutionConfig::new(-60.0, ExecutionEnd::Runtime(600.0));
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.end.target(1000.0, cfg.dt.signum()), 400.0);
        assert_eq!(ExecutionEnd::EndTime(5.0).target(1000.0, -1.0), 5.0);
    }

    #[test]
    fn loads_from_json() {
        let json = r#"{
            "dt": 180.0,
            "end": {"end_time": 21600.0},
            "mode": "compiled",
            "recovery": {"ErrorOutOfBounds": "delete"}
        }"#;
        let cfg: ExecutionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.dt, 180.0);
        assert_eq!(cfg.end, ExecutionEnd::EndTime(21600.0));
        assert_eq!(cfg.mode, ExecutionMode::Compiled);
        assert_eq!(cfg.max_repeats, 100);
        assert_eq!(
            cfg.recovery.action_for(ErrorCode::ErrorOutOfBounds),
            RecoveryAction::Delete
        );
        assert!(cfg.validate().is_ok());
    }
}
