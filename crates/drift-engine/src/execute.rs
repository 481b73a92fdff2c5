//! Execution drivers.
//!
//! Every driver validates the config and the kernel first, then advances
//! each particle independently to its target time:
//!
//! 1. The step is `particle.dt`, shortened on the last step so that the
//!    particle lands exactly on the target.
//! 2. The kernel runs. On `Repeat` the position and custom variables are
//!    restored and the step is re-run with the kernel-updated `dt`.
//! 3. On a kernel error the particle is restored and the recovery policy
//!    picks repeat, delete or abort.
//! 4. On success `time` advances by the (possibly shrunk) `dt`, and a
//!    `dt` requested through `update_next_dt` takes effect.

use std::time::Instant;

use drift_core::{ErrorCode, Particle, Value};
use drift_field::FieldSet;
use drift_kernel::{validate_kernel, Kernel, KernelContext, KernelStatus, RecoveryAction, RecoveryPolicy};
use smallvec::SmallVec;
use tracing::{info, trace, warn};

use crate::config::{ExecutionConfig, ExecutionMode};
use crate::error::ExecutionError;
use crate::metrics::ExecutionMetrics;
use crate::particle_set::ParticleSet;

impl ParticleSet {
    /// Advance every particle through `kernel` (dynamic dispatch).
    ///
    /// Kernel errors are mapped through `config.recovery`.
    pub fn execute(
        &mut self,
        kernel: &dyn Kernel,
        fieldset: &FieldSet,
        config: &ExecutionConfig,
    ) -> Result<ExecutionMetrics, ExecutionError> {
        self.drive(kernel, fieldset, config, &config.recovery, ExecutionMode::Interpreted)
    }

    /// Advance every particle through `kernel`, monomorphised over its type.
    ///
    /// Produces the same trajectories as [`execute`](Self::execute), bit
    /// for bit.
    pub fn execute_compiled<K: Kernel>(
        &mut self,
        kernel: &K,
        fieldset: &FieldSet,
        config: &ExecutionConfig,
    ) -> Result<ExecutionMetrics, ExecutionError> {
        self.drive(kernel, fieldset, config, &config.recovery, ExecutionMode::Compiled)
    }

    /// Dispatch to [`execute`](Self::execute) or
    /// [`execute_compiled`](Self::execute_compiled) according to
    /// `config.mode`.
    pub fn run<K: Kernel>(
        &mut self,
        kernel: &K,
        fieldset: &FieldSet,
        config: &ExecutionConfig,
    ) -> Result<ExecutionMetrics, ExecutionError> {
        match config.mode {
            ExecutionMode::Interpreted => self.execute(kernel, fieldset, config),
            ExecutionMode::Compiled => self.execute_compiled(kernel, fieldset, config),
        }
    }

    /// Like [`execute_compiled`](Self::execute_compiled), but kernel errors
    /// go to `policy` instead of `config.recovery`.
    pub fn execute_with_policy<K, P>(
        &mut self,
        kernel: &K,
        fieldset: &FieldSet,
        config: &ExecutionConfig,
        policy: &P,
    ) -> Result<ExecutionMetrics, ExecutionError>
    where
        K: Kernel + ?Sized,
        P: RecoveryPolicy + ?Sized,
    {
        self.drive(kernel, fieldset, config, policy, ExecutionMode::Compiled)
    }

    fn drive<K, P>(
        &mut self,
        kernel: &K,
        fieldset: &FieldSet,
        config: &ExecutionConfig,
        policy: &P,
        mode: ExecutionMode,
    ) -> Result<ExecutionMetrics, ExecutionError>
    where
        K: Kernel + ?Sized,
        P: RecoveryPolicy + ?Sized,
    {
        config.validate()?;
        validate_kernel(kernel, fieldset, config.dt)?;

        let start = Instant::now();
        let mut metrics = ExecutionMetrics {
            particles: self.particles.len(),
            ..ExecutionMetrics::default()
        };
        info!(
            kernel = kernel.name(),
            ?mode,
            particles = metrics.particles,
            dt = config.dt,
            end = ?config.end,
            "execution started"
        );

        let mut alive = vec![true; self.particles.len()];
        let mut result = Ok(());
        for (particle, keep) in self.particles.iter_mut().zip(alive.iter_mut()) {
            particle.dt = config.dt;
            let target = config.end.target(particle.time, config.dt.signum());
            match advance_particle(particle, target, kernel, fieldset, config, policy, &mut metrics) {
                Ok(Fate::Alive) => {}
                Ok(Fate::Deleted) => {
                    *keep = false;
                    metrics.deleted += 1;
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        let mut flags = alive.into_iter();
        self.particles.retain(|_| flags.next().unwrap_or(true));

        metrics.elapsed_us = start.elapsed().as_micros() as u64;
        result?;
        info!(
            steps = metrics.steps,
            rejected = metrics.rejected,
            deleted = metrics.deleted,
            elapsed_us = metrics.elapsed_us,
            "execution finished"
        );
        Ok(metrics)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fate {
    Alive,
    Deleted,
}

/// Position and custom variables at the start of an attempt.
struct Origin {
    lon: f64,
    lat: f64,
    depth: f64,
    vars: SmallVec<[Value; 4]>,
}

impl Origin {
    fn of(p: &Particle) -> Self {
        Self {
            lon: p.lon,
            lat: p.lat,
            depth: p.depth,
            vars: p.vars.clone(),
        }
    }

    fn restore(&self, p: &mut Particle) {
        p.lon = self.lon;
        p.lat = self.lat;
        p.depth = self.depth;
        p.vars.clone_from(&self.vars);
        p.next_dt = None;
    }
}

fn advance_particle<K, P>(
    p: &mut Particle,
    target: f64,
    kernel: &K,
    fieldset: &FieldSet,
    config: &ExecutionConfig,
    policy: &P,
    metrics: &mut ExecutionMetrics,
) -> Result<Fate, ExecutionError>
where
    K: Kernel + ?Sized,
    P: RecoveryPolicy + ?Sized,
{
    let direction = config.dt.signum();
    let mut step = 0u64;
    loop {
        let remaining = target - p.time;
        if remaining * direction <= 0.0 {
            return Ok(Fate::Alive);
        }
        let full_dt = p.dt;
        let last = full_dt.abs() >= remaining.abs();
        if last {
            p.dt = remaining;
        }

        let ctx = KernelContext::new(fieldset, step);
        let mut origin = Origin::of(p);
        let mut repeats = 0u32;
        loop {
            match kernel.execute(p, &ctx) {
                Ok(KernelStatus::Success) => {
                    p.status = ErrorCode::Success;
                    break;
                }
                Ok(KernelStatus::Repeat) => {
                    p.status = ErrorCode::Repeat;
                    origin.restore(p);
                    metrics.rejected += 1;
                }
                Ok(KernelStatus::Delete) => {
                    p.status = ErrorCode::Delete;
                    trace!(particle = p.id.0, time = p.time, "kernel deleted particle");
                    return Ok(Fate::Deleted);
                }
                Err(err) => {
                    p.status = err.code();
                    origin.restore(p);
                    match policy.recover(p, &err) {
                        RecoveryAction::Repeat => {
                            metrics.recovered += 1;
                            origin = Origin::of(p);
                        }
                        RecoveryAction::Delete => {
                            warn!(code = ?err.code(), error = %err, "deleting particle");
                            return Ok(Fate::Deleted);
                        }
                        RecoveryAction::Abort => return Err(err.into()),
                    }
                }
            }
            repeats += 1;
            if repeats > config.max_repeats {
                return Err(ExecutionError::TooManyRepeats {
                    particle: p.state(),
                    repeats,
                });
            }
        }

        let taken = p.dt;
        let landed = last && taken == remaining;
        p.time = if landed { target } else { p.time + taken };
        metrics.steps += 1;
        step += 1;

        match p.next_dt.take() {
            Some(next) => p.dt = next,
            None if landed => p.dt = full_dt,
            None => {}
        }
    }
}
