//! Per-execution counters.

/// Counters collected by one driver call.
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionMetrics {
    /// Particles in the set when execution started.
    pub particles: usize,
    /// Accepted steps, summed over particles.
    pub steps: u64,
    /// Steps a kernel rejected with `Repeat` (e.g. adaptive step shrinks).
    pub rejected: u64,
    /// Steps re-run because the recovery policy chose `Repeat`.
    pub recovered: u64,
    /// Particles removed, by a kernel or by recovery.
    pub deleted: u64,
    /// Wall-clock time of the whole call.
    pub elapsed_us: u64,
}
