//! The linear engine seam.
//!
//! Branch-and-bound, presolve, and cut generation are internal to the
//! external engine; the session invokes it as an opaque capability through
//! this trait.

use crate::error::MilpResult;
use crate::outcome::MilpOutcome;
use crate::session::MilpSession;

/// Options forwarded to the linear engine.
#[derive(Debug, Clone)]
pub struct MilpOptions {
    /// Iteration cap (engine-defined unit).
    pub max_iterations: usize,

    /// CPU time cap in seconds.
    pub max_cpu_seconds: f64,
}

impl Default for MilpOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1_000_000,
            max_cpu_seconds: 600.0,
        }
    }
}

/// A mixed-integer linear solver engine.
pub trait MilpEngine {
    /// Solve the session's loaded problem.
    ///
    /// The engine reads problem data through the session's accessors (the
    /// constraint matrix in its native column-major storage) and returns an
    /// owned outcome; it keeps no reference into the session afterwards.
    fn solve(&mut self, session: &MilpSession, options: &MilpOptions) -> MilpResult<MilpOutcome>;
}
