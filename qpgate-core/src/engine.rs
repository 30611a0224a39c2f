//! The engine seam.
//!
//! An [`NlpEngine`] is an opaque derivative-based solver driven through the
//! [`NlpProgram`] callback contract. The orchestrator configures it once,
//! then hands it a program; everything between `initialize` and the final
//! `finalize` callback is the engine's business.

use thiserror::Error;

use crate::nlp::NlpProgram;

/// Options handed to the engine before a solve.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Convergence tolerance.
    pub tolerance: f64,

    /// Iteration cap.
    pub max_iterations: usize,

    /// CPU time cap in seconds.
    pub max_cpu_seconds: f64,

    /// Structural hint: the constraint Jacobian never changes between
    /// iterations. Always true for a QP with linear constraints.
    pub constant_jacobian: bool,

    /// Structural hint: the Lagrangian Hessian never changes between
    /// iterations. Always true for a quadratic objective.
    pub constant_hessian: bool,
}

/// Errors from the engine, split by phase.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// Invalid options or engine environment failure; no solve was
    /// attempted.
    #[error("engine initialization failed: {0}")]
    Initialization(String),

    /// The optimize call itself failed (as opposed to running and not
    /// converging, which is reported through the status code).
    #[error("engine optimization failed: {0}")]
    Optimization(String),
}

/// A derivative-based nonlinear solver engine.
pub trait NlpEngine {
    /// Validate options and prepare the engine. Must be called before
    /// [`NlpEngine::optimize`].
    fn initialize(&mut self, options: &EngineOptions) -> Result<(), EngineError>;

    /// Run the engine against a program.
    ///
    /// On `Ok`, the engine has invoked the program's `finalize` callback
    /// exactly once with a terminal status and its best iterate, even when
    /// it did not converge.
    fn optimize(&mut self, program: &mut dyn NlpProgram) -> Result<(), EngineError>;
}
