//! Solve orchestration.
//!
//! [`solve_qp`] wires a validated descriptor to an engine: configure the
//! engine with the caller's caps and the constant-structure hints a QP
//! always satisfies, run initialize-then-optimize, and extract the solution
//! record from the adapter. No numerics happen here.

use log::{debug, info};
use thiserror::Error;

use crate::adapter::QpNlp;
use crate::engine::{EngineError, EngineOptions, NlpEngine};
use crate::problem::{ProblemError, QpOptions, QpProblem, QpSolution};

/// Errors from one orchestrated solve.
#[derive(Error, Debug)]
pub enum SolveError {
    /// The descriptor failed shape validation; the engine was never
    /// contacted.
    #[error("invalid problem: {0}")]
    InvalidProblem(#[from] ProblemError),

    /// Engine setup failed; no solve was attempted.
    #[error("initialization: {0}")]
    Initialization(EngineError),

    /// The engine's optimize call failed outright.
    #[error("optimization: {0}")]
    Optimization(EngineError),

    /// The engine returned without ever finalizing a solution.
    #[error("engine finished without reporting a solution")]
    NoSolution,
}

/// Solve a quadratic program against the given engine.
///
/// Non-convergence is not an error: iteration/time-capped and infeasible
/// outcomes come back as `Ok` with the corresponding
/// [`SolveStatus`](crate::problem::SolveStatus) and the engine's best
/// iterate.
pub fn solve_qp<E: NlpEngine>(
    problem: &QpProblem,
    options: &QpOptions,
    engine: &mut E,
) -> Result<QpSolution, SolveError> {
    problem.validate()?;

    let engine_options = EngineOptions {
        tolerance: options.tolerance,
        max_iterations: options.max_iterations,
        max_cpu_seconds: options.max_cpu_seconds,
        // A QP's constraints are linear and its Hessian is fixed.
        constant_jacobian: true,
        constant_hessian: true,
    };

    debug!(
        "solve_qp: n={} m={} tol={:.1e} max_iter={}",
        problem.num_vars, problem.num_constraints, options.tolerance, options.max_iterations
    );

    engine.initialize(&engine_options).map_err(SolveError::Initialization)?;

    let mut adapter = QpNlp::new(problem);
    engine.optimize(&mut adapter).map_err(SolveError::Optimization)?;

    let solution = adapter.into_solution().ok_or(SolveError::NoSolution)?;
    info!(
        "solve_qp finished: status={} obj={:.6e} iterations={}",
        solution.status, solution.obj_val, solution.iterations
    );
    Ok(solution)
}
