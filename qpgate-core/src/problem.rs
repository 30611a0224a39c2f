//! Problem data structures and validation.
//!
//! This module defines the quadratic program descriptor consumed by the
//! NLP adapter, along with solve options, statuses, and the solution record.

use std::fmt;

use thiserror::Error;

/// Quadratic program in dense form.
///
/// The bridge works with the formulation:
///
/// ```text
/// minimize    x^T Q x + l^T x
/// subject to  conLB <= A x <= conUB
///             lb <= x <= ub
/// ```
///
/// Note the absence of the conventional 1/2 factor on the quadratic term;
/// callers supplying a standard-form QP should halve `q` themselves.
///
/// `q` need not be symmetric. The adapter applies the effective form
/// (Q + Q^T)/2 implicitly through its gradient and Hessian callbacks, so the
/// matrix must never be pre-symmetrized here.
///
/// # Dimensions
///
/// - `n`: number of variables (`num_vars`)
/// - `m`: number of constraints (`num_constraints`, may be zero)
/// - `q`: n × n, dense, row-major (`q[n*i + j]`)
/// - `linear`: n
/// - `a`: m × n, dense, row-major; row i is constraint i
/// - `var_lb`, `var_ub`: n
/// - `con_lb`, `con_ub`: m
///
/// The descriptor is read-only for its entire lifetime: the adapter borrows
/// it immutably for the duration of one solve.
#[derive(Debug, Clone)]
pub struct QpProblem {
    /// Number of variables (must be positive).
    pub num_vars: usize,

    /// Number of linear constraints (may be zero).
    pub num_constraints: usize,

    /// Quadratic cost matrix, n × n dense row-major. Not required to be
    /// symmetric.
    pub q: Vec<f64>,

    /// Linear cost coefficients (length n).
    pub linear: Vec<f64>,

    /// Constraint coefficient matrix, m × n dense row-major.
    pub a: Vec<f64>,

    /// Variable lower bounds (length n).
    pub var_lb: Vec<f64>,

    /// Variable upper bounds (length n).
    pub var_ub: Vec<f64>,

    /// Constraint lower bounds (length m).
    pub con_lb: Vec<f64>,

    /// Constraint upper bounds (length m).
    pub con_ub: Vec<f64>,

    /// Optional starting point for the primal variables (length n).
    /// When `None`, the adapter starts from the origin.
    pub initial_guess: Option<Vec<f64>>,
}

/// Shape errors detected before any engine interaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    /// The problem must have at least one variable.
    #[error("problem has no variables")]
    NoVariables,

    /// An input array's length is inconsistent with n/m.
    #[error("{name} has length {actual}, expected {expected}")]
    BadLength {
        /// Which array failed the check.
        name: &'static str,
        /// Required length given n and m.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
}

impl QpProblem {
    /// Validate array lengths against `num_vars` and `num_constraints`.
    ///
    /// Bound ordering (lb <= ub) is deliberately not checked here; the
    /// engine owns that diagnosis.
    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.num_vars;
        let m = self.num_constraints;

        if n == 0 {
            return Err(ProblemError::NoVariables);
        }

        let checks: [(&'static str, usize, usize); 7] = [
            ("q", n * n, self.q.len()),
            ("linear", n, self.linear.len()),
            ("a", m * n, self.a.len()),
            ("var_lb", n, self.var_lb.len()),
            ("var_ub", n, self.var_ub.len()),
            ("con_lb", m, self.con_lb.len()),
            ("con_ub", m, self.con_ub.len()),
        ];
        for (name, expected, actual) in checks {
            if expected != actual {
                return Err(ProblemError::BadLength { name, expected, actual });
            }
        }

        if let Some(ref x0) = self.initial_guess {
            if x0.len() != n {
                return Err(ProblemError::BadLength {
                    name: "initial_guess",
                    expected: n,
                    actual: x0.len(),
                });
            }
        }

        Ok(())
    }

    /// Entry (i, j) of the quadratic cost matrix.
    #[inline]
    pub fn q_at(&self, i: usize, j: usize) -> f64 {
        self.q[self.num_vars * i + j]
    }

    /// Entry (i, j) of the constraint matrix (constraint i, variable j).
    #[inline]
    pub fn a_at(&self, i: usize, j: usize) -> f64 {
        self.a[self.num_vars * i + j]
    }
}

/// Options for one QP solve.
#[derive(Debug, Clone)]
pub struct QpOptions {
    /// Convergence tolerance handed to the engine.
    pub tolerance: f64,

    /// Iteration cap for the engine.
    pub max_iterations: usize,

    /// CPU time cap in seconds.
    pub max_cpu_seconds: f64,
}

impl Default for QpOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-7,
            max_iterations: 3000,
            max_cpu_seconds: 600.0,
        }
    }
}

/// How a solve attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Converged to the requested tolerance.
    Converged,

    /// No feasible point exists (or none was found with the penalty
    /// saturated).
    Infeasible,

    /// Iteration cap reached; best iterate retained.
    IterationLimit,

    /// CPU time cap reached; best iterate retained.
    TimeLimit,

    /// The engine gave up (non-finite iterates or no progress possible).
    Abandoned,
}

impl SolveStatus {
    /// True when the solve met its tolerance.
    pub fn is_converged(&self) -> bool {
        matches!(self, SolveStatus::Converged)
    }

    /// True when the returned iterate is meaningful (possibly suboptimal).
    pub fn has_iterate(&self) -> bool {
        !matches!(self, SolveStatus::Abandoned)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Converged => write!(f, "Converged"),
            SolveStatus::Infeasible => write!(f, "Infeasible"),
            SolveStatus::IterationLimit => write!(f, "Iteration Limit"),
            SolveStatus::TimeLimit => write!(f, "Time Limit"),
            SolveStatus::Abandoned => write!(f, "Abandoned"),
        }
    }
}

/// Solution record copied out of the engine at finalization.
///
/// Owned by the caller; shares nothing with the adapter or the engine.
#[derive(Debug, Clone)]
pub struct QpSolution {
    /// Termination status.
    pub status: SolveStatus,

    /// Primal solution (length n).
    pub x: Vec<f64>,

    /// Objective value at `x`.
    pub obj_val: f64,

    /// Iterations performed by the engine.
    pub iterations: usize,

    /// Multipliers for the variable lower bounds (length n).
    pub zl: Vec<f64>,

    /// Multipliers for the variable upper bounds (length n).
    pub zu: Vec<f64>,

    /// Constraint multipliers (length m).
    pub lambda: Vec<f64>,
}
