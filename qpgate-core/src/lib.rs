//! qpgate-core: a bridge between dense quadratic programs and
//! derivative-based nonlinear solver engines.
//!
//! The crate has four pieces:
//!
//! - **Sparse format conversion** ([`sparse`]): column-major (CSC) storage,
//!   as used by the linear engine, converted to and from the row-major
//!   layout the host retrieves.
//! - **Problem descriptor** ([`problem::QpProblem`]): an immutable dense QP
//!   with optional initial guess, validated once at the boundary.
//! - **QP-to-NLP adapter** ([`adapter::QpNlp`]): exposes the descriptor
//!   through the five-callback contract ([`nlp::NlpProgram`]) that
//!   gradient/Hessian engines consume.
//! - **Orchestration** ([`solve::solve_qp`]): configures an engine behind
//!   the [`engine::NlpEngine`] seam and extracts the solution record.
//!
//! # Example
//!
//! ```
//! use qpgate_core::{solve_qp, ProjectedLagrangianEngine, QpOptions, QpProblem};
//!
//! // minimize x1^2 + x2^2  subject to  x1 + x2 = 1,  0 <= x <= 1
//! let problem = QpProblem {
//!     num_vars: 2,
//!     num_constraints: 1,
//!     q: vec![1.0, 0.0, 0.0, 1.0],
//!     linear: vec![0.0, 0.0],
//!     a: vec![1.0, 1.0],
//!     var_lb: vec![0.0, 0.0],
//!     var_ub: vec![1.0, 1.0],
//!     con_lb: vec![1.0],
//!     con_ub: vec![1.0],
//!     initial_guess: None,
//! };
//!
//! let mut engine = ProjectedLagrangianEngine::new();
//! let solution = solve_qp(&problem, &QpOptions::default(), &mut engine).unwrap();
//! assert!(solution.status.is_converged());
//! assert!((solution.x[0] - 0.5).abs() < 1e-4);
//! ```

#![warn(clippy::all)]

pub mod adapter;
pub mod engine;
pub mod nlp;
pub mod problem;
pub mod projected;
pub mod solve;
pub mod sparse;

pub use adapter::QpNlp;
pub use engine::{EngineError, EngineOptions, NlpEngine};
pub use nlp::{NlpDims, NlpProgram};
pub use problem::{ProblemError, QpOptions, QpProblem, QpSolution, SolveStatus};
pub use projected::ProjectedLagrangianEngine;
pub use solve::{solve_qp, SolveError};
pub use sparse::{csc_to_row_major, row_major_to_csc, RowMajor, SparseCsc};
