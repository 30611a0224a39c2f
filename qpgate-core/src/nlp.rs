//! The callback contract between a problem and a derivative-based engine.
//!
//! Derivative-based engines query a problem through a fixed set of
//! callbacks: sizing, bounds, a starting point, objective/gradient,
//! constraints/Jacobian, the Lagrangian Hessian, and a final notification
//! carrying the solution. All buffers are engine-owned; callbacks fill the
//! slices they are handed and must not retain them.
//!
//! Index convention is zero-based throughout. Callbacks are infallible by
//! contract: a program that cannot evaluate itself is a construction-time
//! error, not a runtime one.

use crate::problem::SolveStatus;

/// Problem sizes reported to the engine before any allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NlpDims {
    /// Number of primal variables n.
    pub num_vars: usize,

    /// Number of constraints m.
    pub num_constraints: usize,

    /// Entries the Jacobian structure/value callbacks will emit.
    pub nnz_jacobian: usize,

    /// Entries the Hessian structure/value callbacks will emit.
    pub nnz_hessian: usize,
}

/// A nonlinear program, as seen by an [`NlpEngine`](crate::engine::NlpEngine).
///
/// Structure callbacks (`jacobian_structure`, `hessian_structure`) and their
/// value counterparts must enumerate entries in exactly the same order; the
/// engine pairs them positionally.
pub trait NlpProgram {
    /// Problem dimensions.
    fn dims(&self) -> NlpDims;

    /// Fill variable bounds (length n) and constraint bounds (length m).
    fn bounds(&self, x_l: &mut [f64], x_u: &mut [f64], g_l: &mut [f64], g_u: &mut [f64]);

    /// Fill the starting point: primal variables, bound multipliers, and
    /// constraint multipliers.
    fn starting_point(&self, x: &mut [f64], z_l: &mut [f64], z_u: &mut [f64], lambda: &mut [f64]);

    /// Objective value at `x`.
    fn objective(&self, x: &[f64]) -> f64;

    /// Objective gradient at `x` (length n).
    fn gradient(&self, x: &[f64], grad: &mut [f64]);

    /// Constraint values at `x` (length m).
    fn constraints(&self, x: &[f64], g: &mut [f64]);

    /// Jacobian sparsity structure: (constraint, variable) index pairs.
    fn jacobian_structure(&self, rows: &mut [usize], cols: &mut [usize]);

    /// Jacobian values at `x`, in the order `jacobian_structure` declared.
    fn jacobian_values(&self, x: &[f64], values: &mut [f64]);

    /// Lagrangian Hessian sparsity structure (lower triangle, row >= col).
    fn hessian_structure(&self, rows: &mut [usize], cols: &mut [usize]);

    /// Lagrangian Hessian values at `x`, in the order `hessian_structure`
    /// declared. `obj_factor` scales the objective part; `lambda` weights
    /// the constraint parts.
    fn hessian_values(&self, x: &[f64], obj_factor: f64, lambda: &[f64], values: &mut [f64]);

    /// Called once when the engine stops, successfully or not.
    ///
    /// Every slice is engine-owned and reclaimed immediately after this
    /// returns; implementations must copy what they keep.
    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &mut self,
        status: SolveStatus,
        x: &[f64],
        z_l: &[f64],
        z_u: &[f64],
        lambda: &[f64],
        obj_val: f64,
        iterations: usize,
    );
}
