//! Owned solver session.
//!
//! The session replaces a process-wide, open/close-gated engine environment
//! with a plain value: load a problem into a [`MilpSession`], query and
//! adjust it, hand it to an engine, read the outcome. Independent sessions
//! coexist freely, which is also what makes them testable in isolation.
//!
//! The constraint matrix is held in the engine's native column-major
//! storage; the host-facing retrieval path converts it to row-major with
//! one-based column positions, the single place the external index
//! convention is applied.

use log::{debug, info};
use qpgate_core::sparse::{csc_to_row_major, spmv, RowMajor, SparseCsc};

use crate::engine::{MilpEngine, MilpOptions};
use crate::error::{MilpError, MilpResult};
use crate::outcome::MilpOutcome;

/// Variable kind for mixed-integer problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Continuous variable.
    Continuous,
    /// Integer variable.
    Integer,
    /// Binary variable (0 or 1).
    Binary,
}

/// Objective direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjSense {
    /// Minimize the objective (default).
    #[default]
    Minimize,
    /// Maximize the objective.
    Maximize,
}

/// Problem data loaded into a session, validated atomically.
#[derive(Debug, Clone)]
pub struct MilpProblem {
    /// Number of variables n (columns of `a`).
    pub num_vars: usize,

    /// Number of constraints m (rows of `a`).
    pub num_constraints: usize,

    /// Constraint matrix, m x n, column-major.
    pub a: SparseCsc,

    /// Objective coefficients (length n).
    pub obj: Vec<f64>,

    /// Objective direction.
    pub obj_sense: ObjSense,

    /// Variable lower bounds (length n).
    pub var_lb: Vec<f64>,

    /// Variable upper bounds (length n).
    pub var_ub: Vec<f64>,

    /// Constraint lower bounds (length m).
    pub con_lb: Vec<f64>,

    /// Constraint upper bounds (length m).
    pub con_ub: Vec<f64>,

    /// Per-variable kinds (length n).
    pub kinds: Vec<VarKind>,
}

impl MilpProblem {
    fn validate(&self) -> MilpResult<()> {
        let n = self.num_vars;
        let m = self.num_constraints;

        if self.a.rows() != m || self.a.cols() != n {
            return Err(MilpError::BadMatrixShape {
                rows: m,
                cols: n,
                actual_rows: self.a.rows(),
                actual_cols: self.a.cols(),
            });
        }

        let checks: [(&'static str, usize, usize); 6] = [
            ("obj", n, self.obj.len()),
            ("var_lb", n, self.var_lb.len()),
            ("var_ub", n, self.var_ub.len()),
            ("con_lb", m, self.con_lb.len()),
            ("con_ub", m, self.con_ub.len()),
            ("kinds", n, self.kinds.len()),
        ];
        for (name, expected, actual) in checks {
            if expected != actual {
                return Err(MilpError::BadLength { name, expected, actual });
            }
        }
        Ok(())
    }
}

/// Host-facing row-major view of the constraint matrix.
///
/// `column_position` is one-based, per the host convention; everything
/// inside the bridge stays zero-based.
#[derive(Debug, Clone, PartialEq)]
pub struct HostMatrix {
    /// Non-zero count of each row.
    pub count_per_row: Vec<usize>,

    /// One-based column of each non-zero entry.
    pub column_position: Vec<usize>,

    /// Non-zero values.
    pub values: Vec<f64>,
}

/// An owned solve session around an opaque linear engine.
#[derive(Debug, Clone)]
pub struct MilpSession {
    problem: MilpProblem,
    primal_bound: Option<f64>,
    candidate: Option<Vec<f64>>,
    last_outcome: Option<MilpOutcome>,
}

impl MilpSession {
    /// Value the session reports as infinity for unbounded directions.
    pub const INFINITY: f64 = f64::INFINITY;

    /// Load a problem, validating every dimension before the session
    /// exists.
    pub fn load(problem: MilpProblem) -> MilpResult<Self> {
        problem.validate()?;
        debug!(
            "session loaded: n={} m={} nnz={}",
            problem.num_vars,
            problem.num_constraints,
            problem.a.nnz()
        );
        Ok(Self {
            problem,
            primal_bound: None,
            candidate: None,
            last_outcome: None,
        })
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.problem.num_vars
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.problem.num_constraints
    }

    /// Number of stored constraint-matrix entries.
    pub fn num_elements(&self) -> usize {
        self.problem.a.nnz()
    }

    /// Objective coefficients.
    pub fn objective_coefficients(&self) -> &[f64] {
        &self.problem.obj
    }

    /// Replace one objective coefficient.
    pub fn set_objective_coefficient(&mut self, var: usize, value: f64) -> MilpResult<()> {
        self.check_var(var)?;
        self.problem.obj[var] = value;
        self.last_outcome = None;
        Ok(())
    }

    /// Objective direction.
    pub fn objective_sense(&self) -> ObjSense {
        self.problem.obj_sense
    }

    /// Set the objective direction.
    pub fn set_objective_sense(&mut self, sense: ObjSense) {
        self.problem.obj_sense = sense;
        self.last_outcome = None;
    }

    /// Variable lower bounds.
    pub fn var_lower(&self) -> &[f64] {
        &self.problem.var_lb
    }

    /// Variable upper bounds.
    pub fn var_upper(&self) -> &[f64] {
        &self.problem.var_ub
    }

    /// Set one variable's lower bound.
    pub fn set_var_lower(&mut self, var: usize, bound: f64) -> MilpResult<()> {
        self.check_var(var)?;
        self.problem.var_lb[var] = bound;
        self.last_outcome = None;
        Ok(())
    }

    /// Set one variable's upper bound.
    pub fn set_var_upper(&mut self, var: usize, bound: f64) -> MilpResult<()> {
        self.check_var(var)?;
        self.problem.var_ub[var] = bound;
        self.last_outcome = None;
        Ok(())
    }

    /// Constraint lower bounds.
    pub fn constraint_lower(&self) -> &[f64] {
        &self.problem.con_lb
    }

    /// Constraint upper bounds.
    pub fn constraint_upper(&self) -> &[f64] {
        &self.problem.con_ub
    }

    /// Set one constraint's lower bound.
    pub fn set_constraint_lower(&mut self, con: usize, bound: f64) -> MilpResult<()> {
        self.check_con(con)?;
        self.problem.con_lb[con] = bound;
        self.last_outcome = None;
        Ok(())
    }

    /// Set one constraint's upper bound.
    pub fn set_constraint_upper(&mut self, con: usize, bound: f64) -> MilpResult<()> {
        self.check_con(con)?;
        self.problem.con_ub[con] = bound;
        self.last_outcome = None;
        Ok(())
    }

    /// Kind of one variable.
    pub fn var_kind(&self, var: usize) -> MilpResult<VarKind> {
        self.check_var(var)?;
        Ok(self.problem.kinds[var])
    }

    /// Whether a variable is continuous.
    pub fn is_continuous(&self, var: usize) -> MilpResult<bool> {
        Ok(self.var_kind(var)? == VarKind::Continuous)
    }

    /// Whether a variable is integer (binary counts).
    pub fn is_integer(&self, var: usize) -> MilpResult<bool> {
        Ok(matches!(self.var_kind(var)?, VarKind::Integer | VarKind::Binary))
    }

    /// Whether a variable is binary.
    pub fn is_binary(&self, var: usize) -> MilpResult<bool> {
        Ok(self.var_kind(var)? == VarKind::Binary)
    }

    /// Mark a variable integer.
    pub fn set_integer(&mut self, var: usize) -> MilpResult<()> {
        self.check_var(var)?;
        self.problem.kinds[var] = VarKind::Integer;
        self.last_outcome = None;
        Ok(())
    }

    /// Mark a variable continuous.
    pub fn set_continuous(&mut self, var: usize) -> MilpResult<()> {
        self.check_var(var)?;
        self.problem.kinds[var] = VarKind::Continuous;
        self.last_outcome = None;
        Ok(())
    }

    /// The constraint matrix in the engine's native column-major storage.
    pub fn constraint_matrix(&self) -> &SparseCsc {
        &self.problem.a
    }

    /// The constraint matrix converted to row-major storage (zero-based).
    pub fn constraint_matrix_row_major(&self) -> RowMajor {
        csc_to_row_major(&self.problem.a)
    }

    /// Host-facing retrieval: row-major with one-based column positions.
    pub fn constraint_matrix_host(&self) -> HostMatrix {
        let rm = self.constraint_matrix_row_major();
        HostMatrix {
            column_position: rm.one_based_columns(),
            count_per_row: rm.count_per_row,
            values: rm.values,
        }
    }

    /// Known primal bound, if any.
    pub fn primal_bound(&self) -> Option<f64> {
        self.primal_bound
    }

    /// Supply a primal bound to the engine.
    pub fn set_primal_bound(&mut self, bound: f64) {
        self.primal_bound = Some(bound);
    }

    /// Candidate (warm-start) solution, if any.
    pub fn candidate(&self) -> Option<&[f64]> {
        self.candidate.as_deref()
    }

    /// Supply a candidate solution for the engine to improve on.
    pub fn set_candidate(&mut self, x: Vec<f64>) -> MilpResult<()> {
        if x.len() != self.problem.num_vars {
            return Err(MilpError::BadLength {
                name: "candidate",
                expected: self.problem.num_vars,
                actual: x.len(),
            });
        }
        self.candidate = Some(x);
        Ok(())
    }

    /// Run the engine against the loaded problem and store the outcome.
    pub fn solve(
        &mut self,
        engine: &mut dyn MilpEngine,
        options: &MilpOptions,
    ) -> MilpResult<&MilpOutcome> {
        let outcome = engine.solve(self, options)?;
        info!(
            "milp solve finished: status={} obj={:.6e} iterations={}",
            outcome.status, outcome.obj_val, outcome.iterations
        );
        Ok(self.last_outcome.insert(outcome))
    }

    /// Status of the last solve.
    pub fn status(&self) -> MilpResult<crate::outcome::MilpStatus> {
        Ok(self.outcome()?.status)
    }

    /// Incumbent solution of the last solve.
    pub fn var_soln(&self) -> MilpResult<&[f64]> {
        let outcome = self.outcome()?;
        if !outcome.status.has_solution() {
            return Err(MilpError::NoSolution);
        }
        Ok(&outcome.x)
    }

    /// Objective value of the last solve's incumbent.
    pub fn obj_val(&self) -> MilpResult<f64> {
        let outcome = self.outcome()?;
        if !outcome.status.has_solution() {
            return Err(MilpError::NoSolution);
        }
        Ok(outcome.obj_val)
    }

    /// Iterations the last solve used.
    pub fn iteration_count(&self) -> MilpResult<usize> {
        Ok(self.outcome()?.iterations)
    }

    /// Constraint activity A*x at the last incumbent.
    pub fn row_activity(&self) -> MilpResult<Vec<f64>> {
        let x = self.var_soln()?;
        let mut activity = vec![0.0; self.problem.num_constraints];
        spmv(&self.problem.a, x, &mut activity);
        Ok(activity)
    }

    fn outcome(&self) -> MilpResult<&MilpOutcome> {
        self.last_outcome.as_ref().ok_or(MilpError::NoSolution)
    }

    fn check_var(&self, var: usize) -> MilpResult<()> {
        if var >= self.problem.num_vars {
            return Err(MilpError::VariableOutOfRange {
                index: var,
                num_vars: self.problem.num_vars,
            });
        }
        Ok(())
    }

    fn check_con(&self, con: usize) -> MilpResult<()> {
        if con >= self.problem.num_constraints {
            return Err(MilpError::ConstraintOutOfRange {
                index: con,
                num_constraints: self.problem.num_constraints,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpgate_core::sparse::from_triplets;

    fn two_var_problem() -> MilpProblem {
        // x1 + 2 x2 <= 4, both variables binary.
        MilpProblem {
            num_vars: 2,
            num_constraints: 1,
            a: from_triplets(1, 2, vec![(0, 0, 1.0), (0, 1, 2.0)]),
            obj: vec![1.0, 1.0],
            obj_sense: ObjSense::Minimize,
            var_lb: vec![0.0, 0.0],
            var_ub: vec![1.0, 1.0],
            con_lb: vec![f64::NEG_INFINITY],
            con_ub: vec![4.0],
            kinds: vec![VarKind::Binary, VarKind::Binary],
        }
    }

    #[test]
    fn test_load_validates_shapes() {
        let mut prob = two_var_problem();
        prob.obj.pop();
        assert_eq!(
            MilpSession::load(prob).unwrap_err(),
            MilpError::BadLength { name: "obj", expected: 2, actual: 1 }
        );

        let mut prob = two_var_problem();
        prob.num_constraints = 2;
        assert!(matches!(
            MilpSession::load(prob).unwrap_err(),
            MilpError::BadMatrixShape { .. }
        ));
    }

    #[test]
    fn test_kind_queries() {
        let mut session = MilpSession::load(two_var_problem()).unwrap();

        assert!(session.is_binary(0).unwrap());
        assert!(session.is_integer(0).unwrap());
        assert!(!session.is_continuous(0).unwrap());

        session.set_continuous(0).unwrap();
        assert!(session.is_continuous(0).unwrap());

        session.set_integer(0).unwrap();
        assert_eq!(session.var_kind(0).unwrap(), VarKind::Integer);

        assert_eq!(
            session.set_integer(5).unwrap_err(),
            MilpError::VariableOutOfRange { index: 5, num_vars: 2 }
        );
    }

    #[test]
    fn test_host_matrix_is_one_based() {
        let session = MilpSession::load(two_var_problem()).unwrap();
        let host = session.constraint_matrix_host();

        assert_eq!(host.count_per_row, vec![2]);
        assert_eq!(host.column_position, vec![1, 2]);
        assert_eq!(host.values, vec![1.0, 2.0]);

        // The internal view stays zero-based.
        let rm = session.constraint_matrix_row_major();
        assert_eq!(rm.column_position, vec![0, 1]);
    }

    #[test]
    fn test_queries_before_solve_fail() {
        let session = MilpSession::load(two_var_problem()).unwrap();
        assert_eq!(session.status().unwrap_err(), MilpError::NoSolution);
        assert_eq!(session.obj_val().unwrap_err(), MilpError::NoSolution);
        assert_eq!(session.iteration_count().unwrap_err(), MilpError::NoSolution);
    }

    #[test]
    fn test_primal_bound_and_infinity() {
        let mut session = MilpSession::load(two_var_problem()).unwrap();

        assert!(MilpSession::INFINITY.is_infinite());
        assert!(MilpSession::INFINITY > 0.0);
        assert_eq!(session.constraint_lower()[0], -MilpSession::INFINITY);

        assert_eq!(session.primal_bound(), None);
        session.set_primal_bound(3.5);
        assert_eq!(session.primal_bound(), Some(3.5));
    }

    #[test]
    fn test_constraint_bound_mutators() {
        let mut session = MilpSession::load(two_var_problem()).unwrap();

        session.set_constraint_lower(0, 1.0).unwrap();
        session.set_constraint_upper(0, 3.0).unwrap();
        assert_eq!(session.constraint_lower(), &[1.0]);
        assert_eq!(session.constraint_upper(), &[3.0]);

        assert_eq!(
            session.set_constraint_lower(1, 0.0).unwrap_err(),
            MilpError::ConstraintOutOfRange { index: 1, num_constraints: 1 }
        );
        assert_eq!(
            session.set_constraint_upper(7, 0.0).unwrap_err(),
            MilpError::ConstraintOutOfRange { index: 7, num_constraints: 1 }
        );
    }

    #[test]
    fn test_candidate_length_checked() {
        let mut session = MilpSession::load(two_var_problem()).unwrap();
        assert!(session.set_candidate(vec![1.0, 0.0]).is_ok());
        assert_eq!(
            session.set_candidate(vec![1.0]).unwrap_err(),
            MilpError::BadLength { name: "candidate", expected: 2, actual: 1 }
        );
    }
}
