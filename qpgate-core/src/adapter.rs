//! QP-to-NLP adapter.
//!
//! [`QpNlp`] exposes a [`QpProblem`] through the generic callback contract,
//! mirroring how a dense-QP front end presents itself to a gradient/Hessian
//! engine:
//!
//! - the Jacobian is declared fully dense (n·m entries), every constraint
//!   dependent on every variable regardless of true zeros: part of the
//!   reported contract for a dense front end, not something to optimize
//!   away;
//! - the Hessian is the dense lower triangle, n(n+1)/2 entries;
//! - since every constraint is linear, the Lagrangian Hessian is just
//!   `obj_factor * (Q + Q^T)` and the multipliers contribute nothing.
//!
//! Slice lengths supplied by the engine are checked with `debug_assert!`
//! only; correctness in release builds relies on the descriptor's
//! construction-time validation.

use crate::nlp::{NlpDims, NlpProgram};
use crate::problem::{QpProblem, QpSolution, SolveStatus};

/// Adapter borrowing a QP descriptor for the duration of one solve.
///
/// After the engine finalizes, the solution record is extracted with
/// [`QpNlp::into_solution`] and the adapter is discarded.
pub struct QpNlp<'a> {
    problem: &'a QpProblem,
    solution: Option<QpSolution>,
}

impl<'a> QpNlp<'a> {
    /// Wrap a descriptor. The problem is expected to be validated already.
    pub fn new(problem: &'a QpProblem) -> Self {
        Self { problem, solution: None }
    }

    /// Take the finalized solution, if the engine got that far.
    pub fn into_solution(self) -> Option<QpSolution> {
        self.solution
    }
}

impl NlpProgram for QpNlp<'_> {
    fn dims(&self) -> NlpDims {
        let n = self.problem.num_vars;
        let m = self.problem.num_constraints;
        NlpDims {
            num_vars: n,
            num_constraints: m,
            nnz_jacobian: n * m,
            nnz_hessian: n * (n + 1) / 2,
        }
    }

    fn bounds(&self, x_l: &mut [f64], x_u: &mut [f64], g_l: &mut [f64], g_u: &mut [f64]) {
        let p = self.problem;
        debug_assert_eq!(x_l.len(), p.num_vars);
        debug_assert_eq!(x_u.len(), p.num_vars);
        debug_assert_eq!(g_l.len(), p.num_constraints);
        debug_assert_eq!(g_u.len(), p.num_constraints);

        x_l.copy_from_slice(&p.var_lb);
        x_u.copy_from_slice(&p.var_ub);
        g_l.copy_from_slice(&p.con_lb);
        g_u.copy_from_slice(&p.con_ub);
    }

    fn starting_point(&self, x: &mut [f64], z_l: &mut [f64], z_u: &mut [f64], lambda: &mut [f64]) {
        let p = self.problem;
        debug_assert_eq!(x.len(), p.num_vars);
        debug_assert_eq!(lambda.len(), p.num_constraints);

        match p.initial_guess {
            Some(ref x0) => x.copy_from_slice(x0),
            None => x.fill(0.0),
        }
        z_l.fill(0.0);
        z_u.fill(0.0);
        lambda.fill(0.0);
    }

    fn objective(&self, x: &[f64]) -> f64 {
        let p = self.problem;
        let n = p.num_vars;
        debug_assert_eq!(x.len(), n);

        let mut obj = 0.0;
        for i in 0..n {
            for j in 0..n {
                obj += x[i] * x[j] * p.q_at(i, j);
            }
            obj += x[i] * p.linear[i];
        }
        obj
    }

    fn gradient(&self, x: &[f64], grad: &mut [f64]) {
        let p = self.problem;
        let n = p.num_vars;
        debug_assert_eq!(x.len(), n);
        debug_assert_eq!(grad.len(), n);

        for i in 0..n {
            grad[i] = p.linear[i];
            for j in 0..n {
                grad[i] += (p.q_at(i, j) + p.q_at(j, i)) * x[j];
            }
        }
    }

    fn constraints(&self, x: &[f64], g: &mut [f64]) {
        let p = self.problem;
        debug_assert_eq!(x.len(), p.num_vars);
        debug_assert_eq!(g.len(), p.num_constraints);

        for i in 0..p.num_constraints {
            g[i] = 0.0;
            for j in 0..p.num_vars {
                g[i] += p.a_at(i, j) * x[j];
            }
        }
    }

    fn jacobian_structure(&self, rows: &mut [usize], cols: &mut [usize]) {
        let p = self.problem;
        debug_assert_eq!(rows.len(), p.num_vars * p.num_constraints);
        debug_assert_eq!(cols.len(), rows.len());

        let mut idx = 0;
        for i in 0..p.num_constraints {
            for j in 0..p.num_vars {
                rows[idx] = i;
                cols[idx] = j;
                idx += 1;
            }
        }
    }

    fn jacobian_values(&self, _x: &[f64], values: &mut [f64]) {
        let p = self.problem;
        debug_assert_eq!(values.len(), p.num_vars * p.num_constraints);

        // Same enumeration order as jacobian_structure.
        let mut idx = 0;
        for i in 0..p.num_constraints {
            for j in 0..p.num_vars {
                values[idx] = p.a_at(i, j);
                idx += 1;
            }
        }
    }

    fn hessian_structure(&self, rows: &mut [usize], cols: &mut [usize]) {
        let p = self.problem;
        debug_assert_eq!(rows.len(), p.num_vars * (p.num_vars + 1) / 2);
        debug_assert_eq!(cols.len(), rows.len());

        let mut idx = 0;
        for row in 0..p.num_vars {
            for col in 0..=row {
                rows[idx] = row;
                cols[idx] = col;
                idx += 1;
            }
        }
    }

    fn hessian_values(&self, _x: &[f64], obj_factor: f64, _lambda: &[f64], values: &mut [f64]) {
        let p = self.problem;
        debug_assert_eq!(values.len(), p.num_vars * (p.num_vars + 1) / 2);

        let mut idx = 0;
        for row in 0..p.num_vars {
            for col in 0..=row {
                values[idx] = obj_factor * (p.q_at(row, col) + p.q_at(col, row));
                idx += 1;
            }
        }
    }

    fn finalize(
        &mut self,
        status: SolveStatus,
        x: &[f64],
        z_l: &[f64],
        z_u: &[f64],
        lambda: &[f64],
        obj_val: f64,
        iterations: usize,
    ) {
        debug_assert_eq!(x.len(), self.problem.num_vars);
        debug_assert_eq!(lambda.len(), self.problem.num_constraints);

        // The engine reclaims its buffers as soon as this returns; copy
        // everything into owned storage.
        self.solution = Some(QpSolution {
            status,
            x: x.to_vec(),
            obj_val,
            iterations,
            zl: z_l.to_vec(),
            zu: z_u.to_vec(),
            lambda: lambda.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn problem(n: usize, m: usize, q: Vec<f64>, linear: Vec<f64>, a: Vec<f64>) -> QpProblem {
        QpProblem {
            num_vars: n,
            num_constraints: m,
            q,
            linear,
            a,
            var_lb: vec![-10.0; n],
            var_ub: vec![10.0; n],
            con_lb: vec![-10.0; m],
            con_ub: vec![10.0; m],
            initial_guess: None,
        }
    }

    #[test]
    fn test_dims_dense_contract() {
        let prob = problem(3, 2, vec![0.0; 9], vec![0.0; 3], vec![0.0; 6]);
        let nlp = QpNlp::new(&prob);
        let dims = nlp.dims();
        assert_eq!(dims.num_vars, 3);
        assert_eq!(dims.num_constraints, 2);
        assert_eq!(dims.nnz_jacobian, 6);
        assert_eq!(dims.nnz_hessian, 6);
    }

    #[test]
    fn test_objective_uses_unsymmetrized_q() {
        // Q = [[1, 4], [0, 1]]: f(x) = x1^2 + 4 x1 x2 + x2^2 + l'x
        let prob = problem(2, 0, vec![1.0, 4.0, 0.0, 1.0], vec![1.0, -1.0], vec![]);
        let nlp = QpNlp::new(&prob);

        let x = [2.0, 3.0];
        let expected = 4.0 + 24.0 + 9.0 + 2.0 - 3.0;
        assert!((nlp.objective(&x) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_starting_point_defaults_to_zero() {
        let prob = problem(2, 1, vec![0.0; 4], vec![0.0; 2], vec![1.0, 1.0]);
        let nlp = QpNlp::new(&prob);

        let mut x = [9.0, 9.0];
        let mut zl = [9.0, 9.0];
        let mut zu = [9.0, 9.0];
        let mut lam = [9.0];
        nlp.starting_point(&mut x, &mut zl, &mut zu, &mut lam);
        assert_eq!(x, [0.0, 0.0]);
        assert_eq!(zl, [0.0, 0.0]);
        assert_eq!(zu, [0.0, 0.0]);
        assert_eq!(lam, [0.0]);
    }

    #[test]
    fn test_starting_point_uses_guess() {
        let mut prob = problem(2, 0, vec![0.0; 4], vec![0.0; 2], vec![]);
        prob.initial_guess = Some(vec![0.25, -0.5]);
        let nlp = QpNlp::new(&prob);

        let mut x = [0.0, 0.0];
        let (mut zl, mut zu) = ([0.0; 2], [0.0; 2]);
        nlp.starting_point(&mut x, &mut zl, &mut zu, &mut []);
        assert_eq!(x, [0.25, -0.5]);
    }

    #[test]
    fn test_jacobian_structure_matches_values() {
        let n = 3;
        let m = 2;
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let prob = problem(n, m, vec![0.0; 9], vec![0.0; 3], a.clone());
        let nlp = QpNlp::new(&prob);

        let nnz = n * m;
        let mut rows = vec![0; nnz];
        let mut cols = vec![0; nnz];
        let mut values = vec![0.0; nnz];
        nlp.jacobian_structure(&mut rows, &mut cols);
        nlp.jacobian_values(&[0.0; 3], &mut values);

        // Row-major enumeration, value k belongs to (rows[k], cols[k]).
        for k in 0..nnz {
            assert_eq!(rows[k], k / n);
            assert_eq!(cols[k], k % n);
            assert_eq!(values[k], a[rows[k] * n + cols[k]]);
        }
    }

    #[test]
    fn test_jacobian_empty_when_no_constraints() {
        let prob = problem(2, 0, vec![0.0; 4], vec![0.0; 2], vec![]);
        let nlp = QpNlp::new(&prob);
        assert_eq!(nlp.dims().nnz_jacobian, 0);

        // Zero-length callbacks are fine, not an error.
        nlp.jacobian_structure(&mut [], &mut []);
        nlp.jacobian_values(&[0.0, 0.0], &mut []);
        nlp.constraints(&[0.0, 0.0], &mut []);
    }

    #[test]
    fn test_hessian_symmetric_q() {
        // Symmetric Q: values must be exactly 2 * Q on the lower triangle.
        let q = vec![2.0, 1.0, 1.0, 3.0];
        let prob = problem(2, 0, q.clone(), vec![0.0; 2], vec![]);
        let nlp = QpNlp::new(&prob);

        let mut rows = vec![0; 3];
        let mut cols = vec![0; 3];
        let mut values = vec![0.0; 3];
        nlp.hessian_structure(&mut rows, &mut cols);
        nlp.hessian_values(&[0.0; 2], 1.0, &[], &mut values);

        assert_eq!(rows, vec![0, 1, 1]);
        assert_eq!(cols, vec![0, 0, 1]);
        for k in 0..3 {
            assert_eq!(values[k], 2.0 * q[2 * rows[k] + cols[k]]);
        }
    }

    #[test]
    fn test_hessian_asymmetric_q_and_obj_factor() {
        // Asymmetric Q: entry (r, c) must be obj_factor * (Q[r,c] + Q[c,r]).
        let q = vec![1.0, 5.0, 2.0, 4.0];
        let prob = problem(2, 0, q.clone(), vec![0.0; 2], vec![]);
        let nlp = QpNlp::new(&prob);

        let mut values = vec![0.0; 3];
        nlp.hessian_values(&[0.0; 2], 0.5, &[], &mut values);

        // (0,0), (1,0), (1,1)
        assert_eq!(values[0], 0.5 * (1.0 + 1.0));
        assert_eq!(values[1], 0.5 * (2.0 + 5.0));
        assert_eq!(values[2], 0.5 * (4.0 + 4.0));
    }

    #[test]
    fn test_finalize_copies_out() {
        let prob = problem(2, 1, vec![0.0; 4], vec![0.0; 2], vec![1.0, 1.0]);
        let mut nlp = QpNlp::new(&prob);

        let x = vec![0.5, 0.5];
        nlp.finalize(SolveStatus::Converged, &x, &[0.0; 2], &[0.0; 2], &[-2.0], 1.0, 7);
        drop(x); // solution must not alias engine buffers

        let sol = nlp.into_solution().unwrap();
        assert_eq!(sol.status, SolveStatus::Converged);
        assert_eq!(sol.x, vec![0.5, 0.5]);
        assert_eq!(sol.lambda, vec![-2.0]);
        assert_eq!(sol.iterations, 7);
        assert!((sol.obj_val - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_solution_before_finalize() {
        let prob = problem(1, 0, vec![1.0], vec![0.0], vec![]);
        let nlp = QpNlp::new(&prob);
        assert!(nlp.into_solution().is_none());
    }

    proptest! {
        /// Finite differences of the objective match the analytic gradient.
        #[test]
        fn prop_gradient_matches_finite_difference(
            n in 1usize..5,
            seed_q in proptest::collection::vec(-2.0f64..2.0, 25),
            seed_l in proptest::collection::vec(-2.0f64..2.0, 5),
            seed_x in proptest::collection::vec(-1.0f64..1.0, 5),
        ) {
            let q: Vec<f64> = seed_q[..n * n].to_vec();
            let linear: Vec<f64> = seed_l[..n].to_vec();
            let x: Vec<f64> = seed_x[..n].to_vec();

            let prob = problem(n, 0, q, linear, vec![]);
            let nlp = QpNlp::new(&prob);

            let mut grad = vec![0.0; n];
            nlp.gradient(&x, &mut grad);

            let h = 1e-6;
            for i in 0..n {
                let mut xp = x.clone();
                let mut xm = x.clone();
                xp[i] += h;
                xm[i] -= h;
                let fd = (nlp.objective(&xp) - nlp.objective(&xm)) / (2.0 * h);
                prop_assert!(
                    (fd - grad[i]).abs() <= 1e-6 * (1.0 + grad[i].abs()),
                    "component {}: fd={} analytic={}", i, fd, grad[i]
                );
            }
        }

        /// Structure and value enumeration orders agree for arbitrary shapes.
        #[test]
        fn prop_jacobian_order_identity(n in 1usize..5, m in 0usize..4) {
            let a: Vec<f64> = (0..n * m).map(|k| k as f64 + 1.0).collect();
            let prob = problem(n, m, vec![0.0; n * n], vec![0.0; n], a);
            let nlp = QpNlp::new(&prob);

            let nnz = n * m;
            let mut rows = vec![0; nnz];
            let mut cols = vec![0; nnz];
            let mut values = vec![0.0; nnz];
            nlp.jacobian_structure(&mut rows, &mut cols);
            nlp.jacobian_values(&vec![0.0; n], &mut values);

            for k in 0..nnz {
                prop_assert_eq!(values[k], prob.a_at(rows[k], cols[k]));
                if k > 0 {
                    // Strictly increasing in row-major order.
                    prop_assert!(rows[k] * n + cols[k] > rows[k - 1] * n + cols[k - 1]);
                }
            }
        }
    }
}
