//! First-order reference engine.
//!
//! [`ProjectedLagrangianEngine`] drives an [`NlpProgram`] with an augmented
//! Lagrangian method: bound-constrained inner subproblems are minimized by
//! projected gradient with backtracking, multipliers are updated from the
//! shifted penalty between subproblems, and the penalty grows when the
//! constraint violation stops shrinking.
//!
//! This is the workspace's in-tree `NlpEngine`; it exists so the
//! orchestrator can run end to end without an external solver binary. It is
//! first-order only and never calls the Hessian callbacks. Deployments with
//! access to a real derivative-based engine plug it in behind the same
//! trait.

use std::time::Instant;

use log::debug;

use crate::engine::{EngineError, EngineOptions, NlpEngine};
use crate::nlp::NlpProgram;
use crate::problem::SolveStatus;

/// Outer (multiplier-update) iteration cap.
const MAX_OUTER: usize = 40;

/// Initial and maximum penalty parameters.
const RHO_INIT: f64 = 10.0;
const RHO_MAX: f64 = 1e8;

/// Outer iterations with saturated penalty and stalled violation before the
/// problem is declared infeasible.
const STALL_LIMIT: usize = 4;

/// Augmented-Lagrangian engine over the callback contract.
#[derive(Debug, Default)]
pub struct ProjectedLagrangianEngine {
    options: Option<EngineOptions>,
}

impl ProjectedLagrangianEngine {
    /// Create an unconfigured engine; `initialize` must run before
    /// `optimize`.
    pub fn new() -> Self {
        Self { options: None }
    }
}

impl NlpEngine for ProjectedLagrangianEngine {
    fn initialize(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        if !(options.tolerance > 0.0 && options.tolerance.is_finite()) {
            return Err(EngineError::Initialization(format!(
                "tolerance must be positive and finite, got {}",
                options.tolerance
            )));
        }
        if options.max_iterations == 0 {
            return Err(EngineError::Initialization(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(options.max_cpu_seconds > 0.0) {
            return Err(EngineError::Initialization(format!(
                "max_cpu_seconds must be positive, got {}",
                options.max_cpu_seconds
            )));
        }
        self.options = Some(options.clone());
        Ok(())
    }

    fn optimize(&mut self, program: &mut dyn NlpProgram) -> Result<(), EngineError> {
        let opts = self
            .options
            .clone()
            .ok_or_else(|| EngineError::Initialization("optimize called before initialize".to_string()))?;

        let dims = program.dims();
        let n = dims.num_vars;
        let m = dims.num_constraints;
        if n == 0 {
            return Err(EngineError::Optimization("program has no variables".to_string()));
        }

        let mut x_l = vec![0.0; n];
        let mut x_u = vec![0.0; n];
        let mut g_l = vec![0.0; m];
        let mut g_u = vec![0.0; m];
        program.bounds(&mut x_l, &mut x_u, &mut g_l, &mut g_u);

        // Bound ordering is the engine's diagnosis, not the descriptor's.
        for i in 0..n {
            if x_l[i] > x_u[i] {
                return Err(EngineError::Optimization(format!(
                    "variable {} has lower bound {} above upper bound {}",
                    i, x_l[i], x_u[i]
                )));
            }
        }
        for i in 0..m {
            if g_l[i] > g_u[i] {
                return Err(EngineError::Optimization(format!(
                    "constraint {} has lower bound {} above upper bound {}",
                    i, g_l[i], g_u[i]
                )));
            }
        }

        let mut x = vec![0.0; n];
        let mut z_l = vec![0.0; n];
        let mut z_u = vec![0.0; n];
        let mut lambda = vec![0.0; m];
        program.starting_point(&mut x, &mut z_l, &mut z_u, &mut lambda);
        for i in 0..n {
            x[i] = x[i].clamp(x_l[i], x_u[i]);
        }

        // The Jacobian structure is fixed; values are re-read per iterate
        // only when the program does not declare them constant.
        let nnz_j = dims.nnz_jacobian;
        let mut j_rows = vec![0usize; nnz_j];
        let mut j_cols = vec![0usize; nnz_j];
        let mut j_vals = vec![0.0; nnz_j];
        program.jacobian_structure(&mut j_rows, &mut j_cols);
        program.jacobian_values(&x, &mut j_vals);

        let mut g = vec![0.0; m];
        let mut g_trial = vec![0.0; m];
        let mut grad_f = vec![0.0; n];
        let mut grad_l = vec![0.0; n];
        let mut pen = vec![0.0; m];
        let mut x_trial = vec![0.0; n];

        let tol = opts.tolerance;
        let mut rho = RHO_INIT;
        let mut v_best = f64::INFINITY;
        let mut stall = 0usize;
        let mut iterations = 0usize;
        let mut status = None;
        let started = Instant::now();

        'outer: for outer in 0..MAX_OUTER {
            // Inner subproblems are solved loosely at first, then to the
            // engine tolerance as the multipliers settle.
            let inner_tol = if m == 0 {
                tol
            } else {
                (1e-2 * 0.1f64.powi(outer as i32)).max(tol)
            };
            let mut step = 1.0 / rho;

            // Inner loop: projected gradient on the augmented Lagrangian.
            loop {
                if iterations >= opts.max_iterations {
                    status = Some(SolveStatus::IterationLimit);
                    break 'outer;
                }
                if started.elapsed().as_secs_f64() > opts.max_cpu_seconds {
                    status = Some(SolveStatus::TimeLimit);
                    break 'outer;
                }

                program.constraints(&x, &mut g);
                if !opts.constant_jacobian {
                    program.jacobian_values(&x, &mut j_vals);
                }

                let mut merit = program.objective(&x);
                for i in 0..m {
                    let shifted = g[i] + lambda[i] / rho;
                    let excess = shifted - shifted.clamp(g_l[i], g_u[i]);
                    pen[i] = rho * excess;
                    merit += 0.5 * rho * excess * excess;
                }

                program.gradient(&x, &mut grad_f);
                grad_l.copy_from_slice(&grad_f);
                for k in 0..nnz_j {
                    grad_l[j_cols[k]] += j_vals[k] * pen[j_rows[k]];
                }

                if !merit.is_finite() || grad_l.iter().any(|v| !v.is_finite()) {
                    status = Some(SolveStatus::Abandoned);
                    break 'outer;
                }

                let pg = projected_gradient_norm(&x, &grad_l, &x_l, &x_u);
                if pg <= inner_tol {
                    break;
                }

                // Backtracking line search on the merit function, starting
                // above the last accepted step.
                step = (step * 4.0).min(1e8);
                let mut accepted = false;
                for _ in 0..60 {
                    for i in 0..n {
                        x_trial[i] = (x[i] - step * grad_l[i]).clamp(x_l[i], x_u[i]);
                    }
                    program.constraints(&x_trial, &mut g_trial);
                    let mut merit_trial = program.objective(&x_trial);
                    for i in 0..m {
                        let shifted = g_trial[i] + lambda[i] / rho;
                        let excess = shifted - shifted.clamp(g_l[i], g_u[i]);
                        merit_trial += 0.5 * rho * excess * excess;
                    }

                    let decrease: f64 =
                        (0..n).map(|i| grad_l[i] * (x_trial[i] - x[i])).sum();
                    if merit_trial.is_finite() && merit_trial <= merit + 1e-4 * decrease {
                        x.copy_from_slice(&x_trial);
                        accepted = true;
                        break;
                    }
                    step *= 0.5;
                }

                iterations += 1;
                if !accepted {
                    // Merit can no longer be decreased at this penalty
                    // level; hand control back to the outer loop.
                    break;
                }
            }

            // Outer update: violation, candidate multipliers, stationarity.
            program.constraints(&x, &mut g);
            let mut violation = 0.0f64;
            for i in 0..m {
                violation = violation.max((g[i] - g[i].clamp(g_l[i], g_u[i])).abs());
            }

            let lambda_cand: Vec<f64> = (0..m)
                .map(|i| {
                    let shifted = g[i] + lambda[i] / rho;
                    rho * (shifted - shifted.clamp(g_l[i], g_u[i]))
                })
                .collect();

            if !opts.constant_jacobian {
                program.jacobian_values(&x, &mut j_vals);
            }
            program.gradient(&x, &mut grad_f);
            grad_l.copy_from_slice(&grad_f);
            for k in 0..nnz_j {
                grad_l[j_cols[k]] += j_vals[k] * lambda_cand[j_rows[k]];
            }
            let pg = projected_gradient_norm(&x, &grad_l, &x_l, &x_u);

            debug!(
                "outer {}: violation={:.3e} stationarity={:.3e} rho={:.1e} iters={}",
                outer, violation, pg, rho, iterations
            );

            if violation <= tol && pg <= tol {
                lambda = lambda_cand;
                status = Some(SolveStatus::Converged);
                break;
            }

            if violation <= (0.25 * v_best).max(tol) {
                lambda = lambda_cand;
                stall = 0;
            } else if rho < RHO_MAX {
                rho *= 10.0;
            } else {
                stall += 1;
                if stall >= STALL_LIMIT {
                    status = Some(SolveStatus::Infeasible);
                    break;
                }
            }
            v_best = v_best.min(violation);
        }

        let status = status.unwrap_or(SolveStatus::IterationLimit);

        // Bound multipliers from the reduced gradient at the final point:
        // grad f + J' lambda - z_L + z_U = 0.
        program.constraints(&x, &mut g);
        program.gradient(&x, &mut grad_f);
        if !opts.constant_jacobian {
            program.jacobian_values(&x, &mut j_vals);
        }
        grad_l.copy_from_slice(&grad_f);
        for k in 0..nnz_j {
            grad_l[j_cols[k]] += j_vals[k] * lambda[j_rows[k]];
        }
        for i in 0..n {
            z_l[i] = grad_l[i].max(0.0);
            z_u[i] = (-grad_l[i]).max(0.0);
        }

        let obj_val = program.objective(&x);
        program.finalize(status, &x, &z_l, &z_u, &lambda, obj_val, iterations);
        Ok(())
    }
}

/// Infinity norm of `x - proj(x - grad)`, the box-constrained stationarity
/// measure.
fn projected_gradient_norm(x: &[f64], grad: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
    let mut norm = 0.0f64;
    for i in 0..x.len() {
        let proj = (x[i] - grad[i]).clamp(lb[i], ub[i]);
        norm = norm.max((x[i] - proj).abs());
    }
    norm
}
