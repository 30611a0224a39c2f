//! Solve outcome and termination status for the linear engine.

use std::fmt;

/// How a MILP solve attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilpStatus {
    /// Optimal solution found and proven.
    Optimal,

    /// Problem is infeasible.
    Infeasible,

    /// Problem is unbounded.
    Unbounded,

    /// Iteration limit reached; best solution (if any) retained.
    IterationLimit,

    /// Time limit reached; best solution (if any) retained.
    TimeLimit,

    /// Target optimality gap achieved.
    TargetGapReached,

    /// The engine gave up.
    Abandoned,
}

impl MilpStatus {
    /// Optimality was proven (exactly or to the target gap).
    pub fn is_optimal(&self) -> bool {
        matches!(self, MilpStatus::Optimal | MilpStatus::TargetGapReached)
    }

    /// The problem was proven infeasible.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, MilpStatus::Infeasible)
    }

    /// The engine gave up without a verdict.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, MilpStatus::Abandoned)
    }

    /// The iteration cap stopped the solve.
    pub fn is_iteration_limit_reached(&self) -> bool {
        matches!(self, MilpStatus::IterationLimit)
    }

    /// The time cap stopped the solve.
    pub fn is_time_limit_reached(&self) -> bool {
        matches!(self, MilpStatus::TimeLimit)
    }

    /// A usable incumbent accompanies this status.
    pub fn has_solution(&self) -> bool {
        matches!(
            self,
            MilpStatus::Optimal
                | MilpStatus::TargetGapReached
                | MilpStatus::IterationLimit
                | MilpStatus::TimeLimit
        )
    }
}

impl fmt::Display for MilpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MilpStatus::Optimal => write!(f, "Optimal"),
            MilpStatus::Infeasible => write!(f, "Infeasible"),
            MilpStatus::Unbounded => write!(f, "Unbounded"),
            MilpStatus::IterationLimit => write!(f, "Iteration Limit"),
            MilpStatus::TimeLimit => write!(f, "Time Limit"),
            MilpStatus::TargetGapReached => write!(f, "Target Gap Reached"),
            MilpStatus::Abandoned => write!(f, "Abandoned"),
        }
    }
}

/// Result of one engine run, copied into the session.
#[derive(Debug, Clone)]
pub struct MilpOutcome {
    /// Termination status.
    pub status: MilpStatus,

    /// Incumbent solution (length n when `status.has_solution()`, may be
    /// empty otherwise).
    pub x: Vec<f64>,

    /// Objective value of the incumbent.
    pub obj_val: f64,

    /// Iterations (engine-defined unit, e.g. nodes or simplex pivots).
    pub iterations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(MilpStatus::Optimal.is_optimal());
        assert!(MilpStatus::TargetGapReached.is_optimal());
        assert!(!MilpStatus::IterationLimit.is_optimal());

        assert!(MilpStatus::Infeasible.is_infeasible());
        assert!(!MilpStatus::Infeasible.has_solution());

        assert!(MilpStatus::IterationLimit.is_iteration_limit_reached());
        assert!(MilpStatus::IterationLimit.has_solution());
        assert!(MilpStatus::TimeLimit.is_time_limit_reached());

        assert!(MilpStatus::Abandoned.is_abandoned());
        assert!(!MilpStatus::Abandoned.has_solution());
    }
}
