//! qpgate-milp: an owned session layer over an external mixed-integer
//! linear solver engine.
//!
//! Where the engine's native interface is a process-global environment
//! driven by open/load/solve/query calls, this crate wraps one loaded
//! problem in a [`session::MilpSession`] value: construction validates all
//! dimensions, mutation invalidates stale outcomes, and solution queries
//! fail explicitly until a solve has produced something to report.
//!
//! The engine itself stays behind the [`engine::MilpEngine`] trait; the
//! session supplies the constraint matrix column-major and converts to the
//! host's row-major, one-based layout on retrieval only.

#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod outcome;
pub mod session;

pub use engine::{MilpEngine, MilpOptions};
pub use error::{MilpError, MilpResult};
pub use outcome::{MilpOutcome, MilpStatus};
pub use session::{HostMatrix, MilpProblem, MilpSession, ObjSense, VarKind};
