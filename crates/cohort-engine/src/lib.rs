//! # Cohort Engine
//!
//! The decision logic behind enrollment reconciliation and session
//! scheduling, kept free of I/O so it can be tested against explicit
//! snapshots.
//!
//! - [`entitlement`]: which courses a student may take, and the
//!   grant/revoke plan that brings enrollments in line with that
//! - [`conflicts`]: interval overlap and the instructor/student collision
//!   check for candidate sessions
//!
//! # Example
//!
//! ```ignore
//! use cohort_engine::{allowed_courses, plan_reconciliation};
//!
//! let allowed = allowed_courses(&grants, student);
//! let plan = plan_reconciliation(student, &allowed, &enrolled);
//! ```

pub mod conflicts;
pub mod entitlement;
pub mod errors;

pub use conflicts::{
    Booking, Candidate, ConflictOutcome, TimeWindow, affected_students, check_conflict,
};
pub use entitlement::{
    GroupGrant, ReconcilePlan, allowed_courses, plan_reconciliation, roster_union,
};
pub use errors::EngineError;
