//! # Cohort Core
//!
//! Core types shared by every Cohort crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`serde`]: Lenient deserializers for query-string parameters
//!
//! # Example
//!
//! ```ignore
//! use cohort_core::AppError;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Course not found"));
//! ```

pub mod errors;
pub mod serde;

pub use errors::AppError;
