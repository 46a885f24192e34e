//! Read and write-back access to the membership tables.
//!
//! Every function takes a connection so callers decide whether the work runs
//! inside a locked transaction or on a plain pooled connection.

pub mod model;
pub mod service;

pub use model::SessionSlot;
pub use service::MembershipStore;
