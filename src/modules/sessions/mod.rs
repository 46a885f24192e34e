pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_sessions_router, init_student_schedule_router};
pub use service::{SessionCommit, SessionService};
