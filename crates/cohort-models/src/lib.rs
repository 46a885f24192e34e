//! # Cohort Models
//!
//! Domain models and DTOs for the Cohort API: typed ids, validated value
//! types, database entities and request/response bodies.
//!
//! # Modules
//!
//! - [`ids`]: Typed UUID newtypes per entity
//! - [`value_types`]: Validated primitives such as [`CourseCode`]
//! - [`groups`]: Groups, their rosters and course sets
//! - [`enrollments`]: Enrollments and reconciliation summaries
//! - [`grades`]: Grade records
//! - [`sessions`]: Scheduled sessions and conflict checks
//! - [`reports`]: Averages, success rates and enrollment rankings
//!
//! # Example
//!
//! ```ignore
//! use cohort_models::{CourseCode, ConflictCheckResponse, SessionId};
//!
//! let code: CourseCode = "MATH101".parse().unwrap();
//! let body = ConflictCheckResponse::clear();
//! ```

pub mod courses;
pub mod enrollments;
pub mod grades;
pub mod groups;
pub mod ids;
pub mod reports;
pub mod sessions;
pub mod students;
pub mod time_format;
pub mod value_types;

pub use courses::{Course, CourseContact};
pub use enrollments::{
    CreateEnrollmentDto, Enrollment, EnrollmentFilterParams, ReconcileRequestDto, ReconcileSummary,
};
pub use grades::{GradeFilterParams, GradeRecord, GradeView, UpdateGradeDto};
pub use groups::{
    CreateGroupDto, Group, GroupDeletedResponse, GroupDetails, GroupMutationResponse,
    UpdateGroupDto,
};
pub use ids::{
    EnrollmentId, GradeRecordId, GroupId, InstructorId, SessionId, SpecialtyId, StudentId, TermId,
};
pub use reports::{
    CourseSuccessReport, StudentAverageReport, TopCourse, TopCoursesParams,
};
pub use sessions::{
    ConflictCheckResponse, ConflictReason, ScheduledSession, SessionCheckDto, SessionDto,
    SessionFilterParams,
};
pub use students::{Instructor, Student};
pub use value_types::{CourseCode, ValueTypeError};
