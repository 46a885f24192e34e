pub mod enrollments;
pub mod grades;
pub mod groups;
pub mod membership;
pub mod reports;
pub mod sessions;
