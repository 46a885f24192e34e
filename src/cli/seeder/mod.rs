//! Database seeding for demo and load-testing data.
//!
//! # Module Structure
//!
//! - [`people`] - Instructors and students
//! - [`catalog`] - Courses, most of them assigned to a seeded instructor
//! - [`groups`] - Groups with random rosters and course sets
//! - [`models`] - Seed records, configuration and the markers `clear-seed` relies on
//!
//! # Usage
//!
//! ```ignore
//! use cohort::cli::seeder::{SeedConfig, seed_all};
//!
//! let students = seed_all(&db, SeedConfig::default()).await?;
//! ```
//!
//! Seeding only writes groups. Enrollments and grade records are created
//! by reconciling the seeded students afterwards.

pub mod catalog;
pub mod groups;
pub mod models;
pub mod people;

pub use models::SeedConfig;

use sqlx::PgPool;
use std::time::Instant;

use cohort_models::StudentId;

/// Seeds instructors, courses, students and groups. Returns the seeded
/// student ids.
pub async fn seed_all(
    db: &PgPool,
    config: SeedConfig,
) -> Result<Vec<StudentId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let config = config.normalized();

    println!("🌱 Starting database seeding...");
    println!(
        "   - Instructors: {}, Courses: {}, Students: {}, Groups: {}",
        config.instructors, config.courses, config.students, config.groups
    );

    let instructor_ids = people::seed_instructors(db, config.instructors).await?;
    let course_codes = catalog::seed_courses(db, config.courses, &instructor_ids).await?;
    let student_ids = people::seed_students(db, config.students).await?;
    let group_ids = groups::seed_groups(db, &config, &course_codes, &student_ids).await?;

    println!(
        "\n✅ Seeding complete! Created {} instructors, {} courses, {} students, {} groups in {:?}",
        instructor_ids.len(),
        course_codes.len(),
        student_ids.len(),
        group_ids.len(),
        start_time.elapsed()
    );

    Ok(student_ids)
}

/// Clears all seeded data from the database
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing all seeded data...");

    // Groups first so no seeded roster outlives its students
    groups::clear_groups(db).await?;
    catalog::clear_courses(db).await?;
    people::clear_students(db).await?;
    people::clear_instructors(db).await?;

    println!("✅ All seeded data cleared in {:?}", start_time.elapsed());
    Ok(())
}
