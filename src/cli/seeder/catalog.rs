//! Course catalog seeding.

use fake::Fake;
use fake::faker::lorem::en::Sentence;
use rayon::prelude::*;
use sqlx::PgPool;
use std::time::Instant;

use cohort_models::{CourseCode, InstructorId};

use super::models::{CourseSeed, SEED_COURSE_CODE_PREFIX};

const SUBJECTS: [&str; 8] = [
    "Algebra",
    "Mechanics",
    "Organic Chemistry",
    "Genetics",
    "Algorithms",
    "Poetry",
    "Statistics",
    "Databases",
];

/// Round-robins instructors over the generated courses; every fifth course
/// is left without one.
pub fn generate_courses(count: usize, instructor_ids: &[InstructorId]) -> Vec<CourseSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let subject = SUBJECTS[idx % SUBJECTS.len()];
            let instructor_id = if instructor_ids.is_empty() || idx % 5 == 4 {
                None
            } else {
                Some(instructor_ids[idx % instructor_ids.len()])
            };

            CourseSeed {
                code: CourseCode::new_unchecked(format!(
                    "{}{:03}",
                    SEED_COURSE_CODE_PREFIX,
                    idx + 1
                )),
                title: format!("{} {}", subject, idx / SUBJECTS.len() + 1),
                description: Some(Sentence(4..8).fake()),
                instructor_id,
            }
        })
        .collect()
}

pub async fn seed_courses(
    db: &PgPool,
    count: usize,
    instructor_ids: &[InstructorId],
) -> Result<Vec<CourseCode>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📚 Seeding {} courses...", count);

    let courses = generate_courses(count, instructor_ids);

    let codes: Vec<CourseCode> = courses.iter().map(|c| c.code.clone()).collect();
    let titles: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
    let descriptions: Vec<Option<String>> =
        courses.iter().map(|c| c.description.clone()).collect();
    let instructors: Vec<Option<InstructorId>> =
        courses.iter().map(|c| c.instructor_id).collect();

    let inserted = sqlx::query_scalar::<_, CourseCode>(
        r#"INSERT INTO courses (code, title, description, instructor_id)
           SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::uuid[])
           RETURNING code"#,
    )
    .bind(&codes)
    .bind(&titles)
    .bind(&descriptions)
    .bind(&instructors)
    .fetch_all(db)
    .await?;

    println!(
        "   ✓ Inserted {} courses in {:?}",
        inserted.len(),
        start_time.elapsed()
    );

    Ok(inserted)
}

/// Deletes seeded courses. Group links, enrollments, grades and sessions
/// for them cascade.
pub async fn clear_courses(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing courses...");

    let result = sqlx::query("DELETE FROM courses WHERE code LIKE $1")
        .bind(format!("{}%", SEED_COURSE_CODE_PREFIX))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} courses in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_valid() {
        let courses = generate_courses(12, &[InstructorId::from_u128(1)]);
        for course in &courses {
            assert!(CourseCode::new(course.code.as_str()).is_ok());
        }
        assert_eq!(courses[0].code.as_str(), "SD001");
    }

    #[test]
    fn test_some_courses_have_no_instructor() {
        let courses = generate_courses(10, &[InstructorId::from_u128(1)]);
        assert!(courses[4].instructor_id.is_none());
        assert!(courses[0].instructor_id.is_some());

        let unstaffed = generate_courses(3, &[]);
        assert!(unstaffed.iter().all(|c| c.instructor_id.is_none()));
    }
}
