//! Group seeding. Rosters and course sets are sampled at random, so most
//! students end up in more than one group.

use rand::seq::SliceRandom;
use rayon::prelude::*;
use sqlx::PgPool;
use std::time::Instant;

use cohort_models::{CourseCode, GroupId, StudentId};

use super::models::{GroupSeed, SEED_GROUP_PREFIX, SeedConfig};

pub fn generate_groups(
    config: &SeedConfig,
    course_codes: &[CourseCode],
    student_ids: &[StudentId],
) -> Vec<GroupSeed> {
    (0..config.groups)
        .into_par_iter()
        .map(|idx| {
            let mut rng = rand::thread_rng();
            GroupSeed {
                name: format!("{}{}", SEED_GROUP_PREFIX, idx + 1),
                course_codes: course_codes
                    .choose_multiple(&mut rng, config.courses_per_group)
                    .cloned()
                    .collect(),
                student_ids: student_ids
                    .choose_multiple(&mut rng, config.students_per_group)
                    .copied()
                    .collect(),
            }
        })
        .collect()
}

pub async fn seed_groups(
    db: &PgPool,
    config: &SeedConfig,
    course_codes: &[CourseCode],
    student_ids: &[StudentId],
) -> Result<Vec<GroupId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "👪 Seeding {} groups ({} courses, {} students each)...",
        config.groups, config.courses_per_group, config.students_per_group
    );

    let groups = generate_groups(config, course_codes, student_ids);

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(groups.len());
    for group in &groups {
        let id = sqlx::query_scalar::<_, GroupId>(
            "INSERT INTO groups (name) VALUES ($1) RETURNING id",
        )
        .bind(&group.name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO group_students (group_id, student_id) SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(id)
        .bind(&group.student_ids)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO group_courses (group_id, course_code) SELECT $1, UNNEST($2::text[])",
        )
        .bind(id)
        .bind(&group.course_codes)
        .execute(&mut *tx)
        .await?;

        ids.push(id);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} groups in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

pub async fn clear_groups(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing groups...");

    let result = sqlx::query("DELETE FROM groups WHERE name LIKE $1")
        .bind(format!("{}%", SEED_GROUP_PREFIX))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} groups in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_groups_sample_without_repeats() {
        let config = SeedConfig {
            groups: 3,
            courses_per_group: 2,
            students_per_group: 4,
            ..Default::default()
        };
        let codes: Vec<CourseCode> = ["SD001", "SD002", "SD003"]
            .into_iter()
            .map(|code| CourseCode::new_unchecked(code))
            .collect();
        let students: Vec<StudentId> = (1..=6).map(StudentId::from_u128).collect();

        let groups = generate_groups(&config, &codes, &students);

        assert_eq!(groups.len(), 3);
        for group in &groups {
            assert!(group.name.starts_with(SEED_GROUP_PREFIX));
            assert_eq!(group.course_codes.len(), 2);
            assert_eq!(group.student_ids.iter().collect::<HashSet<_>>().len(), 4);
        }
    }
}
