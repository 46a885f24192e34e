//! Instructor and student seeding.

use fake::Fake;
use fake::faker::name::en::*;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use cohort_models::{InstructorId, StudentId};

use super::models::{InstructorSeed, SEED_EMAIL_DOMAIN, SEED_STUDENT_CODE_PREFIX, StudentSeed};

const SPECIALTIES: [&str; 6] = [
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Computer Science",
    "Literature",
];

pub fn generate_instructors(count: usize) -> Vec<InstructorSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let email = format!(
                "{}.{}+instructor{}@{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                idx,
                SEED_EMAIL_DOMAIN
            );

            InstructorSeed {
                first_name,
                last_name,
                email,
                specialty: SPECIALTIES[idx % SPECIALTIES.len()].to_string(),
            }
        })
        .collect()
}

pub fn generate_students(count: usize) -> Vec<StudentSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let email = format!(
                "{}.{}+student{}@{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                idx,
                SEED_EMAIL_DOMAIN
            );

            StudentSeed {
                enrollment_code: format!("{}{:05}", SEED_STUDENT_CODE_PREFIX, idx + 1),
                first_name,
                last_name,
                email,
            }
        })
        .collect()
}

pub async fn seed_instructors(
    db: &PgPool,
    count: usize,
) -> Result<Vec<InstructorId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🧑‍🏫 Seeding {} instructors...", count);

    let instructors = generate_instructors(count);

    let mut tx = db.begin().await?;
    const BATCH_SIZE: usize = 1000;
    let mut all_ids = Vec::with_capacity(instructors.len());
    for chunk in instructors.chunks(BATCH_SIZE) {
        all_ids.extend(insert_instructors_chunk(&mut tx, chunk).await?);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} instructors in {:?}",
        all_ids.len(),
        start_time.elapsed()
    );

    Ok(all_ids)
}

async fn insert_instructors_chunk(
    tx: &mut Transaction<'_, Postgres>,
    instructors: &[InstructorSeed],
) -> Result<Vec<InstructorId>, Box<dyn std::error::Error>> {
    if instructors.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        String::from("INSERT INTO instructors (first_name, last_name, email, specialty) VALUES ");

    for (i, _) in instructors.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 4;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4
        ));
    }

    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for instructor in instructors {
        q = q
            .bind(&instructor.first_name)
            .bind(&instructor.last_name)
            .bind(&instructor.email)
            .bind(&instructor.specialty);
    }

    let ids: Vec<InstructorId> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

pub async fn seed_students(
    db: &PgPool,
    count: usize,
) -> Result<Vec<StudentId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🎓 Seeding {} students...", count);

    let students = generate_students(count);

    let mut tx = db.begin().await?;
    // 4 params per student
    const BATCH_SIZE: usize = 1000;
    let mut all_ids = Vec::with_capacity(students.len());
    for chunk in students.chunks(BATCH_SIZE) {
        all_ids.extend(insert_students_chunk(&mut tx, chunk).await?);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        all_ids.len(),
        start_time.elapsed()
    );

    Ok(all_ids)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> Result<Vec<StudentId>, Box<dyn std::error::Error>> {
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO students (enrollment_code, first_name, last_name, email) VALUES ",
    );

    for (i, _) in students.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 4;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4
        ));
    }

    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for student in students {
        q = q
            .bind(&student.enrollment_code)
            .bind(&student.first_name)
            .bind(&student.last_name)
            .bind(&student.email);
    }

    let ids: Vec<StudentId> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

/// Deletes seeded students. Enrollments and grade records cascade.
pub async fn clear_students(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing students...");

    let result = sqlx::query("DELETE FROM students WHERE enrollment_code LIKE $1")
        .bind(format!("{}%", SEED_STUDENT_CODE_PREFIX))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} students in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

pub async fn clear_instructors(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing instructors...");

    let result = sqlx::query("DELETE FROM instructors WHERE email LIKE $1")
        .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} instructors in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}
