use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;

use cohort_core::AppError;
use cohort_models::reports::{PASSING_AVERAGE, success_rate};
use cohort_models::{
    CourseCode, CourseSuccessReport, StudentAverageReport, StudentId, TopCourse,
};

use crate::modules::membership::MembershipStore;

/// Read-only statistics over grade records and enrollments.
pub struct ReportService;

impl ReportService {
    #[instrument(skip(db))]
    pub async fn student_average(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<StudentAverageReport, AppError> {
        let mut conn = db.acquire().await?;
        MembershipStore::find_student(&mut conn, student_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        let (graded_courses, average) = sqlx::query_as::<_, (i64, f64)>(
            r#"SELECT COUNT(*),
                      COALESCE(AVG((exam_score + continuous_score + oral_score) / 3.0), 0.0)
               FROM grade_records
               WHERE student_id = $1"#,
        )
        .bind(student_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(StudentAverageReport {
            student_id,
            average,
            graded_courses,
        })
    }

    #[instrument(skip(db))]
    pub async fn course_success_rate(
        db: &PgPool,
        code: CourseCode,
    ) -> Result<CourseSuccessReport, AppError> {
        let mut conn = db.acquire().await?;
        MembershipStore::find_course_by_code(&mut conn, &code)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Course {} not found", code)))?;

        let (graded, passing) = sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT COUNT(*),
                      COUNT(*) FILTER (
                          WHERE (exam_score + continuous_score + oral_score) / 3.0 >= $2
                      )
               FROM grade_records
               WHERE course_code = $1"#,
        )
        .bind(&code)
        .bind(PASSING_AVERAGE)
        .fetch_one(&mut *conn)
        .await?;

        Ok(CourseSuccessReport {
            success_rate: success_rate(passing, graded),
            course_code: code,
            passing,
            graded,
        })
    }

    /// Courses with at least one enrollment, most enrolled first.
    #[instrument(skip(db))]
    pub async fn top_courses(db: &PgPool, limit: i64) -> Result<Vec<TopCourse>, AppError> {
        let courses = sqlx::query_as::<_, TopCourse>(
            r#"SELECT c.code, c.title, COUNT(*) AS enrollments
               FROM enrollments e
               JOIN courses c ON c.code = e.course_code
               GROUP BY c.code, c.title
               ORDER BY enrollments DESC, c.code
               LIMIT $1"#,
        )
        .bind(limit.max(1))
        .fetch_all(db)
        .await?;

        Ok(courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn student(pool: &PgPool, code: &str) -> StudentId {
        sqlx::query_scalar::<_, StudentId>(
            r#"INSERT INTO students (enrollment_code, first_name, last_name, email)
               VALUES ($1, 'Test', 'Student', $2) RETURNING id"#,
        )
        .bind(code)
        .bind(format!("{}@example.com", code.to_lowercase()))
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn course(pool: &PgPool, code: &str) -> CourseCode {
        sqlx::query_scalar::<_, CourseCode>(
            "INSERT INTO courses (code, title) VALUES ($1, $2) RETURNING code",
        )
        .bind(code)
        .bind(format!("Course {}", code))
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn enroll(pool: &PgPool, student: StudentId, code: &CourseCode) {
        sqlx::query("INSERT INTO enrollments (student_id, course_code) VALUES ($1, $2)")
            .bind(student)
            .bind(code)
            .execute(pool)
            .await
            .unwrap();
    }

    async fn grade(pool: &PgPool, student: StudentId, code: &CourseCode, scores: [f64; 3]) {
        enroll(pool, student, code).await;
        sqlx::query(
            r#"INSERT INTO grade_records (student_id, course_code, exam_score, continuous_score, oral_score)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(student)
        .bind(code)
        .bind(scores[0])
        .bind(scores[1])
        .bind(scores[2])
        .execute(pool)
        .await
        .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_student_average_over_records(pool: PgPool) {
        let s = student(&pool, "STU001").await;
        let c1 = course(&pool, "C1").await;
        let c2 = course(&pool, "C2").await;
        grade(&pool, s, &c1, [12.0, 15.0, 18.0]).await;
        grade(&pool, s, &c2, [6.0, 9.0, 12.0]).await;

        let report = ReportService::student_average(&pool, s).await.unwrap();

        assert_eq!(report.student_id, s);
        assert_eq!(report.graded_courses, 2);
        assert_eq!(report.average, 12.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_student_average_without_records_is_zero(pool: PgPool) {
        let s = student(&pool, "STU001").await;

        let report = ReportService::student_average(&pool, s).await.unwrap();

        assert_eq!(report.graded_courses, 0);
        assert_eq!(report.average, 0.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_student_average_unknown_student(pool: PgPool) {
        let err = ReportService::student_average(&pool, StudentId::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_course_success_rate(pool: PgPool) {
        let c1 = course(&pool, "C1").await;
        let s1 = student(&pool, "STU001").await;
        let s2 = student(&pool, "STU002").await;
        let s3 = student(&pool, "STU003").await;
        let s4 = student(&pool, "STU004").await;
        grade(&pool, s1, &c1, [10.0, 10.0, 10.0]).await;
        grade(&pool, s2, &c1, [15.0, 12.0, 9.0]).await;
        grade(&pool, s3, &c1, [9.0, 9.0, 9.0]).await;
        grade(&pool, s4, &c1, [0.0, 0.0, 0.0]).await;

        let report = ReportService::course_success_rate(&pool, c1.clone())
            .await
            .unwrap();

        assert_eq!(report.course_code, c1);
        assert_eq!(report.graded, 4);
        assert_eq!(report.passing, 2);
        assert_eq!(report.success_rate, 50.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_course_success_rate_without_records(pool: PgPool) {
        let c1 = course(&pool, "C1").await;

        let report = ReportService::course_success_rate(&pool, c1).await.unwrap();

        assert_eq!(report.graded, 0);
        assert_eq!(report.success_rate, 0.0);

        let err = ReportService::course_success_rate(&pool, CourseCode::new("NOPE").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_top_courses_ranked_by_enrollments(pool: PgPool) {
        let c1 = course(&pool, "C1").await;
        let c2 = course(&pool, "C2").await;
        let c3 = course(&pool, "C3").await;
        course(&pool, "C4").await;
        let s1 = student(&pool, "STU001").await;
        let s2 = student(&pool, "STU002").await;
        let s3 = student(&pool, "STU003").await;
        for s in [s1, s2, s3] {
            enroll(&pool, s, &c2).await;
        }
        for s in [s1, s2] {
            enroll(&pool, s, &c3).await;
        }
        enroll(&pool, s1, &c1).await;

        let top = ReportService::top_courses(&pool, 5).await.unwrap();
        let ranked: Vec<(&str, i64)> = top
            .iter()
            .map(|c| (c.code.as_str(), c.enrollments))
            .collect();
        assert_eq!(ranked, vec![("C2", 3), ("C3", 2), ("C1", 1)]);
        assert_eq!(top[0].title, "Course C2");

        let top = ReportService::top_courses(&pool, 0).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].code, c2);
    }
}
