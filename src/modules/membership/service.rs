use std::collections::{BTreeSet, HashMap};

use anyhow::anyhow;
use chrono::NaiveDate;
use sqlx::PgConnection;
use tracing::instrument;

use cohort_core::AppError;
use cohort_engine::GroupGrant;
use cohort_models::{
    Course, CourseCode, CourseContact, Enrollment, GradeRecordId, GroupId, SpecialtyId, Student,
    StudentId, TermId,
};

use super::model::SessionSlot;

const STUDENT_COLUMNS: &str = "id, enrollment_code, first_name, last_name, email, is_active, specialty_id, created_at, updated_at";

pub struct MembershipStore;

impl MembershipStore {
    #[instrument(skip(conn))]
    pub async fn find_students_by_ids(
        conn: &mut PgConnection,
        ids: &[StudentId],
    ) -> Result<Vec<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(conn)
        .await
    }

    /// Loads every student in `ids`, failing with 404 on the first unknown id.
    ///
    /// Duplicates are collapsed; the result is ordered by id.
    pub async fn require_students(
        conn: &mut PgConnection,
        ids: &[StudentId],
    ) -> Result<Vec<Student>, AppError> {
        let wanted: BTreeSet<StudentId> = ids.iter().copied().collect();
        let wanted: Vec<StudentId> = wanted.into_iter().collect();
        let students = Self::find_students_by_ids(conn, &wanted).await?;

        if students.len() != wanted.len() {
            let found: BTreeSet<StudentId> = students.iter().map(|s| s.id).collect();
            if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
                return Err(AppError::not_found(anyhow!("Student {} not found", missing)));
            }
        }

        Ok(students)
    }

    #[instrument(skip(conn))]
    pub async fn find_student(
        conn: &mut PgConnection,
        id: StudentId,
    ) -> Result<Option<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    #[instrument(skip(conn))]
    pub async fn find_course_by_code(
        conn: &mut PgConnection,
        code: &CourseCode,
    ) -> Result<Option<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"SELECT code, title, description, instructor_id, is_active, created_at, updated_at
               FROM courses WHERE code = $1"#,
        )
        .bind(code)
        .fetch_optional(conn)
        .await
    }

    /// Courses in `codes` joined with their instructor's name and email.
    #[instrument(skip(conn))]
    pub async fn course_contacts(
        conn: &mut PgConnection,
        codes: &[CourseCode],
    ) -> Result<Vec<CourseContact>, sqlx::Error> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, CourseContact>(
            r#"SELECT
                c.code,
                c.title,
                c.instructor_id,
                CASE WHEN i.id IS NULL THEN NULL ELSE i.first_name || ' ' || i.last_name END AS instructor_name,
                i.email AS instructor_email
               FROM courses c
               LEFT JOIN instructors i ON i.id = c.instructor_id
               WHERE c.code = ANY($1)
               ORDER BY c.code"#,
        )
        .bind(codes)
        .fetch_all(conn)
        .await
    }

    /// Codes from `codes` with no matching course.
    pub async fn missing_courses(
        conn: &mut PgConnection,
        codes: &[CourseCode],
    ) -> Result<Vec<CourseCode>, sqlx::Error> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let found: BTreeSet<CourseCode> =
            sqlx::query_scalar::<_, CourseCode>("SELECT code FROM courses WHERE code = ANY($1)")
                .bind(codes)
                .fetch_all(conn)
                .await?
                .into_iter()
                .collect();

        Ok(codes
            .iter()
            .filter(|c| !found.contains(*c))
            .cloned()
            .collect())
    }

    pub async fn group_exists(conn: &mut PgConnection, id: GroupId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM groups WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    pub async fn term_exists(conn: &mut PgConnection, id: TermId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM pedagogical_terms WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(conn)
        .await
    }

    pub async fn specialty_exists(
        conn: &mut PgConnection,
        id: SpecialtyId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM specialties WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Snapshot of every group containing `student`, with full rosters and
    /// course sets.
    #[instrument(skip(conn))]
    pub async fn group_grants_for_student(
        conn: &mut PgConnection,
        student: StudentId,
    ) -> Result<Vec<GroupGrant>, sqlx::Error> {
        let group_ids = sqlx::query_scalar::<_, GroupId>(
            "SELECT group_id FROM group_students WHERE student_id = $1 ORDER BY group_id",
        )
        .bind(student)
        .fetch_all(&mut *conn)
        .await?;

        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut rosters = Self::group_rosters(&mut *conn, &group_ids).await?;
        let mut courses = Self::group_course_sets(&mut *conn, &group_ids).await?;

        Ok(group_ids
            .into_iter()
            .map(|group_id| GroupGrant {
                group_id,
                students: rosters.remove(&group_id).unwrap_or_default(),
                courses: courses.remove(&group_id).unwrap_or_default(),
            })
            .collect())
    }

    pub async fn group_rosters(
        conn: &mut PgConnection,
        group_ids: &[GroupId],
    ) -> Result<HashMap<GroupId, BTreeSet<StudentId>>, sqlx::Error> {
        let mut rosters: HashMap<GroupId, BTreeSet<StudentId>> = HashMap::new();
        if group_ids.is_empty() {
            return Ok(rosters);
        }

        let rows = sqlx::query_as::<_, (GroupId, StudentId)>(
            "SELECT group_id, student_id FROM group_students WHERE group_id = ANY($1)",
        )
        .bind(group_ids)
        .fetch_all(conn)
        .await?;

        for (group_id, student_id) in rows {
            rosters.entry(group_id).or_default().insert(student_id);
        }
        Ok(rosters)
    }

    pub async fn group_course_sets(
        conn: &mut PgConnection,
        group_ids: &[GroupId],
    ) -> Result<HashMap<GroupId, BTreeSet<CourseCode>>, sqlx::Error> {
        let mut courses: HashMap<GroupId, BTreeSet<CourseCode>> = HashMap::new();
        if group_ids.is_empty() {
            return Ok(courses);
        }

        let rows = sqlx::query_as::<_, (GroupId, CourseCode)>(
            "SELECT group_id, course_code FROM group_courses WHERE group_id = ANY($1)",
        )
        .bind(group_ids)
        .fetch_all(conn)
        .await?;

        for (group_id, code) in rows {
            courses.entry(group_id).or_default().insert(code);
        }
        Ok(courses)
    }

    /// Students currently enrolled in each of `codes`.
    pub async fn course_rosters(
        conn: &mut PgConnection,
        codes: &[CourseCode],
    ) -> Result<HashMap<CourseCode, BTreeSet<StudentId>>, sqlx::Error> {
        let mut rosters: HashMap<CourseCode, BTreeSet<StudentId>> = HashMap::new();
        if codes.is_empty() {
            return Ok(rosters);
        }

        let rows = sqlx::query_as::<_, (CourseCode, StudentId)>(
            "SELECT course_code, student_id FROM enrollments WHERE course_code = ANY($1)",
        )
        .bind(codes)
        .fetch_all(conn)
        .await?;

        for (code, student_id) in rows {
            rosters.entry(code).or_default().insert(student_id);
        }
        Ok(rosters)
    }

    pub async fn enrolled_courses(
        conn: &mut PgConnection,
        student: StudentId,
    ) -> Result<BTreeSet<CourseCode>, sqlx::Error> {
        let codes = sqlx::query_scalar::<_, CourseCode>(
            "SELECT course_code FROM enrollments WHERE student_id = $1",
        )
        .bind(student)
        .fetch_all(conn)
        .await?;

        Ok(codes.into_iter().collect())
    }

    /// Sessions on `date` in start-time then id order.
    #[instrument(skip(conn))]
    pub async fn sessions_on_date(
        conn: &mut PgConnection,
        date: NaiveDate,
    ) -> Result<Vec<SessionSlot>, sqlx::Error> {
        sqlx::query_as::<_, SessionSlot>(
            r#"SELECT s.id, s.course_code, s.start_time, s.end_time, s.group_id, c.instructor_id
               FROM scheduled_sessions s
               JOIN courses c ON c.code = s.course_code
               WHERE s.session_date = $1
               ORDER BY s.start_time, s.id"#,
        )
        .bind(date)
        .fetch_all(conn)
        .await
    }

    /// Inserts the enrollment unless the pair already exists.
    ///
    /// Returns `None` when it was already there.
    pub async fn upsert_enrollment(
        conn: &mut PgConnection,
        student: StudentId,
        code: &CourseCode,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        sqlx::query_as::<_, Enrollment>(
            r#"INSERT INTO enrollments (student_id, course_code)
               VALUES ($1, $2)
               ON CONFLICT (student_id, course_code) DO NOTHING
               RETURNING id, student_id, course_code, enrolled_at"#,
        )
        .bind(student)
        .bind(code)
        .fetch_optional(conn)
        .await
    }

    /// Zeroed grade record for the pair, unless one already exists.
    pub async fn upsert_grade_record(
        conn: &mut PgConnection,
        student: StudentId,
        code: &CourseCode,
    ) -> Result<Option<GradeRecordId>, sqlx::Error> {
        sqlx::query_scalar::<_, GradeRecordId>(
            r#"INSERT INTO grade_records (student_id, course_code)
               VALUES ($1, $2)
               ON CONFLICT (student_id, course_code) DO NOTHING
               RETURNING id"#,
        )
        .bind(student)
        .bind(code)
        .fetch_optional(conn)
        .await
    }

    pub async fn delete_grade_record(
        conn: &mut PgConnection,
        student: StudentId,
        code: &CourseCode,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM grade_records WHERE student_id = $1 AND course_code = $2")
                .bind(student)
                .bind(code)
                .execute(conn)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_enrollment(
        conn: &mut PgConnection,
        student: StudentId,
        code: &CourseCode,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM enrollments WHERE student_id = $1 AND course_code = $2")
                .bind(student)
                .bind(code)
                .execute(conn)
                .await?;
        Ok(result.rows_affected())
    }
}
