//! Session scheduling.
//!
//! Create and update run the conflict check and the write in one
//! transaction holding the advisory lock for the session date.

use std::collections::{BTreeSet, HashSet};

use anyhow::anyhow;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument, warn};

use cohort_core::AppError;
use cohort_db::locks::{self, LockScope};
use cohort_engine::{
    Booking, Candidate, ConflictOutcome, TimeWindow, affected_students, check_conflict,
};
use cohort_models::{
    ConflictCheckResponse, CourseCode, GroupId, ScheduledSession, SessionCheckDto, SessionDto,
    SessionFilterParams, SessionId, StudentId,
};

use crate::metrics::{track_session_conflict, track_session_scheduled};
use crate::modules::membership::MembershipStore;

const SESSION_COLUMNS: &str = "id, course_code, session_date, start_time, end_time, room, group_id, created_at, updated_at";

/// Result of a create or update that reached the conflict check.
#[derive(Debug)]
pub enum SessionCommit {
    Saved(ScheduledSession),
    Rejected(ConflictCheckResponse),
}

pub struct SessionService;

impl SessionService {
    /// Validates the candidate and checks it against every other session on
    /// the same date.
    ///
    /// Fails with 400 for an empty or reversed interval and 404 for an
    /// unknown course or group, before anything is read from the schedule.
    async fn evaluate(
        conn: &mut PgConnection,
        dto: &SessionDto,
        exclude: Option<SessionId>,
    ) -> Result<ConflictOutcome, AppError> {
        let window = TimeWindow::new(dto.start_time, dto.end_time).map_err(AppError::bad_request)?;

        let course = MembershipStore::find_course_by_code(&mut *conn, &dto.course_code)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Course {} not found", dto.course_code)))?;

        if let Some(group_id) = dto.group_id
            && !MembershipStore::group_exists(&mut *conn, group_id).await?
        {
            return Err(AppError::not_found(anyhow!("Group {} not found", group_id)));
        }

        let slots = MembershipStore::sessions_on_date(&mut *conn, dto.session_date).await?;

        let group_ids: Vec<GroupId> = slots
            .iter()
            .filter_map(|slot| slot.group_id)
            .chain(dto.group_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let course_codes: Vec<CourseCode> = slots
            .iter()
            .map(|slot| slot.course_code.clone())
            .chain(std::iter::once(dto.course_code.clone()))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let group_rosters = MembershipStore::group_rosters(&mut *conn, &group_ids).await?;
        let course_rosters = MembershipStore::course_rosters(&mut *conn, &course_codes).await?;
        let nobody = BTreeSet::new();

        let roster_of = |group_id: Option<GroupId>, code: &CourseCode| -> BTreeSet<StudentId> {
            affected_students(
                group_id.and_then(|g| group_rosters.get(&g)),
                course_rosters.get(code).unwrap_or(&nobody),
            )
        };

        let mut bookings = Vec::with_capacity(slots.len());
        for slot in &slots {
            let Ok(slot_window) = TimeWindow::new(slot.start_time, slot.end_time) else {
                warn!(session_id = %slot.id, "Skipping stored session with an invalid interval");
                continue;
            };
            bookings.push(Booking {
                session_id: slot.id,
                window: slot_window,
                instructor_id: slot.instructor_id,
                roster: roster_of(slot.group_id, &slot.course_code),
            });
        }

        let candidate = Candidate {
            window,
            instructor_id: course.instructor_id,
            roster: roster_of(dto.group_id, &dto.course_code),
        };

        Ok(check_conflict(&candidate, &bookings, exclude))
    }

    fn rejected(outcome: ConflictOutcome) -> Option<SessionCommit> {
        match outcome {
            ConflictOutcome::Clear => None,
            ConflictOutcome::Conflict { reason, session_id } => {
                info!(%reason, conflicting_session_id = %session_id, "Session rejected");
                track_session_conflict(reason);
                Some(SessionCommit::Rejected(outcome.into()))
            }
        }
    }

    /// Dry-run conflict check. Takes no lock and writes nothing.
    #[instrument(skip(db))]
    pub async fn check_session(
        db: &PgPool,
        dto: SessionCheckDto,
    ) -> Result<ConflictCheckResponse, AppError> {
        let mut conn = db.acquire().await?;
        let outcome = Self::evaluate(&mut conn, &dto.session, dto.exclude_session_id).await?;
        Ok(outcome.into())
    }

    #[instrument(skip(db))]
    pub async fn create_session(db: &PgPool, dto: SessionDto) -> Result<SessionCommit, AppError> {
        let mut tx = db.begin().await?;
        locks::acquire(&mut tx, LockScope::SessionDate(dto.session_date)).await?;

        let outcome = Self::evaluate(&mut tx, &dto, None).await?;
        if let Some(rejection) = Self::rejected(outcome) {
            return Ok(rejection);
        }

        let session = sqlx::query_as::<_, ScheduledSession>(&format!(
            r#"INSERT INTO scheduled_sessions (course_code, session_date, start_time, end_time, room, group_id)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {SESSION_COLUMNS}"#
        ))
        .bind(&dto.course_code)
        .bind(dto.session_date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(dto.room.trim())
        .bind(dto.group_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(session_id = %session.id, date = %session.session_date, "Session scheduled");
        track_session_scheduled();

        Ok(SessionCommit::Saved(session))
    }

    /// Replaces a session, checking it against every other session on its
    /// new date.
    #[instrument(skip(db))]
    pub async fn update_session(
        db: &PgPool,
        id: SessionId,
        dto: SessionDto,
    ) -> Result<SessionCommit, AppError> {
        let mut tx = db.begin().await?;
        sqlx::query_scalar::<_, SessionId>(
            "SELECT id FROM scheduled_sessions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Session not found")))?;

        locks::acquire(&mut tx, LockScope::SessionDate(dto.session_date)).await?;

        let outcome = Self::evaluate(&mut tx, &dto, Some(id)).await?;
        if let Some(rejection) = Self::rejected(outcome) {
            return Ok(rejection);
        }

        let session = sqlx::query_as::<_, ScheduledSession>(&format!(
            r#"UPDATE scheduled_sessions
               SET course_code = $2, session_date = $3, start_time = $4, end_time = $5,
                   room = $6, group_id = $7, updated_at = NOW()
               WHERE id = $1
               RETURNING {SESSION_COLUMNS}"#
        ))
        .bind(id)
        .bind(&dto.course_code)
        .bind(dto.session_date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(dto.room.trim())
        .bind(dto.group_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(session_id = %id, "Session updated");

        Ok(SessionCommit::Saved(session))
    }

    #[instrument(skip(db))]
    pub async fn get_session(db: &PgPool, id: SessionId) -> Result<ScheduledSession, AppError> {
        sqlx::query_as::<_, ScheduledSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM scheduled_sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Session not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_sessions(
        db: &PgPool,
        filters: SessionFilterParams,
    ) -> Result<Vec<ScheduledSession>, AppError> {
        let sessions = sqlx::query_as::<_, ScheduledSession>(&format!(
            r#"SELECT {SESSION_COLUMNS}
               FROM scheduled_sessions
               WHERE ($1::date IS NULL OR session_date = $1)
                 AND ($2::text IS NULL OR course_code = $2)
                 AND ($3::uuid IS NULL OR group_id = $3)
               ORDER BY session_date, start_time, id"#
        ))
        .bind(filters.date)
        .bind(filters.course_code)
        .bind(filters.group_id)
        .fetch_all(db)
        .await?;

        Ok(sessions)
    }

    #[instrument(skip(db))]
    pub async fn delete_session(db: &PgPool, id: SessionId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM scheduled_sessions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Session not found")));
        }

        Ok(())
    }

    /// Sessions whose affected students include `student_id`.
    ///
    /// A session attached to a non-empty group affects that group's roster;
    /// otherwise it affects everyone enrolled in its course.
    #[instrument(skip(db))]
    pub async fn student_schedule(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<Vec<ScheduledSession>, AppError> {
        let mut conn = db.acquire().await?;
        MembershipStore::find_student(&mut conn, student_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        let sessions = sqlx::query_as::<_, ScheduledSession>(&format!(
            r#"SELECT {SESSION_COLUMNS}
               FROM scheduled_sessions s
               WHERE CASE
                   WHEN s.group_id IS NOT NULL
                        AND EXISTS (SELECT 1 FROM group_students gs WHERE gs.group_id = s.group_id)
                   THEN EXISTS (
                       SELECT 1 FROM group_students gs
                       WHERE gs.group_id = s.group_id AND gs.student_id = $1
                   )
                   ELSE EXISTS (
                       SELECT 1 FROM enrollments e
                       WHERE e.course_code = s.course_code AND e.student_id = $1
                   )
               END
               ORDER BY s.session_date, s.start_time, s.id"#
        ))
        .bind(student_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(sessions)
    }
}
