//! Enrollment reconciliation.
//!
//! Enrollments and grade records are derived from group membership. Each
//! student is reconciled in its own transaction under that student's
//! advisory lock, and the group snapshot is read inside the lock, so the
//! last reconciliation to run for a student sees the latest committed
//! membership. Notifications go out only after the transaction commits.

use std::collections::BTreeSet;
use std::time::Instant;

use anyhow::anyhow;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info, instrument};

use cohort_core::AppError;
use cohort_db::locks::{self, LockScope};
use cohort_engine::{allowed_courses, plan_reconciliation};
use cohort_models::{
    CourseCode, CourseContact, Enrollment, EnrollmentFilterParams, EnrollmentId, ReconcileSummary,
    Student, StudentId,
};

use crate::metrics::{
    EnrollmentSource, track_enrollments_granted, track_enrollments_revoked, track_reconciliation,
};
use crate::modules::membership::MembershipStore;
use crate::notifications::{Notification, Notifier, dispatch, enrollment_notifications};

pub struct EnrollmentService;

impl EnrollmentService {
    /// Brings every listed student's enrollments in line with their groups.
    ///
    /// All ids are resolved before anything is written; an unknown id fails
    /// the whole call with 404. A persistence failure stops at the failing
    /// student: students already reconciled keep their committed state.
    #[instrument(skip(db, notifier), fields(students = student_ids.len()))]
    pub async fn reconcile(
        db: &PgPool,
        notifier: &dyn Notifier,
        student_ids: &[StudentId],
    ) -> Result<ReconcileSummary, AppError> {
        let started = Instant::now();
        let mut summary = ReconcileSummary::default();
        if student_ids.is_empty() {
            return Ok(summary);
        }

        let students = {
            let mut conn = db.acquire().await?;
            MembershipStore::require_students(&mut conn, student_ids).await?
        };

        for student in &students {
            match Self::reconcile_student(db, notifier, student).await {
                Ok(changes) => summary.absorb(changes),
                Err(e) => {
                    error!(student_id = %student.id, error = %e.error, "Reconciliation failed");
                    track_reconciliation(false, started.elapsed().as_secs_f64());
                    return Err(e);
                }
            }
        }

        track_reconciliation(true, started.elapsed().as_secs_f64());
        info!(
            students = summary.students,
            granted = summary.granted,
            revoked = summary.revoked,
            "Reconciliation complete"
        );

        Ok(summary)
    }

    async fn reconcile_student(
        db: &PgPool,
        notifier: &dyn Notifier,
        student: &Student,
    ) -> Result<ReconcileSummary, AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;
        locks::acquire(&mut tx, LockScope::Student(student.id.into_inner()))
            .await
            .map_err(AppError::database)?;

        let grants = MembershipStore::group_grants_for_student(&mut tx, student.id)
            .await
            .map_err(AppError::database)?;
        let allowed = allowed_courses(&grants, student.id);
        let enrolled = MembershipStore::enrolled_courses(&mut tx, student.id)
            .await
            .map_err(AppError::database)?;

        let plan = plan_reconciliation(student.id, &allowed, &enrolled);
        if plan.is_empty() {
            tx.commit().await.map_err(AppError::database)?;
            return Ok(ReconcileSummary {
                students: 1,
                ..Default::default()
            });
        }

        for code in &plan.grants {
            Self::grant_pair(&mut tx, student.id, code).await?;
        }
        for code in &plan.revokes {
            Self::revoke_pair(&mut tx, student.id, code).await?;
        }

        let touched: Vec<CourseCode> = plan.grants.iter().chain(&plan.revokes).cloned().collect();
        let contacts = MembershipStore::course_contacts(&mut tx, &touched)
            .await
            .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        let (granted, revoked) = split_contacts(contacts, &plan.grants);
        dispatch(
            notifier,
            enrollment_notifications(student, &granted, &revoked),
        );

        track_enrollments_granted(EnrollmentSource::Group, plan.grants.len());
        track_enrollments_revoked(EnrollmentSource::Group, plan.revokes.len());
        info!(
            student_id = %student.id,
            granted = plan.grants.len(),
            revoked = plan.revokes.len(),
            "Student enrollments reconciled"
        );

        Ok(ReconcileSummary {
            students: 1,
            granted: plan.grants.len(),
            revoked: plan.revokes.len(),
        })
    }

    /// Enrollment plus zeroed grade record for one pair.
    async fn grant_pair(
        conn: &mut PgConnection,
        student: StudentId,
        code: &CourseCode,
    ) -> Result<Option<Enrollment>, AppError> {
        let enrollment = MembershipStore::upsert_enrollment(&mut *conn, student, code)
            .await
            .map_err(AppError::database)?;
        MembershipStore::upsert_grade_record(&mut *conn, student, code)
            .await
            .map_err(AppError::database)?;
        Ok(enrollment)
    }

    /// Removes the grade record, then the enrollment. Returns whether an
    /// enrollment was removed.
    async fn revoke_pair(
        conn: &mut PgConnection,
        student: StudentId,
        code: &CourseCode,
    ) -> Result<bool, AppError> {
        MembershipStore::delete_grade_record(&mut *conn, student, code)
            .await
            .map_err(AppError::database)?;
        let removed = MembershipStore::delete_enrollment(&mut *conn, student, code)
            .await
            .map_err(AppError::database)?;
        Ok(removed > 0)
    }

    /// Direct single-pair enrollment.
    ///
    /// A pair not backed by any group is dropped again by the student's
    /// next reconciliation.
    #[instrument(skip(db, notifier))]
    pub async fn grant_course(
        db: &PgPool,
        notifier: &dyn Notifier,
        student_id: StudentId,
        code: &CourseCode,
    ) -> Result<Enrollment, AppError> {
        let mut tx = db.begin().await?;
        locks::acquire(&mut tx, LockScope::Student(student_id.into_inner())).await?;

        let student = MembershipStore::find_student(&mut tx, student_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;
        MembershipStore::find_course_by_code(&mut tx, code)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))?;

        let enrollment = Self::grant_pair(&mut tx, student_id, code)
            .await?
            .ok_or_else(|| {
                AppError::conflict(anyhow!("Student is already enrolled in this course"))
            })?;

        let contacts = MembershipStore::course_contacts(&mut tx, std::slice::from_ref(code)).await?;
        tx.commit().await.map_err(AppError::database)?;

        dispatch(notifier, enrollment_notifications(&student, &contacts, &[]));
        track_enrollments_granted(EnrollmentSource::Direct, 1);

        Ok(enrollment)
    }

    /// Direct unenrollment by enrollment id.
    #[instrument(skip(db, notifier))]
    pub async fn revoke_enrollment(
        db: &PgPool,
        notifier: &dyn Notifier,
        enrollment_id: EnrollmentId,
    ) -> Result<(), AppError> {
        let enrollment = Self::get_enrollment(db, enrollment_id).await?;

        let mut tx = db.begin().await?;
        locks::acquire(&mut tx, LockScope::Student(enrollment.student_id.into_inner())).await?;

        let removed = Self::revoke_pair(&mut tx, enrollment.student_id, &enrollment.course_code)
            .await?;
        if !removed {
            return Err(AppError::not_found(anyhow!("Enrollment not found")));
        }

        let student = MembershipStore::find_student(&mut tx, enrollment.student_id).await?;
        let contacts = MembershipStore::course_contacts(
            &mut tx,
            std::slice::from_ref(&enrollment.course_code),
        )
        .await?;
        tx.commit().await.map_err(AppError::database)?;

        if let Some(student) = student {
            dispatch(
                notifier,
                contacts
                    .iter()
                    .filter_map(|course| Notification::instructor_unenrolled(&student, course))
                    .collect(),
            );
        }
        track_enrollments_revoked(EnrollmentSource::Direct, 1);

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_enrollment(
        db: &PgPool,
        enrollment_id: EnrollmentId,
    ) -> Result<Enrollment, AppError> {
        sqlx::query_as::<_, Enrollment>(
            "SELECT id, student_id, course_code, enrolled_at FROM enrollments WHERE id = $1",
        )
        .bind(enrollment_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Enrollment not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_enrollments(
        db: &PgPool,
        filters: EnrollmentFilterParams,
    ) -> Result<Vec<Enrollment>, AppError> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            r#"SELECT id, student_id, course_code, enrolled_at
               FROM enrollments
               WHERE ($1::uuid IS NULL OR student_id = $1)
                 AND ($2::text IS NULL OR course_code = $2)
               ORDER BY course_code, enrolled_at, id"#,
        )
        .bind(filters.student_id)
        .bind(filters.course_code)
        .fetch_all(db)
        .await?;

        Ok(enrollments)
    }

    /// Every student id, for whole-school reconciliation.
    pub async fn all_student_ids(db: &PgPool) -> Result<Vec<StudentId>, AppError> {
        let ids = sqlx::query_scalar::<_, StudentId>("SELECT id FROM students ORDER BY id")
            .fetch_all(db)
            .await?;
        Ok(ids)
    }
}

/// Splits loaded contacts into granted and revoked courses.
fn split_contacts(
    contacts: Vec<CourseContact>,
    grants: &[CourseCode],
) -> (Vec<CourseContact>, Vec<CourseContact>) {
    let granted: BTreeSet<&CourseCode> = grants.iter().collect();
    contacts
        .into_iter()
        .partition(|contact| granted.contains(&contact.code))
}
