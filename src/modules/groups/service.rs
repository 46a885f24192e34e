//! Group management.
//!
//! Every write commits the group change first and then reconciles the
//! students whose entitlement may have changed: the new roster on create,
//! old and new rosters on update, the prior roster on delete.

use std::collections::BTreeSet;

use anyhow::anyhow;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use cohort_core::AppError;
use cohort_engine::roster_union;
use cohort_models::{
    CourseCode, CreateGroupDto, Group, GroupDeletedResponse, GroupDetails, GroupId,
    GroupMutationResponse, SpecialtyId, StudentId, TermId, UpdateGroupDto,
};

use crate::modules::enrollments::EnrollmentService;
use crate::modules::membership::MembershipStore;
use crate::notifications::Notifier;

const GROUP_COLUMNS: &str = "id, name, term_id, specialty_id, created_at, updated_at";

fn dedup<T: Ord + Clone>(items: &[T]) -> Vec<T> {
    items
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub struct GroupService;

impl GroupService {
    /// Fails with 404 on the first reference that does not resolve.
    async fn ensure_references(
        conn: &mut PgConnection,
        term_id: Option<TermId>,
        specialty_id: Option<SpecialtyId>,
        course_codes: &[CourseCode],
        student_ids: &[StudentId],
    ) -> Result<(), AppError> {
        if let Some(term_id) = term_id
            && !MembershipStore::term_exists(&mut *conn, term_id).await?
        {
            return Err(AppError::not_found(anyhow!("Term {} not found", term_id)));
        }

        if let Some(specialty_id) = specialty_id
            && !MembershipStore::specialty_exists(&mut *conn, specialty_id).await?
        {
            return Err(AppError::not_found(anyhow!(
                "Specialty {} not found",
                specialty_id
            )));
        }

        if let Some(missing) = MembershipStore::missing_courses(&mut *conn, course_codes)
            .await?
            .first()
        {
            return Err(AppError::not_found(anyhow!("Course {} not found", missing)));
        }

        MembershipStore::require_students(&mut *conn, student_ids).await?;

        Ok(())
    }

    async fn replace_roster(
        conn: &mut PgConnection,
        group_id: GroupId,
        student_ids: &[StudentId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM group_students WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            "INSERT INTO group_students (group_id, student_id) SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(group_id)
        .bind(student_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn replace_courses(
        conn: &mut PgConnection,
        group_id: GroupId,
        course_codes: &[CourseCode],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM group_courses WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            "INSERT INTO group_courses (group_id, course_code) SELECT $1, UNNEST($2::text[])",
        )
        .bind(group_id)
        .bind(course_codes)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn roster(conn: &mut PgConnection, group_id: GroupId) -> Result<Vec<StudentId>, sqlx::Error> {
        sqlx::query_scalar::<_, StudentId>(
            "SELECT student_id FROM group_students WHERE group_id = $1 ORDER BY student_id",
        )
        .bind(group_id)
        .fetch_all(conn)
        .await
    }

    async fn details(conn: &mut PgConnection, group: Group) -> Result<GroupDetails, sqlx::Error> {
        let student_ids = Self::roster(&mut *conn, group.id).await?;
        let course_codes = sqlx::query_scalar::<_, CourseCode>(
            "SELECT course_code FROM group_courses WHERE group_id = $1 ORDER BY course_code",
        )
        .bind(group.id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(GroupDetails {
            group,
            student_ids,
            course_codes,
        })
    }

    #[instrument(skip(db, notifier))]
    pub async fn create_group(
        db: &PgPool,
        notifier: &dyn Notifier,
        dto: CreateGroupDto,
    ) -> Result<GroupMutationResponse, AppError> {
        let student_ids = dedup(&dto.student_ids);
        let course_codes = dedup(&dto.course_codes);

        let mut tx = db.begin().await?;
        Self::ensure_references(
            &mut tx,
            dto.term_id,
            dto.specialty_id,
            &course_codes,
            &student_ids,
        )
        .await?;

        let group = sqlx::query_as::<_, Group>(&format!(
            "INSERT INTO groups (name, term_id, specialty_id) VALUES ($1, $2, $3) RETURNING {GROUP_COLUMNS}"
        ))
        .bind(dto.name.trim())
        .bind(dto.term_id)
        .bind(dto.specialty_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_roster(&mut tx, group.id, &student_ids).await?;
        Self::replace_courses(&mut tx, group.id, &course_codes).await?;
        let details = Self::details(&mut tx, group).await?;
        tx.commit().await?;

        info!(group_id = %details.group.id, students = student_ids.len(), "Group created");

        let reconciliation = EnrollmentService::reconcile(db, notifier, &student_ids).await?;

        Ok(GroupMutationResponse {
            group: details,
            reconciliation,
        })
    }

    #[instrument(skip(db))]
    pub async fn get_group(db: &PgPool, id: GroupId) -> Result<GroupDetails, AppError> {
        let mut conn = db.acquire().await?;
        let group = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Group not found")))?;

        Ok(Self::details(&mut conn, group).await?)
    }

    #[instrument(skip(db))]
    pub async fn list_groups(db: &PgPool) -> Result<Vec<GroupDetails>, AppError> {
        let mut conn = db.acquire().await?;
        let groups = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups ORDER BY name, id"
        ))
        .fetch_all(&mut *conn)
        .await?;

        let ids: Vec<GroupId> = groups.iter().map(|g| g.id).collect();
        let mut rosters = MembershipStore::group_rosters(&mut conn, &ids).await?;
        let mut courses = MembershipStore::group_course_sets(&mut conn, &ids).await?;

        Ok(groups
            .into_iter()
            .map(|group| GroupDetails {
                student_ids: rosters
                    .remove(&group.id)
                    .unwrap_or_default()
                    .into_iter()
                    .collect(),
                course_codes: courses
                    .remove(&group.id)
                    .unwrap_or_default()
                    .into_iter()
                    .collect(),
                group,
            })
            .collect())
    }

    /// Replaces a group's attributes and course set, and its roster when
    /// `student_ids` is given.
    #[instrument(skip(db, notifier))]
    pub async fn update_group(
        db: &PgPool,
        notifier: &dyn Notifier,
        id: GroupId,
        dto: UpdateGroupDto,
    ) -> Result<GroupMutationResponse, AppError> {
        let course_codes = dedup(&dto.course_codes);
        let new_roster = dto.student_ids.as_deref().map(dedup);

        let mut tx = db.begin().await?;
        sqlx::query_scalar::<_, GroupId>("SELECT id FROM groups WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Group not found")))?;

        let old_roster = Self::roster(&mut tx, id).await?;
        Self::ensure_references(
            &mut tx,
            dto.term_id,
            dto.specialty_id,
            &course_codes,
            new_roster.as_deref().unwrap_or_default(),
        )
        .await?;

        let group = sqlx::query_as::<_, Group>(&format!(
            r#"UPDATE groups SET name = $2, term_id = $3, specialty_id = $4, updated_at = NOW()
               WHERE id = $1 RETURNING {GROUP_COLUMNS}"#
        ))
        .bind(id)
        .bind(dto.name.trim())
        .bind(dto.term_id)
        .bind(dto.specialty_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_courses(&mut tx, id, &course_codes).await?;
        if let Some(roster) = &new_roster {
            Self::replace_roster(&mut tx, id, roster).await?;
        }
        let details = Self::details(&mut tx, group).await?;
        tx.commit().await?;

        let affected = roster_union(&old_roster, &details.student_ids);
        info!(group_id = %id, affected = affected.len(), "Group updated");

        let reconciliation = EnrollmentService::reconcile(db, notifier, &affected).await?;

        Ok(GroupMutationResponse {
            group: details,
            reconciliation,
        })
    }

    #[instrument(skip(db, notifier))]
    pub async fn delete_group(
        db: &PgPool,
        notifier: &dyn Notifier,
        id: GroupId,
    ) -> Result<GroupDeletedResponse, AppError> {
        let mut tx = db.begin().await?;
        // Roster is read under the row lock so a concurrent update cannot add
        // students after it was captured.
        sqlx::query_scalar::<_, GroupId>("SELECT id FROM groups WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Group not found")))?;

        let prior_roster = Self::roster(&mut tx, id).await?;

        sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(group_id = %id, students = prior_roster.len(), "Group deleted");

        let reconciliation = EnrollmentService::reconcile(db, notifier, &prior_roster).await?;

        Ok(GroupDeletedResponse { id, reconciliation })
    }
}
