use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;

use cohort_core::AppError;
use cohort_models::{GradeFilterParams, GradeRecord, GradeRecordId, GradeView, UpdateGradeDto};

const GRADE_COLUMNS: &str =
    "id, student_id, course_code, exam_score, continuous_score, oral_score, created_at, updated_at";

/// Read and score-update access to grade records.
///
/// Records are created and removed by reconciliation only.
pub struct GradeService;

impl GradeService {
    #[instrument(skip(db))]
    pub async fn list_grades(
        db: &PgPool,
        filters: GradeFilterParams,
    ) -> Result<Vec<GradeView>, AppError> {
        let records = sqlx::query_as::<_, GradeRecord>(&format!(
            r#"SELECT {GRADE_COLUMNS}
               FROM grade_records
               WHERE ($1::uuid IS NULL OR student_id = $1)
                 AND ($2::text IS NULL OR course_code = $2)
               ORDER BY course_code, student_id"#
        ))
        .bind(filters.student_id)
        .bind(filters.course_code)
        .fetch_all(db)
        .await?;

        Ok(records.into_iter().map(GradeView::from).collect())
    }

    #[instrument(skip(db))]
    pub async fn get_grade(db: &PgPool, id: GradeRecordId) -> Result<GradeView, AppError> {
        let record = sqlx::query_as::<_, GradeRecord>(&format!(
            "SELECT {GRADE_COLUMNS} FROM grade_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Grade record not found")))?;

        Ok(record.into())
    }

    #[instrument(skip(db))]
    pub async fn update_grade(
        db: &PgPool,
        id: GradeRecordId,
        dto: UpdateGradeDto,
    ) -> Result<GradeView, AppError> {
        let record = sqlx::query_as::<_, GradeRecord>(&format!(
            r#"UPDATE grade_records
               SET exam_score = $2, continuous_score = $3, oral_score = $4, updated_at = NOW()
               WHERE id = $1
               RETURNING {GRADE_COLUMNS}"#
        ))
        .bind(id)
        .bind(dto.exam_score)
        .bind(dto.continuous_score)
        .bind(dto.oral_score)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Grade record not found")))?;

        Ok(record.into())
    }
}
