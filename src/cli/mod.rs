//! Administrative tasks behind `cohort-cli`.

pub mod seeder;

use std::time::Instant;

use sqlx::PgPool;

use cohort_config::EmailConfig;
use cohort_models::{ReconcileSummary, StudentId};

use crate::modules::enrollments::EnrollmentService;
use crate::notifications::EmailNotifier;

/// Reconciles `students`, or every student when `students` is empty.
///
/// Notifications go out through SMTP only when it is enabled in the
/// environment.
pub async fn reconcile_students(
    db: &PgPool,
    students: &[StudentId],
    email_config: EmailConfig,
) -> Result<ReconcileSummary, Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    let targets = if students.is_empty() {
        EnrollmentService::all_student_ids(db)
            .await
            .map_err(|e| e.error)?
    } else {
        students.to_vec()
    };

    println!("🔄 Reconciling {} students...", targets.len());

    let notifier = EmailNotifier::new(email_config);
    let summary = EnrollmentService::reconcile(db, &notifier, &targets)
        .await
        .map_err(|e| e.error)?;

    println!(
        "   ✓ Granted {}, revoked {} across {} students in {:?}",
        summary.granted,
        summary.revoked,
        summary.students,
        start_time.elapsed()
    );

    Ok(summary)
}
