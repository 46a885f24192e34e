use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cohort::notifications::RecordingNotifier;
use cohort::router::init_router;
use cohort::state::AppState;
use cohort_config::{CorsConfig, EmailConfig, EnrollmentConfig};
use http_body_util::BodyExt;
use sqlx::{PgPool, Postgres, Transaction};
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: axum::Router,
    pub notifier: Arc<RecordingNotifier>,
}

/// Router over `pool` with notifications captured in memory.
pub fn setup_test_app(pool: PgPool, manual_enrollments: bool) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState {
        db: pool,
        email_config: EmailConfig::default(),
        cors_config: CorsConfig::from_origins("http://localhost:3000"),
        enrollment_config: EnrollmentConfig {
            manual_enrollments_enabled: manual_enrollments,
        },
        notifier: notifier.clone(),
    };

    TestApp {
        router: init_router(state),
        notifier,
    }
}

/// Sends one request and returns the status with the decoded JSON body.
///
/// An empty body decodes to `Null`, a non-JSON body to a string.
pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

pub async fn create_test_student(tx: &mut Transaction<'_, Postgres>, name: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO students (enrollment_code, first_name, last_name, email)
        VALUES ($1, $2, 'Student', $3)
        RETURNING id
        "#,
    )
    .bind(generate_unique_code("STU"))
    .bind(name)
    .bind(generate_unique_email())
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_instructor(tx: &mut Transaction<'_, Postgres>, name: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO instructors (first_name, last_name, email)
        VALUES ($1, 'Instructor', $2)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(generate_unique_email())
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

pub async fn create_test_course(
    tx: &mut Transaction<'_, Postgres>,
    code: &str,
    instructor_id: Option<Uuid>,
) {
    sqlx::query(
        r#"
        INSERT INTO courses (code, title, instructor_id)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(code)
    .bind(format!("Course {}", code))
    .bind(instructor_id)
    .execute(&mut **tx)
    .await
    .unwrap();
}

#[allow(dead_code)]
pub async fn enrolled_courses(pool: &PgPool, student_id: Uuid) -> Vec<String> {
    sqlx::query_scalar::<_, String>(
        "SELECT course_code FROM enrollments WHERE student_id = $1 ORDER BY course_code",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn graded_courses(pool: &PgPool, student_id: Uuid) -> Vec<String> {
    sqlx::query_scalar::<_, String>(
        "SELECT course_code FROM grade_records WHERE student_id = $1 ORDER BY course_code",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn generate_unique_code(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}
