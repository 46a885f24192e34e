mod common;

use axum::http::StatusCode;
use common::{create_test_course, create_test_student, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn grade_id_for(app: &common::TestApp, student: Uuid) -> String {
    let (status, grades) = send(
        app,
        "GET",
        &format!("/api/grades?student_id={}", student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    grades[0]["id"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grades_follow_group_enrollment(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let student = create_test_student(&mut tx, "Sam").await;
    create_test_course(&mut tx, "C1", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool, false);
    send(
        &app,
        "POST",
        "/api/groups",
        Some(json!({"name": "G1", "course_codes": ["C1"], "student_ids": [student]})),
    )
    .await;

    let (status, grades) = send(&app, "GET", "/api/grades?course_code=C1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grades.as_array().unwrap().len(), 1);
    assert_eq!(grades[0]["exam_score"], 0.0);
    assert_eq!(grades[0]["average"], 0.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_grade_scores(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let student = create_test_student(&mut tx, "Sam").await;
    create_test_course(&mut tx, "C1", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool, false);
    send(
        &app,
        "POST",
        "/api/groups",
        Some(json!({"name": "G1", "course_codes": ["C1"], "student_ids": [student]})),
    )
    .await;
    let id = grade_id_for(&app, student).await;
    app.notifier.clear();

    let (status, grade) = send(
        &app,
        "PUT",
        &format!("/api/grades/{}", id),
        Some(json!({"exam_score": 10.0, "continuous_score": 14.0, "oral_score": 18.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grade["average"], 14.0);
    assert!(app.notifier.events().is_empty());

    let (status, grade) = send(&app, "GET", &format!("/api/grades/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grade["oral_score"], 18.0);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/grades/{}", id),
        Some(json!({"exam_score": -1.0, "continuous_score": 14.0, "oral_score": 18.0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "exam_score must not be negative");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_grade(pool: PgPool) {
    let app = setup_test_app(pool, false);

    let (status, _) = send(&app, "GET", &format!("/api/grades/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/grades/{}", Uuid::new_v4()),
        Some(json!({"exam_score": 1.0, "continuous_score": 1.0, "oral_score": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
