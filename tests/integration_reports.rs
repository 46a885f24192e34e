mod common;

use axum::http::StatusCode;
use common::{create_test_course, create_test_student, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
async fn test_reports_follow_grades_and_enrollments(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let s1 = create_test_student(&mut tx, "Sam").await;
    let s2 = create_test_student(&mut tx, "Sue").await;
    create_test_course(&mut tx, "C1", None).await;
    create_test_course(&mut tx, "C2", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool, false);
    send(
        &app,
        "POST",
        "/api/groups",
        Some(json!({"name": "G1", "course_codes": ["C1"], "student_ids": [s1, s2]})),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/groups",
        Some(json!({"name": "G2", "course_codes": ["C2"], "student_ids": [s1]})),
    )
    .await;
    assert_eq!(app.notifier.events().len(), 3);

    let (_, grades) = send(&app, "GET", &format!("/api/grades?student_id={}", s1), None).await;
    for grade in grades.as_array().unwrap() {
        let scores = if grade["course_code"] == "C1" {
            json!({"exam_score": 12.0, "continuous_score": 15.0, "oral_score": 18.0})
        } else {
            json!({"exam_score": 6.0, "continuous_score": 9.0, "oral_score": 12.0})
        };
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/grades/{}", grade["id"].as_str().unwrap()),
            Some(scores),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, report) = send(
        &app,
        "GET",
        &format!("/api/reports/students/{}/average", s1),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["average"], 12.0);
    assert_eq!(report["graded_courses"], 2);

    let (status, report) =
        send(&app, "GET", "/api/reports/courses/C1/success-rate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        report,
        json!({"course_code": "C1", "success_rate": 50.0, "passing": 1, "graded": 2})
    );

    let (status, top) = send(&app, "GET", "/api/reports/courses/top?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        top,
        json!([{"code": "C1", "title": "Course C1", "enrollments": 2}])
    );

    let (_, top) = send(&app, "GET", "/api/reports/courses/top", None).await;
    assert_eq!(top.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_report_lookups_and_bad_params(pool: PgPool) {
    let app = setup_test_app(pool, false);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/reports/students/{}/average", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/reports/courses/NOPE/success-rate", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/reports/courses/top?limit=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, top) = send(&app, "GET", "/api/reports/courses/top?limit=0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(top.as_array().unwrap().is_empty());
}
