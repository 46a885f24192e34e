mod common;

use axum::http::StatusCode;
use common::{
    create_test_course, create_test_instructor, create_test_student, send, setup_test_app,
};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

fn session(code: &str, start: &str, end: &str, group_id: Option<&str>) -> Value {
    json!({
        "course_code": code,
        "session_date": "2024-05-01",
        "start_time": start,
        "end_time": end,
        "room": "A101",
        "group_id": group_id
    })
}

async fn create_group(app: &common::TestApp, name: &str, students: &[Uuid]) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/groups",
        Some(json!({"name": name, "student_ids": students})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["group"]["id"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_instructor_conflict_returns_409(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let instructor = create_test_instructor(&mut tx, "Irene").await;
    create_test_course(&mut tx, "C1", Some(instructor)).await;
    create_test_course(&mut tx, "C2", Some(instructor)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool, false);

    let (status, first) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(session("C1", "09:00", "10:00", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["start_time"], "09:00");

    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(session("C2", "09:30", "10:30", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({
            "ok": false,
            "reason": "instructor_conflict",
            "conflicting_session_id": first["id"]
        })
    );

    let (_, sessions) = send(&app, "GET", "/api/sessions?date=2024-05-01", None).await;
    assert_eq!(sessions.as_array().unwrap().len(), 1);
    assert!(app.notifier.events().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_conflict_through_groups(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let i = create_test_instructor(&mut tx, "Irene").await;
    let j = create_test_instructor(&mut tx, "James").await;
    create_test_course(&mut tx, "C1", Some(i)).await;
    create_test_course(&mut tx, "C2", Some(j)).await;
    let s1 = create_test_student(&mut tx, "S1").await;
    let s2 = create_test_student(&mut tx, "S2").await;
    let s3 = create_test_student(&mut tx, "S3").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool, false);
    let g = create_group(&app, "G1", &[s1, s2]).await;
    let g2 = create_group(&app, "G2", &[s2, s3]).await;

    let (_, first) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(session("C1", "09:00", "10:00", Some(&g))),
    )
    .await;

    let (status, check) = send(
        &app,
        "POST",
        "/api/sessions/check",
        Some(session("C2", "09:30", "10:30", Some(&g2))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["ok"], false);
    assert_eq!(check["reason"], "student_conflict");
    assert_eq!(check["conflicting_session_id"], first["id"]);

    let (status, _) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(session("C2", "10:00", "11:00", Some(&g2))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_disjoint_sessions_may_overlap(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let i = create_test_instructor(&mut tx, "Irene").await;
    let j = create_test_instructor(&mut tx, "James").await;
    create_test_course(&mut tx, "C1", Some(i)).await;
    create_test_course(&mut tx, "C2", Some(j)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool, false);

    let (status, check) = send(
        &app,
        "POST",
        "/api/sessions/check",
        Some(session("C2", "09:30", "10:30", None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check, json!({"ok": true}));

    for (code, start, end) in [("C1", "09:00", "10:00"), ("C2", "09:30", "10:30")] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/sessions",
            Some(session(code, start, end, None)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_excludes_itself(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let i = create_test_instructor(&mut tx, "Irene").await;
    create_test_course(&mut tx, "C1", Some(i)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool, false);
    let (_, created) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(session("C1", "09:00", "10:00", None)),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, check) = send(
        &app,
        "POST",
        "/api/sessions/check",
        Some(json!({
            "course_code": "C1",
            "session_date": "2024-05-01",
            "start_time": "09:15",
            "end_time": "10:15",
            "room": "A101",
            "exclude_session_id": id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["ok"], true);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/sessions/{}", id),
        Some(session("C1", "09:15", "10:15", None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["start_time"], "09:15");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/sessions/{}", Uuid::new_v4()),
        Some(session("C1", "09:15", "10:15", None)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_requests(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    create_test_course(&mut tx, "C1", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool, false);

    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(session("C1", "10:00", "09:00", None)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("must be before"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(session("NOPE", "09:00", "10:00", None)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let missing_group = Uuid::new_v4().to_string();
    let (status, _) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(session("C1", "09:00", "10:00", Some(&missing_group))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({
            "course_code": "C1",
            "session_date": "2024-05-01",
            "start_time": "09:00",
            "end_time": "10:00",
            "room": ""
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_schedule_and_delete(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    create_test_course(&mut tx, "C1", None).await;
    let s1 = create_test_student(&mut tx, "S1").await;
    let s2 = create_test_student(&mut tx, "S2").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool, false);
    let g = create_group(&app, "G1", &[s1]).await;

    let (_, grouped) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(session("C1", "13:00", "14:00", Some(&g))),
    )
    .await;

    let (status, schedule) =
        send(&app, "GET", &format!("/api/students/{}/schedule", s1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule.as_array().unwrap().len(), 1);
    assert_eq!(schedule[0]["id"], grouped["id"]);

    let (_, schedule) = send(&app, "GET", &format!("/api/students/{}/schedule", s2), None).await;
    assert_eq!(schedule, json!([]));

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/students/{}/schedule", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = grouped["id"].as_str().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
