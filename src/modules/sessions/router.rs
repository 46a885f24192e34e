use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    check_session, create_session, delete_session, get_session, get_sessions,
    get_student_schedule, update_session,
};

pub fn init_sessions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_sessions).post(create_session))
        .route("/check", post(check_session))
        .route(
            "/{id}",
            get(get_session).put(update_session).delete(delete_session),
        )
}

pub fn init_student_schedule_router() -> Router<AppState> {
    Router::new().route("/{id}/schedule", get(get_student_schedule))
}
