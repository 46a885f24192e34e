use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    create_enrollment, delete_enrollment, get_enrollments, reconcile_enrollments,
};

pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_enrollments).post(create_enrollment))
        .route("/reconcile", post(reconcile_enrollments))
        .route("/{id}", delete(delete_enrollment))
}
