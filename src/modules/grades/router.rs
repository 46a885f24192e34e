use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_grade, get_grades, update_grade};

pub fn init_grades_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_grades))
        .route("/{id}", get(get_grade).put(update_grade))
}
