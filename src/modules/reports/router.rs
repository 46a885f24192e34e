use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_course_success_rate, get_student_average, get_top_courses};

pub fn init_reports_router() -> Router<AppState> {
    Router::new()
        .route("/students/{id}/average", get(get_student_average))
        .route("/courses/top", get(get_top_courses))
        .route("/courses/{code}/success-rate", get(get_course_success_rate))
}
