use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login_form))
        .route("/logout", post(handlers::logout_form))
        .route("/clock-in", post(handlers::clock_in_form))
        .route("/clock-out", post(handlers::clock_out_form))
        .route("/weekly", get(handlers::own_weekly_page))
        .route(
            "/admin/employee/:first_name/:last_name/weekly",
            get(handlers::admin_weekly_page),
        )
        .route("/api/session", get(handlers::get_session))
        .route("/api/logout", post(handlers::logout))
        .route("/api/time-entries/login", post(handlers::employee_login))
        .route("/api/time-entries/clock-in", post(handlers::clock_in))
        .route("/api/time-entries/clock-out", post(handlers::clock_out))
        .route("/api/time-entries/status", get(handlers::get_status))
        .route("/api/time-entries/history", get(handlers::get_history))
        .route("/api/time-entries/weekly", get(handlers::get_own_weekly))
        .route("/api/admin/login", post(handlers::admin_login))
        .route("/api/admin/summary", get(handlers::get_admin_summary))
        .route("/api/admin/all-employees", get(handlers::get_all_employees))
        .route(
            "/api/admin/employee/:first_name/:last_name",
            get(handlers::get_employee),
        )
        .route(
            "/api/admin/employee/:first_name/:last_name/weekly",
            get(handlers::get_employee_weekly),
        )
        .with_state(state)
}
