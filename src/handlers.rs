use crate::auth::{expired_cookie, role_for_code, session_cookie, session_token, Role, Session, View};
use crate::errors::AppError;
use crate::models::{
    employee_name, AdminLoginResponse, AdminSummary, EmployeeDetail, EmployeeOverview,
    EmployeeWeeklyResponse, LoginRequest, LoginResponse, SessionResponse, TimeEntryResponse,
    WeeklyReport,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::timesheet;
use crate::ui::{render_admin, render_employee, render_login, render_weekly};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::{Local, NaiveDateTime, Utc};
use tracing::{info, warn};

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Html<String>, AppError> {
    let page = match resolve_view(&state, &headers).await {
        View::LoggedOut => render_login(None),
        View::Employee(session) => {
            let data = state.data.lock().await;
            let status =
                timesheet::current_status(&data, &session.first_name, &session.last_name)?;
            let history = timesheet::history(&data, &session.first_name, &session.last_name)?;
            render_employee(&session, status.as_ref(), &history)
        }
        View::Admin(_) => {
            let data = state.data.lock().await;
            let summary = timesheet::admin_summary(&data)?;
            let employees = timesheet::all_employees(&data)?;
            render_admin(&summary, &employees)
        }
    };
    Ok(Html(page))
}

pub async fn login_form(State(state): State<AppState>, Form(form): Form<LoginRequest>) -> Response {
    match form_session(&state, &form).await {
        Ok(session) => {
            let cookie = session_cookie(&session, state.config.session_ttl);
            ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
        }
        Err(err) => (StatusCode::BAD_REQUEST, Html(render_login(Some(&err.message)))).into_response(),
    }
}

pub async fn clock_in_form(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, AppError> {
    let session = require_employee(&state, &headers).await?;
    record_clock_in(&state, &session).await?;
    Ok(Redirect::to("/"))
}

pub async fn clock_out_form(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, AppError> {
    let session = require_employee(&state, &headers).await?;
    record_clock_out(&state, &session).await?;
    Ok(Redirect::to("/"))
}

pub async fn logout_form(State(state): State<AppState>, headers: HeaderMap) -> Response {
    end_session(&state, &headers).await;
    ([(header::SET_COOKIE, expired_cookie())], Redirect::to("/")).into_response()
}

pub async fn own_weekly_page(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let View::Employee(session) = resolve_view(&state, &headers).await else {
        return Ok(Redirect::to("/").into_response());
    };
    let report = weekly_for(&state, &session.first_name, &session.last_name).await?;
    Ok(Html(render_weekly(&report)).into_response())
}

pub async fn admin_weekly_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((first_name, last_name)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let View::Admin(_) = resolve_view(&state, &headers).await else {
        return Ok(Redirect::to("/").into_response());
    };
    let report = known_employee_weekly(&state, &first_name, &last_name).await?;
    Ok(Html(render_weekly(&report)).into_response())
}

pub async fn employee_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let (first_name, last_name) = required_names(&payload)?;
    let code = required_code(&payload)?;
    if code != state.config.employee_access_code {
        warn!("rejected employee login for {}", employee_name(&first_name, &last_name));
        return Err(AppError::bad_request("Invalid access code"));
    }

    let session = start_session(&state, Role::Employee, &first_name, &last_name).await;
    let current_status = {
        let data = state.data.lock().await;
        timesheet::current_status(&data, &first_name, &last_name)?
    };

    let cookie = session_cookie(&session, state.config.session_ttl);
    let body = LoginResponse {
        message: "Login successful".to_string(),
        role: Role::Employee.as_str(),
        token: session.token,
        first_name,
        last_name,
        current_status,
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let code = required_code(&payload)?;
    if code != state.config.admin_access_code {
        warn!("rejected admin login");
        return Err(AppError::bad_request("Invalid admin access code"));
    }

    let (first_name, last_name) = optional_names(&payload);
    let session = start_session(&state, Role::Admin, &first_name, &last_name).await;
    let cookie = session_cookie(&session, state.config.session_ttl);
    let body = AdminLoginResponse {
        message: "Admin login successful".to_string(),
        role: Role::Admin.as_str(),
        token: session.token,
        is_admin: true,
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    end_session(&state, &headers).await;
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, expired_cookie())]).into_response()
}

pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionResponse> {
    let view = resolve_view(&state, &headers).await;
    let (first_name, last_name) = match &view {
        View::Employee(session) => (
            Some(session.first_name.clone()),
            Some(session.last_name.clone()),
        ),
        View::Admin(_) | View::LoggedOut => (None, None),
    };
    Json(SessionResponse {
        view: view.name(),
        first_name,
        last_name,
    })
}

pub async fn clock_in(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<TimeEntryResponse>, AppError> {
    let session = require_employee(&state, &headers).await?;
    Ok(Json(record_clock_in(&state, &session).await?))
}

pub async fn clock_out(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<TimeEntryResponse>, AppError> {
    let session = require_employee(&state, &headers).await?;
    Ok(Json(record_clock_out(&state, &session).await?))
}

pub async fn get_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Option<TimeEntryResponse>>, AppError> {
    let session = require_employee(&state, &headers).await?;
    let data = state.data.lock().await;
    let status = timesheet::current_status(&data, &session.first_name, &session.last_name)?;
    Ok(Json(status))
}

pub async fn get_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<TimeEntryResponse>>, AppError> {
    let session = require_employee(&state, &headers).await?;
    let data = state.data.lock().await;
    let history = timesheet::history(&data, &session.first_name, &session.last_name)?;
    Ok(Json(history))
}

pub async fn get_own_weekly(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<WeeklyReport>, AppError> {
    let session = require_employee(&state, &headers).await?;
    let report = weekly_for(&state, &session.first_name, &session.last_name).await?;
    Ok(Json(report))
}

pub async fn get_admin_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminSummary>, AppError> {
    require_admin(&state, &headers).await?;
    let data = state.data.lock().await;
    Ok(Json(timesheet::admin_summary(&data)?))
}

pub async fn get_all_employees(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<EmployeeOverview>>, AppError> {
    require_admin(&state, &headers).await?;
    let data = state.data.lock().await;
    Ok(Json(timesheet::all_employees(&data)?))
}

pub async fn get_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((first_name, last_name)): Path<(String, String)>,
) -> Result<Json<EmployeeDetail>, AppError> {
    require_admin(&state, &headers).await?;
    let data = state.data.lock().await;
    timesheet::employee_detail(&data, &first_name, &last_name)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Employee not found"))
}

pub async fn get_employee_weekly(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((first_name, last_name)): Path<(String, String)>,
) -> Result<Json<EmployeeWeeklyResponse>, AppError> {
    require_admin(&state, &headers).await?;
    let report = known_employee_weekly(&state, &first_name, &last_name).await?;
    Ok(Json(EmployeeWeeklyResponse {
        first_name,
        last_name,
        report,
    }))
}

async fn weekly_for(state: &AppState, first_name: &str, last_name: &str) -> Result<WeeklyReport, AppError> {
    let data = state.data.lock().await;
    Ok(timesheet::weekly_report(&data, first_name, last_name)?)
}

/// Admin lookups treat a name with no entries as unknown.
async fn known_employee_weekly(
    state: &AppState,
    first_name: &str,
    last_name: &str,
) -> Result<WeeklyReport, AppError> {
    let data = state.data.lock().await;
    if !timesheet::has_entries(&data, first_name, last_name) {
        return Err(AppError::not_found("Employee not found"));
    }
    Ok(timesheet::weekly_report(&data, first_name, last_name)?)
}

/// Changes are made on a copy and only replace the shared data once they are on disk.
async fn record_clock_in(state: &AppState, session: &Session) -> Result<TimeEntryResponse, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let entry = timesheet::clock_in(&mut next, &session.first_name, &session.last_name, local_now())?;
    persist_data(&state.config.data_path, &next).await?;
    *data = next;
    info!(
        "{} clocked in (entry {})",
        employee_name(&session.first_name, &session.last_name),
        entry.id
    );
    Ok(entry)
}

async fn record_clock_out(state: &AppState, session: &Session) -> Result<TimeEntryResponse, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let entry = timesheet::clock_out(&mut next, &session.first_name, &session.last_name, local_now())?;
    persist_data(&state.config.data_path, &next).await?;
    *data = next;
    info!(
        "{} clocked out (entry {}, {:?} hours)",
        employee_name(&session.first_name, &session.last_name),
        entry.id,
        entry.total_hours
    );
    Ok(entry)
}

async fn start_session(state: &AppState, role: Role, first_name: &str, last_name: &str) -> Session {
    let mut sessions = state.sessions.lock().await;
    let session = sessions.issue(role, first_name, last_name, Utc::now(), state.config.session_ttl);
    let name = employee_name(first_name, last_name);
    match name.trim() {
        "" => info!("{} session started", role.as_str()),
        name => info!("{} session started for '{}'", role.as_str(), name),
    }
    session
}

/// The form login picks the role from whichever access code matches.
async fn form_session(state: &AppState, form: &LoginRequest) -> Result<Session, AppError> {
    let code = required_code(form)?;
    let role = role_for_code(
        code,
        &state.config.employee_access_code,
        &state.config.admin_access_code,
    )
    .ok_or_else(|| {
        warn!("rejected login with an unknown access code");
        AppError::bad_request("Invalid access code")
    })?;
    let (first_name, last_name) = match role {
        Role::Admin => optional_names(form),
        Role::Employee => required_names(form)?,
    };
    Ok(start_session(state, role, &first_name, &last_name).await)
}

async fn end_session(state: &AppState, headers: &HeaderMap) {
    if let Some(token) = session_token(headers) {
        if state.sessions.lock().await.revoke(token) {
            info!("session ended");
        }
    }
}

async fn resolve_view(state: &AppState, headers: &HeaderMap) -> View {
    match session_token(headers) {
        Some(token) => state.sessions.lock().await.resolve(token, Utc::now()),
        None => View::LoggedOut,
    }
}

async fn require_employee(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    match resolve_view(state, headers).await {
        View::Employee(session) => Ok(session),
        View::Admin(_) => Err(AppError::unauthorized("Employee session required")),
        View::LoggedOut => Err(AppError::unauthorized("Login required")),
    }
}

async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    match resolve_view(state, headers).await {
        View::Admin(session) => Ok(session),
        View::Employee(_) => Err(AppError::unauthorized("Admin session required")),
        View::LoggedOut => Err(AppError::unauthorized("Login required")),
    }
}

fn required_names(request: &LoginRequest) -> Result<(String, String), AppError> {
    let first_name = request.first_name.trim();
    if first_name.is_empty() {
        return Err(AppError::bad_request("First name is required"));
    }
    let last_name = request.last_name.trim();
    if last_name.is_empty() {
        return Err(AppError::bad_request("Last name is required"));
    }
    Ok((first_name.to_string(), last_name.to_string()))
}

fn optional_names(request: &LoginRequest) -> (String, String) {
    (
        request.first_name.trim().to_string(),
        request.last_name.trim().to_string(),
    )
}

fn required_code(request: &LoginRequest) -> Result<&str, AppError> {
    let code = request.access_code.trim();
    if code.is_empty() {
        return Err(AppError::bad_request("Access code is required"));
    }
    Ok(code)
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
