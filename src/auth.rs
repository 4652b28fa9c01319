use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "clockin_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Employee,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub expires_at: DateTime<Utc>,
}

/// What a request is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    LoggedOut,
    Employee(Session),
    Admin(Session),
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::LoggedOut => "login",
            View::Employee(_) => "employee",
            View::Admin(_) => "admin",
        }
    }
}

/// Maps a shared access code to the role it grants. The admin code wins if both match.
pub fn role_for_code(code: &str, employee_code: &str, admin_code: &str) -> Option<Role> {
    if code == admin_code {
        Some(Role::Admin)
    } else if code == employee_code {
        Some(Role::Employee)
    } else {
        None
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn issue(
        &mut self,
        role: Role,
        first_name: &str,
        last_name: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Session {
        self.sessions.retain(|_, session| session.expires_at > now);
        let session = Session {
            token: Uuid::new_v4().to_string(),
            role,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            expires_at: now + ttl,
        };
        self.sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// Expired sessions are dropped on lookup and whenever a new one is issued.
    pub fn resolve(&mut self, token: &str, now: DateTime<Utc>) -> View {
        let Some(session) = self.sessions.get(token) else {
            return View::LoggedOut;
        };
        if session.expires_at <= now {
            self.sessions.remove(token);
            return View::LoggedOut;
        }

        match session.role {
            Role::Employee => View::Employee(session.clone()),
            Role::Admin => View::Admin(session.clone()),
        }
    }

    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Bearer token first, then the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

pub fn session_cookie(session: &Session, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        session.token,
        ttl.num_seconds()
    )
}

pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}
