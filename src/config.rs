use chrono::Duration;
use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_ACCESS_CODE: &str = "777";
const DEFAULT_ADMIN_ACCESS_CODE: &str = "888";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 12 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub employee_access_code: String,
    pub admin_access_code: String,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let session_minutes = lookup("CLOCKIN_SESSION_TTL_MINUTES")
            .and_then(|value| value.parse::<i64>().ok())
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_MINUTES);

        Self {
            port,
            data_path,
            employee_access_code: lookup("CLOCKIN_ACCESS_CODE")
                .unwrap_or_else(|| DEFAULT_ACCESS_CODE.to_string()),
            admin_access_code: lookup("CLOCKIN_ADMIN_ACCESS_CODE")
                .unwrap_or_else(|| DEFAULT_ADMIN_ACCESS_CODE.to_string()),
            session_ttl: Duration::minutes(session_minutes),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
