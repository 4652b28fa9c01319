use crate::errors::EntryError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub clock_in_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub clock_out_time: Option<NaiveDateTime>,
}

impl TimeEntry {
    pub fn is_active(&self) -> bool {
        self.clock_out_time.is_none()
    }

    pub fn belongs_to(&self, first_name: &str, last_name: &str) -> bool {
        self.first_name == first_name && self.last_name == last_name
    }

    pub fn employee_name(&self) -> String {
        employee_name(&self.first_name, &self.last_name)
    }

    pub fn checked_clock_in(&self) -> Result<NaiveDateTime, EntryError> {
        self.clock_in_time.ok_or(EntryError::InvalidEntry {
            id: self.id,
            reason: "missing clock-in time",
        })
    }

    /// Whole minutes between clock-in and clock-out, `None` while the entry is open.
    pub fn worked_minutes(&self) -> Result<Option<i64>, EntryError> {
        let clock_in = self.checked_clock_in()?;
        match self.clock_out_time {
            None => Ok(None),
            Some(clock_out) if clock_out < clock_in => Err(EntryError::InvalidEntry {
                id: self.id,
                reason: "clock-out time precedes clock-in time",
            }),
            Some(clock_out) => Ok(Some((clock_out - clock_in).num_minutes())),
        }
    }

    pub fn to_response(&self) -> Result<TimeEntryResponse, EntryError> {
        let minutes = self.worked_minutes()?;
        Ok(TimeEntryResponse {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            clock_in_time: self.clock_in_time,
            clock_out_time: self.clock_out_time,
            total_hours: minutes.map(minutes_to_hours),
            is_active: self.is_active(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub next_id: u64,
    pub entries: Vec<TimeEntry>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub access_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryResponse {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub clock_in_time: Option<NaiveDateTime>,
    pub clock_out_time: Option<NaiveDateTime>,
    pub total_hours: Option<f64>,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub role: &'static str,
    pub token: String,
    pub first_name: String,
    pub last_name: String,
    pub current_status: Option<TimeEntryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub message: String,
    pub role: &'static str,
    pub token: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub view: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub total_employees: usize,
    pub currently_active: usize,
    pub total_hours: f64,
    pub total_entries: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeOverview {
    pub employee_name: String,
    pub first_name: String,
    pub last_name: String,
    pub total_hours: f64,
    pub total_entries: usize,
    pub active_entries: usize,
    pub is_currently_active: bool,
    pub latest_entry: Option<TimeEntryResponse>,
    pub entries: Vec<TimeEntryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetail {
    pub first_name: String,
    pub last_name: String,
    pub entries: Vec<TimeEntryResponse>,
    pub total_hours: f64,
    pub total_entries: usize,
    pub active_entries: usize,
}

/// Time entries for one employee, grouped by ISO week and then by weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub employee_name: String,
    pub total_hours: f64,
    pub total_entries: usize,
    /// Most recent week first.
    pub weekly_data: Vec<WeekBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    pub week_key: String,
    pub week_label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_hours: f64,
    pub entry_count: usize,
    /// Always seven days, Monday through Sunday.
    pub weekdays: Vec<DayBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub weekday: String,
    pub date: NaiveDate,
    pub total_hours: f64,
    pub entries: Vec<TimeEntryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWeeklyResponse {
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub report: WeeklyReport,
}

pub fn employee_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

/// Hours rounded to two decimal places.
pub fn minutes_to_hours(minutes: i64) -> f64 {
    (minutes as f64 / 60.0 * 100.0).round() / 100.0
}
