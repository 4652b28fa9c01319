use crate::errors::{ClockError, EntryError};
use crate::models::{
    employee_name, minutes_to_hours, AdminSummary, AppData, EmployeeDetail, EmployeeOverview,
    TimeEntry, TimeEntryResponse, WeeklyReport,
};
use crate::weekly::aggregate;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashSet};

pub fn clock_in(
    data: &mut AppData,
    first_name: &str,
    last_name: &str,
    now: NaiveDateTime,
) -> Result<TimeEntryResponse, ClockError> {
    if open_entry(data, first_name, last_name).is_some() {
        return Err(ClockError::AlreadyClockedIn);
    }

    let entry = TimeEntry {
        id: data.next_id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        clock_in_time: Some(now),
        clock_out_time: None,
    };
    data.next_id = data.next_id.saturating_add(1);
    let response = entry.to_response()?;
    data.entries.push(entry);
    Ok(response)
}

pub fn clock_out(
    data: &mut AppData,
    first_name: &str,
    last_name: &str,
    now: NaiveDateTime,
) -> Result<TimeEntryResponse, ClockError> {
    let entry = data
        .entries
        .iter_mut()
        .find(|entry| entry.belongs_to(first_name, last_name) && entry.is_active())
        .ok_or(ClockError::NotClockedIn)?;

    let clock_in = entry.checked_clock_in()?;
    // a clock that stepped backwards still yields a zero-length shift
    entry.clock_out_time = Some(now.max(clock_in));
    Ok(entry.to_response()?)
}

pub fn current_status(
    data: &AppData,
    first_name: &str,
    last_name: &str,
) -> Result<Option<TimeEntryResponse>, EntryError> {
    open_entry(data, first_name, last_name)
        .map(TimeEntry::to_response)
        .transpose()
}

/// Newest entries first.
pub fn history(
    data: &AppData,
    first_name: &str,
    last_name: &str,
) -> Result<Vec<TimeEntryResponse>, EntryError> {
    let entries: Vec<&TimeEntry> = data
        .entries
        .iter()
        .filter(|entry| entry.belongs_to(first_name, last_name))
        .collect();
    newest_first(&entries)
}

pub fn weekly_report(
    data: &AppData,
    first_name: &str,
    last_name: &str,
) -> Result<WeeklyReport, EntryError> {
    let entries: Vec<TimeEntry> = data
        .entries
        .iter()
        .filter(|entry| entry.belongs_to(first_name, last_name))
        .cloned()
        .collect();
    aggregate(&entries, &employee_name(first_name, last_name))
}

pub fn admin_summary(data: &AppData) -> Result<AdminSummary, EntryError> {
    let total_employees = data
        .entries
        .iter()
        .map(|entry| (entry.first_name.as_str(), entry.last_name.as_str()))
        .collect::<HashSet<_>>()
        .len();
    let currently_active = data.entries.iter().filter(|entry| entry.is_active()).count();

    Ok(AdminSummary {
        total_employees,
        currently_active,
        total_hours: minutes_to_hours(total_minutes(data.entries.iter())?),
        total_entries: data.entries.len(),
    })
}

/// One overview per employee, sorted by employee name.
pub fn all_employees(data: &AppData) -> Result<Vec<EmployeeOverview>, EntryError> {
    let mut groups: BTreeMap<String, Vec<&TimeEntry>> = BTreeMap::new();
    for entry in &data.entries {
        groups.entry(entry.employee_name()).or_default().push(entry);
    }

    let mut overviews = Vec::with_capacity(groups.len());
    for (name, entries) in groups {
        let first = entries[0];
        let responses = newest_first(&entries)?;
        let active_entries = responses.iter().filter(|entry| entry.is_active).count();

        overviews.push(EmployeeOverview {
            employee_name: name,
            first_name: first.first_name.clone(),
            last_name: first.last_name.clone(),
            total_hours: minutes_to_hours(total_minutes(entries.iter().copied())?),
            total_entries: responses.len(),
            active_entries,
            is_currently_active: active_entries > 0,
            latest_entry: responses.first().cloned(),
            entries: responses,
        });
    }

    Ok(overviews)
}

/// `None` when the employee has never clocked in.
pub fn employee_detail(
    data: &AppData,
    first_name: &str,
    last_name: &str,
) -> Result<Option<EmployeeDetail>, EntryError> {
    let entries: Vec<&TimeEntry> = data
        .entries
        .iter()
        .filter(|entry| entry.belongs_to(first_name, last_name))
        .collect();
    if entries.is_empty() {
        return Ok(None);
    }

    let responses = newest_first(&entries)?;
    Ok(Some(EmployeeDetail {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        total_hours: minutes_to_hours(total_minutes(entries.iter().copied())?),
        total_entries: responses.len(),
        active_entries: responses.iter().filter(|entry| entry.is_active).count(),
        entries: responses,
    }))
}

pub fn has_entries(data: &AppData, first_name: &str, last_name: &str) -> bool {
    data.entries
        .iter()
        .any(|entry| entry.belongs_to(first_name, last_name))
}

fn open_entry<'a>(data: &'a AppData, first_name: &str, last_name: &str) -> Option<&'a TimeEntry> {
    data.entries
        .iter()
        .find(|entry| entry.belongs_to(first_name, last_name) && entry.is_active())
}

fn newest_first(entries: &[&TimeEntry]) -> Result<Vec<TimeEntryResponse>, EntryError> {
    let mut keyed = entries
        .iter()
        .map(|entry| Ok((entry.checked_clock_in()?, entry.to_response()?)))
        .collect::<Result<Vec<_>, EntryError>>()?;
    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
    Ok(keyed.into_iter().map(|(_, response)| response).collect())
}

fn total_minutes<'a>(entries: impl Iterator<Item = &'a TimeEntry>) -> Result<i64, EntryError> {
    let mut total = 0i64;
    for entry in entries {
        total += entry.worked_minutes()?.unwrap_or(0);
    }
    Ok(total)
}
