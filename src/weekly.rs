use crate::errors::EntryError;
use crate::models::{
    minutes_to_hours, DayBucket, TimeEntry, TimeEntryResponse, WeekBucket, WeeklyReport,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeMap;

#[derive(Default)]
struct DayTally {
    minutes: i64,
    entries: Vec<TimeEntryResponse>,
}

#[derive(Default)]
struct WeekTally {
    days: [DayTally; 7],
}

/// Groups one employee's entries by ISO week and weekday of their clock-in.
///
/// Durations are summed as whole minutes and rounded to hours once per level,
/// so day, week and report totals never compound rounding error.
pub fn aggregate(entries: &[TimeEntry], employee_name: &str) -> Result<WeeklyReport, EntryError> {
    let mut ordered = Vec::with_capacity(entries.len());
    for entry in entries {
        let clock_in = entry.checked_clock_in()?;
        let minutes = entry.worked_minutes()?.unwrap_or(0);
        ordered.push((clock_in, minutes, entry.to_response()?));
    }
    // stable, so entries sharing a clock-in keep their input order
    ordered.sort_by_key(|(clock_in, _, _)| *clock_in);

    let mut weeks: BTreeMap<NaiveDate, WeekTally> = BTreeMap::new();
    let mut total_minutes = 0i64;
    for (clock_in, minutes, response) in ordered {
        let date = clock_in.date();
        let day_index = date.weekday().num_days_from_monday() as usize;
        let day = &mut weeks.entry(week_start(date)).or_default().days[day_index];
        day.minutes += minutes;
        day.entries.push(response);
        total_minutes += minutes;
    }

    let weekly_data = weeks
        .into_iter()
        .rev()
        .map(|(start, tally)| build_week(start, tally))
        .collect();

    Ok(WeeklyReport {
        employee_name: employee_name.to_string(),
        total_hours: minutes_to_hours(total_minutes),
        total_entries: entries.len(),
        weekly_data,
    })
}

fn build_week(start: NaiveDate, tally: WeekTally) -> WeekBucket {
    let end = start + Duration::days(6);
    let mut week_minutes = 0i64;
    let mut entry_count = 0usize;

    let weekdays = tally
        .days
        .into_iter()
        .enumerate()
        .map(|(offset, day)| {
            week_minutes += day.minutes;
            entry_count += day.entries.len();
            let date = start + Duration::days(offset as i64);
            DayBucket {
                weekday: weekday_name(date.weekday()).to_string(),
                date,
                total_hours: minutes_to_hours(day.minutes),
                entries: day.entries,
            }
        })
        .collect();

    WeekBucket {
        week_key: week_key(start),
        week_label: week_label(start, end),
        start_date: start,
        end_date: end,
        total_hours: minutes_to_hours(week_minutes),
        entry_count,
        weekdays,
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_key(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

fn week_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format("%b %d"), end.format("%b %d, %Y"))
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
