use crate::auth::Session;
use crate::models::{
    employee_name, AdminSummary, DayBucket, EmployeeOverview, TimeEntryResponse, WeekBucket,
    WeeklyReport,
};
use chrono::NaiveDateTime;
use std::fmt::Write;

pub fn render_login(error: Option<&str>) -> String {
    let error = error
        .map(|message| format!(r#"<p class="status error">{}</p>"#, escape_html(message)))
        .unwrap_or_default();
    let body = format!(
        r#"<section class="card">
      <h2>Sign in</h2>
      {error}
      <form method="post" action="/login" class="login">
        <label>First name <input name="firstName" autocomplete="given-name" /></label>
        <label>Last name <input name="lastName" autocomplete="family-name" /></label>
        <label>Access code <input name="accessCode" type="password" required /></label>
        <button type="submit">Log in</button>
      </form>
    </section>"#
    );
    render_page("Time Clock", &body)
}

pub fn render_employee(
    session: &Session,
    status: Option<&TimeEntryResponse>,
    history: &[TimeEntryResponse],
) -> String {
    let name = escape_html(&employee_name(&session.first_name, &session.last_name));
    let (status_badge, action) = match status {
        Some(entry) => (
            format!(
                r#"{} <span class="muted">since {}</span>"#,
                badge("CLOCKED IN", true),
                format_date_time(entry.clock_in_time)
            ),
            r#"<form method="post" action="/clock-out"><button type="submit" class="danger">Clock out</button></form>"#,
        ),
        None => (
            badge("CLOCKED OUT", false),
            r#"<form method="post" action="/clock-in"><button type="submit">Clock in</button></form>"#,
        ),
    };

    let mut rows = String::new();
    for entry in history {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            format_date(entry.clock_in_time),
            format_date_time(entry.clock_in_time),
            format_date_time(entry.clock_out_time),
            format_hours(entry.total_hours),
            entry_badge(entry),
        );
    }

    let body = format!(
        r#"<section class="card">
      <h2>Welcome, {name}</h2>
      <p>Status: {status_badge}</p>
      <div class="actions">{action}<a href="/weekly">Weekly view</a>{logout}</div>
    </section>
    <section class="card">
      <h2>History</h2>
      {table}
    </section>"#,
        logout = LOGOUT_FORM,
        table = table(&["Date", "Clock in", "Clock out", "Total", "Status"], &rows, history.is_empty()),
    );
    render_page("Time Clock", &body)
}

pub fn render_admin(summary: &AdminSummary, employees: &[EmployeeOverview]) -> String {
    let mut rows = String::new();
    for employee in employees {
        let latest = employee
            .latest_entry
            .as_ref()
            .map(|entry| format_date_time(entry.clock_in_time))
            .unwrap_or_else(|| "N/A".to_string());
        let state = if employee.is_currently_active {
            badge("ACTIVE", true)
        } else {
            badge("INACTIVE", false)
        };
        let _ = write!(
            rows,
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><a href="/admin/employee/{}/{}/weekly">Weekly</a></td></tr>"#,
            escape_html(&employee.employee_name),
            format_hours(Some(employee.total_hours)),
            employee.total_entries,
            state,
            latest,
            escape_path(&employee.first_name),
            escape_path(&employee.last_name),
        );
    }

    let body = format!(
        r#"<section class="card">
      <h2>Admin dashboard</h2>
      <div class="panel">
        {employees_stat}{active_stat}{hours_stat}{entries_stat}
      </div>
      <div class="actions">{logout}</div>
    </section>
    <section class="card">
      <h2>Employees</h2>
      {table}
    </section>"#,
        employees_stat = stat("Employees", &summary.total_employees.to_string()),
        active_stat = stat("Currently active", &summary.currently_active.to_string()),
        hours_stat = stat("Total hours", &summary.total_hours.to_string()),
        entries_stat = stat("Total entries", &summary.total_entries.to_string()),
        logout = LOGOUT_FORM,
        table = table(
            &["Employee", "Total hours", "Entries", "Currently active", "Latest clock in", ""],
            &rows,
            employees.is_empty(),
        ),
    );
    render_page("Time Clock Admin", &body)
}

pub fn render_weekly(report: &WeeklyReport) -> String {
    let mut weeks = String::new();
    for week in &report.weekly_data {
        weeks.push_str(&render_week(week));
    }
    if report.weekly_data.is_empty() {
        weeks.push_str(r#"<p class="muted">No time entries.</p>"#);
    }

    let body = format!(
        r#"<section class="card">
      <h2>{name} &middot; weekly view</h2>
      <div class="panel">{hours}{entries}{week_count}</div>
      <div class="actions"><a href="/">Back</a></div>
    </section>
    {weeks}"#,
        name = escape_html(&report.employee_name),
        hours = stat("Total hours", &report.total_hours.to_string()),
        entries = stat("Total entries", &report.total_entries.to_string()),
        week_count = stat("Weeks", &report.weekly_data.len().to_string()),
    );
    render_page("Weekly view", &body)
}

fn render_week(week: &WeekBucket) -> String {
    let mut days = String::new();
    for day in &week.weekdays {
        days.push_str(&render_day(day));
    }
    format!(
        r#"<section class="card week">
      <h2>{label}</h2>
      <p class="muted">{key} &middot; {hours} &middot; {count} entries</p>
      {days}
    </section>"#,
        label = week.week_label,
        key = week.week_key,
        hours = format_hours(Some(week.total_hours)),
        count = week.entry_count,
    )
}

fn render_day(day: &DayBucket) -> String {
    let mut rows = String::new();
    for entry in &day.entries {
        let clock_out = match entry.clock_out_time {
            Some(_) => format_time(entry.clock_out_time),
            None => "Active".to_string(),
        };
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            format_time(entry.clock_in_time),
            clock_out,
            format_hours(entry.total_hours),
            entry_badge(entry),
        );
    }
    format!(
        r#"<div class="day"><h3>{weekday} <span class="muted">{date} &middot; {hours}</span></h3>{table}</div>"#,
        weekday = day.weekday,
        date = day.date.format("%b %d"),
        hours = format_hours(Some(day.total_hours)),
        table = table(&["Clock in", "Clock out", "Duration", "Status"], &rows, day.entries.is_empty()),
    )
}

fn table(headers: &[&str], rows: &str, empty: bool) -> String {
    if empty {
        return r#"<p class="muted">No entries.</p>"#.to_string();
    }
    let head: String = headers.iter().map(|name| format!("<th>{name}</th>")).collect();
    format!("<table><thead><tr>{head}</tr></thead><tbody>{rows}</tbody></table>")
}

fn stat(label: &str, value: &str) -> String {
    format!(r#"<div class="stat"><span class="label">{label}</span><span class="value">{value}</span></div>"#)
}

fn badge(text: &str, active: bool) -> String {
    let class = if active { "active" } else { "inactive" };
    format!(r#"<span class="badge {class}">{text}</span>"#)
}

fn entry_badge(entry: &TimeEntryResponse) -> String {
    if entry.is_active {
        badge("ACTIVE", true)
    } else {
        badge("COMPLETED", false)
    }
}

fn format_hours(hours: Option<f64>) -> String {
    match hours {
        Some(hours) => format!("{hours} hours"),
        None => "N/A".to_string(),
    }
}

fn format_date_time(value: Option<NaiveDateTime>) -> String {
    value
        .map(|value| value.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn format_date(value: Option<NaiveDateTime>) -> String {
    value
        .map(|value| value.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn format_time(value: Option<NaiveDateTime>) -> String {
    value
        .map(|value| value.format("%H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Percent-encodes everything outside the unreserved set for use in a path segment.
fn escape_path(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

fn render_page(title: &str, body: &str) -> String {
    PAGE_HTML.replace("{{TITLE}}", title).replace("{{BODY}}", body)
}

const LOGOUT_FORM: &str =
    r#"<form method="post" action="/logout"><button type="submit" class="secondary">Log out</button></form>"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --ink: #2b2a28;
      --accent: #2f4858;
      --active: #2d7a4b;
      --danger: #c63b2b;
      --muted: #7a746d;
    }

    body {
      margin: 0;
      background: #f8f3e6;
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 24px 16px 48px;
    }

    main {
      width: min(960px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    .card {
      background: white;
      border-radius: 16px;
      padding: 24px;
      box-shadow: 0 12px 30px rgba(47, 72, 88, 0.12);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 12px;
    }

    .stat {
      border: 1px solid rgba(47, 72, 88, 0.12);
      border-radius: 12px;
      padding: 12px;
      display: grid;
      gap: 4px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
    }

    .actions {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      gap: 12px;
      margin-top: 16px;
    }

    .login {
      display: grid;
      gap: 12px;
      max-width: 320px;
    }

    label {
      display: grid;
      gap: 4px;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-weight: 600;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }

    button.danger {
      background: var(--danger);
    }

    button.secondary {
      background: #e6e1d8;
      color: var(--ink);
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 6px 8px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    .badge {
      font-size: 0.75rem;
      font-weight: 600;
      padding: 2px 8px;
      border-radius: 999px;
      color: white;
    }

    .badge.active {
      background: var(--active);
    }

    .badge.inactive {
      background: var(--muted);
    }

    .muted {
      color: var(--muted);
      font-weight: normal;
    }

    .status.error {
      color: var(--danger);
    }
  </style>
</head>
<body>
  <main>
    <header><h1>{{TITLE}}</h1></header>
    {{BODY}}
  </main>
</body>
</html>
"#;
