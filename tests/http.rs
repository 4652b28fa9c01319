use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const ACCESS_CODE: &str = "777";
const ADMIN_ACCESS_CODE: &str = "888";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeEntryResponse {
    id: u64,
    first_name: String,
    clock_out_time: Option<String>,
    total_hours: Option<f64>,
    is_active: bool,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("clockin_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/session")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_clockin"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("CLOCKIN_ACCESS_CODE", ACCESS_CODE)
        .env("CLOCKIN_ADMIN_ACCESS_CODE", ADMIN_ACCESS_CODE)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn employee_token(client: &Client, base_url: &str, first: &str, last: &str) -> String {
    let body: Value = client
        .post(format!("{base_url}/api/time-entries/login"))
        .json(&json!({ "firstName": first, "lastName": last, "accessCode": ACCESS_CODE }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["role"], "employee");
    body["token"].as_str().expect("missing token").to_string()
}

async fn admin_token(client: &Client, base_url: &str) -> String {
    let body: Value = client
        .post(format!("{base_url}/api/admin/login"))
        .json(&json!({ "accessCode": ADMIN_ACCESS_CODE }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["isAdmin"], true);
    body["token"].as_str().expect("missing token").to_string()
}

#[tokio::test]
async fn http_employee_clock_in_and_out() {
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;
    let token = employee_token(&client, base, "Ada", "Clockwork").await;

    let status: Option<TimeEntryResponse> = client
        .get(format!("{base}/api/time-entries/status"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(status.is_none());

    let opened: TimeEntryResponse = client
        .post(format!("{base}/api/time-entries/clock-in"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(opened.is_active);
    assert_eq!(opened.first_name, "Ada");
    assert_eq!(opened.total_hours, None);

    let again = client
        .post(format!("{base}/api/time-entries/clock-in"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);
    let error: Value = again.json().await.unwrap();
    assert_eq!(error["error"], "Employee is already clocked in");

    let closed: TimeEntryResponse = client
        .post(format!("{base}/api/time-entries/clock-out"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(closed.id, opened.id);
    assert!(!closed.is_active);
    assert!(closed.clock_out_time.is_some());
    assert!(closed.total_hours.is_some());

    let history: Vec<TimeEntryResponse> = client
        .get(format!("{base}/api/time-entries/history"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, opened.id);

    let weekly: Value = client
        .get(format!("{base}/api/time-entries/weekly"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(weekly["employeeName"], "Ada Clockwork");
    assert_eq!(weekly["totalEntries"], 1);
    assert_eq!(weekly["weeklyData"][0]["weekdays"].as_array().unwrap().len(), 7);
    assert_eq!(weekly["weeklyData"][0]["entryCount"], 1);
}

#[tokio::test]
async fn http_login_validation() {
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let wrong_code = client
        .post(format!("{base}/api/time-entries/login"))
        .json(&json!({ "firstName": "Ada", "lastName": "Clockwork", "accessCode": "000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_code.status(), StatusCode::BAD_REQUEST);
    let error: Value = wrong_code.json().await.unwrap();
    assert_eq!(error["error"], "Invalid access code");

    let blank_name = client
        .post(format!("{base}/api/time-entries/login"))
        .json(&json!({ "firstName": "  ", "lastName": "Clockwork", "accessCode": ACCESS_CODE }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank_name.status(), StatusCode::BAD_REQUEST);
    let error: Value = blank_name.json().await.unwrap();
    assert_eq!(error["error"], "First name is required");

    let admin_with_employee_code = client
        .post(format!("{base}/api/admin/login"))
        .json(&json!({ "accessCode": ACCESS_CODE }))
        .send()
        .await
        .unwrap();
    assert_eq!(admin_with_employee_code.status(), StatusCode::BAD_REQUEST);
    let error: Value = admin_with_employee_code.json().await.unwrap();
    assert_eq!(error["error"], "Invalid admin access code");
}

#[tokio::test]
async fn http_endpoints_check_the_session_role() {
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let anonymous = client
        .get(format!("{base}/api/time-entries/history"))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let forged = client
        .get(format!("{base}/api/admin/summary"))
        .bearer_auth("not-a-session")
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    let employee = employee_token(&client, base, "Role", "Checker").await;
    let admin_as_employee = client
        .get(format!("{base}/api/admin/all-employees"))
        .bearer_auth(&employee)
        .send()
        .await
        .unwrap();
    assert_eq!(admin_as_employee.status(), StatusCode::UNAUTHORIZED);

    let admin = admin_token(&client, base).await;
    let employee_as_admin = client
        .post(format!("{base}/api/time-entries/clock-in"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(employee_as_admin.status(), StatusCode::UNAUTHORIZED);

    let session: Value = client
        .get(format!("{base}/api/session"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["view"], "admin");
}

#[tokio::test]
async fn http_admin_reads_employee_reports() {
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let employee = employee_token(&client, base, "Grace", "Weekly").await;
    for path in ["clock-in", "clock-out", "clock-in"] {
        let response = client
            .post(format!("{base}/api/time-entries/{path}"))
            .bearer_auth(&employee)
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let admin = admin_token(&client, base).await;

    let summary: Value = client
        .get(format!("{base}/api/admin/summary"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(summary["totalEntries"].as_u64().unwrap() >= 2);
    assert!(summary["currentlyActive"].as_u64().unwrap() >= 1);

    let employees: Value = client
        .get(format!("{base}/api/admin/all-employees"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let grace = employees
        .as_array()
        .unwrap()
        .iter()
        .find(|employee| employee["employeeName"] == "Grace Weekly")
        .expect("missing employee");
    assert_eq!(grace["totalEntries"], 2);
    assert_eq!(grace["activeEntries"], 1);
    assert_eq!(grace["isCurrentlyActive"], true);

    let detail: Value = client
        .get(format!("{base}/api/admin/employee/Grace/Weekly"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["firstName"], "Grace");
    assert_eq!(detail["entries"].as_array().unwrap().len(), 2);
    assert_eq!(detail["entries"][0]["isActive"], true);

    let weekly: Value = client
        .get(format!("{base}/api/admin/employee/Grace/Weekly/weekly"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(weekly["firstName"], "Grace");
    assert_eq!(weekly["employeeName"], "Grace Weekly");
    assert_eq!(weekly["totalEntries"], 2);
    let entry_count: u64 = weekly["weeklyData"]
        .as_array()
        .unwrap()
        .iter()
        .map(|week| week["entryCount"].as_u64().unwrap())
        .sum();
    assert_eq!(entry_count, 2);

    let unknown = client
        .get(format!("{base}/api/admin/employee/No/Body"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    let error: Value = unknown.json().await.unwrap();
    assert_eq!(error["error"], "Employee not found");

    let missing = client
        .get(format!("{base}/api/admin/employee/No/Body/weekly"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_weekly_report_is_empty_before_first_clock_in() {
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;
    let token = employee_token(&client, base, "Fresh", "Hire").await;

    let response = client
        .get(format!("{base}/api/time-entries/weekly"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let weekly: Value = response.json().await.unwrap();
    assert_eq!(weekly["employeeName"], "Fresh Hire");
    assert_eq!(weekly["totalEntries"], 0);
    assert_eq!(weekly["totalHours"], 0.0);
    assert!(weekly["weeklyData"].as_array().unwrap().is_empty());

    let page = client
        .get(format!("{base}/weekly"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("No time entries."));
}

#[tokio::test]
async fn http_logout_revokes_the_session() {
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;
    let token = employee_token(&client, base, "Short", "Stay").await;

    let logout = client
        .post(format!("{base}/api/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);

    let after = client
        .get(format!("{base}/api/time-entries/status"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_form_login_sets_cookie_and_renders_employee_page() {
    let server = shared_server().await;
    let base = &server.base_url;
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let login_page = client.get(format!("{base}/")).send().await.unwrap();
    assert!(login_page.text().await.unwrap().contains("Sign in"));

    let response = client
        .post(format!("{base}/login"))
        .form(&[
            ("firstName", "Form"),
            ("lastName", "Tester"),
            ("accessCode", ACCESS_CODE),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    let cookie = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .expect("missing session cookie")
        .to_string();
    assert!(cookie.starts_with("clockin_session="));

    let page = client
        .get(format!("{base}/"))
        .header(reqwest::header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Welcome, Form Tester"));
    assert!(page.contains("CLOCKED OUT"));

    let clocked = client
        .post(format!("{base}/clock-in"))
        .header(reqwest::header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert!(clocked.status().is_redirection());

    let weekly = client
        .get(format!("{base}/weekly"))
        .header(reqwest::header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(weekly.contains("Active"));

    let rejected = client
        .post(format!("{base}/login"))
        .form(&[("firstName", "Form"), ("lastName", "Tester"), ("accessCode", "nope")])
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    assert!(rejected.text().await.unwrap().contains("Invalid access code"));
}
