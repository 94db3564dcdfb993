use std::collections::{HashMap, HashSet, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::services::marks::grading::GradeStatus;
use crate::services::marks::types::ReconciledSubject;
use crate::services::marks::{NoDataFound, StudentReport, StudentSource};
use crate::services::telegram_bot::TelegramClient;

/// Student id the fake marks site answers only after a long delay.
pub(crate) const SLOW_STUDENT_ID: &str = "999999999";
pub(crate) const TEST_BOT_TOKEN: &str = "123456:test-token";

const TEST_ENV_KEYS: &[&str] = &[
    "ENVIRONMENT",
    "HOST",
    "PORT",
    "BOT_TOKEN",
    "TG_TOKEN",
    "WEBHOOK_URL",
    "PROXY_URL",
    "TELEGRAM_API_BASE",
    "TELEGRAM_POLL_TIMEOUT_SECONDS",
    "MARKS_SOURCE_URL",
    "MARKS_USER_AGENT",
    "MARKS_TIMEOUT_SECONDS",
    "MARKS_LOG_LEVEL",
    "MARKS_LOG_JSON",
];

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("MARKS_BOT_ENV", "test");
    std::env::set_var("MARKS_BOT_STRICT_CONFIG", "0");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    for key in TEST_ENV_KEYS {
        std::env::remove_var(key);
    }
}

pub(crate) fn marks_page(name: &str, headings: &[&str], tables: &[String]) -> String {
    let mut html = String::from("<html><head><meta charset=\"utf-8\"></head><body>");
    html.push_str(&format!("<div class=\"navbar\"><span class=\"bottom\">{name}</span></div>"));
    for heading in headings {
        html.push_str(&format!(
            "<div class=\"panel panel-default\"><div class=\"panel-heading\">{heading}</div></div>"
        ));
    }
    for table in tables {
        html.push_str(table);
    }
    html.push_str("</body></html>");
    html
}

/// Grade table with a header row followed by `[subject, semester, mark, date]` rows.
pub(crate) fn grade_table(rows: &[[&str; 4]]) -> String {
    let mut html = String::from(
        "<table class=\"table table-striped\"><tr><th>المادة</th><th>الفصل</th>\
         <th>العلامة</th><th>تاريخ الصدور</th></tr>",
    );
    for [subject, semester, mark, date] in rows {
        html.push_str(&format!(
            "<tr><td>{subject}</td><td>{semester}</td><td>{mark}</td><td>{date}</td></tr>"
        ));
    }
    html.push_str("</table>");
    html
}

pub(crate) fn subject(name: &str, semester: &str, mark: f64) -> ReconciledSubject {
    ReconciledSubject {
        subject: name.to_string(),
        mark,
        mark_display: format!("{mark}"),
        semester: semester.to_string(),
        release_date: "2024/01/15".to_string(),
        parsed_date: None,
        status: GradeStatus::classify(mark),
    }
}

pub(crate) fn sample_report(student_id: &str) -> StudentReport {
    StudentReport {
        name: "سارة أحمد".to_string(),
        cohort: "السنة الثانية".to_string(),
        student_id: student_id.to_string(),
        subjects: vec![
            subject("برمجة 1", "الفصل الأول", 88.0),
            subject("رياضيات", "الفصل الأول", 52.0),
            subject("شبكات", "الفصل الثاني", 71.0),
        ],
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener =
        tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("test listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    addr
}

pub(crate) fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: Response<Body>) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}

/// Fixed-answer `StudentSource` that counts how often it is asked.
#[derive(Default)]
pub(crate) struct StubSource {
    reports: HashMap<String, StudentReport>,
    calls: AtomicUsize,
}

impl StubSource {
    pub(crate) fn with_report(mut self, report: StudentReport) -> Self {
        self.reports.insert(report.student_id.clone(), report);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StudentSource for StubSource {
    async fn fetch_report(&self, student_id: &str) -> Result<StudentReport, NoDataFound> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reports.get(student_id).cloned().ok_or(NoDataFound)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MarksRequest {
    pub(crate) student_id: String,
    pub(crate) college: Option<String>,
    pub(crate) user_agent: Option<String>,
}

#[derive(Clone)]
struct MarksSiteState {
    pages: Arc<HashMap<String, String>>,
    requests: Arc<StdMutex<Vec<MarksRequest>>>,
}

/// Local stand-in for the university marks site.
pub(crate) struct MarksSite {
    addr: SocketAddr,
    requests: Arc<StdMutex<Vec<MarksRequest>>>,
}

impl MarksSite {
    pub(crate) fn url_template(&self) -> String {
        format!("http://{}/StdMark/Student/{{student_id}}?college=3", self.addr)
    }

    pub(crate) fn requests(&self) -> Vec<MarksRequest> {
        self.requests.lock().expect("marks requests lock").clone()
    }
}

pub(crate) async fn spawn_marks_site(pages: Vec<(&str, String)>) -> MarksSite {
    let requests = Arc::new(StdMutex::new(Vec::new()));
    let state = MarksSiteState {
        pages: Arc::new(pages.into_iter().map(|(id, html)| (id.to_string(), html)).collect()),
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/StdMark/Student/:student_id", get(marks_site_page))
        .with_state(state);

    MarksSite { addr: serve(app).await, requests }
}

async fn marks_site_page(
    State(state): State<MarksSiteState>,
    Path(student_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.requests.lock().expect("marks requests lock").push(MarksRequest {
        student_id: student_id.clone(),
        college: query.get("college").cloned(),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    });

    if student_id == SLOW_STUDENT_ID {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    match state.pages.get(&student_id) {
        Some(page) => Html(page.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Student not found").into_response(),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TelegramCall {
    pub(crate) token: String,
    pub(crate) method: String,
    pub(crate) body: Value,
}

#[derive(Clone, Default)]
struct TelegramApiState {
    calls: Arc<StdMutex<Vec<TelegramCall>>>,
    updates: Arc<StdMutex<VecDeque<Value>>>,
    failing_methods: Arc<StdMutex<HashSet<String>>>,
    reject_markdown: Arc<AtomicBool>,
}

/// Local stand-in for the Bot API. Records every call and answers like Telegram does.
pub(crate) struct TelegramApi {
    addr: SocketAddr,
    state: TelegramApiState,
}

impl TelegramApi {
    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn client(&self) -> TelegramClient {
        TelegramClient::new(&self.base_url(), TEST_BOT_TOKEN, None).expect("telegram client")
    }

    /// Every `sendMessage` with a `parse_mode` is refused with a 400.
    pub(crate) fn reject_markdown(&self) {
        self.state.reject_markdown.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_method(&self, method: &str) {
        self.state.failing_methods.lock().expect("failing methods lock").insert(method.to_string());
    }

    pub(crate) fn push_update(&self, update: Value) {
        self.state.updates.lock().expect("updates lock").push_back(update);
    }

    pub(crate) fn calls(&self) -> Vec<TelegramCall> {
        self.state.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn calls_to(&self, method: &str) -> Vec<TelegramCall> {
        self.calls().into_iter().filter(|call| call.method == method).collect()
    }

    pub(crate) fn sent_texts(&self) -> Vec<String> {
        self.calls_to("sendMessage")
            .into_iter()
            .filter_map(|call| call.body["text"].as_str().map(str::to_string))
            .collect()
    }
}

pub(crate) async fn spawn_telegram_api() -> TelegramApi {
    let state = TelegramApiState::default();
    let app =
        Router::new().route("/:bot/:method", any(telegram_api_call)).with_state(state.clone());

    TelegramApi { addr: serve(app).await, state }
}

async fn telegram_api_call(
    State(state): State<TelegramApiState>,
    Path((bot, method)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let body = if body.is_empty() {
        json!(query)
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    let token = bot.strip_prefix("bot").unwrap_or(&bot).to_string();
    state.calls.lock().expect("calls lock").push(TelegramCall {
        token,
        method: method.clone(),
        body: body.clone(),
    });

    if state.failing_methods.lock().expect("failing methods lock").contains(&method) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error_code": 500, "description": "Internal Server Error"})),
        )
            .into_response();
    }

    match method.as_str() {
        "getUpdates" => {
            let updates: Vec<Value> =
                state.updates.lock().expect("updates lock").drain(..).collect();
            if updates.is_empty() {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Json(json!({"ok": true, "result": updates})).into_response()
        }
        "sendMessage"
            if state.reject_markdown.load(Ordering::SeqCst) && body.get("parse_mode").is_some() =>
        {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "ok": false,
                    "error_code": 400,
                    "description": "Bad Request: can't parse entities: \
                                    Can't find end of the entity starting at byte offset 0"
                })),
            )
                .into_response()
        }
        "sendMessage" => {
            let chat_id = body["chat_id"].clone();
            Json(json!({
                "ok": true,
                "result": {"message_id": 1, "date": 0, "chat": {"id": chat_id}}
            }))
            .into_response()
        }
        _ => Json(json!({"ok": true, "result": true})).into_response(),
    }
}
