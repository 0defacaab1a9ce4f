//! Common Test Utilities for Integration Tests
//!
//! An in-process memo service built on axum, bound to an ephemeral port, plus
//! helpers to build sessions pointed at it.

#![allow(dead_code)]

use axum::{
    Form, Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use memo_bench::check::md5_hex;
use memo_bench::client::RequestExecutor;
use memo_bench::config::{RequestConfig, TargetConfig};
use memo_bench::fixtures::{Fixtures, StaticAsset};
use memo_bench::random::RandomSource;
use memo_bench::session::Session;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SESSION_COOKIE: &str = "isucon_session";
pub const SEEDED_USERS: usize = 400;
const PER_PAGE: usize = 100;

const STATIC_FILES: &[(&str, &str)] = &[
    ("/css/bootstrap.min.css", "body { margin: 0; }\n"),
    ("/js/jquery.min.js", "/* jquery */ window.jQuery = {};\n"),
];

/// Misbehaviours the mock can be asked to exhibit
#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Serve private memos to anyone
    pub leak_private: bool,
    /// Serve static files whose bytes differ from the manifest
    pub corrupt_static: bool,
    /// Keep the server-side session alive after signout
    pub sticky_session: bool,
    /// Set an extra cookie next to the session cookie on signin
    pub extra_cookie: bool,
    /// Report the seeded memo total forever, even after new public memos
    pub stale_total: bool,
    /// Drop the pager, rename the username input and change the greeting
    pub broken_markup: bool,
    /// Serve signed-in pages without `Cache-Control: private`
    pub no_cache_header: bool,
}

#[derive(Debug, Clone)]
struct Memo {
    id: usize,
    user: String,
    content: String,
    private: bool,
}

impl Memo {
    fn title(&self) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches('#')
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone)]
struct Login {
    username: String,
    token: String,
}

struct MockState {
    options: MockOptions,
    memos: Mutex<Vec<Memo>>,
    logins: Mutex<HashMap<String, Login>>,
    /// Successful anonymous views per memo id
    anonymous_views: Mutex<HashMap<usize, usize>>,
}

type Shared = Arc<MockState>;

/// Running mock memo service
pub struct MockMemoService {
    pub endpoint: String,
    state: Shared,
}

impl MockMemoService {
    pub async fn start() -> Self {
        Self::start_with(MockOptions::default()).await
    }

    pub async fn start_with(options: MockOptions) -> Self {
        let memos = (1..=SEEDED_USERS)
            .map(|n| Memo {
                id: n,
                user: format!("isucon{n}"),
                content: format!("# seeded memo {n}\n\nhello"),
                private: false,
            })
            .collect();
        let state = Arc::new(MockState {
            options,
            memos: Mutex::new(memos),
            logins: Mutex::new(HashMap::new()),
            anonymous_views: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/", get(top))
            .route("/recent/:page", get(recent))
            .route("/signin", get(signin_form).post(signin))
            .route("/signout", post(signout))
            .route("/mypage", get(mypage))
            .route("/memo", post(create_memo))
            .route("/memo/:id", get(show_memo))
            .route("/slow", get(slow))
            .fallback(static_file)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            endpoint: format!("http://{addr}"),
            state,
        }
    }

    pub fn memo_count(&self) -> usize {
        self.state.memos.lock().unwrap().len()
    }

    pub fn private_memo_count(&self) -> usize {
        self.state
            .memos
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.private)
            .count()
    }

    pub fn active_logins(&self) -> usize {
        self.state.logins.lock().unwrap().len()
    }

    pub fn anonymous_views(&self, id: usize) -> usize {
        self.state
            .anonymous_views
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or_default()
    }
}

/// Manifest matching the files the mock serves
pub fn static_manifest() -> Vec<StaticAsset> {
    STATIC_FILES
        .iter()
        .map(|(path, body)| StaticAsset::new(*path, md5_hex(body.as_bytes())))
        .collect()
}

pub fn test_fixtures() -> Arc<Fixtures> {
    Arc::new(Fixtures::default().with_static_files(static_manifest()))
}

/// Target settings with the waits shortened for tests
pub fn fast_target() -> TargetConfig {
    TargetConfig {
        static_sleep: Duration::from_millis(1),
        settle_delay: Duration::from_millis(10),
        ..TargetConfig::default()
    }
}

pub fn request_config(timeout: Duration) -> RequestConfig {
    RequestConfig {
        timeout,
        ..RequestConfig::default()
    }
}

/// A running session against `endpoint` with worker id `id`
pub fn test_session(endpoint: &str, id: usize, rng: impl RandomSource + 'static) -> Session {
    let executor =
        RequestExecutor::new(id, &request_config(Duration::from_secs(5))).expect("executor");
    let session = Session::new(id, endpoint, executor, test_fixtures(), fast_target(), Box::new(rng));
    session.start();
    session
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn current_login(state: &MockState, headers: &HeaderMap) -> Option<(String, Login)> {
    let sid = session_id(headers)?;
    let login = state.logins.lock().unwrap().get(&sid).cloned()?;
    Some((sid, login))
}

fn layout(options: &MockOptions, user: Option<&Login>, body: &str) -> Response {
    let nav = match user {
        Some(login) => format!(
            "<li><a href=\"/mypage\">MyPage</a></li>\
             <li><form action=\"/signout\" method=\"post\">\
             <input type=\"hidden\" name=\"sid\" value=\"{}\">\
             <input type=\"submit\" value=\"SignOut\"></form></li>",
            login.token
        ),
        None => "<li><a href=\"/signin\">SignIn</a></li>".to_string(),
    };
    let name = user.map(|l| l.username.as_str()).unwrap_or_default();
    let greeting = if options.broken_markup {
        "Welcome back".to_string()
    } else {
        format!("Hello {name}!")
    };
    let html = format!(
        "<!DOCTYPE html><html><head><title>Isucon3</title>\
         <link rel=\"stylesheet\" href=\"/\"></head><body>\
         <div class=\"navbar\"><div class=\"navbar-inner\"><div class=\"container\">\
         <a class=\"brand\" href=\"/\">Isucon3</a>\
         <div class=\"nav-collapse\"><ul class=\"nav\">{nav}</ul></div>\
         </div></div></div>\
         <div class=\"container\"><h2>{greeting}</h2>{body}</div></body></html>"
    );
    let mut response = html.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    if user.is_some() && !options.no_cache_header {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("private"));
    }
    response
}

fn listing(options: &MockOptions, memos: &[Memo], total: usize) -> String {
    let items: String = memos
        .iter()
        .map(|m| {
            format!(
                "<li><a href=\"/memo/{}\">{}</a> by {}</li>",
                m.id,
                escape(&m.title()),
                m.user
            )
        })
        .collect();
    if options.broken_markup {
        return format!("<h3>public memos</h3><ul id=\"memos\">{items}</ul>");
    }
    format!(
        "<h3>public memos</h3>\
         <p id=\"pager\">recent {PER_PAGE} / <span id=\"total\">{total}</span></p>\
         <ul id=\"memos\">{items}</ul>"
    )
}

fn public_page(state: &MockState, page: usize) -> (Vec<Memo>, usize) {
    let memos = state.memos.lock().unwrap();
    let public: Vec<&Memo> = memos.iter().filter(|m| !m.private).rev().collect();
    let total = if state.options.stale_total {
        SEEDED_USERS
    } else {
        public.len()
    };
    let slice = public
        .into_iter()
        .skip(page * PER_PAGE)
        .take(PER_PAGE)
        .cloned()
        .collect();
    (slice, total)
}

async fn top(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let login = current_login(&state, &headers).map(|(_, l)| l);
    let (memos, total) = public_page(&state, 0);
    layout(&state.options, login.as_ref(), &listing(&state.options, &memos, total))
}

async fn recent(
    State(state): State<Shared>,
    Path(page): Path<usize>,
    headers: HeaderMap,
) -> Response {
    let login = current_login(&state, &headers).map(|(_, l)| l);
    let (memos, total) = public_page(&state, page);
    if memos.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }
    layout(&state.options, login.as_ref(), &listing(&state.options, &memos, total))
}

async fn signin_form(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let login = current_login(&state, &headers).map(|(_, l)| l);
    let field = if state.options.broken_markup { "user" } else { "username" };
    let form = format!(
        "<form action=\"/signin\" method=\"post\">\
         <input type=\"text\" name=\"{field}\">\
         <input type=\"password\" name=\"password\">\
         <input type=\"submit\" value=\"SignIn\"></form>"
    );
    layout(&state.options, login.as_ref(), &form)
}

#[derive(Deserialize)]
struct SigninForm {
    username: String,
    password: String,
}

async fn signin(State(state): State<Shared>, Form(form): Form<SigninForm>) -> Response {
    if !form.username.starts_with("isucon") || form.password != form.username {
        return Redirect::to("/signin").into_response();
    }
    let sid = uuid::Uuid::new_v4().to_string();
    let login = Login {
        username: form.username,
        token: uuid::Uuid::new_v4().simple().to_string(),
    };
    state.logins.lock().unwrap().insert(sid.clone(), login);

    let mut response = Redirect::to("/mypage").into_response();
    let cookie = format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    if state.options.extra_cookie {
        response
            .headers_mut()
            .append(header::SET_COOKIE, HeaderValue::from_static("tracking=1; Path=/"));
    }
    response
}

#[derive(Deserialize)]
struct TokenForm {
    sid: String,
}

async fn signout(
    State(state): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<TokenForm>,
) -> Response {
    let Some((sid, login)) = current_login(&state, &headers) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if login.token != form.sid {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if !state.options.sticky_session {
        state.logins.lock().unwrap().remove(&sid);
    }
    let mut response = Redirect::to("/").into_response();
    let cookie = format!("{SESSION_COOKIE}=; Path=/; Max-Age=0");
    if !state.options.sticky_session
        && let Ok(value) = HeaderValue::from_str(&cookie)
    {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

async fn mypage(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let Some((_, login)) = current_login(&state, &headers) else {
        return Redirect::to("/").into_response();
    };
    let items: String = state
        .memos
        .lock()
        .unwrap()
        .iter()
        .rev()
        .filter(|m| m.user == login.username)
        .map(|m| {
            format!(
                "<li><a href=\"/memo/{}\">{}</a> {}</li>",
                m.id,
                escape(&m.title()),
                if m.private { "[private]" } else { "" }
            )
        })
        .collect();
    let body = format!(
        "<form action=\"/memo\" method=\"post\">\
         <input type=\"hidden\" name=\"sid\" value=\"{}\">\
         <textarea name=\"content\"></textarea>\
         <input type=\"checkbox\" name=\"is_private\" value=\"1\">\
         <input type=\"submit\" value=\"post\"></form>\
         <h3>my memos</h3><ul>{items}</ul>",
        login.token
    );
    layout(&state.options, Some(&login), &body)
}

#[derive(Deserialize)]
struct MemoForm {
    sid: String,
    content: String,
    #[serde(default)]
    is_private: String,
}

async fn create_memo(
    State(state): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<MemoForm>,
) -> Response {
    let Some((_, login)) = current_login(&state, &headers) else {
        return Redirect::to("/").into_response();
    };
    if login.token != form.sid {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let id = {
        let mut memos = state.memos.lock().unwrap();
        let id = memos.len() + 1;
        memos.push(Memo {
            id,
            user: login.username,
            content: form.content,
            private: form.is_private == "1",
        });
        id
    };
    Redirect::to(&format!("/memo/{id}")).into_response()
}

async fn show_memo(
    State(state): State<Shared>,
    Path(id): Path<usize>,
    headers: HeaderMap,
) -> Response {
    let login = current_login(&state, &headers).map(|(_, l)| l);
    let viewer = login.as_ref().map(|l| l.username.as_str());
    let memos = state.memos.lock().unwrap().clone();
    let Some(memo) = memos.iter().find(|m| m.id == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let owner = viewer == Some(memo.user.as_str());
    if memo.private && !owner && !state.options.leak_private {
        return StatusCode::NOT_FOUND.into_response();
    }
    if login.is_none() {
        *state.anonymous_views.lock().unwrap().entry(id).or_default() += 1;
    }

    let older = memos
        .iter()
        .rev()
        .filter(|m| m.user == memo.user && m.id < memo.id && (owner || !m.private))
        .map(|m| format!("<a id=\"older\" href=\"/memo/{}\">&lt; older memo</a>", m.id))
        .next()
        .unwrap_or_default();
    let label = if memo.private { "Private" } else { "Public" };
    let rest: String = memo.content.lines().skip(1).collect::<Vec<_>>().join("\n");
    let body = format!(
        "<p id=\"author\">{label} Memo by {}</p><hr>{older}\
         <div id=\"content_html\"><h1>{}</h1><pre>{}</pre></div>",
        memo.user,
        escape(&memo.title()),
        escape(&rest)
    );
    layout(&state.options, login.as_ref(), &body)
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "finally"
}

async fn static_file(State(state): State<Shared>, uri: axum::http::Uri) -> Response {
    let Some((_, body)) = STATIC_FILES.iter().find(|(path, _)| *path == uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if state.options.corrupt_static {
        return format!("{body}/* tampered */").into_response();
    }
    body.to_string().into_response()
}

/// Always draws 0 and answers the coin with a fixed visibility,
/// so a journey signs in as `isucon1` and posts a predictable memo.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    pub private: bool,
}

impl RandomSource for FixedRandom {
    fn below(&mut self, _upper: usize) -> usize {
        0
    }

    fn coin(&mut self) -> bool {
        self.private
    }
}
