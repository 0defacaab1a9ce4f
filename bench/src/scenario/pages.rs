//! Page-level checks shared by the scenarios
//!
//! Each `inspect_*` function parses a body synchronously and returns owned
//! values, so no parsed document outlives the call. The async step functions
//! send requests through the session and record the outcomes.

use regex::Regex;
use reqwest::StatusCode;
use std::sync::LazyLock;

use crate::check::{Document, Failure, Verification, expect_asset, expect_header};
use crate::session::Session;

/// Credit for a validated page
pub const PAGE_CREDIT: f64 = 1.0;
/// Credit for a static asset
pub const STATIC_CREDIT: f64 = 0.02;

const PAGER_TOTAL: &str = "p#pager > span#total";
const MEMO_LIST: &str = "ul#memos li";
const GREETING: &str = "h2";

static ANONYMOUS_GREETING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Hello\s+!").expect("valid regex"));
static SIGN_OUT: LazyLock<Regex> = LazyLock::new(|| Regex::new("SignOut").expect("valid regex"));
static SIGN_IN: LazyLock<Regex> = LazyLock::new(|| Regex::new("SignIn").expect("valid regex"));
static PRIVATE: LazyLock<Regex> = LazyLock::new(|| Regex::new("Private").expect("valid regex"));
pub(crate) static MEMO_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/memo/[0-9]+").expect("valid regex"));

fn greeting_for(username: &str) -> Result<Regex, Failure> {
    Regex::new(&format!(r"Hello\s+{}!", regex::escape(username)))
        .map_err(|_| Failure::structure(format!("bad username pattern {username}")))
}

fn pager_total(doc: &Document) -> Result<usize, Failure> {
    doc.expect_count(PAGER_TOTAL, 1)
        .map_err(|_| Failure::structure("no pager"))?;
    let text = doc.first_text(PAGER_TOTAL)?.unwrap_or_default();
    text.trim()
        .parse()
        .map_err(|_| Failure::structure(format!("invalid pager total {:?}", text.trim())))
}

// ---------------------------------------------------------------------------
// Inspections
// ---------------------------------------------------------------------------

/// Outcome of inspecting a memo listing (top page or recent page)
#[derive(Debug)]
pub struct ListingView {
    /// Pager total, when it could be read
    pub total: Option<usize>,
    pub verdict: Result<(), Failure>,
}

impl ListingView {
    fn failed(failure: Failure) -> Self {
        Self {
            total: None,
            verdict: Err(failure),
        }
    }
}

/// Top page: pager total, a full first page and optionally a listed title
pub fn inspect_top(body: &[u8], memos_per_page: usize, title: Option<&str>) -> ListingView {
    let doc = match Document::parse(body) {
        Ok(doc) => doc,
        Err(failure) => return ListingView::failed(failure),
    };
    let total = match pager_total(&doc) {
        Ok(total) => total,
        Err(failure) => return ListingView::failed(failure),
    };
    let verdict = (|| {
        let items = doc.texts(MEMO_LIST)?;
        if items.len() != memos_per_page {
            return Err(Failure::structure("invalid memos list"));
        }
        if let Some(title) = title {
            let pattern = Regex::new(&regex::escape(title))
                .map_err(|_| Failure::structure(format!("bad title pattern {title}")))?;
            if !items.iter().any(|item| pattern.is_match(item)) {
                return Err(Failure::consistency(format!("no match title: {title}")));
            }
        }
        Ok(())
    })();
    ListingView {
        total: Some(total),
        verdict,
    }
}

/// Recent page: at least one memo and a pager total
pub fn inspect_recent(body: &[u8]) -> ListingView {
    let doc = match Document::parse(body) {
        Ok(doc) => doc,
        Err(failure) => return ListingView::failed(failure),
    };
    match doc.count(MEMO_LIST) {
        Ok(0) => return ListingView::failed(Failure::structure("memos too few")),
        Ok(_) => {}
        Err(failure) => return ListingView::failed(failure),
    }
    match pager_total(&doc) {
        Ok(total) => ListingView {
            total: Some(total),
            verdict: Ok(()),
        },
        Err(failure) => ListingView::failed(failure),
    }
}

/// Sign-in page: exactly one username input inside a form
pub fn inspect_signin_form(body: &[u8]) -> Result<(), Failure> {
    let doc = Document::parse(body)?;
    doc.expect_count("form input[name='username']", 1)
        .map_err(|_| Failure::structure("input element not found"))
}

/// What the authenticated landing page revealed
#[derive(Debug)]
pub struct MypageView {
    pub token: String,
    /// Greeting check; only evaluated for strict checkers
    pub greeting: Option<Result<(), Failure>>,
    pub memo_links: Vec<String>,
}

/// Authenticated landing page: anti-forgery token, greeting and memo links.
/// `username` is passed only when the greeting should be checked.
pub fn inspect_mypage(body: &[u8], username: Option<&str>) -> Result<MypageView, Failure> {
    let doc = Document::parse(body)?;
    let token = doc
        .attrs("input[name='sid'][type='hidden']", "value")?
        .into_iter()
        .next()
        .ok_or_else(|| Failure::structure("not found <input type='hidden' name='sid'>"))?;

    let Some(username) = username else {
        return Ok(MypageView {
            token,
            greeting: None,
            memo_links: Vec::new(),
        });
    };
    let greeting =
        Some(greeting_for(username).and_then(|pattern| doc.expect_match(GREETING, &pattern)));
    let memo_links = doc.attrs("div.container > ul > li > a", "href")?;
    Ok(MypageView {
        token,
        greeting,
        memo_links,
    })
}

/// What a memo page revealed to a strict checker
#[derive(Debug)]
pub struct MemoView {
    /// One entry per content check
    pub checks: Vec<Result<(), Failure>>,
    /// `<link href="/">` targets to fetch afterwards
    pub home_links: Vec<String>,
}

/// Memo page as seen by the signed-in user (`Some`) or an anonymous visitor
pub fn inspect_memo(body: &[u8], username: Option<&str>) -> MemoView {
    let doc = match Document::parse(body) {
        Ok(doc) => doc,
        Err(failure) => {
            return MemoView {
                checks: vec![Err(failure)],
                home_links: Vec::new(),
            };
        }
    };
    let mut checks = Vec::with_capacity(2);
    match username {
        Some(username) => {
            checks.push(
                greeting_for(username).and_then(|pattern| doc.expect_match(GREETING, &pattern)),
            );
            checks.push(
                doc.expect_markup_match("input[value='SignOut'][type='submit']", &SIGN_OUT),
            );
        }
        None => {
            checks.push(doc.expect_match(GREETING, &ANONYMOUS_GREETING));
            checks.push(doc.expect_match("ul.nav", &SIGN_IN));
        }
    }
    let home_links = doc.attrs("link[href='/']", "href").unwrap_or_default();
    MemoView { checks, home_links }
}

/// What the page shown right after posting a memo revealed
#[derive(Debug)]
pub struct PostedView {
    pub title: Result<(), Failure>,
    pub older: Result<String, Failure>,
    pub author: Result<String, Failure>,
}

pub fn inspect_posted(body: &[u8], title: &str) -> Result<PostedView, Failure> {
    let doc = Document::parse(body)?;
    let heading = "div.container div#content_html h1";
    let title = Regex::new(&regex::escape(title))
        .map_err(|_| Failure::structure(format!("bad title pattern {title}")))
        .and_then(|pattern| doc.expect_match(heading, &pattern));

    let older = doc.expect_count("a#older", 1).and_then(|()| {
        doc.attrs("a#older", "href")?
            .into_iter()
            .next()
            .ok_or_else(|| Failure::structure("a#older has no href"))
    });
    let author = doc
        .expect_count("p#author", 1)
        .and_then(|()| Ok(doc.first_text("p#author")?.unwrap_or_default()));

    Ok(PostedView {
        title,
        older,
        author,
    })
}

/// Private memos must be labelled as such on their own page
pub fn expect_private_label(author: &str) -> Result<(), Failure> {
    if PRIVATE.is_match(author) {
        Ok(())
    } else {
        Err(Failure::consistency("not private"))
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// GET `/`; strict checkers verify the listing and capture the memo total
pub async fn top(session: &mut Session, title: Option<&str>) {
    let request = session.get("/");
    let Some(page) = session.fetch(request, StatusCode::OK).await else {
        return;
    };
    if !session.is_checker() {
        session.success(PAGE_CREDIT);
        return;
    }
    let view = inspect_top(&page.body, session.target().memos_per_page, title);
    if let Some(total) = view.total {
        session.set_total_memos(total);
    }
    session.record(view.verdict, PAGE_CREDIT);
}

/// GET `/recent/{page}` and capture the memo total
pub async fn recent(session: &mut Session, page: usize) {
    let request = session.get(&format!("/recent/{page}"));
    let Some(page) = session.fetch(request, StatusCode::OK).await else {
        return;
    };
    let view = inspect_recent(&page.body);
    if let Some(total) = view.total {
        session.set_total_memos(total);
    }
    session.record(view.verdict, PAGE_CREDIT);
}

/// GET every manifest asset
pub async fn static_assets(session: &mut Session, verification: Verification) {
    let assets = session.fixtures().static_files.clone();
    for asset in &assets {
        let request = match session.get(&asset.path) {
            Ok(request) => request,
            Err(err) => {
                session.fail_request(&err);
                continue;
            }
        };
        match session.send(request).await {
            Ok(page) => {
                let outcome = expect_asset(&page, &asset.md5, verification);
                session.record(outcome, STATIC_CREDIT);
            }
            Err(err) => session.fail_request(&err),
        }
    }
}

/// GET `/signin`
pub async fn signin_form(session: &mut Session) {
    let request = session.get("/signin");
    let Some(page) = session.fetch(request, StatusCode::OK).await else {
        return;
    };
    if !session.is_checker() {
        session.success(PAGE_CREDIT);
        return;
    }
    session.record(inspect_signin_form(&page.body), PAGE_CREDIT);
}

/// POST `/signin` and validate the authenticated landing page
pub async fn signin(session: &mut Session, username: &str) {
    let request = session.post("/signin", &[("username", username), ("password", username)]);
    let Some(page) = session.fetch(request, StatusCode::OK).await else {
        return;
    };
    if let Err(failure) = expect_header(&page, "Cache-Control", "private") {
        session.fail(failure);
        return;
    }

    let checked_user = session.is_checker().then_some(username);
    let view = match inspect_mypage(&page.body, checked_user) {
        Ok(view) => view,
        Err(failure) => {
            session.fail(failure);
            return;
        }
    };
    session.set_token(view.token);

    let Some(greeting) = view.greeting else {
        session.success(PAGE_CREDIT);
        return;
    };
    session.record(greeting, PAGE_CREDIT);
    session.success(PAGE_CREDIT);

    if view.memo_links.is_empty() {
        return;
    }
    let fetches = session.below(10) + 1;
    for _ in 0..fetches {
        if !session.is_running() {
            break;
        }
        let pick = session.below(view.memo_links.len());
        memo(session, &view.memo_links[pick]).await;
    }
}

/// Every cookie held for the endpoint must be the session cookie
pub fn session_cookie(session: &mut Session) {
    let expected = session.target().session_cookie.clone();
    for name in session.cookie_names() {
        if name != expected {
            session.fail(Failure::header(format!("invalid cookie.name={name}")));
        }
    }
}

/// GET a memo page and validate it for the current viewer
pub async fn memo(session: &mut Session, href: &str) {
    let request = session.get(href);
    let Some(page) = session.fetch(request, StatusCode::OK).await else {
        return;
    };
    if !session.is_checker() {
        session.success(PAGE_CREDIT);
        return;
    }
    let username = session.username().map(str::to_string);
    let view = inspect_memo(&page.body, username.as_deref());
    for check in view.checks {
        session.record(check, PAGE_CREDIT);
    }
    for link in view.home_links {
        let request = session.get(&link);
        if session.fetch(request, StatusCode::OK).await.is_some() {
            session.success(0.0);
        }
    }
}
