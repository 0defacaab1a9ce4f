use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

use super::pages::{self, MEMO_PATH, PAGE_CREDIT};
use super::{Scenario, ScenarioKind};
use crate::check::{Failure, Verification};
use crate::session::Session;

/// Whether a posted memo is visible to other users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Value of the `is_private` form field
    pub fn form_value(self) -> &'static str {
        match self {
            Visibility::Public => "0",
            Visibility::Private => "1",
        }
    }

    fn draw(session: &mut Session) -> Self {
        if session.coin() {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }
}

/// Full user journey: browse, sign in, post a memo, validate it, sign out.
///
/// Failures never abort an iteration. A post that does not land on a memo
/// page skips the memo-dependent steps but the journey still signs out.
#[derive(Debug, Default, Clone, Copy)]
pub struct FullJourney;

#[async_trait]
impl Scenario for FullJourney {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::FullJourney
    }

    async fn iterate(&mut self, session: &mut Session) {
        session.reset_identity();

        pages::top(session, None).await;
        let verification = if session.is_checker() {
            Verification::Checksum
        } else {
            Verification::StatusOnly
        };
        pages::static_assets(session, verification).await;
        pages::signin_form(session).await;

        let username = session.random_user();
        session.set_username(Some(username.clone()));
        pages::signin(session, &username).await;
        pages::session_cookie(session);

        let title = session.random_title();
        let content = session.random_content(&title);
        let visibility = Visibility::draw(session);
        let memo_url = post_memo(session, &title, &content, visibility).await;

        if memo_url.is_some() {
            validate_posted(session, &title, visibility).await;
        }

        signout(session).await;

        if let Some(memo_url) = &memo_url {
            revisit_anonymously(session, memo_url, visibility).await;
        }
        if session.is_checker() {
            expect_signed_out(session).await;
        }
    }
}

/// POST `/memo` and return the memo page it redirected to
async fn post_memo(
    session: &mut Session,
    title: &str,
    content: &str,
    visibility: Visibility,
) -> Option<Url> {
    let settle = session.target().settle_delay;
    let token = session.token().to_string();
    let request = session
        .post(
            "/memo",
            &[
                ("sid", token.as_str()),
                ("content", content),
                ("is_private", visibility.form_value()),
            ],
        )
        .map(|request| request.with_settle(settle));
    let page = session.fetch(request, StatusCode::OK).await?;
    if !MEMO_PATH.is_match(page.url.path()) {
        session.fail(Failure::structure(format!(
            "posted memo landed on {}",
            page.url.path()
        )));
        return None;
    }
    debug!(worker = session.id(), url = %page.url, ?visibility, "memo posted");

    let view = match pages::inspect_posted(&page.body, title) {
        Ok(view) => view,
        Err(failure) => {
            session.fail(failure);
            return Some(page.url);
        }
    };
    session.record(view.title, PAGE_CREDIT);

    match view.older {
        Ok(href) => pages::memo(session, &href).await,
        Err(failure) => session.fail(failure),
    }

    match view.author {
        Ok(author) if visibility == Visibility::Private => {
            session.record(pages::expect_private_label(&author), PAGE_CREDIT);
        }
        Ok(_) => session.success(PAGE_CREDIT),
        Err(failure) => session.fail(failure),
    }
    Some(page.url)
}

/// A public memo must show up on the top page and grow the memo total
async fn validate_posted(session: &mut Session, title: &str, visibility: Visibility) {
    if visibility == Visibility::Private {
        return;
    }
    let before = session.total_memos();
    pages::top(session, Some(title)).await;
    if !session.is_checker() {
        return;
    }
    let per_page = session.target().memos_per_page.max(1);
    let last = (session.total_memos() / per_page).saturating_sub(1);
    pages::recent(session, last).await;
    if session.total_memos() > before {
        session.success(PAGE_CREDIT);
    } else {
        session.fail(Failure::consistency(format!(
            "total not changed: {before} -> {}",
            session.total_memos()
        )));
    }
}

/// POST `/signout`; the session is anonymous afterwards whatever the outcome
async fn signout(session: &mut Session) {
    let token = session.token().to_string();
    let request = session.post("/signout", &[("sid", token.as_str())]);
    if session.fetch(request, StatusCode::OK).await.is_some() {
        session.success(PAGE_CREDIT);
    }
    session.set_username(None);
}

/// Re-fetch the posted memo without a session. A public memo is fetched
/// twice: once for its status alone, then with the anonymous page checks.
async fn revisit_anonymously(session: &mut Session, memo_url: &Url, visibility: Visibility) {
    match visibility {
        Visibility::Public => {
            let request = session.get(memo_url.as_str());
            if session.fetch(request, StatusCode::OK).await.is_some() {
                session.success(PAGE_CREDIT);
            }
            pages::memo(session, memo_url.as_str()).await;
        }
        Visibility::Private => {
            let request = match session.get(memo_url.as_str()) {
                Ok(request) => request,
                Err(err) => return session.fail_request(&err),
            };
            match session.send(request).await {
                Ok(page) if page.status == StatusCode::NOT_FOUND => session.success(PAGE_CREDIT),
                Ok(page) if page.status == StatusCode::OK => session.fail(Failure::consistency(
                    format!("private memo visible after signout {}", memo_url.path()),
                )),
                Ok(page) => session.fail(Failure::status(
                    page.status,
                    StatusCode::NOT_FOUND,
                    memo_url.as_str(),
                )),
                Err(err) => session.fail_request(&err),
            }
        }
    }
}

/// GET `/mypage` must not land on `/mypage` once signed out
async fn expect_signed_out(session: &mut Session) {
    let request = match session.get("/mypage") {
        Ok(request) => request,
        Err(err) => return session.fail_request(&err),
    };
    match session.send(request).await {
        Ok(page) if page.url.path() == "/mypage" => {
            session.fail(Failure::consistency("session survived signout"));
        }
        Ok(_) => session.success(PAGE_CREDIT),
        Err(err) => session.fail_request(&err),
    }
}
