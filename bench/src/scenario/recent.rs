use async_trait::async_trait;

use super::{Scenario, ScenarioKind, pages};
use crate::session::Session;

/// Fetches a random page of the recent listing, bounded by the last seen total
#[derive(Debug, Default, Clone, Copy)]
pub struct RecentCrawl;

impl RecentCrawl {
    /// Page to request next. Page 1 until a total spanning a full page is known.
    pub fn next_page(session: &mut Session) -> usize {
        let pages = session.total_memos() / session.target().memos_per_page.max(1);
        if pages > 0 { session.below(pages) } else { 1 }
    }
}

#[async_trait]
impl Scenario for RecentCrawl {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::RecentCrawl
    }

    async fn iterate(&mut self, session: &mut Session) {
        let page = Self::next_page(session);
        pages::recent(session, page).await;
    }
}
