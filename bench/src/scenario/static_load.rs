use async_trait::async_trait;

use super::pages::STATIC_CREDIT;
use super::{Scenario, ScenarioKind};
use crate::check::{Verification, expect_asset};
use crate::session::Session;

/// Requests every static asset in turn, pausing briefly after each.
/// Only the status is verified, whatever the session's checker flag.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticLoad;

#[async_trait]
impl Scenario for StaticLoad {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::StaticLoad
    }

    async fn iterate(&mut self, session: &mut Session) {
        let assets = session.fixtures().static_files.clone();
        let pause = session.target().static_sleep;
        if assets.is_empty() {
            tokio::time::sleep(pause).await;
            return;
        }
        for asset in &assets {
            match session.get(&asset.path) {
                Ok(request) => match session.send(request).await {
                    Ok(page) => {
                        let outcome = expect_asset(&page, &asset.md5, Verification::StatusOnly);
                        session.record(outcome, STATIC_CREDIT);
                    }
                    Err(err) => session.fail_request(&err),
                },
                Err(err) => session.fail_request(&err),
            }
            tokio::time::sleep(pause).await;
        }
    }
}
