use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use civic_core::admin::SummaryTrigger;
use civic_core::board::IssueBoard;
use civic_core::llm::CompletionService;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub completion: Arc<dyn CompletionService>,
    pub board: Arc<IssueBoard>,
    pub summary: Arc<SummaryTrigger>,
    pub suggest_quiet_period: Duration,
}

impl AppState {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        board: Arc<IssueBoard>,
        suggest_quiet_period: Duration,
    ) -> Self {
        Self {
            summary: Arc::new(SummaryTrigger::new(completion.clone())),
            completion,
            board,
            suggest_quiet_period,
        }
    }
}
