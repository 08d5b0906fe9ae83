use crate::board::{BoardError, IssueBoard};
use crate::flow::FlowError;
use crate::flows::{SummarizeIssuesInput, summarize_issues_for_official};
use crate::llm::CompletionService;
use crate::model::IssueId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("no issues selected")]
    NoIssuesSelected,
    #[error("a summary is already being generated")]
    AlreadyRunning,
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("could not generate summary: {0}")]
    Flow(#[from] FlowError),
}

/// Admin-initiated summaries for officials.
///
/// One generation at a time. A failed attempt leaves the last good summary in
/// place and may be retried immediately.
pub struct SummaryTrigger {
    service: Arc<dyn CompletionService>,
    running: AtomicBool,
    summary: Mutex<Option<String>>,
}

/// Clears the running flag even if the caller drops the future mid-flight.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SummaryTrigger {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            running: AtomicBool::new(false),
            summary: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Last successfully generated summary.
    pub fn summary(&self) -> Option<String> {
        self.summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn generate(&self, titles: Vec<String>) -> Result<String, SummaryError> {
        if titles.is_empty() {
            return Err(SummaryError::NoIssuesSelected);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SummaryError::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);

        let count = titles.len();
        let input = SummarizeIssuesInput { issues: titles };
        match summarize_issues_for_official(self.service.as_ref(), &input).await {
            Ok(output) => {
                tracing::info!(issues = count, "summary generated");
                *self.summary.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(output.summary.clone());
                Ok(output.summary)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to generate summary");
                Err(e.into())
            }
        }
    }

    /// Summarizes the selected board issues, in selection order.
    pub async fn generate_for(
        &self,
        board: &IssueBoard,
        selected: &[IssueId],
    ) -> Result<String, SummaryError> {
        if selected.is_empty() {
            return Err(SummaryError::NoIssuesSelected);
        }
        let titles = board.titles_of(selected)?;
        self.generate(titles).await
    }
}
