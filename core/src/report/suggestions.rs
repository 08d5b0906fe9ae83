use crate::flows::{SuggestSimilarIssuesInput, suggest_similar_issues};
use crate::llm::CompletionService;
use crate::report::scheduler::{ScheduledHandle, Scheduler, TokioScheduler};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Descriptions shorter than this never trigger a lookup.
pub const MIN_DESCRIPTION_CHARS: usize = 20;
/// Locations shorter than this never trigger a lookup.
pub const MIN_LOCATION_CHARS: usize = 5;
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// What the report form shows next to its description field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionState {
    pub description: String,
    pub location: String,
    pub suggestions: Vec<String>,
    pub is_loading: bool,
}

/// Whether the fields are long enough to be worth a lookup.
pub fn meets_threshold(description: &str, location: &str) -> bool {
    description.chars().count() >= MIN_DESCRIPTION_CHARS
        && location.chars().count() >= MIN_LOCATION_CHARS
}

/// Debounces report-form edits into duplicate-issue lookups.
///
/// Every edit cancels the pending lookup, so only the input that stays
/// unchanged for a full quiet period is ever sent. Results are applied only
/// if no newer edit arrived while the lookup was running.
#[derive(Clone)]
pub struct SuggestionController {
    inner: Arc<Inner>,
}

struct Inner {
    service: Arc<dyn CompletionService>,
    scheduler: Arc<dyn Scheduler>,
    quiet_period: Duration,
    state: watch::Sender<SuggestionState>,
    pending: Mutex<Option<ScheduledHandle>>,
    generation: AtomicU64,
}

impl SuggestionController {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self::with_scheduler(service, Arc::new(TokioScheduler), DEFAULT_QUIET_PERIOD)
    }

    pub fn with_scheduler(
        service: Arc<dyn CompletionService>,
        scheduler: Arc<dyn Scheduler>,
        quiet_period: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SuggestionState::default());
        Self {
            inner: Arc::new(Inner {
                service,
                scheduler,
                quiet_period,
                state,
                pending: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> SuggestionState {
        self.inner.state.borrow().clone()
    }

    pub fn set_description(&self, description: impl Into<String>) {
        let location = self.inner.state.borrow().location.clone();
        self.update(description.into(), location);
    }

    pub fn set_location(&self, location: impl Into<String>) {
        let description = self.inner.state.borrow().description.clone();
        self.update(description, location.into());
    }

    /// Records new field values and reschedules the lookup. Values equal to
    /// the current ones leave any pending or running lookup alone.
    pub fn update(&self, description: String, location: String) {
        let mut pending = self.inner.lock_pending();
        {
            let current = self.inner.state.borrow();
            if current.description == description && current.location == location {
                return;
            }
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(handle) = pending.take() {
            handle.cancel();
        }

        let eligible = meets_threshold(&description, &location);
        let input = SuggestSimilarIssuesInput {
            description: description.clone(),
            location: location.clone(),
        };

        self.inner.state.send_modify(|state| {
            state.description = description;
            state.location = location;
            state.is_loading = false;
            if !eligible {
                state.suggestions.clear();
            }
        });

        if !eligible {
            tracing::trace!(generation, "input below threshold, lookup skipped");
            return;
        }

        let inner = Arc::clone(&self.inner);
        let task = Box::pin(async move { inner.lookup(generation, input).await });
        *pending = Some(
            self.inner
                .scheduler
                .schedule_after(self.inner.quiet_period, task),
        );
    }

    /// Clears the form after submission, cancelling any pending lookup.
    pub fn reset(&self) {
        let mut pending = self.inner.lock_pending();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = pending.take() {
            handle.cancel();
        }
        self.inner.state.send_replace(SuggestionState::default());
    }
}

impl Inner {
    fn lock_pending(&self) -> MutexGuard<'_, Option<ScheduledHandle>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn lookup(&self, generation: u64, input: SuggestSimilarIssuesInput) {
        {
            let _pending = self.lock_pending();
            if !self.is_current(generation) {
                return;
            }
            self.state.send_modify(|state| state.is_loading = true);
        }

        tracing::debug!(generation, "looking up similar issues");
        let result = suggest_similar_issues(self.service.as_ref(), &input).await;

        let _pending = self.lock_pending();
        if !self.is_current(generation) {
            tracing::debug!(generation, "discarding stale suggestions");
            return;
        }

        match result {
            Ok(output) => {
                tracing::debug!(
                    generation,
                    count = output.suggestions.len(),
                    "suggestions received"
                );
                self.state.send_modify(|state| {
                    state.suggestions = output.suggestions;
                    state.is_loading = false;
                });
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "similar issue lookup failed");
                self.state.send_modify(|state| state.is_loading = false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ScriptedCompletion, ScriptedReply};
    use serde_json::json;

    const DESCRIPTION: &str = "Large pothole on Main St causing damage";
    const LOCATION: &str = "123 Main St";

    fn controller(service: Arc<ScriptedCompletion>) -> SuggestionController {
        SuggestionController::new(service)
    }

    fn payload(items: &[&str]) -> ScriptedReply {
        ScriptedReply::Payload(json!({ "suggestions": items }))
    }

    async fn settle() {
        tokio::time::sleep(DEFAULT_QUIET_PERIOD + Duration::from_millis(500)).await;
    }

    #[test]
    fn test_meets_threshold() {
        assert!(meets_threshold(DESCRIPTION, LOCATION));
        assert!(!meets_threshold("Short text", LOCATION));
        assert!(!meets_threshold(DESCRIPTION, "Elm"));
        assert!(meets_threshold(&"x".repeat(20), &"y".repeat(5)));
        assert!(!meets_threshold(&"x".repeat(19), &"y".repeat(5)));
        // counted in characters, not bytes
        assert!(!meets_threshold(&"é".repeat(19), "Straße"));
        assert!(meets_threshold(&"é".repeat(20), "Straße"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_below_threshold_makes_no_calls() {
        let service = Arc::new(ScriptedCompletion::always(payload(&["x"])));
        let controller = controller(service.clone());

        controller.update("Pothole".to_string(), LOCATION.to_string());
        controller.update(DESCRIPTION.to_string(), "Elm".to_string());
        controller.update(String::new(), String::new());
        settle().await;

        assert_eq!(service.calls(), 0);
        let state = controller.snapshot();
        assert!(state.suggestions.is_empty());
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_input_fetches_suggestions() {
        let service = Arc::new(ScriptedCompletion::new([payload(&["Pothole near 120 Main St"])]));
        let controller = controller(service.clone());

        controller.set_description(DESCRIPTION);
        controller.set_location(LOCATION);

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(service.calls(), 0);

        settle().await;
        assert_eq!(service.calls(), 1);
        let state = controller.snapshot();
        assert_eq!(state.suggestions, vec!["Pothole near 120 Main St"]);
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_only_dispatch_final_state() {
        let service = Arc::new(ScriptedCompletion::always(payload(&["Road damage on Main St"])));
        let controller = controller(service.clone());

        for suffix in ["A", "B", "C"] {
            controller.update(format!("{DESCRIPTION} {suffix}"), LOCATION.to_string());
            tokio::time::sleep(Duration::from_millis(400)).await;
        }
        settle().await;

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains(&format!("{DESCRIPTION} C")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_suggestions() {
        let service = Arc::new(ScriptedCompletion::new([
            payload(&["Pothole near 120 Main St"]),
            ScriptedReply::Payload(json!({ "suggestions": "not a list" })),
        ]));
        let controller = controller(service.clone());

        controller.update(DESCRIPTION.to_string(), LOCATION.to_string());
        settle().await;
        assert_eq!(controller.snapshot().suggestions, vec!["Pothole near 120 Main St"]);

        controller.update(format!("{DESCRIPTION}!"), LOCATION.to_string());
        settle().await;

        assert_eq!(service.calls(), 2);
        let state = controller.snapshot();
        assert_eq!(state.suggestions, vec!["Pothole near 120 Main St"]);
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_error_degrades_silently() {
        let service = Arc::new(ScriptedCompletion::new([ScriptedReply::Fail {
            status: 503,
            body: "overloaded".to_string(),
        }]));
        let controller = controller(service.clone());

        controller.update(DESCRIPTION.to_string(), LOCATION.to_string());
        settle().await;

        let state = controller.snapshot();
        assert!(state.suggestions.is_empty());
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_lookup_discards_stale_result() {
        let service = Arc::new(
            ScriptedCompletion::new([payload(&["stale"]), payload(&["fresh"])])
                .with_latency(Duration::from_millis(3000)),
        );
        let controller = controller(service.clone());
        let mut rx = controller.subscribe();

        controller.update(DESCRIPTION.to_string(), LOCATION.to_string());
        rx.wait_for(|state| state.is_loading).await.unwrap();

        controller.update(format!("{DESCRIPTION} near the bus stop"), LOCATION.to_string());
        assert!(!controller.snapshot().is_loading);

        tokio::time::sleep(Duration::from_millis(5000)).await;
        let state = controller.snapshot();
        assert_eq!(state.suggestions, vec!["fresh"]);
        assert!(!state.is_loading);
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_fields_keep_running_lookup() {
        let service = Arc::new(
            ScriptedCompletion::always(payload(&["Pothole near 120 Main St"]))
                .with_latency(Duration::from_millis(300)),
        );
        let controller = controller(service.clone());

        controller.update(DESCRIPTION.to_string(), LOCATION.to_string());
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(controller.snapshot().is_loading);

        controller.set_location(LOCATION);
        controller.update(DESCRIPTION.to_string(), LOCATION.to_string());
        tokio::time::sleep(Duration::from_millis(3000)).await;

        assert_eq!(service.calls(), 1);
        let state = controller.snapshot();
        assert_eq!(state.suggestions, vec!["Pothole near 120 Main St"]);
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_below_threshold_clears_suggestions() {
        let service = Arc::new(ScriptedCompletion::always(payload(&["Pothole near 120 Main St"])));
        let controller = controller(service.clone());

        controller.update(DESCRIPTION.to_string(), LOCATION.to_string());
        settle().await;
        assert_eq!(controller.snapshot().suggestions.len(), 1);

        controller.set_description("Pothole");
        assert!(controller.snapshot().suggestions.is_empty());
        settle().await;
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_pending_lookup() {
        let service = Arc::new(ScriptedCompletion::always(payload(&["x"])));
        let controller = controller(service.clone());

        controller.update(DESCRIPTION.to_string(), LOCATION.to_string());
        controller.reset();
        settle().await;

        assert_eq!(service.calls(), 0);
        assert_eq!(controller.snapshot(), SuggestionState::default());
    }
}
