use crate::api::state::AppState;
use crate::model::ReportFormEvent;

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use civic_core::report::{SuggestionController, SuggestionState, TokioScheduler};
use futures::{Sink, SinkExt, Stream, StreamExt};

pub fn routes() -> axum::Router<AppState> {
    axum::Router::new().route("/report/ws", get(ws_handler))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sender, receiver) = socket.split();
    let controller = SuggestionController::with_scheduler(
        state.completion.clone(),
        Arc::new(TokioScheduler),
        state.suggest_quiet_period,
    );
    run_session(sender, receiver, controller).await;
}

/// One report form per connection: field edits come in, suggestion state goes
/// out. Returns once either side closes, leaving the controller reset.
pub async fn run_session<S, R, E>(
    mut sender: S,
    mut receiver: R,
    controller: SuggestionController,
) where
    S: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Send + 'static,
{
    let mut rx = controller.subscribe();

    let initial = rx.borrow_and_update().clone();
    if send_state(&mut sender, &initial).await.is_err() {
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if send_state(&mut sender, &snapshot).await.is_err() {
                break;
            }
        }
    });

    let form = controller.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let Message::Text(text) = msg else {
                continue;
            };
            match serde_json::from_str::<ReportFormEvent>(text.as_str()) {
                Ok(ReportFormEvent::Fields {
                    description,
                    location,
                }) => form.update(description, location),
                Ok(ReportFormEvent::Description { value }) => form.set_description(value),
                Ok(ReportFormEvent::Location { value }) => form.set_location(value),
                Ok(ReportFormEvent::Reset) => form.reset(),
                Err(e) => tracing::warn!(error = %e, "ignoring malformed report form event"),
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // drop any lookup still waiting on the quiet period
    controller.reset();
}

async fn send_state<S>(sender: &mut S, state: &SuggestionState) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(state) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode suggestion state");
            return Err(());
        }
    };
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use civic_core::llm::{ScriptedCompletion, ScriptedReply};
    use futures::channel::mpsc;
    use serde_json::{Value, json};

    const DESCRIPTION: &str = "Large pothole on Main St causing damage";
    const LOCATION: &str = "123 Main St";

    struct Session {
        events: mpsc::UnboundedSender<Result<Message, axum::Error>>,
        states: mpsc::UnboundedReceiver<Message>,
        controller: SuggestionController,
        task: tokio::task::JoinHandle<()>,
    }

    fn start(service: Arc<ScriptedCompletion>) -> Session {
        let (events, inbound) = mpsc::unbounded();
        let (outbound, states) = mpsc::unbounded();
        let controller = SuggestionController::with_scheduler(
            service,
            Arc::new(TokioScheduler),
            Duration::from_millis(1000),
        );
        let task = tokio::spawn(run_session(outbound, inbound, controller.clone()));
        Session {
            events,
            states,
            controller,
            task,
        }
    }

    impl Session {
        fn send(&self, event: Value) {
            self.send_raw(&event.to_string());
        }

        fn send_raw(&self, text: &str) {
            self.events
                .unbounded_send(Ok(Message::Text(text.to_string().into())))
                .unwrap();
        }

        /// Reads pushed states until one satisfies `done`.
        async fn state_until(&mut self, done: impl Fn(&Value) -> bool) -> Value {
            loop {
                let Some(Message::Text(text)) = self.states.next().await else {
                    panic!("session closed before the expected state");
                };
                let state: Value = serde_json::from_str(text.as_str()).unwrap();
                if done(&state) {
                    return state;
                }
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_pushes_state_for_form_events() {
        let service = Arc::new(ScriptedCompletion::new([ScriptedReply::Payload(
            json!({ "suggestions": ["Pothole near 120 Main St"] }),
        )]));
        let mut session = start(service.clone());

        let initial = session.state_until(|_| true).await;
        assert_eq!(
            initial,
            json!({ "description": "", "location": "", "suggestions": [], "is_loading": false })
        );

        session.send(json!({ "type": "fields", "description": "Pothole", "location": LOCATION }));
        session.state_until(|s| s["description"] == "Pothole").await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(service.calls(), 0);

        session.send_raw("not an event");
        session.send(json!({ "type": "description", "value": DESCRIPTION }));
        let settled = session
            .state_until(|s| !s["suggestions"].as_array().unwrap().is_empty())
            .await;
        assert_eq!(settled["suggestions"], json!(["Pothole near 120 Main St"]));
        assert_eq!(settled["location"], LOCATION);
        assert_eq!(service.calls(), 1);

        session.send(json!({ "type": "reset" }));
        session.state_until(|s| s["description"] == "").await;
        assert_eq!(session.controller.snapshot(), SuggestionState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_cancels_pending_lookup() {
        let service = Arc::new(ScriptedCompletion::always(ScriptedReply::Payload(
            json!({ "suggestions": ["x"] }),
        )));
        let mut session = start(service.clone());
        session.state_until(|_| true).await;

        session.send(json!({ "type": "location", "value": LOCATION }));
        session.send(json!({ "type": "description", "value": DESCRIPTION }));
        session.state_until(|s| s["description"] == DESCRIPTION).await;

        drop(session.events);
        session.task.await.unwrap();
        tokio::time::sleep(Duration::from_millis(2000)).await;

        assert_eq!(service.calls(), 0);
        assert_eq!(session.controller.snapshot(), SuggestionState::default());
    }
}
