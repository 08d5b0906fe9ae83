use crate::api::{errors::Error, state::AppState};
use crate::model::{SummaryRequest, SummaryResponse, SummaryStatusResponse};
use axum::{
    Router,
    extract::{Json, State},
    routing::get,
};
use tracing::instrument;

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/summary", get(summary_status).post(generate_summary))
}

async fn summary_status(State(state): State<AppState>) -> Json<SummaryStatusResponse> {
    Json(SummaryStatusResponse {
        summary: state.summary.summary(),
        running: state.summary.is_running(),
    })
}

/// Generate an AI summary of the selected issues for officials.
#[instrument(skip(state, req), fields(selected = req.issue_ids.len()))]
async fn generate_summary(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, Error> {
    let summary = state
        .summary
        .generate_for(&state.board, &req.issue_ids)
        .await?;
    Ok(Json(SummaryResponse { summary }))
}
