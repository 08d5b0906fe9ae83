use crate::api::{errors::Error, state::AppState};
use axum::{
    Router,
    extract::{Json, State},
    routing::post,
};
use civic_core::{
    SuggestSimilarIssuesInput, SuggestSimilarIssuesOutput, SummarizeIssuesInput,
    SummarizeIssuesOutput, suggest_similar_issues, summarize_issues_for_official,
};
use tracing::instrument;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ai/suggest-similar", post(suggest_similar_handler))
        .route("/ai/summarize", post(summarize_handler))
}

/// Similar, already-reported issues for a report in progress.
#[instrument(skip(state, req))]
pub async fn suggest_similar_handler(
    State(state): State<AppState>,
    Json(req): Json<SuggestSimilarIssuesInput>,
) -> Result<Json<SuggestSimilarIssuesOutput>, Error> {
    let output = suggest_similar_issues(state.completion.as_ref(), &req).await?;
    Ok(Json(output))
}

/// Summary of arbitrary issue titles for an official.
#[instrument(skip(state, req), fields(issues = req.issues.len()))]
pub async fn summarize_handler(
    State(state): State<AppState>,
    Json(req): Json<SummarizeIssuesInput>,
) -> Result<Json<SummarizeIssuesOutput>, Error> {
    let output = summarize_issues_for_official(state.completion.as_ref(), &req).await?;
    Ok(Json(output))
}
