use crate::api::{errors::Error, state::AppState};
use crate::model::{NewUserRequest, StatusUpdateRequest, VoteRequest};
use axum::{
    Router,
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
};
use civic_core::model::{Issue, IssueId, NewIssueReport, Notification, User, UserId};
use tracing::instrument;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/issues", get(list_issues).post(create_issue))
        .route("/issues/{id}", get(get_issue))
        .route("/issues/{id}/status", post(update_status))
        .route("/issues/{id}/vote", post(cast_vote))
        .route("/users", get(list_users).post(add_user))
        .route("/users/{id}/top-citizen", post(toggle_top_citizen))
        .route("/leaderboard", get(leaderboard))
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}/read", post(mark_notification_read))
}

async fn list_issues(State(state): State<AppState>) -> Json<Vec<Issue>> {
    Json(state.board.list_issues())
}

async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<IssueId>,
) -> Result<Json<Issue>, Error> {
    Ok(Json(state.board.get_issue(id)?))
}

#[instrument(skip(state, req))]
async fn create_issue(
    State(state): State<AppState>,
    Json(req): Json<NewIssueReport>,
) -> Result<(StatusCode, Json<Issue>), Error> {
    let issue = state.board.create_issue(req)?;
    Ok((StatusCode::CREATED, Json(issue)))
}

#[instrument(skip(state, req))]
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<IssueId>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<Issue>, Error> {
    Ok(Json(state.board.update_issue_status(id, req.status)?))
}

async fn cast_vote(
    State(state): State<AppState>,
    Path(id): Path<IssueId>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Issue>, Error> {
    Ok(Json(state.board.cast_vote(id, req.delta)?))
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.board.list_users())
}

async fn add_user(
    State(state): State<AppState>,
    Json(req): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), Error> {
    if req.name.trim().is_empty() {
        return Err(Error::invalid("name must not be empty"));
    }
    let user = state.board.add_user(req.name, req.avatar_url);
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
async fn toggle_top_citizen(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>, Error> {
    Ok(Json(state.board.toggle_top_citizen(id)?))
}

async fn leaderboard(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.board.leaderboard())
}

async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.board.list_notifications())
}

async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, Error> {
    Ok(Json(state.board.mark_notification_read(id)?))
}
