use civic_core::model::{IssueId, IssueStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: IssueStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    pub delta: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub issue_ids: Vec<IssueId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryStatusResponse {
    pub summary: Option<String>,
    pub running: bool,
}

/// Messages a report-form websocket client sends as it edits.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportFormEvent {
    Fields {
        description: String,
        location: String,
    },
    Description {
        value: String,
    },
    Location {
        value: String,
    },
    /// The report was submitted and the form cleared.
    Reset,
}
