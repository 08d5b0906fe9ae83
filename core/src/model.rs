use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;
use validator::Validate;

pub type IssueId = Uuid;
pub type UserId = Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum IssueCategory {
    Pothole,
    Graffiti,
    #[serde(rename = "Streetlight Out")]
    #[strum(serialize = "Streetlight Out")]
    StreetlightOut,
    Trash,
    #[serde(rename = "Water Logging")]
    #[strum(serialize = "Water Logging")]
    WaterLogging,
    Other,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum IssueStatus {
    #[default]
    New,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub status: IssueStatus,
    pub votes: i64,
    pub location: Location,
    pub image_url: Option<String>,
    pub reporter_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Badge {
    #[serde(rename = "Top Citizen")]
    #[strum(serialize = "Top Citizen")]
    TopCitizen,
    #[serde(rename = "First Report")]
    #[strum(serialize = "First Report")]
    FirstReport,
    #[serde(rename = "Pothole Pro")]
    #[strum(serialize = "Pothole Pro")]
    PotholePro,
    #[serde(rename = "Community Hero")]
    #[strum(serialize = "Community Hero")]
    CommunityHero,
}

impl Badge {
    pub fn description(&self) -> &'static str {
        match self {
            Badge::TopCitizen => "Recognized by the city for outstanding civic engagement.",
            Badge::FirstReport => "Filed a first issue report.",
            Badge::PotholePro => "Reported five or more potholes.",
            Badge::CommunityHero => "Reports have received a hundred or more votes.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub avatar_url: Option<String>,
    pub is_top_citizen: bool,
    pub badges: Vec<Badge>,
    pub reported_issues: u32,
    pub total_votes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields submitted by the report form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewIssueReport {
    #[validate(length(min = 10, message = "Title must be at least 10 characters long."))]
    pub title: String,
    #[validate(length(min = 20, message = "Description must be at least 20 characters long."))]
    pub description: String,
    pub category: IssueCategory,
    #[validate(length(min = 5, message = "Please provide a location or address."))]
    pub location: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub reporter_id: Option<UserId>,
}
