//! In-memory issue board.
//!
//! Holds issues, citizens and admin notifications for the lifetime of the
//! process. Nothing is persisted.

use crate::model::{
    Badge, Issue, IssueCategory, IssueId, IssueStatus, Location, NewIssueReport, Notification,
    User, UserId,
};
use chrono::Utc;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// Pothole reports needed for [`Badge::PotholePro`].
pub const POTHOLE_PRO_REPORTS: usize = 5;
/// Votes across a citizen's reports needed for [`Badge::CommunityHero`].
pub const COMMUNITY_HERO_VOTES: i64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("invalid report: {0}")]
    InvalidReport(#[from] ValidationErrors),
    #[error("issue {0} not found")]
    IssueNotFound(IssueId),
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("notification {0} not found")]
    NotificationNotFound(Uuid),
    #[error("vote delta must be +1 or -1, got {0}")]
    InvalidVote(i64),
}

#[derive(Default)]
struct BoardState {
    issues: Vec<Issue>,
    users: Vec<User>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
pub struct IssueBoard {
    state: RwLock<BoardState>,
}

impl IssueBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BoardState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BoardState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Newest first.
    pub fn list_issues(&self) -> Vec<Issue> {
        let mut issues = self.read().issues.clone();
        issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        issues
    }

    pub fn get_issue(&self, id: IssueId) -> Result<Issue, BoardError> {
        self.read()
            .issues
            .iter()
            .find(|issue| issue.id == id)
            .cloned()
            .ok_or(BoardError::IssueNotFound(id))
    }

    /// Titles of the given issues, in the order the ids were given.
    pub fn titles_of(&self, ids: &[IssueId]) -> Result<Vec<String>, BoardError> {
        let state = self.read();
        ids.iter()
            .map(|id| {
                state
                    .issues
                    .iter()
                    .find(|issue| issue.id == *id)
                    .map(|issue| issue.title.clone())
                    .ok_or(BoardError::IssueNotFound(*id))
            })
            .collect()
    }

    pub fn create_issue(&self, report: NewIssueReport) -> Result<Issue, BoardError> {
        report.validate()?;

        let mut state = self.write();
        if let Some(reporter) = report.reporter_id {
            if !state.users.iter().any(|user| user.id == reporter) {
                return Err(BoardError::UserNotFound(reporter));
            }
        }

        let issue = Issue {
            id: Uuid::new_v4(),
            title: report.title,
            description: report.description,
            category: report.category,
            status: IssueStatus::New,
            votes: 0,
            location: Location {
                address: report.location,
                lat: report.lat,
                lng: report.lng,
            },
            image_url: report.image_url,
            reporter_id: report.reporter_id,
            created_at: Utc::now(),
        };
        state.issues.push(issue.clone());

        if let Some(reporter) = issue.reporter_id {
            let potholes = state
                .issues
                .iter()
                .filter(|i| i.reporter_id == Some(reporter) && i.category == IssueCategory::Pothole)
                .count();
            if let Some(user) = state.users.iter_mut().find(|u| u.id == reporter) {
                user.reported_issues += 1;
                award(user, Badge::FirstReport);
                if potholes >= POTHOLE_PRO_REPORTS {
                    award(user, Badge::PotholePro);
                }
            }
        }

        tracing::info!(issue = %issue.id, category = %issue.category, "issue reported");
        Ok(issue)
    }

    pub fn update_issue_status(
        &self,
        id: IssueId,
        status: IssueStatus,
    ) -> Result<Issue, BoardError> {
        let mut state = self.write();
        let issue = state
            .issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or(BoardError::IssueNotFound(id))?;
        issue.status = status;
        let updated = issue.clone();

        push_notification(
            &mut state,
            "Status Updated",
            format!("Issue #{id} has been marked as {status}."),
        );
        tracing::info!(issue = %id, %status, "issue status updated");
        Ok(updated)
    }

    /// Applies an upvote (`+1`) or downvote (`-1`).
    pub fn cast_vote(&self, id: IssueId, delta: i64) -> Result<Issue, BoardError> {
        if delta != 1 && delta != -1 {
            return Err(BoardError::InvalidVote(delta));
        }

        let mut state = self.write();
        let issue = state
            .issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or(BoardError::IssueNotFound(id))?;
        issue.votes += delta;
        let updated = issue.clone();

        if let Some(reporter) = updated.reporter_id {
            if let Some(user) = state.users.iter_mut().find(|u| u.id == reporter) {
                user.total_votes += delta;
                if user.total_votes >= COMMUNITY_HERO_VOTES {
                    award(user, Badge::CommunityHero);
                }
            }
        }
        Ok(updated)
    }

    pub fn add_user(&self, name: impl Into<String>, avatar_url: Option<String>) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            avatar_url,
            is_top_citizen: false,
            badges: Vec::new(),
            reported_issues: 0,
            total_votes: 0,
        };
        self.write().users.push(user.clone());
        user
    }

    pub fn list_users(&self) -> Vec<User> {
        self.read().users.clone()
    }

    pub fn toggle_top_citizen(&self, id: UserId) -> Result<User, BoardError> {
        let mut state = self.write();
        let user = state
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(BoardError::UserNotFound(id))?;

        user.is_top_citizen = !user.is_top_citizen;
        if user.is_top_citizen {
            award(user, Badge::TopCitizen);
        } else {
            user.badges.retain(|badge| *badge != Badge::TopCitizen);
        }
        let updated = user.clone();

        push_notification(
            &mut state,
            "Citizen Status Updated!",
            format!("{} status has been updated.", updated.name),
        );
        Ok(updated)
    }

    /// Citizens ranked by votes received, then by number of reports.
    pub fn leaderboard(&self) -> Vec<User> {
        let mut users = self.list_users();
        users.sort_by(|a, b| {
            b.total_votes
                .cmp(&a.total_votes)
                .then(b.reported_issues.cmp(&a.reported_issues))
        });
        users
    }

    /// Newest first.
    pub fn list_notifications(&self) -> Vec<Notification> {
        let mut notifications = self.read().notifications.clone();
        notifications.reverse();
        notifications
    }

    pub fn mark_notification_read(&self, id: Uuid) -> Result<Notification, BoardError> {
        let mut state = self.write();
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(BoardError::NotificationNotFound(id))?;
        notification.read = true;
        Ok(notification.clone())
    }
}

fn award(user: &mut User, badge: Badge) {
    if !user.badges.contains(&badge) {
        tracing::debug!(user = %user.id, %badge, "badge awarded");
        user.badges.push(badge);
    }
}

fn push_notification(state: &mut BoardState, title: &str, description: String) {
    state.notifications.push(Notification {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description,
        read: false,
        created_at: Utc::now(),
    });
}
