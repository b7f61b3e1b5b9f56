use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AccountId, LeaveRequest, LeaveRequestId, LeaveStatus};

/// Decision an approver can take on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub const fn target_status(self) -> LeaveStatus {
        match self {
            ReviewAction::Approve => LeaveStatus::Approved,
            ReviewAction::Reject => LeaveStatus::Rejected,
        }
    }
}

impl FromStr for ReviewAction {
    type Err = ReviewError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            _ => Err(ReviewError::InvalidAction(raw.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("{actor} is not the assigned approver of leave request {request}")]
    NotAssignedApprover {
        request: LeaveRequestId,
        actor: AccountId,
    },
    #[error("leave request {request} is already {}", .status.label())]
    AlreadyReviewed {
        request: LeaveRequestId,
        status: LeaveStatus,
    },
    #[error("unrecognized review action '{0}' (expected approve or reject)")]
    InvalidAction(String),
    #[error("leave request {0} was reviewed concurrently; reload and try again")]
    ConcurrentReview(LeaveRequestId),
}

impl LeaveRequest {
    /// Applies a Pending -> Approved/Rejected transition on behalf of `actor`.
    ///
    /// Checks run in order: `actor` must be the assigned approver, the request must still be
    /// pending, and only then is `action` parsed. On error the request is left untouched.
    pub fn apply_review(
        &mut self,
        actor: &AccountId,
        action: &str,
        comments: &str,
        at: DateTime<Utc>,
    ) -> Result<(), ReviewError> {
        if &self.approver != actor {
            return Err(ReviewError::NotAssignedApprover {
                request: self.id,
                actor: actor.clone(),
            });
        }
        if self.status.is_terminal() {
            return Err(ReviewError::AlreadyReviewed {
                request: self.id,
                status: self.status,
            });
        }
        let action: ReviewAction = action.parse()?;

        self.status = action.target_status();
        self.review_comments = comments.trim().to_string();
        self.reviewed_at = Some(at);
        self.version += 1;
        Ok(())
    }
}
