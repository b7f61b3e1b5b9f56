use std::cmp::Reverse;

use serde::Serialize;

use super::domain::{AccountId, AccountView, LeaveRequest, LeaveRequestView, LeaveStatus, Profile};

/// Number of own requests shown on the student dashboard.
pub const STUDENT_RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn tally<'a>(requests: impl IntoIterator<Item = &'a LeaveRequest>) -> Self {
        requests
            .into_iter()
            .fold(Self::default(), |mut counts, request| {
                match request.status {
                    LeaveStatus::Pending => counts.pending += 1,
                    LeaveStatus::Approved => counts.approved += 1,
                    LeaveStatus::Rejected => counts.rejected += 1,
                }
                counts
            })
    }
}

/// What a mentor or director sees: their assigned requests grouped by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerDashboard {
    pub approver: AccountId,
    pub pending: Vec<LeaveRequestView>,
    pub approved: Vec<LeaveRequestView>,
    pub rejected: Vec<LeaveRequestView>,
    pub stats: StatusCounts,
}

impl ReviewerDashboard {
    /// Pending newest-created first; approved and rejected newest-reviewed first.
    /// Requests assigned to anyone other than `approver` are ignored.
    pub fn project(approver: &AccountId, requests: Vec<LeaveRequest>) -> Self {
        let mut pending = Vec::new();
        let mut approved = Vec::new();
        let mut rejected = Vec::new();

        for request in requests
            .into_iter()
            .filter(|request| &request.approver == approver)
        {
            match request.status {
                LeaveStatus::Pending => pending.push(request),
                LeaveStatus::Approved => approved.push(request),
                LeaveStatus::Rejected => rejected.push(request),
            }
        }

        pending.sort_by_key(|request| Reverse((request.created_at, request.id)));
        approved.sort_by_key(|request| Reverse((request.reviewed_at, request.id)));
        rejected.sort_by_key(|request| Reverse((request.reviewed_at, request.id)));

        let stats = StatusCounts {
            pending: pending.len(),
            approved: approved.len(),
            rejected: rejected.len(),
        };

        Self {
            approver: approver.clone(),
            pending: pending.iter().map(LeaveRequest::view).collect(),
            approved: approved.iter().map(LeaveRequest::view).collect(),
            rejected: rejected.iter().map(LeaveRequest::view).collect(),
            stats,
        }
    }
}

/// What a student sees: their profile, latest requests and per-status totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentDashboard {
    pub account: AccountView,
    pub profile: Profile,
    pub recent: Vec<LeaveRequestView>,
    pub stats: StatusCounts,
}

impl StudentDashboard {
    pub fn project(account: AccountView, profile: Profile, mut requests: Vec<LeaveRequest>) -> Self {
        let stats = StatusCounts::tally(&requests);
        requests.sort_by_key(|request| Reverse((request.created_at, request.id)));
        let recent = requests
            .iter()
            .take(STUDENT_RECENT_LIMIT)
            .map(LeaveRequest::view)
            .collect();

        Self {
            account,
            profile,
            recent,
            stats,
        }
    }
}
