use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use super::domain::{Account, AccountId, Role};

/// Longest leave (inclusive days) a mentor may approve.
pub const MENTOR_LEAVE_MAX_DAYS: i64 = 2;

/// Which kind of approver a leave of a given duration goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewRoute {
    Mentor,
    Director,
}

impl ReviewRoute {
    pub fn for_days(num_days: i64) -> Self {
        if num_days <= MENTOR_LEAVE_MAX_DAYS {
            ReviewRoute::Mentor
        } else {
            ReviewRoute::Director
        }
    }
}

/// How a director is picked for long leaves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DirectorAssignment {
    /// Earliest registered director.
    #[default]
    FirstRegistered,
    /// Rotate through directors in registration order.
    RoundRobin,
    /// Always this account; it must hold the director role.
    Designated(AccountId),
}

/// Outcome of routing a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub route: ReviewRoute,
    pub approver: AccountId,
    pub mentor: Option<AccountId>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("no director is available to review long leaves")]
    NoDirectorAvailable,
    #[error("designated director {0} is not a director account")]
    DesignatedDirectorMissing(AccountId),
}

/// Picks the account that must review a submission.
#[derive(Debug, Default)]
pub struct ApproverRouter {
    policy: DirectorAssignment,
    cursor: AtomicUsize,
}

impl ApproverRouter {
    pub fn new(policy: DirectorAssignment) -> Self {
        Self {
            policy,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn policy(&self) -> &DirectorAssignment {
        &self.policy
    }

    /// Routes to `mentor` when one is named, otherwise to a director.
    ///
    /// Whether a mentor belongs on the submission is decided by `validate_leave` from the
    /// leave duration, so callers validate first. `directors` must be in registration order;
    /// accounts without the director role are ignored.
    pub fn assign(
        &self,
        mentor: Option<&Account>,
        directors: &[Account],
    ) -> Result<Assignment, RoutingError> {
        match mentor {
            Some(mentor) => Ok(Assignment {
                route: ReviewRoute::Mentor,
                approver: mentor.id.clone(),
                mentor: Some(mentor.id.clone()),
            }),
            None => {
                let director = self.pick_director(directors)?;
                Ok(Assignment {
                    route: ReviewRoute::Director,
                    approver: director.id.clone(),
                    mentor: None,
                })
            }
        }
    }

    fn pick_director<'a>(&self, directors: &'a [Account]) -> Result<&'a Account, RoutingError> {
        let eligible: Vec<&Account> = directors
            .iter()
            .filter(|account| account.role == Role::Director)
            .collect();

        match &self.policy {
            DirectorAssignment::Designated(id) => eligible
                .into_iter()
                .find(|account| &account.id == id)
                .ok_or_else(|| RoutingError::DesignatedDirectorMissing(id.clone())),
            _ if eligible.is_empty() => Err(RoutingError::NoDirectorAvailable),
            DirectorAssignment::FirstRegistered => Ok(eligible[0]),
            DirectorAssignment::RoundRobin => {
                let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % eligible.len();
                Ok(eligible[slot])
            }
        }
    }
}
