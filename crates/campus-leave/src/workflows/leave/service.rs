use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use super::access::{
    AccessError, AnyRole, Authorized, Capability, DirectorRole, MentorRole, ReviewerRole,
    StudentRole,
};
use super::credentials::{Argon2Hasher, CredentialError, PasswordHasher};
use super::dashboard::{ReviewerDashboard, StudentDashboard};
use super::domain::{
    Account, AccountId, AccountRecord, AccountView, LeaveRequest, LeaveRequestId, LeaveStatus,
    LeaveSubmission, Profile, ProfileUpdate, Role, StudentRegistration,
};
use super::repository::{AccountRepository, LeaveRepository, RepositoryError};
use super::review::ReviewError;
use super::roster::{BootstrapSummary, StaffRoster};
use super::routing::{ApproverRouter, DirectorAssignment, RoutingError};
use super::sessions::{Session, SessionStore, SessionToken};
use super::validation::{self, InputPolicy, ValidationError};

/// Capabilities allowed to review leave requests.
pub trait ReviewCapability: Capability {}

impl ReviewCapability for MentorRole {}
impl ReviewCapability for DirectorRole {}
impl ReviewCapability for ReviewerRole {}

/// Deployment-level knobs for the workflow.
#[derive(Debug, Clone)]
pub struct LeaveSettings {
    pub director_assignment: DirectorAssignment,
    pub input: InputPolicy,
    pub session_ttl: Duration,
}

impl Default for LeaveSettings {
    fn default() -> Self {
        Self {
            director_assignment: DirectorAssignment::default(),
            input: InputPolicy::default(),
            session_ttl: Duration::hours(8),
        }
    }
}

/// Facade over accounts, sessions, routing and review.
pub struct LeaveService<A, L> {
    accounts: Arc<A>,
    leaves: Arc<L>,
    hasher: Arc<dyn PasswordHasher>,
    router: ApproverRouter,
    input: InputPolicy,
    sessions: SessionStore,
}

impl<A, L> LeaveService<A, L>
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    pub fn new(accounts: Arc<A>, leaves: Arc<L>, settings: LeaveSettings) -> Self {
        Self::with_hasher(accounts, leaves, settings, Arc::new(Argon2Hasher::new()))
    }

    pub fn with_hasher(
        accounts: Arc<A>,
        leaves: Arc<L>,
        settings: LeaveSettings,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            accounts,
            leaves,
            hasher,
            router: ApproverRouter::new(settings.director_assignment),
            input: settings.input,
            sessions: SessionStore::new(settings.session_ttl),
        }
    }

    /// Creates roster accounts that do not exist yet.
    pub fn bootstrap_staff(
        &self,
        roster: &StaffRoster,
    ) -> Result<BootstrapSummary, LeaveServiceError> {
        let mut summary = BootstrapSummary::default();
        for entry in roster.entries() {
            let id = AccountId::from_email(&entry.email);
            if self.accounts.fetch(&id)?.is_some() {
                summary.skipped += 1;
                continue;
            }

            let record = AccountRecord {
                account: Account {
                    id,
                    email: entry.email.clone(),
                    display_name: entry.name.clone(),
                    role: entry.role,
                    created_at: Utc::now(),
                },
                profile: Profile {
                    active_mentor: entry.role == Role::Mentor && entry.active,
                    ..Profile::default()
                },
                password_hash: self.hasher.hash(&entry.password)?,
            };
            self.accounts.insert(record)?;
            summary.created += 1;
        }

        info!(
            created = summary.created,
            skipped = summary.skipped,
            "staff roster applied"
        );
        Ok(summary)
    }

    /// Creates a student account and signs it in.
    pub fn register_student(
        &self,
        registration: StudentRegistration,
    ) -> Result<(Account, Session), LeaveServiceError> {
        let valid = self.input.validate_registration(&registration)?;
        let id = AccountId::from_email(&valid.email);
        if self.accounts.fetch(&id)?.is_some() {
            return Err(ValidationError::EmailTaken.into());
        }

        let record = AccountRecord {
            account: Account {
                id,
                email: valid.email,
                display_name: valid.full_name,
                role: Role::Student,
                created_at: Utc::now(),
            },
            profile: Profile {
                phone: Some(valid.mobile),
                ..Profile::default()
            },
            password_hash: self.hasher.hash(&valid.password)?,
        };

        let stored = self.accounts.insert(record).map_err(|err| match err {
            RepositoryError::Conflict => LeaveServiceError::Validation(ValidationError::EmailTaken),
            other => other.into(),
        })?;

        info!(account = %stored.account.id, "student registered");
        let session = self.sessions.open(stored.account.id.clone(), Utc::now());
        Ok((stored.account, session))
    }

    pub fn sign_in_student(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Account, Session), LeaveServiceError> {
        self.sign_in(Role::Student, email, password)
    }

    /// Staff must pick the role they hold; a mismatch is reported as bad credentials.
    pub fn sign_in_staff(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<(Account, Session), LeaveServiceError> {
        if !role.is_reviewer() {
            return Err(LeaveServiceError::InvalidCredentials);
        }
        self.sign_in(role, email, password)
    }

    fn sign_in(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<(Account, Session), LeaveServiceError> {
        let id = AccountId::from_email(email);
        let record = self
            .accounts
            .fetch(&id)?
            .ok_or(LeaveServiceError::InvalidCredentials)?;

        if !self.hasher.verify(password, &record.password_hash)? || record.account.role != role {
            warn!(account = %id, role = %role, "sign-in refused");
            return Err(LeaveServiceError::InvalidCredentials);
        }

        let session = self.sessions.open(record.account.id.clone(), Utc::now());
        Ok((record.account, session))
    }

    pub fn sign_out(&self, token: &SessionToken) -> bool {
        self.sessions.revoke(token)
    }

    /// Resolves a session token and checks the account against capability `C`.
    pub fn authorize<C: Capability>(
        &self,
        token: &SessionToken,
    ) -> Result<Authorized<C>, LeaveServiceError> {
        let id = self
            .sessions
            .resolve(token, Utc::now())
            .ok_or(AccessError::Unauthenticated)?;
        let record = self
            .accounts
            .fetch(&id)?
            .ok_or(AccessError::Unauthenticated)?;
        Ok(Authorized::check(record.account)?)
    }

    pub fn update_profile(
        &self,
        student: &Authorized<StudentRole>,
        update: ProfileUpdate,
    ) -> Result<Profile, LeaveServiceError> {
        validation::validate_profile_update(&update)?;
        let mut profile = self.account_record(student.id())?.profile;
        profile.apply(update);
        self.accounts
            .update_profile(student.id(), profile.clone())?;
        Ok(profile)
    }

    /// Mentors students may currently pick, in registration order.
    pub fn active_mentors(
        &self,
        _student: &Authorized<StudentRole>,
    ) -> Result<Vec<AccountView>, LeaveServiceError> {
        Ok(self
            .accounts
            .by_role(Role::Mentor)?
            .iter()
            .filter(|record| record.profile.active_mentor)
            .map(|record| AccountView::from(&record.account))
            .collect())
    }

    /// Validates, routes and stores a new pending request.
    pub fn submit(
        &self,
        student: &Authorized<StudentRole>,
        submission: LeaveSubmission,
    ) -> Result<LeaveRequest, LeaveServiceError> {
        let window = validation::validate_leave(&submission)?;

        let mentor = match &submission.mentor {
            Some(id) => Some(self.active_mentor(id)?),
            None => None,
        };
        let directors = match &mentor {
            Some(_) => Vec::new(),
            None => self
                .accounts
                .by_role(Role::Director)?
                .into_iter()
                .map(|record| record.account)
                .collect(),
        };

        let assignment = self
            .router
            .assign(mentor.as_ref(), &directors)
            .map_err(|err| {
                warn!(student = %student.id(), error = %err, "leave request could not be routed");
                err
            })?;

        let request = LeaveRequest {
            id: self.leaves.allocate_id()?,
            student: student.id().clone(),
            leave_type: submission.leave_type,
            window,
            reason: submission.reason.trim().to_string(),
            mentor: assignment.mentor,
            approver: assignment.approver,
            status: LeaveStatus::Pending,
            review_comments: String::new(),
            created_at: Utc::now(),
            reviewed_at: None,
            version: 0,
        };

        let stored = self.leaves.insert(request)?;
        info!(
            request = %stored.id,
            student = %stored.student,
            approver = %stored.approver,
            route = ?assignment.route,
            days = stored.num_days(),
            "leave request submitted"
        );
        Ok(stored)
    }

    /// Applies an `approve`/`reject` decision. Fails without side effects if the request does
    /// not exist, the actor is not the assigned approver, the request is terminal, the action is
    /// not recognized, or another review landed first, checked in that order.
    pub fn review<C: ReviewCapability>(
        &self,
        reviewer: &Authorized<C>,
        id: LeaveRequestId,
        action: &str,
        comments: &str,
    ) -> Result<LeaveRequest, LeaveServiceError> {
        let current = self
            .leaves
            .fetch(id)?
            .ok_or(LeaveServiceError::LeaveNotFound(id))?;

        let mut updated = current.clone();
        if let Err(err) = updated.apply_review(reviewer.id(), action, comments, Utc::now()) {
            warn!(request = %id, actor = %reviewer.id(), error = %err, "review refused");
            return Err(err.into());
        }

        match self.leaves.update_if_version(updated.clone(), current.version) {
            Ok(()) => {}
            Err(RepositoryError::StaleVersion { .. }) => {
                warn!(request = %id, actor = %reviewer.id(), "concurrent review detected");
                return Err(ReviewError::ConcurrentReview(id).into());
            }
            Err(other) => return Err(other.into()),
        }

        info!(
            request = %id,
            approver = %reviewer.id(),
            status = updated.status.label(),
            "leave request reviewed"
        );
        Ok(updated)
    }

    pub fn reviewer_dashboard<C: ReviewCapability>(
        &self,
        reviewer: &Authorized<C>,
    ) -> Result<ReviewerDashboard, LeaveServiceError> {
        let requests = self.leaves.by_approver(reviewer.id())?;
        Ok(ReviewerDashboard::project(reviewer.id(), requests))
    }

    pub fn student_dashboard(
        &self,
        student: &Authorized<StudentRole>,
    ) -> Result<StudentDashboard, LeaveServiceError> {
        let record = self.account_record(student.id())?;
        let requests = self.leaves.by_student(student.id())?;
        Ok(StudentDashboard::project(
            AccountView::from(&record.account),
            record.profile,
            requests,
        ))
    }

    /// A request is visible to its owner and its approver only.
    pub fn leave_detail(
        &self,
        actor: &Authorized<AnyRole>,
        id: LeaveRequestId,
    ) -> Result<LeaveRequest, LeaveServiceError> {
        let request = self
            .leaves
            .fetch(id)?
            .ok_or(LeaveServiceError::LeaveNotFound(id))?;
        if &request.student != actor.id() && &request.approver != actor.id() {
            return Err(AccessError::Forbidden {
                actor: actor.id().clone(),
                role: actor.role(),
                required: "owner or approver",
            }
            .into());
        }
        Ok(request)
    }

    fn account_record(&self, id: &AccountId) -> Result<AccountRecord, LeaveServiceError> {
        self.accounts
            .fetch(id)?
            .ok_or_else(|| LeaveServiceError::AccountNotFound(id.clone()))
    }

    fn active_mentor(&self, id: &AccountId) -> Result<Account, LeaveServiceError> {
        match self.accounts.fetch(id)? {
            Some(record) if record.account.role == Role::Mentor && record.profile.active_mentor => {
                Ok(record.account)
            }
            _ => Err(ValidationError::UnknownMentor(id.clone()).into()),
        }
    }
}

/// Error raised by the leave service.
#[derive(Debug, thiserror::Error)]
pub enum LeaveServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("leave request {0} not found")]
    LeaveNotFound(LeaveRequestId),
    #[error("account {0} not found")]
    AccountNotFound(AccountId),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
