use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::workflows::leave::access::{Authorized, Capability, StudentRole};
use crate::workflows::leave::credentials::{CredentialError, PasswordHasher};
use crate::workflows::leave::domain::{
    Account, AccountId, LeaveRequest, LeaveRequestId, LeaveSubmission, LeaveType, Role,
    StudentRegistration,
};
use crate::workflows::leave::memory::{InMemoryAccountRepository, InMemoryLeaveRepository};
use crate::workflows::leave::repository::{LeaveRepository, RepositoryError};
use crate::workflows::leave::roster::{StaffEntry, StaffRoster};
use crate::workflows::leave::routing::DirectorAssignment;
use crate::workflows::leave::service::{LeaveService, LeaveSettings};

pub(super) const MENTOR_ONE: &str = "bharathi.mca@suranacollege.edu.in";
pub(super) const MENTOR_TWO: &str = "chandan.mca@suranacollege.edu.in";
pub(super) const RETIRED_MENTOR: &str = "sujay.mca@suranacollege.edu.in";
pub(super) const DIRECTOR: &str = "director@suranacollege.edu.in";
pub(super) const STAFF_PASSWORD: &str = "mentor2024";

pub(super) type MemoryService = LeaveService<InMemoryAccountRepository, InMemoryLeaveRepository>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn id(email: &str) -> AccountId {
    AccountId::from_email(email)
}

pub(super) fn account(email: &str, role: Role) -> Account {
    Account {
        id: AccountId::from_email(email),
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or(email).to_string(),
        role,
        created_at: Utc::now(),
    }
}

/// Stores passwords with a marker prefix so tests avoid Argon2 cost.
pub(super) struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        hash.strip_prefix("plain$")
            .map(|stored| stored == password)
            .ok_or(CredentialError::MalformedHash)
    }
}

fn staff(name: &str, email: &str, role: Role, active: bool) -> StaffEntry {
    StaffEntry {
        name: name.to_string(),
        email: email.to_string(),
        password: STAFF_PASSWORD.to_string(),
        role,
        active,
    }
}

pub(super) fn mentor_roster() -> StaffRoster {
    StaffRoster::new(vec![
        staff("Bharathi", MENTOR_ONE, Role::Mentor, true),
        staff("Chandan", MENTOR_TWO, Role::Mentor, true),
        staff("Sujay", RETIRED_MENTOR, Role::Mentor, false),
    ])
}

pub(super) fn full_roster() -> StaffRoster {
    let mut entries = mentor_roster().entries().to_vec();
    entries.push(staff("Director", DIRECTOR, Role::Director, true));
    StaffRoster::new(entries)
}

pub(super) fn settings(director_assignment: DirectorAssignment) -> LeaveSettings {
    LeaveSettings {
        director_assignment,
        ..LeaveSettings::default()
    }
}

pub(super) fn build_service_with(
    roster: &StaffRoster,
    director_assignment: DirectorAssignment,
) -> (
    Arc<MemoryService>,
    Arc<InMemoryAccountRepository>,
    Arc<InMemoryLeaveRepository>,
) {
    let accounts = Arc::new(InMemoryAccountRepository::default());
    let leaves = Arc::new(InMemoryLeaveRepository::default());
    let service = LeaveService::with_hasher(
        accounts.clone(),
        leaves.clone(),
        settings(director_assignment),
        Arc::new(PlainHasher),
    );
    service.bootstrap_staff(roster).expect("roster applies");
    (Arc::new(service), accounts, leaves)
}

pub(super) fn build_service() -> (
    Arc<MemoryService>,
    Arc<InMemoryAccountRepository>,
    Arc<InMemoryLeaveRepository>,
) {
    build_service_with(&full_roster(), DirectorAssignment::FirstRegistered)
}

pub(super) fn registration(local_part: &str) -> StudentRegistration {
    StudentRegistration {
        full_name: format!("Student {local_part}"),
        email: format!("{local_part}.mca23@suranacollege.edu.in"),
        mobile: "9876543210".to_string(),
        password: "Secret12".to_string(),
        confirm_password: "Secret12".to_string(),
    }
}

pub(super) fn register<A, L>(
    service: &LeaveService<A, L>,
    local_part: &str,
) -> Authorized<StudentRole>
where
    A: crate::workflows::leave::repository::AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    let (_, session) = service
        .register_student(registration(local_part))
        .expect("registration succeeds");
    service
        .authorize::<StudentRole>(&session.token)
        .expect("student authorized")
}

pub(super) fn sign_in_staff<C, A, L>(
    service: &LeaveService<A, L>,
    email: &str,
    role: Role,
) -> Authorized<C>
where
    C: Capability,
    A: crate::workflows::leave::repository::AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    let (_, session) = service
        .sign_in_staff(role, email, STAFF_PASSWORD)
        .expect("staff sign-in succeeds");
    service.authorize::<C>(&session.token).expect("staff authorized")
}

pub(super) fn submission(
    leave_type: LeaveType,
    start: NaiveDate,
    end: NaiveDate,
    mentor: Option<&str>,
) -> LeaveSubmission {
    LeaveSubmission {
        leave_type,
        start_date: start,
        end_date: end,
        reason: "Family function out of town".to_string(),
        mentor: mentor.map(AccountId::from_email),
    }
}

pub(super) fn short_leave() -> LeaveSubmission {
    submission(
        LeaveType::Sick,
        date(2024, 3, 1),
        date(2024, 3, 1),
        Some(MENTOR_ONE),
    )
}

pub(super) fn long_leave() -> LeaveSubmission {
    submission(LeaveType::Personal, date(2024, 3, 1), date(2024, 3, 5), None)
}

/// Serves a frozen snapshot on `fetch` for chosen ids, emulating a reader that raced a writer.
#[derive(Default)]
pub(super) struct StaleReadLeaves {
    pub(super) inner: InMemoryLeaveRepository,
    frozen: Mutex<HashMap<LeaveRequestId, LeaveRequest>>,
}

impl StaleReadLeaves {
    pub(super) fn freeze(&self, id: LeaveRequestId) {
        let snapshot = self
            .inner
            .fetch(id)
            .expect("fetch succeeds")
            .expect("request present");
        self.frozen
            .lock()
            .expect("frozen mutex poisoned")
            .insert(id, snapshot);
    }
}

impl LeaveRepository for StaleReadLeaves {
    fn allocate_id(&self) -> Result<LeaveRequestId, RepositoryError> {
        self.inner.allocate_id()
    }

    fn insert(&self, request: LeaveRequest) -> Result<LeaveRequest, RepositoryError> {
        self.inner.insert(request)
    }

    fn update_if_version(
        &self,
        request: LeaveRequest,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        self.inner.update_if_version(request, expected_version)
    }

    fn fetch(&self, id: LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError> {
        let frozen = self.frozen.lock().expect("frozen mutex poisoned");
        match frozen.get(&id) {
            Some(snapshot) => Ok(Some(snapshot.clone())),
            None => self.inner.fetch(id),
        }
    }

    fn by_approver(&self, approver: &AccountId) -> Result<Vec<LeaveRequest>, RepositoryError> {
        self.inner.by_approver(approver)
    }

    fn by_student(&self, student: &AccountId) -> Result<Vec<LeaveRequest>, RepositoryError> {
        self.inner.by_student(student)
    }
}

pub(super) struct UnavailableLeaves;

impl LeaveRepository for UnavailableLeaves {
    fn allocate_id(&self) -> Result<LeaveRequestId, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _request: LeaveRequest) -> Result<LeaveRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_if_version(
        &self,
        _request: LeaveRequest,
        _expected_version: u64,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_approver(&self, _approver: &AccountId) -> Result<Vec<LeaveRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_student(&self, _student: &AccountId) -> Result<Vec<LeaveRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
