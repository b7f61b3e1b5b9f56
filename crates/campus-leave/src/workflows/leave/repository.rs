use super::domain::{AccountId, AccountRecord, LeaveRequest, LeaveRequestId, Profile, Role};

/// Storage abstraction for accounts and their profiles.
pub trait AccountRepository: Send + Sync {
    fn insert(&self, record: AccountRecord) -> Result<AccountRecord, RepositoryError>;
    fn update_profile(&self, id: &AccountId, profile: Profile) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AccountId) -> Result<Option<AccountRecord>, RepositoryError>;
    /// Accounts holding `role`, in registration order.
    fn by_role(&self, role: Role) -> Result<Vec<AccountRecord>, RepositoryError>;
}

/// Storage abstraction for leave requests.
pub trait LeaveRepository: Send + Sync {
    /// Reserves a fresh id, unique across every caller sharing this store.
    fn allocate_id(&self) -> Result<LeaveRequestId, RepositoryError>;
    fn insert(&self, request: LeaveRequest) -> Result<LeaveRequest, RepositoryError>;
    /// Replaces the stored request only if its version still equals `expected_version`.
    fn update_if_version(
        &self,
        request: LeaveRequest,
        expected_version: u64,
    ) -> Result<(), RepositoryError>;
    fn fetch(&self, id: LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError>;
    fn by_approver(&self, approver: &AccountId) -> Result<Vec<LeaveRequest>, RepositoryError>;
    fn by_student(&self, student: &AccountId) -> Result<Vec<LeaveRequest>, RepositoryError>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record changed since it was read (expected version {expected}, found {found})")]
    StaleVersion { expected: u64, found: u64 },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
