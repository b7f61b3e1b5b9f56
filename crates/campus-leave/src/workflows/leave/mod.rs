//! Leave request workflow: students submit, the routing rule picks a mentor or director,
//! and the assigned approver moves the request from pending to approved or rejected.

pub mod access;
pub mod credentials;
pub mod dashboard;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod review;
pub mod roster;
pub mod router;
pub mod routing;
pub mod service;
pub mod sessions;
pub mod validation;

#[cfg(test)]
mod tests;

pub use access::{
    AccessError, AnyRole, Authorized, Capability, DirectorRole, MentorRole, ReviewerRole,
    StudentRole,
};
pub use credentials::{Argon2Hasher, CredentialError, PasswordHasher};
pub use dashboard::{ReviewerDashboard, StatusCounts, StudentDashboard};
pub use domain::{
    Account, AccountId, AccountRecord, AccountView, LeaveRequest, LeaveRequestId,
    LeaveRequestView, LeaveStatus, LeaveSubmission, LeaveType, LeaveWindow, Profile,
    ProfileUpdate, Role, StudentRegistration,
};
pub use memory::{InMemoryAccountRepository, InMemoryLeaveRepository};
pub use repository::{AccountRepository, LeaveRepository, RepositoryError};
pub use review::{ReviewAction, ReviewError};
pub use roster::{BootstrapSummary, RosterError, StaffEntry, StaffRoster};
pub use router::leave_router;
pub use routing::{
    ApproverRouter, Assignment, DirectorAssignment, ReviewRoute, RoutingError,
    MENTOR_LEAVE_MAX_DAYS,
};
pub use service::{LeaveService, LeaveServiceError, LeaveSettings, ReviewCapability};
pub use sessions::{Session, SessionToken};
pub use validation::{InputPolicy, ValidationError, DEFAULT_STUDENT_EMAIL_PATTERN};
