use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Account identifier derived from the normalized (trimmed, lowercased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn from_email(email: &str) -> Self {
        Self(email.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role tag fixed at account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Mentor,
    Director,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Mentor => "mentor",
            Role::Director => "director",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "mentor" => Some(Role::Mentor),
            "director" => Some(Role::Director),
            _ => None,
        }
    }

    pub const fn is_reviewer(self) -> bool {
        matches!(self, Role::Mentor | Role::Director)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Persisted account. Never deleted; the role never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Academic and contact attributes kept 1:1 with an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub student_number: String,
    pub semester: Option<u8>,
    pub year: String,
    pub course: String,
    pub specialization: String,
    /// Only meaningful for mentors: whether students may pick this mentor.
    pub active_mentor: bool,
}

/// Self-service edit a student can apply to their own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub student_number: String,
    #[serde(default)]
    pub semester: Option<u8>,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub specialization: String,
}

impl Profile {
    pub fn apply(&mut self, update: ProfileUpdate) {
        self.dob = update.dob;
        self.student_number = update.student_number.trim().to_string();
        self.semester = update.semester;
        self.year = update.year.trim().to_string();
        self.course = update.course.trim().to_string();
        self.specialization = update.specialization.trim().to_string();
    }
}

/// Storage shape for an account: the public account, its profile and the credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub account: Account,
    pub profile: Profile,
    pub password_hash: String,
}

/// Raw student registration input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRegistration {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveType {
    #[serde(rename = "personal")]
    Personal,
    #[serde(rename = "sick")]
    Sick,
    #[serde(rename = "other")]
    Other,
}

impl LeaveType {
    pub const fn label(self) -> &'static str {
        match self {
            LeaveType::Personal => "Personal Leave",
            LeaveType::Sick => "Sick Leave",
            LeaveType::Other => "Other",
        }
    }
}

/// Review status. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaveRequestId(pub u64);

impl fmt::Display for LeaveRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive calendar window of a leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LeaveWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Inclusive day count: `end - start + 1`.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Raw leave submission as entered by a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveSubmission {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    #[serde(default)]
    pub mentor: Option<AccountId>,
}

impl LeaveSubmission {
    pub fn window(&self) -> LeaveWindow {
        LeaveWindow::new(self.start_date, self.end_date)
    }
}

/// Persisted leave application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: LeaveRequestId,
    pub student: AccountId,
    pub leave_type: LeaveType,
    pub window: LeaveWindow,
    pub reason: String,
    pub mentor: Option<AccountId>,
    pub approver: AccountId,
    pub status: LeaveStatus,
    pub review_comments: String,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Bumped on every persisted transition; used for conditional updates.
    pub version: u64,
}

impl LeaveRequest {
    pub fn num_days(&self) -> i64 {
        self.window.num_days()
    }

    pub fn view(&self) -> LeaveRequestView {
        LeaveRequestView {
            id: self.id,
            student: self.student.clone(),
            leave_type: self.leave_type.label(),
            start_date: self.window.start,
            end_date: self.window.end,
            num_days: self.num_days(),
            reason: self.reason.clone(),
            mentor: self.mentor.clone(),
            approver: self.approver.clone(),
            status: self.status.label(),
            review_comments: self.review_comments.clone(),
            created_at: self.created_at,
            reviewed_at: self.reviewed_at,
        }
    }
}

/// Serialized representation exposed by dashboards and the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaveRequestView {
    pub id: LeaveRequestId,
    pub student: AccountId,
    pub leave_type: &'static str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_days: i64,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor: Option<AccountId>,
    pub approver: AccountId,
    pub status: &'static str,
    pub review_comments: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Public account summary; never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub display_name: String,
    pub role: &'static str,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            display_name: account.display_name.clone(),
            role: account.role.label(),
        }
    }
}
