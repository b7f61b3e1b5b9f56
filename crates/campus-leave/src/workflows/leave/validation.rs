use regex::Regex;

use super::domain::{AccountId, LeaveSubmission, LeaveWindow, ProfileUpdate, StudentRegistration};
use super::routing::ReviewRoute;

/// Email pattern accepted for student self-registration unless configured otherwise.
pub const DEFAULT_STUDENT_EMAIL_PATTERN: &str = r"^[a-z0-9]+\.mca23@suranacollege\.edu\.in$";

const MIN_PASSWORD_LEN: usize = 7;
const MOBILE_DIGITS: usize = 10;
const MIN_REASON_LEN: usize = 10;
const MAX_SEMESTER: u8 = 12;
const MAX_SHORT_FIELD_LEN: usize = 10;
const MAX_LONG_FIELD_LEN: usize = 50;

/// Field-level input errors, reported to the submitter before anything is persisted.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("full name must not be empty")]
    MissingFullName,
    #[error("email '{email}' does not match the required college format")]
    InvalidEmail { email: String },
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("mobile number should be exactly 10 digits")]
    InvalidMobile,
    #[error("password must be at least 7 characters long")]
    PasswordTooShort,
    #[error("password must contain at least one uppercase letter")]
    PasswordMissingUppercase,
    #[error("password confirmation does not match")]
    PasswordMismatch,
    #[error("reason must be at least 10 characters long")]
    ReasonTooShort,
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error("for leave of {days} day(s) you must select a mentor")]
    MentorRequired { days: i64 },
    #[error("for leave of {days} days a mentor must not be selected (goes to director)")]
    MentorForbidden { days: i64 },
    #[error("{0} is not an active mentor")]
    UnknownMentor(AccountId),
    #[error("semester must be between 1 and 12")]
    InvalidSemester,
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
}

/// Registration input after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRegistration {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
}

/// Input rules that depend on deployment configuration.
#[derive(Debug, Clone)]
pub struct InputPolicy {
    student_email: Regex,
}

impl InputPolicy {
    pub fn new(student_email: Regex) -> Self {
        Self { student_email }
    }

    pub fn student_email_pattern(&self) -> &str {
        self.student_email.as_str()
    }

    pub fn validate_registration(
        &self,
        registration: &StudentRegistration,
    ) -> Result<ValidatedRegistration, ValidationError> {
        let full_name = registration.full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::MissingFullName);
        }

        let email = registration.email.trim().to_ascii_lowercase();
        if !self.student_email.is_match(&email) {
            return Err(ValidationError::InvalidEmail { email });
        }

        let mobile = registration.mobile.trim();
        if mobile.len() != MOBILE_DIGITS || !mobile.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidMobile);
        }

        check_password(&registration.password)?;
        if registration.password != registration.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        Ok(ValidatedRegistration {
            full_name: full_name.to_string(),
            email,
            mobile: mobile.to_string(),
            password: registration.password.clone(),
        })
    }
}

impl Default for InputPolicy {
    fn default() -> Self {
        let student_email =
            Regex::new(DEFAULT_STUDENT_EMAIL_PATTERN).expect("default pattern is a valid regex");
        Self::new(student_email)
    }
}

pub fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::PasswordMissingUppercase);
    }
    Ok(())
}

/// Checks reason length, date order and mentor presence against the duration route.
pub fn validate_leave(submission: &LeaveSubmission) -> Result<LeaveWindow, ValidationError> {
    if submission.reason.trim().chars().count() < MIN_REASON_LEN {
        return Err(ValidationError::ReasonTooShort);
    }

    let window = submission.window();
    if window.end < window.start {
        return Err(ValidationError::InvalidDateRange {
            start: window.start,
            end: window.end,
        });
    }

    let days = window.num_days();
    match (ReviewRoute::for_days(days), &submission.mentor) {
        (ReviewRoute::Mentor, None) => Err(ValidationError::MentorRequired { days }),
        (ReviewRoute::Director, Some(_)) => Err(ValidationError::MentorForbidden { days }),
        _ => Ok(window),
    }
}

/// Checks an update before it is merged; text limits apply to the trimmed values.
pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), ValidationError> {
    if let Some(semester) = update.semester {
        if semester == 0 || semester > MAX_SEMESTER {
            return Err(ValidationError::InvalidSemester);
        }
    }

    let limits = [
        ("student_number", update.student_number.as_str(), MAX_LONG_FIELD_LEN),
        ("year", update.year.as_str(), MAX_SHORT_FIELD_LEN),
        ("course", update.course.as_str(), MAX_SHORT_FIELD_LEN),
        ("specialization", update.specialization.as_str(), MAX_LONG_FIELD_LEN),
    ];
    for (field, value, max) in limits {
        if value.trim().chars().count() > max {
            return Err(ValidationError::FieldTooLong { field, max });
        }
    }
    Ok(())
}
