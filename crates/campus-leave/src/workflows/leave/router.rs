use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::access::{
    AccessError, AnyRole, Authorized, Capability, DirectorRole, MentorRole, ReviewerRole,
    StudentRole,
};
use super::domain::{
    Account, AccountView, LeaveRequestId, LeaveSubmission, ProfileUpdate, Role,
    StudentRegistration,
};
use super::repository::{AccountRepository, LeaveRepository};
use super::review::ReviewError;
use super::service::{LeaveService, LeaveServiceError};
use super::sessions::{Session, SessionToken};

/// Router exposing registration, sign-in, submission, review and dashboards.
pub fn leave_router<A, L>(service: Arc<LeaveService<A, L>>) -> Router
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    Router::new()
        .route("/api/v1/students/register", post(register_handler::<A, L>))
        .route("/api/v1/sessions/student", post(student_sign_in_handler::<A, L>))
        .route("/api/v1/sessions/staff", post(staff_sign_in_handler::<A, L>))
        .route("/api/v1/sessions", delete(sign_out_handler::<A, L>))
        .route(
            "/api/v1/student/dashboard",
            get(student_dashboard_handler::<A, L>),
        )
        .route("/api/v1/student/profile", put(update_profile_handler::<A, L>))
        .route("/api/v1/student/leaves", post(submit_handler::<A, L>))
        .route("/api/v1/mentors", get(mentors_handler::<A, L>))
        .route("/api/v1/leaves/:leave_id", get(leave_detail_handler::<A, L>))
        .route(
            "/api/v1/leaves/:leave_id/review",
            post(review_handler::<A, L>),
        )
        .route(
            "/api/v1/mentor/dashboard",
            get(mentor_dashboard_handler::<A, L>),
        )
        .route(
            "/api/v1/director/dashboard",
            get(director_dashboard_handler::<A, L>),
        )
        .with_state(service)
}

/// Bearer token from the `Authorization` header.
pub struct SessionBearer(pub SessionToken);

#[async_trait]
impl<S> FromRequestParts<S> for SessionBearer
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| SessionBearer(SessionToken(token.to_string())))
            .ok_or_else(|| error_response(AccessError::Unauthenticated.into()))
    }
}

/// Role gate run before any handler body: resolves the session and checks capability `C`.
pub struct Gate<C: Capability>(pub Authorized<C>);

#[async_trait]
impl<A, L, C> FromRequestParts<Arc<LeaveService<A, L>>> for Gate<C>
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
    C: Capability,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &Arc<LeaveService<A, L>>,
    ) -> Result<Self, Self::Rejection> {
        let SessionBearer(token) = SessionBearer::from_request_parts(parts, service).await?;
        service
            .authorize::<C>(&token)
            .map(Gate)
            .map_err(error_response)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignInPayload {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StaffSignInPayload {
    pub(crate) role: Role,
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewPayload {
    pub(crate) action: String,
    #[serde(default)]
    pub(crate) comments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionView {
    pub(crate) token: SessionToken,
    pub(crate) expires_at: DateTime<Utc>,
    pub(crate) account: AccountView,
}

fn session_response(status: StatusCode, account: &Account, session: Session) -> Response {
    let view = SessionView {
        token: session.token,
        expires_at: session.expires_at,
        account: AccountView::from(account),
    };
    (status, Json(view)).into_response()
}

/// Maps workflow errors onto HTTP statuses with a `{"error": ...}` body.
pub(crate) fn error_response(error: LeaveServiceError) -> Response {
    let status = match &error {
        LeaveServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LeaveServiceError::Routing(_) => StatusCode::SERVICE_UNAVAILABLE,
        LeaveServiceError::Review(ReviewError::InvalidAction(_)) => StatusCode::BAD_REQUEST,
        LeaveServiceError::Review(ReviewError::NotAssignedApprover { .. }) => {
            StatusCode::FORBIDDEN
        }
        LeaveServiceError::Review(ReviewError::AlreadyReviewed { .. })
        | LeaveServiceError::Review(ReviewError::ConcurrentReview(_)) => StatusCode::CONFLICT,
        LeaveServiceError::Access(AccessError::Unauthenticated)
        | LeaveServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        LeaveServiceError::Access(AccessError::Forbidden { .. }) => StatusCode::FORBIDDEN,
        LeaveServiceError::LeaveNotFound(_) | LeaveServiceError::AccountNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        LeaveServiceError::Credentials(_) | LeaveServiceError::Repository(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn register_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Json(registration): Json<StudentRegistration>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.register_student(registration) {
        Ok((account, session)) => session_response(StatusCode::CREATED, &account, session),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn student_sign_in_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Json(payload): Json<SignInPayload>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.sign_in_student(&payload.email, &payload.password) {
        Ok((account, session)) => session_response(StatusCode::OK, &account, session),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn staff_sign_in_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Json(payload): Json<StaffSignInPayload>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.sign_in_staff(payload.role, &payload.email, &payload.password) {
        Ok((account, session)) => session_response(StatusCode::OK, &account, session),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn sign_out_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Gate(_actor): Gate<AnyRole>,
    SessionBearer(token): SessionBearer,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    service.sign_out(&token);
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn student_dashboard_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Gate(student): Gate<StudentRole>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.student_dashboard(&student) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_profile_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Gate(student): Gate<StudentRole>,
    Json(update): Json<ProfileUpdate>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.update_profile(&student, update) {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn mentors_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Gate(student): Gate<StudentRole>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.active_mentors(&student) {
        Ok(mentors) => (StatusCode::OK, Json(mentors)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Gate(student): Gate<StudentRole>,
    Json(submission): Json<LeaveSubmission>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.submit(&student, submission) {
        Ok(request) => (StatusCode::CREATED, Json(request.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn leave_detail_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Gate(actor): Gate<AnyRole>,
    Path(leave_id): Path<u64>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.leave_detail(&actor, LeaveRequestId(leave_id)) {
        Ok(request) => (StatusCode::OK, Json(request.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Gate(reviewer): Gate<ReviewerRole>,
    Path(leave_id): Path<u64>,
    Json(payload): Json<ReviewPayload>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.review(
        &reviewer,
        LeaveRequestId(leave_id),
        &payload.action,
        &payload.comments,
    ) {
        Ok(request) => (StatusCode::OK, Json(request.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn mentor_dashboard_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Gate(mentor): Gate<MentorRole>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.reviewer_dashboard(&mentor) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn director_dashboard_handler<A, L>(
    State(service): State<Arc<LeaveService<A, L>>>,
    Gate(director): Gate<DirectorRole>,
) -> Response
where
    A: AccountRepository + 'static,
    L: LeaveRepository + 'static,
{
    match service.reviewer_dashboard(&director) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}
