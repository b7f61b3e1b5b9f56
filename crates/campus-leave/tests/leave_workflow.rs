//! End-to-end scenarios for the leave workflow driven through the public service facade and
//! HTTP router, using the production Argon2 hasher and a CSV roster.

mod common {
    use std::sync::Arc;

    use campus_leave::workflows::leave::{
        InMemoryAccountRepository, InMemoryLeaveRepository, LeaveService, LeaveSettings,
        StaffRoster, StudentRegistration,
    };

    pub(super) const ROSTER: &str = "name,email,password,role,active\n\
        Bharathi,bharathi.mca@suranacollege.edu.in,Mentor2024,mentor,true\n\
        Chandan,chandan.mca@suranacollege.edu.in,Mentor2024,mentor,true\n\
        Sujay,sujay.mca@suranacollege.edu.in,Mentor2024,mentor,false\n\
        Director,director@suranacollege.edu.in,Director2024,director,\n";

    pub(super) type Service = LeaveService<InMemoryAccountRepository, InMemoryLeaveRepository>;

    pub(super) fn service() -> Arc<Service> {
        let service = LeaveService::new(
            Arc::new(InMemoryAccountRepository::default()),
            Arc::new(InMemoryLeaveRepository::default()),
            LeaveSettings::default(),
        );
        let roster = StaffRoster::from_reader(ROSTER.as_bytes()).expect("roster parses");
        service.bootstrap_staff(&roster).expect("roster applies");
        Arc::new(service)
    }

    pub(super) fn registration(local_part: &str) -> StudentRegistration {
        StudentRegistration {
            full_name: format!("Student {local_part}"),
            email: format!("{local_part}.mca23@suranacollege.edu.in"),
            mobile: "9988776655".to_string(),
            password: "Campus2024".to_string(),
            confirm_password: "Campus2024".to_string(),
        }
    }
}

mod service_flow {
    use chrono::NaiveDate;

    use super::common::*;
    use campus_leave::workflows::leave::{
        AccountId, LeaveServiceError, LeaveStatus, LeaveSubmission, LeaveType, ReviewError,
        ReviewerRole, Role, StudentRole,
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).expect("valid date")
    }

    #[test]
    fn mentor_and_director_paths() {
        let service = service();
        let (_, session) = service
            .register_student(registration("kavya"))
            .expect("register");
        let student = service
            .authorize::<StudentRole>(&session.token)
            .expect("student gate");

        let mentors = service.active_mentors(&student).expect("mentors");
        assert_eq!(mentors.len(), 2);
        assert!(mentors
            .iter()
            .all(|mentor| mentor.id.as_str() != "sujay.mca@suranacollege.edu.in"));

        let short = service
            .submit(
                &student,
                LeaveSubmission {
                    leave_type: LeaveType::Sick,
                    start_date: day(10),
                    end_date: day(11),
                    reason: "Viral fever, doctor advised rest".to_string(),
                    mentor: Some(mentors[1].id.clone()),
                },
            )
            .expect("short leave");
        assert_eq!(
            short.approver,
            AccountId::from_email("chandan.mca@suranacollege.edu.in")
        );

        let long = service
            .submit(
                &student,
                LeaveSubmission {
                    leave_type: LeaveType::Personal,
                    start_date: day(15),
                    end_date: day(19),
                    reason: "Travelling home for a family wedding".to_string(),
                    mentor: None,
                },
            )
            .expect("long leave");
        assert_eq!(
            long.approver,
            AccountId::from_email("director@suranacollege.edu.in")
        );

        let (_, mentor_session) = service
            .sign_in_staff(Role::Mentor, "chandan.mca@suranacollege.edu.in", "Mentor2024")
            .expect("mentor sign-in");
        let mentor = service
            .authorize::<ReviewerRole>(&mentor_session.token)
            .expect("reviewer gate");

        match service.review(&mentor, long.id, "approve", "") {
            Err(LeaveServiceError::Review(ReviewError::NotAssignedApprover { .. })) => {}
            other => panic!("expected not assigned approver, got {other:?}"),
        }

        let reviewed = service
            .review(&mentor, short.id, "reject", "Submit a medical certificate")
            .expect("mentor review");
        assert_eq!(reviewed.status, LeaveStatus::Rejected);

        let dashboard = service.student_dashboard(&student).expect("dashboard");
        assert_eq!(dashboard.stats.pending, 1);
        assert_eq!(dashboard.stats.rejected, 1);
        assert_eq!(dashboard.recent[0].id, long.id);
    }

    #[test]
    fn staff_passwords_are_verified_against_argon2_hashes() {
        let service = service();

        assert!(service
            .sign_in_staff(Role::Director, "director@suranacollege.edu.in", "Director2024")
            .is_ok());
        assert!(matches!(
            service.sign_in_staff(Role::Director, "director@suranacollege.edu.in", "director2024"),
            Err(LeaveServiceError::InvalidCredentials)
        ));
    }
}

mod http_flow {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::common::*;
    use campus_leave::workflows::leave::leave_router;

    async fn call(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("json")
        };
        (status, payload)
    }

    fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
            .expect("request")
    }

    #[tokio::test]
    async fn two_day_leave_reviewed_by_mentor_over_http() {
        let router = leave_router(service());

        let (status, registered) = call(
            &router,
            post(
                "/api/v1/students/register",
                None,
                serde_json::to_value(registration("rahul")).expect("json"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let student = registered["token"].as_str().expect("token").to_string();

        let (status, created) = call(
            &router,
            post(
                "/api/v1/student/leaves",
                Some(&student),
                json!({
                    "leave_type": "other",
                    "start_date": "2024-08-01",
                    "end_date": "2024-08-02",
                    "reason": "Inter-college hackathon",
                    "mentor": "bharathi.mca@suranacollege.edu.in",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["num_days"], 2);
        let leave_id = created["id"].as_u64().expect("id");

        let (status, session) = call(
            &router,
            post(
                "/api/v1/sessions/staff",
                None,
                json!({
                    "role": "mentor",
                    "email": "bharathi.mca@suranacollege.edu.in",
                    "password": "Mentor2024",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let mentor = session["token"].as_str().expect("token").to_string();

        let (status, reviewed) = call(
            &router,
            post(
                &format!("/api/v1/leaves/{leave_id}/review"),
                Some(&mentor),
                json!({ "action": "approve", "comments": "All the best" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reviewed["status"], "approved");

        let (status, again) = call(
            &router,
            post(
                &format!("/api/v1/leaves/{leave_id}/review"),
                Some(&mentor),
                json!({ "action": "reject" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(again["error"]
            .as_str()
            .expect("error")
            .contains("already approved"));
    }
}
