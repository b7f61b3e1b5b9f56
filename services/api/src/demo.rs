use crate::infra::{in_memory_service, MemoryLeaveService};
use campus_leave::error::AppError;
use campus_leave::workflows::leave::{
    AccountView, DirectorRole, LeaveRequest, LeaveSettings, LeaveSubmission, LeaveType,
    MentorRole, ReviewerDashboard, Role, StaffRoster, StudentDashboard,
    StudentRegistration, StudentRole,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;

const SAMPLE_ROSTER: &str = include_str!("../config/staff_roster.csv");

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// First day of the sample leaves (YYYY-MM-DD). Defaults to tomorrow.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Staff roster CSV to use instead of the bundled sample.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start = args
        .start
        .unwrap_or_else(|| Local::now().date_naive() + Duration::days(1));
    let roster = match &args.roster {
        Some(path) => StaffRoster::from_path(path)?,
        None => StaffRoster::from_reader(SAMPLE_ROSTER.as_bytes())?,
    };
    let staff_password = |email: &str| -> Option<String> {
        roster
            .entries()
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.password.clone())
    };

    println!("Campus leave demo");
    let service = in_memory_service(LeaveSettings::default());
    let summary = service.bootstrap_staff(&roster)?;
    println!(
        "Provisioned {} staff accounts ({} mentors, {} directors)",
        summary.created,
        roster.count(Role::Mentor),
        roster.count(Role::Director)
    );

    let (account, session) = service.register_student(StudentRegistration {
        full_name: "Ananya Shetty".to_string(),
        email: "ananya.mca23@suranacollege.edu.in".to_string(),
        mobile: "9876501234".to_string(),
        password: "Leave2024".to_string(),
        confirm_password: "Leave2024".to_string(),
    })?;
    println!(
        "\nRegistered {} <{}>; session valid until {}",
        account.display_name,
        account.email,
        session.expires_at.format("%Y-%m-%d %H:%M UTC")
    );
    let student = service.authorize::<StudentRole>(&session.token)?;

    let mentors = service.active_mentors(&student)?;
    println!("Mentors open for selection:");
    for mentor in &mentors {
        println!("  - {} ({})", mentor.display_name, mentor.id);
    }
    let Some(mentor) = mentors.first() else {
        println!("No active mentor in the roster; short leaves cannot be submitted.");
        return Ok(());
    };

    let short = service.submit(
        &student,
        LeaveSubmission {
            leave_type: LeaveType::Sick,
            start_date: start,
            end_date: start + Duration::days(1),
            reason: "Fever, advised two days of rest".to_string(),
            mentor: Some(mentor.id.clone()),
        },
    )?;
    print_submission(&short);

    let long = match service.submit(
        &student,
        LeaveSubmission {
            leave_type: LeaveType::Personal,
            start_date: start + Duration::days(7),
            end_date: start + Duration::days(10),
            reason: "Sister's wedding in Udupi".to_string(),
            mentor: None,
        },
    ) {
        Ok(request) => {
            print_submission(&request);
            Some(request)
        }
        Err(err) => {
            println!("Long leave not accepted: {err}");
            None
        }
    };

    review_as_mentor(&service, mentor, &short, &staff_password)?;
    if let Some(long) = &long {
        review_as_director(&service, long, &staff_password)?;
    }

    print_student_dashboard(&service.student_dashboard(&student)?);
    Ok(())
}

fn review_as_mentor(
    service: &MemoryLeaveService,
    mentor: &AccountView,
    request: &LeaveRequest,
    password_of: &dyn Fn(&str) -> Option<String>,
) -> Result<(), AppError> {
    let Some(password) = password_of(mentor.id.as_str()) else {
        return Ok(());
    };
    let (_, session) = service.sign_in_staff(Role::Mentor, mentor.id.as_str(), &password)?;
    let reviewer = service.authorize::<MentorRole>(&session.token)?;

    let reviewed = service.review(&reviewer, request.id, "approve", "Take care")?;
    println!(
        "\n{} approved request #{} ({})",
        mentor.display_name,
        reviewed.id,
        reviewed.status.label()
    );
    if let Err(err) = service.review(&reviewer, request.id, "reject", "") {
        println!("Second review refused: {err}");
    }

    print_reviewer_dashboard("Mentor", &service.reviewer_dashboard(&reviewer)?);
    Ok(())
}

fn review_as_director(
    service: &MemoryLeaveService,
    request: &LeaveRequest,
    password_of: &dyn Fn(&str) -> Option<String>,
) -> Result<(), AppError> {
    let Some(password) = password_of(request.approver.as_str()) else {
        return Ok(());
    };
    let (account, session) =
        service.sign_in_staff(Role::Director, request.approver.as_str(), &password)?;
    let director = service.authorize::<DirectorRole>(&session.token)?;

    let reviewed = service.review(
        &director,
        request.id,
        "reject",
        "Overlaps with internal assessments",
    )?;
    println!(
        "\n{} rejected request #{}: {}",
        account.display_name, reviewed.id, reviewed.review_comments
    );

    print_reviewer_dashboard("Director", &service.reviewer_dashboard(&director)?);
    Ok(())
}

fn print_submission(request: &LeaveRequest) {
    println!(
        "Submitted #{} {} {} -> {} ({} day(s)), routed to {}",
        request.id,
        request.leave_type.label(),
        request.window.start,
        request.window.end,
        request.num_days(),
        request.approver
    );
}

fn print_reviewer_dashboard(title: &str, dashboard: &ReviewerDashboard) {
    println!(
        "{title} dashboard for {}: {} pending, {} approved, {} rejected",
        dashboard.approver,
        dashboard.stats.pending,
        dashboard.stats.approved,
        dashboard.stats.rejected
    );
}

fn print_student_dashboard(dashboard: &StudentDashboard) {
    println!(
        "\nStudent dashboard for {}: {} pending, {} approved, {} rejected",
        dashboard.account.display_name,
        dashboard.stats.pending,
        dashboard.stats.approved,
        dashboard.stats.rejected
    );
    for request in &dashboard.recent {
        let comments = if request.review_comments.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", request.review_comments)
        };
        println!(
            "  #{} {:<14} {} -> {} {:<9}{}",
            request.id,
            request.leave_type,
            request.start_date,
            request.end_date,
            request.status,
            comments
        );
    }
}
