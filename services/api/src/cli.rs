use crate::demo::{run_demo, DemoArgs};
use crate::server;
use campus_leave::error::AppError;
use campus_leave::workflows::leave::{Role, StaffRoster};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Campus Leave",
    about = "Run and inspect the campus leave request service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect staff roster files
    Roster {
        #[command(subcommand)]
        command: RosterCommand,
    },
    /// Walk through a scripted submit and review scenario in memory
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RosterCommand {
    /// Parse a roster CSV and report what it would provision
    Validate(RosterArgs),
}

#[derive(Args, Debug)]
struct RosterArgs {
    /// Path to a `name,email,password,role[,active]` CSV file
    #[arg(long)]
    path: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Staff roster to provision on startup (overrides LEAVE_STAFF_ROSTER)
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Roster {
            command: RosterCommand::Validate(args),
        } => validate_roster(args),
        Command::Demo(args) => run_demo(args),
    }
}

fn validate_roster(args: RosterArgs) -> Result<(), AppError> {
    let roster = StaffRoster::from_path(&args.path)?;
    println!("Roster {} is valid", args.path.display());
    println!("  mentors:   {}", roster.count(Role::Mentor));
    println!("  directors: {}", roster.count(Role::Director));
    let inactive = roster
        .entries()
        .iter()
        .filter(|entry| entry.role == Role::Mentor && !entry.active)
        .count();
    if inactive > 0 {
        println!("  inactive mentors (hidden from students): {inactive}");
    }
    if roster.count(Role::Director) == 0 {
        println!("  warning: no director listed; leaves longer than two days cannot be routed");
    }
    Ok(())
}
