use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::Duration;
use regex::Regex;

use crate::workflows::leave::{
    AccountId, DirectorAssignment, InputPolicy, LeaveSettings, DEFAULT_STUDENT_EMAIL_PATTERN,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub leave: LeaveConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = LogFormat::parse(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        )?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            leave: LeaveConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Leave workflow policy: director assignment, registration rules, sessions, staff roster.
#[derive(Debug, Clone)]
pub struct LeaveConfig {
    pub director_assignment: DirectorAssignment,
    pub student_email_pattern: String,
    pub session_ttl_minutes: i64,
    pub staff_roster: Option<PathBuf>,
}

impl Default for LeaveConfig {
    fn default() -> Self {
        Self {
            director_assignment: DirectorAssignment::FirstRegistered,
            student_email_pattern: DEFAULT_STUDENT_EMAIL_PATTERN.to_string(),
            session_ttl_minutes: 480,
            staff_roster: None,
        }
    }
}

impl LeaveConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let policy = env::var("LEAVE_DIRECTOR_POLICY").unwrap_or_else(|_| "first".to_string());
        let director_assignment = match policy.trim().to_ascii_lowercase().as_str() {
            "first" | "first_registered" => DirectorAssignment::FirstRegistered,
            "round_robin" | "round-robin" => DirectorAssignment::RoundRobin,
            "designated" => {
                let email = env::var("LEAVE_DIRECTOR_EMAIL")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .ok_or(ConfigError::MissingDesignatedDirector)?;
                DirectorAssignment::Designated(AccountId::from_email(&email))
            }
            other => return Err(ConfigError::InvalidDirectorPolicy(other.to_string())),
        };

        let student_email_pattern = env::var("LEAVE_STUDENT_EMAIL_PATTERN")
            .unwrap_or(defaults.student_email_pattern);
        Regex::new(&student_email_pattern).map_err(|source| ConfigError::InvalidEmailPattern {
            pattern: student_email_pattern.clone(),
            source,
        })?;

        let session_ttl_minutes = match env::var("LEAVE_SESSION_TTL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or(ConfigError::InvalidSessionTtl)?,
            Err(_) => defaults.session_ttl_minutes,
        };

        let staff_roster = env::var("LEAVE_STAFF_ROSTER")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            director_assignment,
            student_email_pattern,
            session_ttl_minutes,
            staff_roster,
        })
    }

    /// Builds the workflow settings consumed by `LeaveService`.
    pub fn settings(&self) -> Result<LeaveSettings, ConfigError> {
        let student_email = Regex::new(&self.student_email_pattern).map_err(|source| {
            ConfigError::InvalidEmailPattern {
                pattern: self.student_email_pattern.clone(),
                source,
            }
        })?;

        Ok(LeaveSettings {
            director_assignment: self.director_assignment.clone(),
            input: InputPolicy::new(student_email),
            session_ttl: Duration::minutes(self.session_ttl_minutes),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidDirectorPolicy(String),
    MissingDesignatedDirector,
    InvalidEmailPattern { pattern: String, source: regex::Error },
    InvalidSessionTtl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json' (got '{value}')")
            }
            ConfigError::InvalidDirectorPolicy(value) => write!(
                f,
                "LEAVE_DIRECTOR_POLICY must be first, round_robin or designated (got '{value}')"
            ),
            ConfigError::MissingDesignatedDirector => write!(
                f,
                "LEAVE_DIRECTOR_EMAIL is required when LEAVE_DIRECTOR_POLICY=designated"
            ),
            ConfigError::InvalidEmailPattern { pattern, .. } => {
                write!(f, "LEAVE_STUDENT_EMAIL_PATTERN '{pattern}' is not a valid regex")
            }
            ConfigError::InvalidSessionTtl => {
                write!(f, "LEAVE_SESSION_TTL_MINUTES must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidEmailPattern { source, .. } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLogFormat(_)
            | ConfigError::InvalidDirectorPolicy(_)
            | ConfigError::MissingDesignatedDirector
            | ConfigError::InvalidSessionTtl => None,
        }
    }
}
