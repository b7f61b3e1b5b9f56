use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::Role;

/// One provisioned staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffEntry {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    /// Whether a mentor is offered to students. Ignored for directors.
    pub active: bool,
}

/// Mentor and director accounts provisioned out of band.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffRoster {
    entries: Vec<StaffEntry>,
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    email: String,
    password: String,
    role: String,
    #[serde(default)]
    active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to open roster {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read roster row: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: role '{role}' is not mentor or director")]
    InvalidRole { row: usize, role: String },
    #[error("row {row}: {field} must not be empty")]
    MissingField { row: usize, field: &'static str },
    #[error("row {row}: duplicate email {email}")]
    DuplicateEmail { row: usize, email: String },
}

impl StaffRoster {
    pub fn new(entries: Vec<StaffEntry>) -> Self {
        Self { entries }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RosterError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Parses `name,email,password,role[,active]` rows; the header line is required.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RosterError> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut entries: Vec<StaffEntry> = Vec::new();
        for (index, row) in csv.deserialize::<RosterRow>().enumerate() {
            // Header is line 1.
            let line = index + 2;
            let row = row?;

            let role = match Role::parse(&row.role) {
                Some(role) if role.is_reviewer() => role,
                _ => {
                    return Err(RosterError::InvalidRole {
                        row: line,
                        role: row.role,
                    })
                }
            };
            for (field, value) in [
                ("name", &row.name),
                ("email", &row.email),
                ("password", &row.password),
            ] {
                if value.is_empty() {
                    return Err(RosterError::MissingField { row: line, field });
                }
            }

            let email = row.email.to_ascii_lowercase();
            if entries.iter().any(|entry| entry.email == email) {
                return Err(RosterError::DuplicateEmail { row: line, email });
            }

            entries.push(StaffEntry {
                name: row.name,
                email,
                password: row.password,
                role,
                active: row.active.unwrap_or(true),
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[StaffEntry] {
        &self.entries
    }

    pub fn count(&self, role: Role) -> usize {
        self.entries.iter().filter(|entry| entry.role == role).count()
    }
}

/// Result of applying a roster; existing accounts are never touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapSummary {
    pub created: usize,
    pub skipped: usize,
}
