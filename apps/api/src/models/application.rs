use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// Lifecycle of an application record.
///
/// Forward chain: Pending → Found → Tailored → Applied. `Failed` can be
/// reached from any non-failed status and absorbs everything after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Found,
    Tailored,
    Applied,
    Failed,
}

#[derive(Debug, Error)]
#[error("Unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Found => "Found",
            ApplicationStatus::Tailored => "Tailored",
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Failed => "Failed",
        }
    }

    /// Position on the forward chain. `Failed` sits off the chain.
    fn rank(self) -> Option<u8> {
        match self {
            ApplicationStatus::Pending => Some(0),
            ApplicationStatus::Found => Some(1),
            ApplicationStatus::Tailored => Some(2),
            ApplicationStatus::Applied => Some(3),
            ApplicationStatus::Failed => None,
        }
    }

    /// Whether a record currently in `self` may be moved to `next`.
    pub fn can_advance_to(self, next: ApplicationStatus) -> bool {
        match (self.rank(), next.rank()) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(current), Some(target)) => target > current,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Applied | ApplicationStatus::Failed)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Pending" => Ok(ApplicationStatus::Pending),
            "Found" => Ok(ApplicationStatus::Found),
            "Tailored" => Ok(ApplicationStatus::Tailored),
            "Applied" => Ok(ApplicationStatus::Applied),
            "Failed" => Ok(ApplicationStatus::Failed),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// One row of the `applications` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRecord {
    pub id: i64,
    pub job_url: String,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub error_log: Option<String>,
    pub resume_pdf_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written by a single status update. Optional columns left as `None`
/// are written as NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationUpdate {
    pub status: ApplicationStatus,
    pub error_log: Option<String>,
    pub resume_pdf_path: Option<String>,
}

impl ApplicationUpdate {
    pub fn status(status: ApplicationStatus) -> Self {
        Self {
            status,
            error_log: None,
            resume_pdf_path: None,
        }
    }

    pub fn with_error_log(mut self, error_log: impl Into<String>) -> Self {
        self.error_log = Some(error_log.into());
        self
    }

    pub fn with_resume_pdf_path(mut self, path: impl Into<String>) -> Self {
        self.resume_pdf_path = Some(path.into());
        self
    }
}
