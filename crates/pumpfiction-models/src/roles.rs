//! Role and workflow state enumerations.
//!
//! All four enums map onto Postgres enum types created by the migrations and
//! serialize as lowercase snake_case strings on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Error returned when parsing one of the enums in this module from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

/// A user's role. Every user has exactly one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    NormalUser,
    Trainer,
    Seller,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::NormalUser, Role::Trainer, Role::Seller];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::NormalUser => "normal_user",
            Role::Trainer => "trainer",
            Role::Seller => "seller",
        }
    }

    /// Roles a user may apply for through the application workflow.
    pub fn is_requestable(&self) -> bool {
        matches!(self, Role::Trainer | Role::Seller)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// Lifecycle of a role application.
///
/// `Pending` is the only non-terminal state; it moves exactly once to
/// `Approved` or `Rejected`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(ParseEnumError {
                kind: "application status",
                value: other.to_string(),
            }),
        }
    }
}

/// An admin's verdict on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for ApplicationStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => ApplicationStatus::Approved,
            ReviewDecision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

impl TryFrom<ApplicationStatus> for ReviewDecision {
    type Error = ApplicationStatus;

    /// Fails with the input when it is `Pending`, which is not a decision.
    fn try_from(status: ApplicationStatus) -> Result<Self, Self::Error> {
        match status {
            ApplicationStatus::Approved => Ok(ReviewDecision::Approved),
            ApplicationStatus::Rejected => Ok(ReviewDecision::Rejected),
            ApplicationStatus::Pending => Err(status),
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ApplicationStatus::from(*self).fmt(f)
    }
}

/// Whether an approved application's role has reached the role store.
///
/// Approval and the role write hit different stores. `Pending` marks an
/// approval whose role write has not landed yet; it is what the
/// reconciliation sweep looks for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "role_sync_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoleSyncState {
    #[default]
    NotRequired,
    Pending,
    Synced,
}

impl RoleSyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleSyncState::NotRequired => "not_required",
            RoleSyncState::Pending => "pending",
            RoleSyncState::Synced => "synced",
        }
    }
}

impl fmt::Display for RoleSyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleSyncState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_required" => Ok(RoleSyncState::NotRequired),
            "pending" => Ok(RoleSyncState::Pending),
            "synced" => Ok(RoleSyncState::Synced),
            other => Err(ParseEnumError {
                kind: "role sync state",
                value: other.to_string(),
            }),
        }
    }
}
