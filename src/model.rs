//! Domain records as stored in the database and returned by the API.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Profile-wide privilege level, independent of any project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
    #[default]
    Member,
    Admin,
    SuperAdmin,
}

impl GlobalRole {
    pub fn as_str(self) -> &'static str {
        match self {
            GlobalRole::Member => "member",
            GlobalRole::Admin => "admin",
            GlobalRole::SuperAdmin => "super_admin",
        }
    }
}

impl FromStr for GlobalRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(GlobalRole::Member),
            "admin" => Ok(GlobalRole::Admin),
            "super_admin" => Ok(GlobalRole::SuperAdmin),
            other => Err(Error::BadRequest(format!("Unknown global role: {other}"))),
        }
    }
}

impl fmt::Display for GlobalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective role of an actor within one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    Owner,
    Manager,
    Editor,
    Viewer,
}

impl ProjectRole {
    pub const ALL: [ProjectRole; 4] = [
        ProjectRole::Owner,
        ProjectRole::Manager,
        ProjectRole::Editor,
        ProjectRole::Viewer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectRole::Owner => "owner",
            ProjectRole::Manager => "manager",
            ProjectRole::Editor => "editor",
            ProjectRole::Viewer => "viewer",
        }
    }

    /// Roles that may be stored on a membership row. Ownership lives on the
    /// project itself.
    pub fn is_assignable(self) -> bool {
        !matches!(self, ProjectRole::Owner)
    }
}

impl FromStr for ProjectRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| Error::BadRequest(format!("Unknown project role: {s}")))
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level user record, linked to one external identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Profile {
    pub id: String,
    pub external_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub global_role: GlobalRole,
    pub created_at: String,
}

impl Profile {
    pub fn is_super_admin(&self) -> bool {
        self.global_role == GlobalRole::SuperAdmin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub tags: Vec<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Membership of a profile in a project. One row per (project, member).
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Membership {
    pub id: String,
    pub project_id: String,
    pub member_id: String,
    /// Stored role string; see [`crate::permission::membership_role`].
    pub project_role: String,
    pub assigned_by: String,
    pub assigned_at: String,
    pub updated_at: String,
    /// Profile of the member, when joined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Profile>,
}

/// A specification document ("cahier des charges").
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Spec {
    pub id: String,
    pub project_id: String,
    pub author_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub objectives: Option<String>,
    pub requirements: Option<String>,
    pub constraints: Option<String>,
    pub deliverables: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Note {
    pub id: String,
    pub project_id: String,
    pub author_id: String,
    pub title: Option<String>,
    pub content: String,
    pub note_type: String,
    pub is_pinned: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ProposalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProposalStatus::Pending),
            "accepted" => Ok(ProposalStatus::Accepted),
            "rejected" => Ok(ProposalStatus::Rejected),
            other => Err(Error::Internal(format!("Unknown proposal status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Proposal {
    pub id: String,
    pub project_id: String,
    pub proposer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub estimated_duration: Option<String>,
    pub estimated_cost: Option<f64>,
    pub status: ProposalStatus,
    pub response_message: Option<String>,
    pub responded_by: Option<String>,
    pub responded_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
