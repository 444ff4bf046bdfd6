//! Project role resolution and typed capability grants.
//!
//! Every actor gets exactly one effective role per project:
//!
//! 1. The project owner, or any `super_admin`, resolves to `owner`.
//! 2. Otherwise the membership row for (project, actor) decides.
//! 3. No row, or a role string we do not recognise, resolves to `viewer`.
//!
//! The role maps through a fixed table to a set of capabilities. Operations
//! never inspect roles directly: they ask a [`Descriptor`] for a [`Grant`] of
//! the capability they need, and the grant is the only way to prove it.
//!
//! # Example
//!
//! ```ignore
//! use flyboard::permission::{self, cap};
//!
//! let grant = permission::require::<cap::EditSpecs>(conn, &project_id, &actor).await?;
//! specs::update(conn, &grant, &spec_id, input).await?;
//! ```

use std::fmt;
use std::marker::PhantomData;

use libsql::Connection;
use schemars::JsonSchema;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Profile, Project, ProjectRole};

/// The seven project capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_create_proposals: bool,
    pub can_create_notes: bool,
    pub can_manage_members: bool,
    pub can_create_specs: bool,
    pub can_edit_specs: bool,
}

impl Capabilities {
    pub const ALL: Capabilities = Capabilities {
        can_edit: true,
        can_delete: true,
        can_create_proposals: true,
        can_create_notes: true,
        can_manage_members: true,
        can_create_specs: true,
        can_edit_specs: true,
    };

    pub const NONE: Capabilities = Capabilities {
        can_edit: false,
        can_delete: false,
        can_create_proposals: false,
        can_create_notes: false,
        can_manage_members: false,
        can_create_specs: false,
        can_edit_specs: false,
    };
}

/// Capability table keyed by project role.
pub const fn capabilities(role: ProjectRole) -> Capabilities {
    match role {
        ProjectRole::Owner => Capabilities::ALL,
        ProjectRole::Manager => Capabilities {
            can_delete: false,
            ..Capabilities::ALL
        },
        ProjectRole::Editor => Capabilities {
            can_create_proposals: true,
            can_create_notes: true,
            can_create_specs: true,
            can_edit_specs: true,
            ..Capabilities::NONE
        },
        ProjectRole::Viewer => Capabilities::NONE,
    }
}

/// Interpret the role stored on a membership row.
///
/// Absent rows and unrecognised strings fall back to `viewer`. So does
/// `owner`: a membership row cannot confer ownership.
pub fn membership_role(stored: Option<&str>) -> ProjectRole {
    let Some(stored) = stored else {
        return ProjectRole::Viewer;
    };
    match stored.parse::<ProjectRole>() {
        Ok(role) if role.is_assignable() => role,
        _ => {
            tracing::warn!(role = stored, "Unrecognised membership role, treating as viewer");
            ProjectRole::Viewer
        }
    }
}

/// Effective permissions of one actor on one project.
///
/// Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    #[serde(skip)]
    project_id: String,
    pub role: ProjectRole,
    pub is_owner: bool,
    pub is_manager: bool,
    pub is_editor: bool,
    pub is_viewer: bool,
    /// Owner, super-admin, or holder of a membership row of any role.
    pub is_member: bool,
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

impl Descriptor {
    /// Descriptor for the owner or a super-admin. Delete stays with the true
    /// owner.
    fn maximal(project_id: &str, true_owner: bool) -> Self {
        Self {
            project_id: project_id.to_string(),
            role: ProjectRole::Owner,
            is_owner: true,
            is_manager: true,
            is_editor: true,
            is_viewer: true,
            is_member: true,
            capabilities: Capabilities {
                can_delete: true_owner,
                ..Capabilities::ALL
            },
        }
    }

    fn for_role(project_id: &str, role: ProjectRole, has_row: bool) -> Self {
        Self {
            project_id: project_id.to_string(),
            role,
            is_owner: false,
            is_manager: role == ProjectRole::Manager,
            is_editor: role == ProjectRole::Editor,
            is_viewer: role == ProjectRole::Viewer,
            is_member: has_row,
            capabilities: capabilities(role),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Whether the capability `C` is held.
    pub fn holds<C: Capability>(&self) -> bool {
        C::held(self)
    }

    /// Obtain a proof of capability `C`, or `Forbidden`.
    pub fn require<C: Capability>(&self) -> Result<Grant<C>> {
        if self.holds::<C>() {
            Ok(Grant {
                descriptor: self.clone(),
                _capability: PhantomData,
            })
        } else {
            Err(Error::forbidden(C::ACTION, C::RESOURCE))
        }
    }
}

/// Resolve the descriptor from already-fetched records.
///
/// `membership` is the stored role string of the actor's membership row, if
/// one exists. Ignored for the owner and for super-admins.
pub fn resolve(project: &Project, actor: &Profile, membership: Option<&str>) -> Descriptor {
    let is_owner = project.owner_id == actor.id;
    if is_owner || actor.is_super_admin() {
        return Descriptor::maximal(&project.id, is_owner);
    }
    Descriptor::for_role(&project.id, membership_role(membership), membership.is_some())
}

/// Resolve the actor's descriptor for a project.
///
/// Reads the project (NotFound if absent) and, unless the actor is owner or
/// super-admin, the actor's membership row. Nothing is cached: two calls may
/// disagree if a role changed in between.
pub async fn resolve_role(conn: &Connection, project_id: &str, actor: &Profile) -> Result<Descriptor> {
    let project = crate::projects::fetch(conn, project_id).await?;
    if project.owner_id == actor.id || actor.is_super_admin() {
        return Ok(resolve(&project, actor, None));
    }
    let stored = crate::members::stored_role(conn, project_id, &actor.id).await?;
    let descriptor = resolve(&project, actor, stored.as_deref());
    tracing::debug!(
        project_id,
        actor = %actor.id,
        role = %descriptor.role,
        "Resolved project role"
    );
    Ok(descriptor)
}

/// Resolve the actor's descriptor and demand capability `C`.
pub async fn require<C: Capability>(
    conn: &Connection,
    project_id: &str,
    actor: &Profile,
) -> Result<Grant<C>> {
    resolve_role(conn, project_id, actor).await?.require::<C>()
}

/// Proof that an actor holds capability `C` on one project.
///
/// Only [`Descriptor::require`] creates these.
#[derive(Clone)]
pub struct Grant<C: Capability> {
    descriptor: Descriptor,
    _capability: PhantomData<C>,
}

impl<C: Capability> Grant<C> {
    pub fn project_id(&self) -> &str {
        &self.descriptor.project_id
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }
}

impl<C: Capability> fmt::Debug for Grant<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grant")
            .field("capability", &C::ACTION)
            .field("project_id", &self.descriptor.project_id)
            .finish()
    }
}

/// Marker trait for a checkable capability.
pub trait Capability: Copy + fmt::Debug + Send + Sync + 'static {
    /// Verb used in the `Forbidden` message.
    const ACTION: &'static str;
    /// Object used in the `Forbidden` message.
    const RESOURCE: &'static str;

    fn held(descriptor: &Descriptor) -> bool;
}

/// Capability markers.
pub mod cap {
    use super::{Capability, Descriptor};
    use crate::model::ProjectRole;

    macro_rules! capability {
        ($(#[$doc:meta])* $name:ident, $action:literal, $resource:literal, |$d:ident| $held:expr) => {
            $(#[$doc])*
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
            pub struct $name;

            impl Capability for $name {
                const ACTION: &'static str = $action;
                const RESOURCE: &'static str = $resource;

                fn held($d: &Descriptor) -> bool {
                    $held
                }
            }
        };
    }

    capability!(
        /// Update project details.
        Edit, "edit", "project", |d| d.capabilities.can_edit
    );
    capability!(
        /// Delete the project. True owner only.
        Delete, "delete", "project", |d| d.capabilities.can_delete
    );
    capability!(
        CreateProposals, "create proposals in", "project", |d| d.capabilities.can_create_proposals
    );
    capability!(
        CreateNotes, "create notes in", "project", |d| d.capabilities.can_create_notes
    );
    capability!(
        ManageMembers, "manage members of", "project", |d| d.capabilities.can_manage_members
    );
    capability!(
        CreateSpecs, "create specs in", "project", |d| d.capabilities.can_create_specs
    );
    capability!(
        EditSpecs, "edit specs in", "project", |d| d.capabilities.can_edit_specs
    );
    capability!(
        /// Owner or super-admin.
        Own, "administer", "project", |d| d.role == ProjectRole::Owner
    );
    capability!(
        /// Any explicit membership, or ownership.
        Member, "view members of", "project", |d| d.is_member
    );
}
