//! Static role → permission mapping.
//!
//! Pure lookup, no state. `studio_admin` holds a strict superset of
//! `studio_member`'s operations. The studio owner (the identity recorded in
//! `studios.owner_id`) implicitly holds every permission regardless of this
//! table; ownership is an attribute, not a role, and is resolved by the
//! services, not here.

use crate::models::profile::UserRole;

/// Every gated operation in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ViewStudio,
    ViewMembers,
    ViewTemplates,
    ManageTemplates,
    ViewForms,
    ManageForms,
    ViewArchive,
    ManageArchive,
    // Studio administration.
    EditStudio,
    DeleteStudio,
    ManageMembers,
    ManageInvitations,
}

const MEMBER_OPERATIONS: &[Operation] = &[
    Operation::ViewStudio,
    Operation::ViewMembers,
    Operation::ViewTemplates,
    Operation::ManageTemplates,
    Operation::ViewForms,
    Operation::ManageForms,
    Operation::ViewArchive,
    Operation::ManageArchive,
];

const ADMIN_OPERATIONS: &[Operation] = &[
    Operation::ViewStudio,
    Operation::ViewMembers,
    Operation::ViewTemplates,
    Operation::ManageTemplates,
    Operation::ViewForms,
    Operation::ManageForms,
    Operation::ViewArchive,
    Operation::ManageArchive,
    Operation::EditStudio,
    Operation::DeleteStudio,
    Operation::ManageMembers,
    Operation::ManageInvitations,
];

/// O(1) lookup of the operations a role may perform.
pub fn permissions_for(role: UserRole) -> &'static [Operation] {
    match role {
        UserRole::StudioAdmin => ADMIN_OPERATIONS,
        UserRole::StudioMember => MEMBER_OPERATIONS,
    }
}

/// Lookup by unvalidated role name, as stored. Unknown names fail closed
/// (empty permission set).
pub fn permissions_for_name(role: &str) -> &'static [Operation] {
    match UserRole::parse(role) {
        Some(role) => permissions_for(role),
        None => &[],
    }
}

/// True iff `role` may perform `op`.
pub fn allows(role: UserRole, op: Operation) -> bool {
    permissions_for(role).contains(&op)
}
