//! Roles and the capability table.
//!
//! Role names must match the `CHECK` constraint on `users.role` in
//! `20260301000002_create_users_table.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_SUPER_ADMIN: &str = "SUPER_ADMIN";

/// A platform role. Closed set; no inheritance between roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

/// An administrative capability granted by a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// List, edit and deactivate regular user accounts.
    ManageUsers,
    /// Grant or revoke the ADMIN and SUPER_ADMIN roles.
    ManageAdmins,
    /// Create, edit, publish and unpublish packages and tools.
    ManageCatalog,
    /// Create and edit mentor profiles.
    ManageMentors,
    /// Read and transition any booking.
    ViewAllBookings,
}

const USER_CAPABILITIES: &[Capability] = &[];

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ManageUsers,
    Capability::ManageCatalog,
    Capability::ManageMentors,
    Capability::ViewAllBookings,
];

const SUPER_ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ManageUsers,
    Capability::ManageAdmins,
    Capability::ManageCatalog,
    Capability::ManageMentors,
    Capability::ViewAllBookings,
];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Admin => ROLE_ADMIN,
            Role::SuperAdmin => ROLE_SUPER_ADMIN,
        }
    }

    /// The capability table row for this role.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::User => USER_CAPABILITIES,
            Role::Admin => ADMIN_CAPABILITIES,
            Role::SuperAdmin => SUPER_ADMIN_CAPABILITIES,
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Whether this is one of the back-office roles.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(Role::User),
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_SUPER_ADMIN => Ok(Role::SuperAdmin),
            other => Err(CoreError::Invalid(format!(
                "Unknown role '{other}'. Must be one of: {ROLE_USER}, {ROLE_ADMIN}, {ROLE_SUPER_ADMIN}"
            ))),
        }
    }
}

/// Check whether `actor` may change a user's role from `current` to `target`.
///
/// Any change that touches a staff role on either side requires
/// [`Capability::ManageAdmins`]; everything else requires
/// [`Capability::ManageUsers`].
pub fn validate_role_change(actor: Role, current: Role, target: Role) -> Result<(), CoreError> {
    let needed = if current.is_staff() || target.is_staff() {
        Capability::ManageAdmins
    } else {
        Capability::ManageUsers
    };
    if actor.can(needed) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role {actor} cannot change a {current} account to {target}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn user_has_no_capabilities() {
        assert!(Role::User.capabilities().is_empty());
        assert!(!Role::User.can(Capability::ManageUsers));
    }

    #[test]
    fn only_super_admin_manages_admins() {
        assert!(!Role::Admin.can(Capability::ManageAdmins));
        assert!(Role::SuperAdmin.can(Capability::ManageAdmins));
    }

    #[test]
    fn admin_manages_catalog_and_users() {
        assert!(Role::Admin.can(Capability::ManageCatalog));
        assert!(Role::Admin.can(Capability::ManageUsers));
        assert!(Role::Admin.can(Capability::ViewAllBookings));
    }

    #[test]
    fn parse_round_trips_through_as_str() {
        for role in [Role::User, Role::Admin, Role::SuperAdmin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn parse_rejects_lowercase_and_unknown() {
        assert_matches!("admin".parse::<Role>(), Err(CoreError::Invalid(_)));
        assert_matches!("owner".parse::<Role>(), Err(CoreError::Invalid(_)));
    }

    #[test]
    fn serde_uses_screaming_names() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
    }

    #[test]
    fn admin_cannot_promote_to_admin() {
        assert_matches!(
            validate_role_change(Role::Admin, Role::User, Role::Admin),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn admin_cannot_demote_super_admin() {
        assert_matches!(
            validate_role_change(Role::Admin, Role::SuperAdmin, Role::User),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn super_admin_can_promote() {
        assert!(validate_role_change(Role::SuperAdmin, Role::User, Role::Admin).is_ok());
    }

    #[test]
    fn admin_can_keep_user_as_user() {
        assert!(validate_role_change(Role::Admin, Role::User, Role::User).is_ok());
    }
}
