//! Roles of the people operating the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

use distinta_shared::types::UserId;

/// Role of an identity record.
///
/// Roles are ordered from lowest to highest privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Counter operator: opens and closes their own sessions.
    Operator = 0,
    /// Manager: additionally verifies closed sessions.
    Manager = 1,
    /// Administrator: additionally reopens any closed session.
    Admin = 2,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "operator" => Some(Self::Operator),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Operator => "operator",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Managers and admins may verify closed sessions.
    #[must_use]
    pub fn can_verify(self) -> bool {
        self >= Self::Manager
    }

    /// Only admins may reopen sessions they do not own or from another day.
    #[must_use]
    pub fn can_reopen_any(self) -> bool {
        self == Self::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated principal acting on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Identity record id.
    pub user_id: UserId,
    /// Assigned role.
    pub role: Role,
    /// Superusers act as admins regardless of role.
    pub is_superuser: bool,
}

impl Principal {
    /// Creates a principal without superuser rights.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            is_superuser: false,
        }
    }

    /// The role used for authorization checks.
    #[must_use]
    pub const fn effective_role(&self) -> Role {
        if self.is_superuser {
            Role::Admin
        } else {
            self.role
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Operator, false, false)]
    #[case(Role::Manager, true, false)]
    #[case(Role::Admin, true, true)]
    fn test_role_permissions(#[case] role: Role, #[case] verify: bool, #[case] reopen_any: bool) {
        assert_eq!(role.can_verify(), verify);
        assert_eq!(role.can_reopen_any(), reopen_any);
    }

    #[test]
    fn test_role_parse_roundtrip() {
        for role in [Role::Operator, Role::Manager, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("MANAGER"), Some(Role::Manager));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_superuser_acts_as_admin() {
        let mut principal = Principal::new(UserId::new(), Role::Operator);
        assert_eq!(principal.effective_role(), Role::Operator);
        principal.is_superuser = true;
        assert_eq!(principal.effective_role(), Role::Admin);
    }
}
