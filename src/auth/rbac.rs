use serde::{Deserialize, Serialize};
use std::fmt;

/// The two account roles. Closed on purpose: an unknown role in a cookie or
/// a request body never maps onto one of these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Nurse,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Nurse => "nurse",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "nurse" => Some(Role::Nurse),
            _ => None,
        }
    }

    /// Landing page for this role.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/users",
            Role::Nurse => "/",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
