//! Verified principal types.
//!
//! Identities are produced by the external auth collaborator; the core never
//! parses or validates credentials itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Principal role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Driver,
}

impl Role {
    /// Wire text for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Driver => "DRIVER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Role::Customer),
            "DRIVER" => Ok(Role::Driver),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Error for a role string outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// An authenticated principal, opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub role: Role,
}

impl Identity {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Convenience constructor for a customer principal.
    pub fn customer(id: impl Into<String>) -> Self {
        Self::new(id, Role::Customer)
    }

    /// Convenience constructor for a driver principal.
    pub fn driver(id: impl Into<String>) -> Self {
        Self::new(id, Role::Driver)
    }
}
