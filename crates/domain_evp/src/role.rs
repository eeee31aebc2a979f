//! Actor roles

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use core_kernel::CoreError;

/// Role of the user issuing a command or reading a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Composes and submits claims
    Gestionnaire,
    /// First-tier approver
    ResponsableService,
    /// Second-tier approver
    ResponsableDivision,
    /// Human resources, read-only reporting and export
    Rh,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Gestionnaire,
        Role::ResponsableService,
        Role::ResponsableDivision,
        Role::Rh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Gestionnaire => "gestionnaire",
            Role::ResponsableService => "responsable_service",
            Role::ResponsableDivision => "responsable_division",
            Role::Rh => "rh",
        }
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
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::unknown_variant("role", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("RH".parse::<Role>().unwrap(), Role::Rh);
        assert_eq!(
            "responsable_division".parse::<Role>().unwrap(),
            Role::ResponsableDivision
        );
        assert!("admin".parse::<Role>().is_err());
    }
}
