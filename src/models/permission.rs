use serde::{Deserialize, Serialize};
use std::fmt;

/// What an unauthenticated visitor is allowed to do.
///
/// Levels are ordered, so a check is a plain comparison against the level an
/// action requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PermissionLevel {
    /// View only
    #[default]
    None,
    /// May add events
    Create,
    /// May add, modify and delete events
    Modify,
}

impl PermissionLevel {
    /// Level required to remove events
    pub const DELETE: PermissionLevel = PermissionLevel::Modify;

    /// Level required to add events
    pub const CREATE: PermissionLevel = PermissionLevel::Create;

    pub fn allows(self, required: PermissionLevel) -> bool {
        self >= required
    }
}

impl TryFrom<u8> for PermissionLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PermissionLevel::None),
            1 => Ok(PermissionLevel::Create),
            2 => Ok(PermissionLevel::Modify),
            other => Err(format!("permission level must be 0, 1 or 2, got {}", other)),
        }
    }
}

impl From<PermissionLevel> for u8 {
    fn from(level: PermissionLevel) -> Self {
        match level {
            PermissionLevel::None => 0,
            PermissionLevel::Create => 1,
            PermissionLevel::Modify => 2,
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PermissionLevel::None => "none",
            PermissionLevel::Create => "create",
            PermissionLevel::Modify => "modify",
        };
        f.write_str(name)
    }
}
