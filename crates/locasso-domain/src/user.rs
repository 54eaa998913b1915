//! User domain types.

use serde::{Deserialize, Serialize};

/// User role.
///
/// Storage format: `i16` (0 = Admin, 1 = Guide, 2 = Traveler).
/// Wire format: the variant name (`"Admin"`, `"Guide"`, `"Traveler"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UserRole {
    Admin = 0,
    Guide = 1,
    /// Assigned to every newly created user.
    #[default]
    Traveler = 2,
}

impl UserRole {
    /// Convert from the stored `i16` value. Returns `None` for unknown values.
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(Self::Admin),
            1 => Some(Self::Guide),
            2 => Some(Self::Traveler),
            _ => None,
        }
    }

    /// Convert to the stored `i16` value.
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Guide => "Guide",
            Self::Traveler => "Traveler",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
