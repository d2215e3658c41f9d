use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role held by a user for the duration of a session.
///
/// A user has exactly one role assignment per tenant. The wire form is the
/// upper-case name (`"TEACHER"`), matching what the session layer stores.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    /// Every known role, in a stable order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Student, Role::Parent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
            Role::Parent => "PARENT",
        }
    }

    /// Parse a raw role string. Unknown or empty values yield `None`.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "TEACHER" => Some(Role::Teacher),
            "STUDENT" => Some(Role::Student),
            "PARENT" => Some(Role::Parent),
            _ => None,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| format!("unknown role '{s}'"))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(Role::parse(" teacher "), Some(Role::Teacher));
        assert_eq!(Role::parse("PARENT"), Some(Role::Parent));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&Role::Student).unwrap();
        assert_eq!(json, "\"STUDENT\"");
        let back: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(back, Role::Admin);
    }
}
