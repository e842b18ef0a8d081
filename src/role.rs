use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::navigation::NavigationFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
    Parent,
    Student,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Parent, Role::Student];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
            Role::Student => "student",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Teacher => "Teacher",
            Role::Parent => "Parent",
            Role::Student => "Student",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Presentation only; nothing in navigation reads this.
    pub fn theme(self) -> RoleTheme {
        match self {
            Role::Admin => RoleTheme {
                brand: "#6d28d9",
                brand_soft: "#ede9fe",
            },
            Role::Teacher => RoleTheme {
                brand: "#2563eb",
                brand_soft: "#dbeafe",
            },
            Role::Parent => RoleTheme {
                brand: "#059669",
                brand_soft: "#d1fae5",
            },
            Role::Student => RoleTheme {
                brand: "#ea580c",
                brand_soft: "#ffedd5",
            },
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTheme {
    pub brand: &'static str,
    pub brand_soft: &'static str,
}

/// A bottom-navigation tab. The tab id doubles as the view id of its root frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
}

impl TabSpec {
    pub fn root_frame(&self) -> NavigationFrame {
        NavigationFrame::root(self.id, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("Teacher"), Some(Role::Teacher));
        assert_eq!(Role::parse(" PARENT "), Some(Role::Parent));
        assert_eq!(Role::parse("janitor"), None);
    }

    #[test]
    fn every_role_has_distinct_brand() {
        let mut brands: Vec<&str> = Role::ALL.iter().map(|r| r.theme().brand).collect();
        brands.dedup();
        assert_eq!(brands.len(), 4);
    }
}
