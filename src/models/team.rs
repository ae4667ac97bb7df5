//! Team model.
//!
//! A team is the unit that gets paired, scheduled and refereed. Group
//! membership is fixed for the whole tournament once matches exist.

use serde::{Deserialize, Serialize};

/// Group label used when every team plays in one round robin.
pub const SINGLE_GROUP: &str = "all";

/// A participating team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Unique team identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Group label (`"A"`, `"B"`, ...). `None` = not yet assigned.
    #[serde(default)]
    pub group: Option<String>,
}

impl Team {
    /// Creates a team whose name equals its ID.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            group: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the group label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Whether this team belongs to the given group label.
    pub fn in_group(&self, label: &str) -> bool {
        self.group.as_deref() == Some(label)
    }
}

/// Label for the group at `index` (0 → `"A"`, 25 → `"Z"`, 26 → `"AA"`).
pub fn group_label(index: usize) -> String {
    let mut n = index;
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Inverse of [`group_label`], case-insensitive.
pub fn group_index(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize;
        index = index * 26 + digit + 1;
    }
    Some(index - 1)
}

/// A group and its members in configuration order.
#[derive(Debug, Clone)]
pub struct GroupAssignment<'a> {
    /// Group label.
    pub label: String,
    /// Member teams.
    pub teams: Vec<&'a Team>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_builder() {
        let t = Team::new("t1").with_name("FC Nord").with_group("A");
        assert_eq!(t.id, "t1");
        assert_eq!(t.name, "FC Nord");
        assert!(t.in_group("A"));
        assert!(!t.in_group("B"));
    }

    #[test]
    fn test_team_default_name() {
        let t = Team::new("Lions");
        assert_eq!(t.name, "Lions");
        assert_eq!(t.group, None);
    }

    #[test]
    fn test_group_labels() {
        assert_eq!(group_label(0), "A");
        assert_eq!(group_label(7), "H");
        assert_eq!(group_label(25), "Z");
        assert_eq!(group_label(26), "AA");
        assert_eq!(group_label(27), "AB");
    }

    #[test]
    fn test_group_index_roundtrip() {
        for i in [0, 1, 7, 25, 26, 51, 52] {
            assert_eq!(group_index(&group_label(i)), Some(i));
        }
        assert_eq!(group_index("b"), Some(1));
        assert_eq!(group_index(""), None);
        assert_eq!(group_index("A1"), None);
    }
}
