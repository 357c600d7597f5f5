// Fighter identity: the normalized (first name, last name) key used as the
// graph's vertex type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized fighter key.
///
/// Both parts are trimmed and an absent last name is stored as the empty
/// string (single-name fighters). Case is preserved, so matching is
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FighterId {
    pub first_name: String,
    pub last_name: String,
}

impl FighterId {
    pub fn new(first_name: &str, last_name: Option<&str>) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.map(str::trim).unwrap_or_default().to_string(),
        }
    }

    /// Rebuild an identity from a combined display name.
    ///
    /// Splits on the first whitespace boundary only; everything after it is
    /// the last name, so multi-word surnames keep their internal spaces.
    pub fn from_full_name(full_name: &str) -> Self {
        let trimmed = full_name.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some((first, rest)) => Self::new(first, Some(rest)),
            None => Self::new(trimmed, None),
        }
    }

    pub fn full_name(&self) -> String {
        if self.is_single_name() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    pub fn is_single_name(&self) -> bool {
        self.last_name.is_empty()
    }
}

impl fmt::Display for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// One historical contest between two fighters. Side order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutRecord {
    pub fighter_a: FighterId,
    pub fighter_b: FighterId,
}

impl BoutRecord {
    pub fn new(fighter_a: FighterId, fighter_b: FighterId) -> Self {
        Self {
            fighter_a,
            fighter_b,
        }
    }

    /// Both sides resolve to the same identity. Cannot happen in valid data.
    pub fn is_self_paired(&self) -> bool {
        self.fighter_a == self.fighter_b
    }

    /// Pick a side: `false` is the first fighter, `true` the second.
    pub fn side(&self, second: bool) -> &FighterId {
        if second {
            &self.fighter_b
        } else {
            &self.fighter_a
        }
    }
}
