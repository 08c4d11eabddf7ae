//! Club catalog: members, roles and per-member completion history.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// A meeting role. `difficulty` runs from 1 (easiest) to the number of
/// difficulty tiers the club defines, typically 6. Immutable once defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub difficulty: u8,
}

impl Role {
    /// Create a role.
    pub fn new(name: impl Into<String>, difficulty: u8) -> Self {
        Self {
            name: name.into(),
            difficulty,
        }
    }
}

/// A club member or guest, keyed by WhatsApp id (E.164 digits, no leading '+').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub is_guest: bool,
    #[serde(default = "default_level")]
    pub level: u8,
    /// Roles completed in the member's current cycle, oldest first.
    #[serde(default)]
    pub roles_done: Vec<String>,
}

fn default_level() -> u8 {
    1
}

impl Member {
    /// Create a fresh member: level 1, not a guest, empty cycle.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            is_guest: false,
            level: 1,
            roles_done: Vec::new(),
        }
    }

    /// Mark this member as a guest.
    pub fn guest(mut self) -> Self {
        self.is_guest = true;
        self
    }

    /// Set the experience level.
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }
}

/// The catalog of one club: its members and its roles.
///
/// Mutated only by admin operations (add/remove) and by role acceptance
/// (`record_role_completion`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Catalog {
    /// Look up a member by id.
    pub fn find_member_by_id(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Look up a member by id first, then by display name.
    pub fn find_member(&self, query: &str) -> Option<&Member> {
        self.find_member_by_id(query)
            .or_else(|| self.members.iter().find(|m| m.name == query))
    }

    /// Display name for an id, falling back to the id itself for unknowns.
    pub fn member_name(&self, id: &str) -> String {
        self.find_member_by_id(id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Insert a member, refusing an id collision.
    pub fn add_member(&mut self, member: Member) -> Result<(), DataError> {
        if self.find_member_by_id(&member.id).is_some() {
            return Err(DataError::DuplicateId(member.id));
        }
        self.members.push(member);
        Ok(())
    }

    /// Remove a member by id, returning the removed entry.
    pub fn remove_member(&mut self, id: &str) -> Result<Member, DataError> {
        let pos = self
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| DataError::NotFound(id.to_string()))?;
        Ok(self.members.remove(pos))
    }

    /// Roles sorted by descending difficulty, ties broken by name.
    pub fn roles_sorted_by_difficulty(&self) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self.roles.iter().collect();
        roles.sort_by(|a, b| b.difficulty.cmp(&a.difficulty).then(a.name.cmp(&b.name)));
        roles
    }

    /// Record that a member completed a role in their current cycle.
    ///
    /// Appends the role; when the cycle length reaches the number of roles
    /// in the club it restarts empty, so the member becomes a fresh
    /// candidate for everything again. Repeat completions count toward the
    /// cycle length. Never changes `level`.
    pub fn record_role_completion(
        &mut self,
        member_id: &str,
        role_name: &str,
    ) -> Result<(), DataError> {
        let total_roles = self.roles.len();
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or_else(|| DataError::NotFound(member_id.to_string()))?;

        member.roles_done.push(role_name.to_string());
        if member.roles_done.len() >= total_roles {
            member.roles_done.clear();
        }
        Ok(())
    }
}
