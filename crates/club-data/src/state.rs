//! Per-club round ledger, persisted between restarts.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// An offer currently waiting on a candidate's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOffer {
    /// Member currently holding the offer.
    pub candidate: String,
    /// Everyone who already declined this role in the current round.
    /// Never contains the current candidate.
    #[serde(default)]
    pub declined_by: Vec<String>,
    /// Always false while the entry lives in `pending`; kept for the wire
    /// format.
    #[serde(default)]
    pub accepted: bool,
}

impl PendingOffer {
    /// A fresh offer for a candidate, nobody declined yet.
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            declined_by: Vec::new(),
            accepted: false,
        }
    }
}

/// A role somebody already took this round. The display name is denormalized
/// so summaries render without a catalog join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedRole {
    pub waid: String,
    pub name: String,
}

/// The whole round ledger of one club.
///
/// `Default` is the zero state a fresh club starts with, and what a missing
/// state file loads as.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// Round counter, incremented on each successful start. Monotone.
    #[serde(default)]
    pub round: u32,
    /// role name → offer awaiting an answer.
    #[serde(default)]
    pub pending: BTreeMap<String, PendingOffer>,
    /// role name → member who took it this round.
    #[serde(default)]
    pub accepted: BTreeMap<String, AcceptedRole>,
    /// member id → roles completed in the member's current cycle.
    /// Mirrors `Member::roles_done`, kept in the ledger for fast exclusion.
    #[serde(default)]
    pub members_cycle: BTreeMap<String, Vec<String>>,
    /// The most recent fully-resolved round summary.
    #[serde(default)]
    pub last_summary: Option<String>,
    #[serde(default)]
    pub canceled: bool,
}

impl RoundState {
    /// Role the member currently holds an offer for, if any.
    pub fn pending_role_of(&self, member_id: &str) -> Option<&str> {
        self.pending
            .iter()
            .find(|(_, offer)| offer.candidate == member_id)
            .map(|(role, _)| role.as_str())
    }

    /// Role the member already accepted this round, if any.
    pub fn accepted_role_of(&self, member_id: &str) -> Option<&str> {
        self.accepted
            .iter()
            .find(|(_, acc)| acc.waid == member_id)
            .map(|(role, _)| role.as_str())
    }

    /// Everybody already spoken for this round: current candidates plus
    /// members who accepted.
    pub fn engaged_ids(&self) -> BTreeSet<String> {
        self.pending
            .values()
            .map(|offer| offer.candidate.clone())
            .chain(self.accepted.values().map(|acc| acc.waid.clone()))
            .collect()
    }

    /// Append `role` to the member's cycle, restarting the cycle once its
    /// length reaches the club's role count. Mirrors the catalog-side reset.
    pub fn record_cycle(&mut self, member_id: &str, role: &str, total_roles: usize) {
        let cycle = self.members_cycle.entry(member_id.to_string()).or_default();
        cycle.push(role.to_string());
        if cycle.len() >= total_roles {
            cycle.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_and_accepted_lookups() {
        let mut st = RoundState::default();
        st.pending
            .insert("Evaluador general".into(), PendingOffer::new("111"));
        st.accepted.insert(
            "Evaluador del tiempo".into(),
            AcceptedRole {
                waid: "222".into(),
                name: "Paco".into(),
            },
        );

        assert_eq!(st.pending_role_of("111"), Some("Evaluador general"));
        assert_eq!(st.pending_role_of("222"), None);
        assert_eq!(st.accepted_role_of("222"), Some("Evaluador del tiempo"));

        let engaged = st.engaged_ids();
        assert!(engaged.contains("111"));
        assert!(engaged.contains("222"));
        assert_eq!(engaged.len(), 2);
    }

    #[test]
    fn cycle_resets_when_length_reaches_role_count() {
        let mut st = RoundState::default();
        st.record_cycle("111", "A", 2);
        assert_eq!(st.members_cycle["111"], vec!["A"]);
        st.record_cycle("111", "B", 2);
        assert!(st.members_cycle["111"].is_empty());

        // A repeat completion also counts toward the cycle length.
        st.record_cycle("111", "A", 2);
        st.record_cycle("111", "A", 2);
        assert!(st.members_cycle["111"].is_empty());
    }

    #[test]
    fn zero_state_round_trips_through_json() {
        let st = RoundState::default();
        let json = serde_json::to_string(&st).unwrap();
        let back: RoundState = serde_json::from_str(&json).unwrap();
        assert_eq!(st, back);
        assert_eq!(back.round, 0);
        assert!(!back.canceled);
    }
}
