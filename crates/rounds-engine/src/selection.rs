//! Hierarchical candidate selection.
//!
//! `choose_candidate` balances role difficulty against member level and
//! per-member completion cycles. It is pure: no state is read outside its
//! arguments and the same inputs always produce the same answer.

use std::collections::{BTreeMap, BTreeSet};

use club_data::{Catalog, Member, Role};

/// Pick the member to offer `role` to, or `None` when nobody is eligible.
///
/// `cycles` is the round ledger's member → completed-roles map; `excluded`
/// must already contain every current candidate and accepted member of the
/// round plus everyone who declined this role. Guests are includable under
/// the current policy.
///
/// Tiers are scanned in order and the first non-empty tier wins:
/// 1. level at or above the role's difficulty, role not yet done this cycle;
/// 2. same level band, repeaters (when no fresh candidate exists);
/// 3. fallback by descending level below the difficulty, fresh before
///    repeaters at each level.
///
/// Within a tier the tie-break is deterministic: fewest completions this
/// cycle, then name, then id.
pub fn choose_candidate(
    catalog: &Catalog,
    cycles: &BTreeMap<String, Vec<String>>,
    role: &Role,
    excluded: &BTreeSet<String>,
) -> Option<String> {
    let pool: Vec<&Member> = catalog
        .members
        .iter()
        .filter(|m| !excluded.contains(&m.id))
        .collect();
    if pool.is_empty() {
        return None;
    }

    let cycle_len = |m: &Member| cycles.get(&m.id).map_or(0, |c| c.len());
    let has_done = |m: &Member| {
        cycles
            .get(&m.id)
            .is_some_and(|c| c.iter().any(|r| r == &role.name))
    };
    let pick = |candidates: Vec<&&Member>| -> Option<String> {
        candidates
            .into_iter()
            .min_by(|a, b| {
                cycle_len(a)
                    .cmp(&cycle_len(b))
                    .then_with(|| a.name.cmp(&b.name))
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|m| m.id.clone())
    };

    let d = role.difficulty;

    let fresh_at_level: Vec<&&Member> = pool
        .iter()
        .filter(|m| m.level >= d && !has_done(m))
        .collect();
    if let Some(id) = pick(fresh_at_level) {
        return Some(id);
    }

    let repeaters_at_level: Vec<&&Member> = pool
        .iter()
        .filter(|m| m.level >= d && has_done(m))
        .collect();
    if let Some(id) = pick(repeaters_at_level) {
        return Some(id);
    }

    // Nobody reaches the difficulty: walk levels downward, fresh first.
    for level in (1..d).rev() {
        let fresh: Vec<&&Member> = pool
            .iter()
            .filter(|m| m.level == level && !has_done(m))
            .collect();
        if let Some(id) = pick(fresh) {
            return Some(id);
        }
        let repeaters: Vec<&&Member> = pool
            .iter()
            .filter(|m| m.level == level && has_done(m))
            .collect();
        if let Some(id) = pick(repeaters) {
            return Some(id);
        }
    }

    // Out-of-band levels (0, or above every tier) still get a best-effort
    // pick: the contract returns None only on an empty pool.
    pick(pool.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn catalog(members: Vec<Member>) -> Catalog {
        Catalog {
            members,
            roles: vec![
                Role::new("Evaluador del tiempo", 1),
                Role::new("Evaluador gramatical", 3),
                Role::new("Evaluador general", 6),
            ],
        }
    }

    fn member(name: &str, id: &str, level: u8) -> Member {
        Member::new(name, id).with_level(level)
    }

    #[test]
    fn fresh_candidates_at_level_win() {
        let catalog = catalog(vec![
            member("Ana", "100", 3),
            member("Beto", "200", 3),
        ]);
        let mut cycles = BTreeMap::new();
        cycles.insert("100".to_string(), vec!["Evaluador gramatical".to_string()]);

        let role = Role::new("Evaluador gramatical", 3);
        // Ana already did the role this cycle; fresh Beto wins even though
        // Ana sorts first by name.
        let chosen = choose_candidate(&catalog, &cycles, &role, &BTreeSet::new());
        assert_eq!(chosen.as_deref(), Some("200"));
    }

    #[test]
    fn repeaters_allowed_when_no_fresh_candidate() {
        let catalog = catalog(vec![member("Ana", "100", 3)]);
        let mut cycles = BTreeMap::new();
        cycles.insert("100".to_string(), vec!["Evaluador gramatical".to_string()]);

        let role = Role::new("Evaluador gramatical", 3);
        let chosen = choose_candidate(&catalog, &cycles, &role, &BTreeSet::new());
        assert_eq!(chosen.as_deref(), Some("100"));
    }

    #[test]
    fn fallback_walks_levels_downward() {
        // Scenario: difficulty 3, everyone below it. The level-2 member is
        // preferred over the level-1 members.
        let catalog = catalog(vec![
            member("Ana", "100", 1),
            member("Beto", "200", 2),
            member("Carla", "300", 1),
        ]);
        let role = Role::new("Evaluador gramatical", 3);
        let chosen = choose_candidate(&catalog, &BTreeMap::new(), &role, &BTreeSet::new());
        assert_eq!(chosen.as_deref(), Some("200"));
    }

    #[test]
    fn fallback_at_lowest_level_picks_by_name() {
        let catalog = catalog(vec![
            member("Carla", "300", 1),
            member("Ana", "100", 1),
        ]);
        let role = Role::new("Evaluador gramatical", 3);
        let chosen = choose_candidate(&catalog, &BTreeMap::new(), &role, &BTreeSet::new());
        assert_eq!(chosen.as_deref(), Some("100"));
    }

    #[test]
    fn tie_break_prefers_least_assigned_then_name_then_id() {
        let mut cycles = BTreeMap::new();
        cycles.insert(
            "100".to_string(),
            vec!["Evaluador del tiempo".to_string()],
        );
        let catalog = catalog(vec![
            member("Ana", "100", 6),
            member("Beto", "200", 6),
        ]);
        let role = Role::new("Evaluador general", 6);
        // Both fresh for this role, but Beto has fewer completions.
        let chosen = choose_candidate(&catalog, &cycles, &role, &BTreeSet::new());
        assert_eq!(chosen.as_deref(), Some("200"));

        // Same cycle counts: name decides; same name: id decides.
        let catalog = Catalog {
            members: vec![member("Ana", "500", 6), member("Ana", "400", 6)],
            roles: vec![Role::new("Evaluador general", 6)],
        };
        let chosen = choose_candidate(&catalog, &BTreeMap::new(), &role, &BTreeSet::new());
        assert_eq!(chosen.as_deref(), Some("400"));
    }

    #[test]
    fn exclusions_empty_the_pool() {
        let catalog = catalog(vec![member("Ana", "100", 6)]);
        let excluded: BTreeSet<String> = ["100".to_string()].into();
        let role = Role::new("Evaluador general", 6);
        assert_eq!(
            choose_candidate(&catalog, &BTreeMap::new(), &role, &excluded),
            None
        );
    }

    #[test]
    fn selection_is_pure() {
        let catalog = catalog(vec![
            member("Ana", "100", 2),
            member("Beto", "200", 2),
        ]);
        let role = Role::new("Evaluador del tiempo", 1);
        let first = choose_candidate(&catalog, &BTreeMap::new(), &role, &BTreeSet::new());
        for _ in 0..10 {
            assert_eq!(
                choose_candidate(&catalog, &BTreeMap::new(), &role, &BTreeSet::new()),
                first
            );
        }
    }

    #[test]
    fn guests_are_includable() {
        let catalog = catalog(vec![member("Ana", "100", 1).guest()]);
        let role = Role::new("Evaluador del tiempo", 1);
        let chosen = choose_candidate(&catalog, &BTreeMap::new(), &role, &BTreeSet::new());
        assert_eq!(chosen.as_deref(), Some("100"));
    }
}
