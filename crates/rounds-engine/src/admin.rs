//! Member management operations.

use club_data::Member;
use tracing::info;

use crate::error::EngineError;
use crate::messages;
use crate::registry::{TenantContext, TenantData};
use crate::sender::Outbound;

/// Shortest and longest accepted id: E.164 national numbers run 8 to 15
/// digits once the country code is included.
const ID_LEN: std::ops::RangeInclusive<usize> = 8..=15;

/// Whether `id` looks like an E.164 number in digit form (no leading '+').
pub fn is_valid_waid(id: &str) -> bool {
    ID_LEN.contains(&id.len()) && id.bytes().all(|b| b.is_ascii_digit())
}

/// Add a member: level 1, not a guest, empty cycle. The caller validates
/// the id shape beforehand via [`is_valid_waid`]; collisions surface as
/// `DuplicateId`.
pub fn add_member(
    ctx: &TenantContext,
    data: &mut TenantData,
    admin_id: &str,
    name: &str,
    id: &str,
) -> Result<Vec<Outbound>, EngineError> {
    data.catalog.add_member(Member::new(name, id))?;
    data.round.members_cycle.entry(id.to_string()).or_default();

    ctx.store.save_catalog(&data.catalog)?;
    ctx.store.save_state(&data.round)?;
    info!(club = %ctx.club_id, member = %id, "Member added");
    Ok(vec![Outbound::new(admin_id, messages::member_added(name, id))])
}

/// Remove a member, resolving `reference` by id then by name.
///
/// Refused with `MemberBusy` while the member is a pending candidate or
/// holds an accepted role in the current round.
pub fn remove_member(
    ctx: &TenantContext,
    data: &mut TenantData,
    admin_id: &str,
    reference: &str,
) -> Result<Vec<Outbound>, EngineError> {
    let member = data
        .catalog
        .find_member(reference)
        .cloned()
        .ok_or_else(|| EngineError::NotFound(reference.to_string()))?;

    if data.round.pending_role_of(&member.id).is_some()
        || data.round.accepted_role_of(&member.id).is_some()
    {
        return Err(EngineError::MemberBusy(member.name));
    }

    data.catalog.remove_member(&member.id)?;
    data.round.members_cycle.remove(&member.id);

    ctx.store.save_catalog(&data.catalog)?;
    ctx.store.save_state(&data.round)?;
    info!(club = %ctx.club_id, member = %member.id, "Member removed");
    Ok(vec![Outbound::new(
        admin_id,
        messages::member_removed(&member.name),
    )])
}

/// The roster, one line per member, sorted by name.
pub fn members_list(data: &TenantData) -> String {
    messages::members_list(&data.catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waid_validation() {
        assert!(is_valid_waid("5219211787763"));
        assert!(is_valid_waid("52155500"));
        assert!(!is_valid_waid("521555"));
        assert!(!is_valid_waid("+5219211787763"));
        assert!(!is_valid_waid("52192117877631234"));
        assert!(!is_valid_waid("521921178776a"));
        assert!(!is_valid_waid(""));
    }
}
