//! The round state machine.
//!
//! Each command runs with the tenant lock held: it mutates the in-memory
//! mirror, persists, and returns the outbound batch for the caller to send
//! once the lock is released. Per role the states are
//! unassigned → offered → accepted, or → exhausted when every eligible
//! member declined.

use std::collections::BTreeSet;

use club_data::{AcceptedRole, PendingOffer, Role};
use tracing::info;

use crate::error::EngineError;
use crate::messages;
use crate::registry::{TenantContext, TenantData};
use crate::selection::choose_candidate;
use crate::sender::Outbound;

/// Start a new round: refuse while offers are open, otherwise select a
/// candidate per role in descending difficulty and queue the offers.
pub fn start_round(
    ctx: &TenantContext,
    data: &mut TenantData,
    admin_id: &str,
) -> Result<Vec<Outbound>, EngineError> {
    if !data.round.pending.is_empty() && !data.round.canceled {
        return Err(EngineError::RoundInProgress);
    }

    data.round.round += 1;
    data.round.pending.clear();
    data.round.accepted.clear();
    data.round.last_summary = None;
    data.round.canceled = false;

    let roles: Vec<Role> = data
        .catalog
        .roles_sorted_by_difficulty()
        .into_iter()
        .cloned()
        .collect();

    let mut out = Vec::new();
    let mut unfilled = Vec::new();
    for role in &roles {
        let excluded: BTreeSet<String> = data.round.engaged_ids();
        match choose_candidate(&data.catalog, &data.round.members_cycle, role, &excluded) {
            Some(candidate) => {
                let name = data.catalog.member_name(&candidate);
                out.push(Outbound::new(
                    &candidate,
                    messages::offer(&name, &role.name, data.round.round),
                ));
                data.round
                    .pending
                    .insert(role.name.clone(), PendingOffer::new(candidate));
            }
            None => unfilled.push(role.name.clone()),
        }
    }

    for role_name in &unfilled {
        for admin in &ctx.admins {
            out.push(Outbound::new(admin, messages::no_candidate(role_name)));
        }
    }
    let by_name = data.catalog.member_name(admin_id);
    for admin in &ctx.admins {
        out.push(Outbound::new(
            admin,
            messages::round_started(data.round.round, &by_name),
        ));
    }

    ctx.store.save_state(&data.round)?;
    info!(
        club = %ctx.club_id,
        round = data.round.round,
        offers = data.round.pending.len(),
        unfilled = unfilled.len(),
        "Round started"
    );
    Ok(out)
}

/// Accept the sender's pending offer.
///
/// Moves the entry into `accepted`, records the completion in both the
/// round ledger and the catalog. When the round just fully resolved with at
/// least one acceptance, the final summary is queued for all admins and
/// accepted members.
pub fn accept(
    ctx: &TenantContext,
    data: &mut TenantData,
    sender_id: &str,
) -> Result<Vec<Outbound>, EngineError> {
    let role_name = data
        .round
        .pending_role_of(sender_id)
        .map(str::to_string)
        .ok_or(EngineError::NoPendingOffer)?;

    data.round.pending.remove(&role_name);
    let name = data.catalog.member_name(sender_id);
    data.round.accepted.insert(
        role_name.clone(),
        AcceptedRole {
            waid: sender_id.to_string(),
            name: name.clone(),
        },
    );
    let total_roles = data.catalog.roles.len();
    data.round.record_cycle(sender_id, &role_name, total_roles);
    data.catalog.record_role_completion(sender_id, &role_name)?;

    let mut out = vec![Outbound::new(
        sender_id,
        messages::accept_ack(&name, &role_name, data.round.round),
    )];

    if data.round.pending.is_empty() && !data.round.accepted.is_empty() {
        let summary = messages::summary(&data.catalog, &data.round);
        data.round.last_summary = Some(summary.clone());
        let recipients: BTreeSet<String> = ctx
            .admins
            .iter()
            .cloned()
            .chain(data.round.accepted.values().map(|a| a.waid.clone()))
            .collect();
        for recipient in recipients {
            out.push(Outbound::new(recipient, messages::summary_broadcast(&summary)));
        }
    }

    ctx.store.save_state(&data.round)?;
    ctx.store.save_catalog(&data.catalog)?;
    info!(club = %ctx.club_id, member = %sender_id, role = %role_name, "Role accepted");
    Ok(out)
}

/// Decline the sender's pending offer and re-select.
///
/// The decliner joins `declined_by`; selection runs again with everyone
/// already engaged excluded. No replacement means the role is exhausted and
/// the admins hear about it.
pub fn reject(
    ctx: &TenantContext,
    data: &mut TenantData,
    sender_id: &str,
) -> Result<Vec<Outbound>, EngineError> {
    let role_name = data
        .round
        .pending_role_of(sender_id)
        .map(str::to_string)
        .ok_or(EngineError::NoPendingOffer)?;
    let role = data
        .catalog
        .roles
        .iter()
        .find(|r| r.name == role_name)
        .cloned()
        .ok_or_else(|| EngineError::NotFound(role_name.clone()))?;

    let mut excluded: BTreeSet<String> = data.round.engaged_ids();
    if let Some(offer) = data.round.pending.get(&role_name) {
        excluded.extend(offer.declined_by.iter().cloned());
    }
    excluded.insert(sender_id.to_string());

    let replacement = choose_candidate(&data.catalog, &data.round.members_cycle, &role, &excluded);

    let mut out = vec![Outbound::new(sender_id, messages::reject_ack(&role_name))];
    match replacement {
        Some(next) => {
            let next_name = data.catalog.member_name(&next);
            out.push(Outbound::new(
                &next,
                messages::reoffer(&next_name, &role_name, data.round.round),
            ));
            if let Some(offer) = data.round.pending.get_mut(&role_name) {
                offer.declined_by.push(sender_id.to_string());
                offer.candidate = next;
            }
            info!(club = %ctx.club_id, role = %role_name, "Offer declined, re-selected");
        }
        None => {
            data.round.pending.remove(&role_name);
            for admin in &ctx.admins {
                out.push(Outbound::new(admin, messages::no_candidate(&role_name)));
            }
            info!(club = %ctx.club_id, role = %role_name, "Offer declined, role exhausted");
        }
    }

    ctx.store.save_state(&data.round)?;
    Ok(out)
}

/// "Reply later": acknowledge and leave the offer untouched.
pub fn defer(data: &TenantData, sender_id: &str) -> Result<Vec<Outbound>, EngineError> {
    if data.round.pending_role_of(sender_id).is_none() {
        return Err(EngineError::NoPendingOffer);
    }
    Ok(vec![Outbound::new(sender_id, messages::defer_ack())])
}

/// Cancel the round: open offers become moot, accepted roles and cycles
/// survive.
pub fn cancel_round(
    ctx: &TenantContext,
    data: &mut TenantData,
    admin_id: &str,
) -> Result<Vec<Outbound>, EngineError> {
    let dropped: Vec<String> = data
        .round
        .pending
        .values()
        .map(|offer| offer.candidate.clone())
        .collect();
    data.round.pending.clear();
    data.round.canceled = true;

    let mut out = Vec::new();
    for candidate in dropped {
        out.push(Outbound::new(candidate, messages::canceled_candidate()));
    }
    let by_name = data.catalog.member_name(admin_id);
    for admin in &ctx.admins {
        out.push(Outbound::new(
            admin,
            messages::canceled_admins(data.round.round, &by_name),
        ));
    }

    ctx.store.save_state(&data.round)?;
    info!(club = %ctx.club_id, round = data.round.round, "Round canceled");
    Ok(out)
}

/// Wipe the round ledger: offers, acceptances and cycles go, the round
/// counter stays monotone. The catalog, member histories included, is
/// untouched.
pub fn reset(
    ctx: &TenantContext,
    data: &mut TenantData,
    admin_id: &str,
) -> Result<Vec<Outbound>, EngineError> {
    data.round.pending.clear();
    data.round.accepted.clear();
    for cycle in data.round.members_cycle.values_mut() {
        cycle.clear();
    }
    data.round.last_summary = None;
    data.round.canceled = false;

    let by_name = data.catalog.member_name(admin_id);
    let out = ctx
        .admins
        .iter()
        .map(|admin| Outbound::new(admin, messages::reset_done(&by_name)))
        .collect();

    ctx.store.save_state(&data.round)?;
    info!(club = %ctx.club_id, round = data.round.round, "Round state reset");
    Ok(out)
}

/// Human-readable round status for admins.
pub fn status_text(data: &TenantData) -> String {
    messages::status(&data.catalog, &data.round)
}

/// The sender's own assignment view.
pub fn whoami_text(data: &TenantData, sender_id: &str) -> String {
    messages::whoami(&data.round, sender_id)
}
