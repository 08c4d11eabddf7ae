//! Tenant registry: per-club contexts and sender → club resolution.
//!
//! The registry is built once at startup from the clubs directory and frozen
//! afterwards; adding a club at runtime is a non-goal. Each tenant owns one
//! lock covering both its catalog mirror and its round state, plus its own
//! persistence handles. A club whose files do not load is pinned as corrupt:
//! it refuses every command, loudly, while the other tenants keep working.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use club_data::{Catalog, ClubStore, RoundState};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::error::EngineError;

/// Registry manifest file name inside the clubs directory.
pub const REGISTRY_FILE: &str = "registry.json";

#[derive(Debug, Deserialize)]
struct RegistryManifest {
    #[serde(default)]
    clubs: BTreeMap<String, ClubEntry>,
}

#[derive(Debug, Deserialize)]
struct ClubEntry {
    #[serde(default)]
    admins: Vec<String>,
}

/// The lockable half of a tenant: loaded data, or the reason it refused to
/// load.
#[derive(Debug)]
pub enum TenantCell {
    Ready(TenantData),
    Corrupt(String),
}

/// In-memory mirror of one club's persisted files. Mutations happen under
/// the tenant lock and are persisted before the lock is released.
#[derive(Debug)]
pub struct TenantData {
    pub catalog: Catalog,
    pub round: RoundState,
}

impl TenantCell {
    /// Borrow the data, refusing operation on a corrupt tenant.
    pub fn ready_mut(&mut self, club_id: &str) -> Result<&mut TenantData, EngineError> {
        match self {
            TenantCell::Ready(data) => Ok(data),
            TenantCell::Corrupt(reason) => {
                error!(club = %club_id, reason = %reason, "Command refused: corrupt tenant state");
                Err(EngineError::CorruptState(club_id.to_string()))
            }
        }
    }
}

/// One club: identity, admin set, persistence handles and the tenant lock.
#[derive(Debug)]
pub struct TenantContext {
    pub club_id: String,
    /// Admins authorized to run rounds and member management. An admin need
    /// not be a member.
    pub admins: HashSet<String>,
    pub store: ClubStore,
    pub cell: Mutex<TenantCell>,
}

impl TenantContext {
    /// Whether the sender may run admin commands on this club.
    pub fn is_admin(&self, sender_id: &str) -> bool {
        self.admins.contains(sender_id)
    }
}

/// Outcome of resolving an inbound sender to a tenant.
#[derive(Debug, Clone)]
pub enum TenantResolution {
    /// Exactly one club applies.
    Club(Arc<TenantContext>),
    /// The sender administers several clubs and must pick one.
    NeedsPick(Vec<String>),
    /// Nobody knows this sender.
    Unknown,
}

/// All tenants of the process, frozen after load.
#[derive(Debug)]
pub struct Registry {
    tenants: Vec<Arc<TenantContext>>,
}

impl Registry {
    /// Load every club listed in `<clubs_dir>/registry.json`.
    ///
    /// A missing or unreadable manifest fails the whole load; a club whose
    /// own files fail is kept as a corrupt tenant so the rest of the fleet
    /// still serves.
    pub fn load(clubs_dir: &Path) -> Result<Self, EngineError> {
        let manifest_path = clubs_dir.join(REGISTRY_FILE);
        let bytes = fs::read(&manifest_path).map_err(|e| {
            EngineError::Storage(format!("{}: {e}", manifest_path.display()))
        })?;
        let manifest: RegistryManifest = serde_json::from_slice(&bytes).map_err(|e| {
            EngineError::CorruptState(format!("{}: {e}", manifest_path.display()))
        })?;

        let mut tenants = Vec::new();
        for (club_id, entry) in manifest.clubs {
            let store = ClubStore::new(clubs_dir.join(&club_id));
            let cell = match load_club(&store) {
                Ok(data) => {
                    info!(
                        club = %club_id,
                        members = data.catalog.members.len(),
                        roles = data.catalog.roles.len(),
                        round = data.round.round,
                        "Club loaded"
                    );
                    TenantCell::Ready(data)
                }
                Err(err) => {
                    error!(club = %club_id, error = %err, "Club refused: state did not load");
                    TenantCell::Corrupt(err.to_string())
                }
            };
            tenants.push(Arc::new(TenantContext {
                club_id,
                admins: entry.admins.into_iter().collect(),
                store,
                cell: Mutex::new(cell),
            }));
        }

        info!(clubs = tenants.len(), "Tenant registry loaded");
        Ok(Self { tenants })
    }

    /// Enumerate every tenant.
    pub fn contexts(&self) -> &[Arc<TenantContext>] {
        &self.tenants
    }

    /// Look up a tenant by club id.
    pub fn get(&self, club_id: &str) -> Option<&Arc<TenantContext>> {
        self.tenants.iter().find(|t| t.club_id == club_id)
    }

    /// Clubs the sender administers, in club-id order.
    pub fn admin_clubs(&self, sender_id: &str) -> Vec<Arc<TenantContext>> {
        self.tenants
            .iter()
            .filter(|t| t.is_admin(sender_id))
            .cloned()
            .collect()
    }

    /// The unique club the sender is a member of, or `None` when the sender
    /// belongs to zero or several.
    pub async fn member_club(&self, sender_id: &str) -> Option<Arc<TenantContext>> {
        let mut found = Vec::new();
        for tenant in &self.tenants {
            let cell = tenant.cell.lock().await;
            if let TenantCell::Ready(data) = &*cell {
                if data.catalog.find_member_by_id(sender_id).is_some() {
                    found.push(tenant.clone());
                }
            }
        }
        match found.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        }
    }

    /// The first club where the sender currently holds a pending offer.
    pub async fn offer_club(&self, sender_id: &str) -> Option<Arc<TenantContext>> {
        for tenant in &self.tenants {
            let cell = tenant.cell.lock().await;
            if let TenantCell::Ready(data) = &*cell {
                if data.round.pending_role_of(sender_id).is_some() {
                    return Some(tenant.clone());
                }
            }
        }
        None
    }

    /// The first club where the sender holds a pending offer or an accepted
    /// role.
    pub async fn engaged_club(&self, sender_id: &str) -> Option<Arc<TenantContext>> {
        for tenant in &self.tenants {
            let cell = tenant.cell.lock().await;
            if let TenantCell::Ready(data) = &*cell {
                if data.round.pending_role_of(sender_id).is_some()
                    || data.round.accepted_role_of(sender_id).is_some()
                {
                    return Some(tenant.clone());
                }
            }
        }
        None
    }

    /// Resolve an inbound sender to a tenant.
    ///
    /// Order: session binding, unique membership, unique adminship, current
    /// engagement anywhere, then needs-pick (multi-club admins) or unknown.
    pub async fn infer_tenant(
        &self,
        sender_id: &str,
        session_club: Option<&str>,
    ) -> TenantResolution {
        if let Some(club_id) = session_club {
            if let Some(tenant) = self.get(club_id) {
                return TenantResolution::Club(tenant.clone());
            }
        }
        if let Some(tenant) = self.member_club(sender_id).await {
            return TenantResolution::Club(tenant);
        }
        let admin_clubs = self.admin_clubs(sender_id);
        if let [only] = admin_clubs.as_slice() {
            return TenantResolution::Club(only.clone());
        }
        if let Some(tenant) = self.engaged_club(sender_id).await {
            return TenantResolution::Club(tenant);
        }
        if admin_clubs.len() > 1 {
            TenantResolution::NeedsPick(
                admin_clubs.iter().map(|t| t.club_id.clone()).collect(),
            )
        } else {
            TenantResolution::Unknown
        }
    }
}

fn load_club(store: &ClubStore) -> Result<TenantData, EngineError> {
    let catalog = store.load_catalog()?;
    let round = store.load_state()?;
    Ok(TenantData { catalog, round })
}
