//! Inbound text routing.
//!
//! The engine applies a strict precedence to every normalized inbound event:
//!
//! 1. Pending-offer replies ("1"/"2"/"3" while an offer is open anywhere)
//!    bypass the menus entirely.
//! 2. Session-driven routing: awaited free-text arguments, then numeric
//!    menu selection per session mode.
//! 3. Legacy text commands kept for backward compatibility (`iniciar`,
//!    `estado`, `acepto`, …).
//! 4. Fallback: the root menu.
//!
//! A numeric that does not index an option rendered for this user falls
//! through to the fallback. Errors render as one short line plus the root
//! menu, and the session returns to root.

use std::sync::Arc;

use tracing::{debug, info};

use crate::admin;
use crate::error::EngineError;
use crate::messages;
use crate::registry::{Registry, TenantContext, TenantResolution};
use crate::round;
use crate::sender::Outbound;
use crate::session::{Awaiting, Session, SessionMode, SessionTable};

/// Root menu options, in rendered order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootOption {
    MemberMenu,
    AdminMenu,
    MyStatus,
}

/// Member menu operations, in rendered order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberOp {
    MyRole,
    RoundStatus,
    Back,
}

/// Admin menu operations, in rendered order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminOp {
    Start,
    Status,
    Cancel,
    Reset,
    Members,
    AddMember,
    RemoveMember,
    Back,
}

const ADMIN_OPS: [AdminOp; 8] = [
    AdminOp::Start,
    AdminOp::Status,
    AdminOp::Cancel,
    AdminOp::Reset,
    AdminOp::Members,
    AdminOp::AddMember,
    AdminOp::RemoveMember,
    AdminOp::Back,
];

const MEMBER_OPS: [MemberOp; 3] = [MemberOp::MyRole, MemberOp::RoundStatus, MemberOp::Back];

/// Where an admin command should land: a resolved club, or a pick menu
/// that must go out first.
enum AdminTarget {
    Ctx(Arc<TenantContext>),
    Pick(Vec<Outbound>),
}

/// The assignment engine's front door: routes normalized inbound events to
/// the state machine, admin ops, or menu rendering.
pub struct Engine {
    registry: Arc<Registry>,
    sessions: SessionTable,
}

impl Engine {
    /// Create an engine over a loaded registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            sessions: SessionTable::default(),
        }
    }

    /// The tenant registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handle one inbound event and return the outbound batch.
    ///
    /// State is persisted and every tenant lock released by the time this
    /// returns; the caller delivers the batch afterwards.
    pub async fn handle_text(&self, sender_id: &str, raw_text: &str) -> Vec<Outbound> {
        let text = norm(raw_text);
        debug!(sender = %sender_id, text = %text, "Inbound event");

        let session_arc = self.sessions.entry(sender_id).await;
        let mut session = session_arc.lock().await;

        match self.dispatch(sender_id, raw_text, &text, &mut session).await {
            Ok(out) => out,
            Err(err) => {
                info!(sender = %sender_id, error = %err, "Command refused");
                *session = Session::default();
                let is_admin = !self.registry.admin_clubs(sender_id).is_empty();
                vec![Outbound::new(
                    sender_id,
                    format!(
                        "{}\n\n{}",
                        messages::error_line(&err),
                        messages::root_menu(is_admin)
                    ),
                )]
            }
        }
    }

    async fn dispatch(
        &self,
        sender_id: &str,
        raw: &str,
        text: &str,
        session: &mut Session,
    ) -> Result<Vec<Outbound>, EngineError> {
        // 1. Pending-offer reply, regardless of session state.
        if matches!(text, "1" | "2" | "3") {
            if let Some(ctx) = self.registry.offer_club(sender_id).await {
                return self.offer_reply(&ctx, sender_id, text).await;
            }
        }

        // 2. Session-driven routing: an awaited argument consumes the whole
        // message, otherwise numerics select from the current menu.
        match session.awaiting {
            Awaiting::AddMember => {
                session.awaiting = Awaiting::None;
                return self.consume_add_member(sender_id, raw, session).await;
            }
            Awaiting::RemoveMember => {
                session.awaiting = Awaiting::None;
                return self.consume_remove_member(sender_id, raw, session).await;
            }
            Awaiting::None | Awaiting::PickClub => {}
        }

        if let Some(n) = numeric_token(text) {
            return match session.mode {
                SessionMode::Root => self.root_select(sender_id, n, session).await,
                SessionMode::Member => self.member_select(sender_id, n, session).await,
                SessionMode::Admin => self.admin_select(sender_id, n, session).await,
                SessionMode::AdminPick => self.pick_select(sender_id, n, session).await,
            };
        }

        // 3. Legacy text commands.
        if let Some(result) = self.legacy(sender_id, raw, text, session).await {
            return result;
        }

        // 4. Fallback.
        Ok(self.fallback(sender_id, session))
    }

    /// Reset the session and render the root menu.
    fn fallback(&self, sender_id: &str, session: &mut Session) -> Vec<Outbound> {
        *session = Session::default();
        let is_admin = !self.registry.admin_clubs(sender_id).is_empty();
        vec![Outbound::new(sender_id, messages::root_menu(is_admin))]
    }

    /// Apply a "1"/"2"/"3" reply to the sender's open offer.
    async fn offer_reply(
        &self,
        ctx: &Arc<TenantContext>,
        sender_id: &str,
        text: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        let mut cell = ctx.cell.lock().await;
        let data = cell.ready_mut(&ctx.club_id)?;
        match text {
            "1" => round::accept(ctx, data, sender_id),
            "2" => round::reject(ctx, data, sender_id),
            _ => round::defer(data, sender_id),
        }
    }

    async fn root_select(
        &self,
        sender_id: &str,
        n: usize,
        session: &mut Session,
    ) -> Result<Vec<Outbound>, EngineError> {
        let is_admin = !self.registry.admin_clubs(sender_id).is_empty();
        let mut options = vec![RootOption::MemberMenu];
        if is_admin {
            options.push(RootOption::AdminMenu);
        }
        options.push(RootOption::MyStatus);

        let Some(option) = n.checked_sub(1).and_then(|i| options.get(i)).copied() else {
            return Ok(self.fallback(sender_id, session));
        };
        match option {
            RootOption::MemberMenu => {
                session.mode = SessionMode::Member;
                Ok(vec![Outbound::new(sender_id, messages::member_menu())])
            }
            RootOption::AdminMenu => match self.resolve_admin_target(sender_id, session).await? {
                AdminTarget::Ctx(ctx) => {
                    session.mode = SessionMode::Admin;
                    Ok(vec![Outbound::new(
                        sender_id,
                        messages::admin_menu(&ctx.club_id),
                    )])
                }
                AdminTarget::Pick(out) => Ok(out),
            },
            RootOption::MyStatus => self.my_status(sender_id, session).await,
        }
    }

    async fn member_select(
        &self,
        sender_id: &str,
        n: usize,
        session: &mut Session,
    ) -> Result<Vec<Outbound>, EngineError> {
        let Some(op) = n.checked_sub(1).and_then(|i| MEMBER_OPS.get(i)).copied() else {
            return Ok(self.fallback(sender_id, session));
        };
        match op {
            MemberOp::MyRole => self.my_status(sender_id, session).await,
            MemberOp::RoundStatus => self.round_status(sender_id, session).await,
            MemberOp::Back => Ok(self.fallback(sender_id, session)),
        }
    }

    async fn admin_select(
        &self,
        sender_id: &str,
        n: usize,
        session: &mut Session,
    ) -> Result<Vec<Outbound>, EngineError> {
        let Some(op) = n.checked_sub(1).and_then(|i| ADMIN_OPS.get(i)).copied() else {
            return Ok(self.fallback(sender_id, session));
        };
        if op == AdminOp::Back {
            return Ok(self.fallback(sender_id, session));
        }

        let ctx = match self.resolve_admin_target(sender_id, session).await? {
            AdminTarget::Ctx(ctx) => ctx,
            AdminTarget::Pick(out) => return Ok(out),
        };

        match op {
            AdminOp::Start => {
                let mut cell = ctx.cell.lock().await;
                let data = cell.ready_mut(&ctx.club_id)?;
                round::start_round(&ctx, data, sender_id)
            }
            AdminOp::Status => {
                let mut cell = ctx.cell.lock().await;
                let data = cell.ready_mut(&ctx.club_id)?;
                Ok(vec![Outbound::new(sender_id, round::status_text(data))])
            }
            AdminOp::Cancel => {
                let mut cell = ctx.cell.lock().await;
                let data = cell.ready_mut(&ctx.club_id)?;
                round::cancel_round(&ctx, data, sender_id)
            }
            AdminOp::Reset => {
                let mut cell = ctx.cell.lock().await;
                let data = cell.ready_mut(&ctx.club_id)?;
                round::reset(&ctx, data, sender_id)
            }
            AdminOp::Members => {
                let mut cell = ctx.cell.lock().await;
                let data = cell.ready_mut(&ctx.club_id)?;
                Ok(vec![Outbound::new(sender_id, admin::members_list(data))])
            }
            AdminOp::AddMember => {
                session.awaiting = Awaiting::AddMember;
                Ok(vec![Outbound::new(sender_id, messages::add_member_prompt())])
            }
            AdminOp::RemoveMember => {
                session.awaiting = Awaiting::RemoveMember;
                Ok(vec![Outbound::new(
                    sender_id,
                    messages::remove_member_prompt(),
                )])
            }
            AdminOp::Back => unreachable!("handled above"),
        }
    }

    async fn pick_select(
        &self,
        sender_id: &str,
        n: usize,
        session: &mut Session,
    ) -> Result<Vec<Outbound>, EngineError> {
        let clubs = self.registry.admin_clubs(sender_id);
        let Some(ctx) = n.checked_sub(1).and_then(|i| clubs.get(i)) else {
            return Ok(self.fallback(sender_id, session));
        };
        session.club_id = Some(ctx.club_id.clone());
        session.mode = SessionMode::Admin;
        session.awaiting = Awaiting::None;
        Ok(vec![Outbound::new(
            sender_id,
            messages::admin_menu(&ctx.club_id),
        )])
    }

    /// Resolve the club an admin command targets, binding it into the
    /// session. Multi-club admins without a binding get the pick menu.
    async fn resolve_admin_target(
        &self,
        sender_id: &str,
        session: &mut Session,
    ) -> Result<AdminTarget, EngineError> {
        if let Some(club_id) = &session.club_id {
            let ctx = self
                .registry
                .get(club_id)
                .cloned()
                .ok_or(EngineError::Unauthorized)?;
            if !ctx.is_admin(sender_id) {
                return Err(EngineError::Unauthorized);
            }
            return Ok(AdminTarget::Ctx(ctx));
        }

        let clubs = self.registry.admin_clubs(sender_id);
        match clubs.as_slice() {
            [] => Err(EngineError::Unauthorized),
            [only] => {
                session.club_id = Some(only.club_id.clone());
                Ok(AdminTarget::Ctx(only.clone()))
            }
            many => {
                session.mode = SessionMode::AdminPick;
                session.awaiting = Awaiting::PickClub;
                let ids: Vec<String> = many.iter().map(|t| t.club_id.clone()).collect();
                Ok(AdminTarget::Pick(vec![Outbound::new(
                    sender_id,
                    messages::admin_pick_menu(&ids),
                )]))
            }
        }
    }

    /// The sender's own assignment view, against their inferred club.
    async fn my_status(
        &self,
        sender_id: &str,
        session: &Session,
    ) -> Result<Vec<Outbound>, EngineError> {
        match self
            .registry
            .infer_tenant(sender_id, session.club_id.as_deref())
            .await
        {
            TenantResolution::Club(ctx) => {
                let mut cell = ctx.cell.lock().await;
                let data = cell.ready_mut(&ctx.club_id)?;
                Ok(vec![Outbound::new(
                    sender_id,
                    round::whoami_text(data, sender_id),
                )])
            }
            TenantResolution::NeedsPick(_) => {
                Ok(vec![Outbound::new(sender_id, messages::pick_a_club_first())])
            }
            TenantResolution::Unknown => {
                Ok(vec![Outbound::new(sender_id, messages::unknown_sender())])
            }
        }
    }

    /// The round status, against the sender's inferred club.
    async fn round_status(
        &self,
        sender_id: &str,
        session: &Session,
    ) -> Result<Vec<Outbound>, EngineError> {
        match self
            .registry
            .infer_tenant(sender_id, session.club_id.as_deref())
            .await
        {
            TenantResolution::Club(ctx) => {
                let mut cell = ctx.cell.lock().await;
                let data = cell.ready_mut(&ctx.club_id)?;
                Ok(vec![Outbound::new(sender_id, round::status_text(data))])
            }
            TenantResolution::NeedsPick(_) => {
                Ok(vec![Outbound::new(sender_id, messages::pick_a_club_first())])
            }
            TenantResolution::Unknown => {
                Ok(vec![Outbound::new(sender_id, messages::unknown_sender())])
            }
        }
    }

    async fn consume_add_member(
        &self,
        sender_id: &str,
        raw: &str,
        session: &mut Session,
    ) -> Result<Vec<Outbound>, EngineError> {
        let ctx = match self.resolve_admin_target(sender_id, session).await? {
            AdminTarget::Ctx(ctx) => ctx,
            AdminTarget::Pick(out) => return Ok(out),
        };
        let Some((name, id)) = parse_member_arg(raw) else {
            return Ok(vec![Outbound::new(sender_id, messages::add_member_usage())]);
        };
        let mut cell = ctx.cell.lock().await;
        let data = cell.ready_mut(&ctx.club_id)?;
        admin::add_member(&ctx, data, sender_id, &name, &id)
    }

    async fn consume_remove_member(
        &self,
        sender_id: &str,
        raw: &str,
        session: &mut Session,
    ) -> Result<Vec<Outbound>, EngineError> {
        let ctx = match self.resolve_admin_target(sender_id, session).await? {
            AdminTarget::Ctx(ctx) => ctx,
            AdminTarget::Pick(out) => return Ok(out),
        };
        let reference = raw.trim();
        if reference.is_empty() {
            return Ok(vec![Outbound::new(
                sender_id,
                messages::remove_member_prompt(),
            )]);
        }
        let mut cell = ctx.cell.lock().await;
        let data = cell.ready_mut(&ctx.club_id)?;
        admin::remove_member(&ctx, data, sender_id, reference)
    }

    /// Legacy exact-match commands kept from earlier releases.
    async fn legacy(
        &self,
        sender_id: &str,
        raw: &str,
        text: &str,
        session: &mut Session,
    ) -> Option<Result<Vec<Outbound>, EngineError>> {
        match text {
            "hola" | "hi" | "hello" => {
                return Some(Ok(vec![Outbound::new(sender_id, messages::greeting())]));
            }
            "mi rol" | "mirol" | "miasignacion" | "mi asignacion" => {
                return Some(self.my_status(sender_id, session).await);
            }
            "acepto" | "aceptar" | "si acepto" => {
                return Some(self.legacy_offer_reply(sender_id, "1").await);
            }
            "rechazo" | "rechazar" | "no acepto" | "no puedo" => {
                return Some(self.legacy_offer_reply(sender_id, "2").await);
            }
            "iniciar" | "/iniciar" | "roles" => {
                return Some(self.legacy_admin(sender_id, AdminOp::Start, session).await);
            }
            "estado" | "/estado" => {
                return Some(self.legacy_admin(sender_id, AdminOp::Status, session).await);
            }
            "cancelar" | "/cancelar" => {
                return Some(self.legacy_admin(sender_id, AdminOp::Cancel, session).await);
            }
            "reset" | "/reset" => {
                return Some(self.legacy_admin(sender_id, AdminOp::Reset, session).await);
            }
            "miembros" => {
                return Some(self.legacy_admin(sender_id, AdminOp::Members, session).await);
            }
            _ => {}
        }

        // AGREGAR <name>, <id> / ELIMINAR <id|name> carry free-text
        // arguments, so they match on the first token only.
        let (head, rest) = split_command(raw)?;
        match (head.as_str(), rest.is_empty()) {
            ("agregar", false) => {
                match parse_member_arg(rest) {
                    Some((name, id)) => Some(self.run_add(sender_id, session, &name, &id).await),
                    None => Some(Ok(vec![Outbound::new(
                        sender_id,
                        messages::add_member_usage(),
                    )])),
                }
            }
            ("eliminar", false) => Some(self.run_remove(sender_id, session, rest).await),
            _ => None,
        }
    }

    async fn legacy_offer_reply(
        &self,
        sender_id: &str,
        text: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        let ctx = self
            .registry
            .offer_club(sender_id)
            .await
            .ok_or(EngineError::NoPendingOffer)?;
        self.offer_reply(&ctx, sender_id, text).await
    }

    async fn legacy_admin(
        &self,
        sender_id: &str,
        op: AdminOp,
        session: &mut Session,
    ) -> Result<Vec<Outbound>, EngineError> {
        let ctx = match self.resolve_admin_target(sender_id, session).await? {
            AdminTarget::Ctx(ctx) => ctx,
            AdminTarget::Pick(out) => return Ok(out),
        };
        let mut cell = ctx.cell.lock().await;
        let data = cell.ready_mut(&ctx.club_id)?;
        match op {
            AdminOp::Start => round::start_round(&ctx, data, sender_id),
            AdminOp::Status => Ok(vec![Outbound::new(sender_id, round::status_text(data))]),
            AdminOp::Cancel => round::cancel_round(&ctx, data, sender_id),
            AdminOp::Reset => round::reset(&ctx, data, sender_id),
            AdminOp::Members => Ok(vec![Outbound::new(sender_id, admin::members_list(data))]),
            AdminOp::AddMember | AdminOp::RemoveMember | AdminOp::Back => {
                unreachable!("not reachable from legacy commands")
            }
        }
    }

    async fn run_add(
        &self,
        sender_id: &str,
        session: &mut Session,
        name: &str,
        id: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        let ctx = match self.resolve_admin_target(sender_id, session).await? {
            AdminTarget::Ctx(ctx) => ctx,
            AdminTarget::Pick(out) => return Ok(out),
        };
        let mut cell = ctx.cell.lock().await;
        let data = cell.ready_mut(&ctx.club_id)?;
        admin::add_member(&ctx, data, sender_id, name, id)
    }

    async fn run_remove(
        &self,
        sender_id: &str,
        session: &mut Session,
        reference: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        let ctx = match self.resolve_admin_target(sender_id, session).await? {
            AdminTarget::Ctx(ctx) => ctx,
            AdminTarget::Pick(out) => return Ok(out),
        };
        let mut cell = ctx.cell.lock().await;
        let data = cell.ready_mut(&ctx.club_id)?;
        admin::remove_member(&ctx, data, sender_id, reference)
    }
}

/// Normalize inbound text: trim, fold Spanish accents to their ASCII base,
/// drop any other non-ASCII, lowercase.
pub fn norm(s: &str) -> String {
    let folded: String = s.trim().chars().filter_map(fold_char).collect();
    folded.trim().to_string()
}

fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ä' | 'Á' | 'À' | 'Â' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ñ' | 'Ñ' => 'n',
        c if c.is_ascii() => c.to_ascii_lowercase(),
        _ => return None,
    };
    Some(folded)
}

/// A menu selection: one to three digits.
fn numeric_token(text: &str) -> Option<usize> {
    if text.is_empty() || text.len() > 3 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Split a raw message into its normalized first token and the raw rest.
fn split_command(raw: &str) -> Option<(String, &str)> {
    let raw = raw.trim();
    let token = raw.split_whitespace().next()?;
    let rest = raw[token.len()..].trim();
    Some((norm(token), rest))
}

/// Parse a "Nombre, 5215550001" member argument. The id must be in E.164
/// digit form.
fn parse_member_arg(raw: &str) -> Option<(String, String)> {
    let (name, id) = raw.trim().split_once(',')?;
    let name = name.trim();
    let id = id.trim();
    if name.is_empty() || !admin::is_valid_waid(id) {
        return None;
    }
    Some((name.to_string(), id.to_string()))
}
