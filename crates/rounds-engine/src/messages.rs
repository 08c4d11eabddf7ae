//! User-facing texts and menus.
//!
//! All wording lives here so the state machine and the router stay free of
//! string building. Texts keep the Spanish register of the club chats.

use club_data::{Catalog, RoundState};

use crate::error::EngineError;

/// First offer of a role to a candidate.
pub fn offer(name: &str, role: &str, round: u32) -> String {
    format!(
        "Hola {name} 👋\nPara la reunión #{round} te propongo el rol *{role}*.\n\n\
         Responde:\n1) *ACEPTO*\n2) *RECHAZO*\n3) Contesto luego\n\n\
         (Si rechazas, se propondrá a otro miembro.)"
    )
}

/// Re-offer after somebody else declined.
pub fn reoffer(name: &str, role: &str, round: u32) -> String {
    format!(
        "Hola {name} 👋\n¿Podrías tomar el rol *{role}* para la reunión #{round}?\n\
         Responde 1 (*ACEPTO*), 2 (*RECHAZO*) o 3 (contesto luego)."
    )
}

pub fn accept_ack(name: &str, role: &str, round: u32) -> String {
    format!("🎉 ¡Gracias {name}! Quedaste como *{role}* en la reunión #{round}.")
}

pub fn reject_ack(role: &str) -> String {
    format!("Gracias por avisar, buscaremos otra opción para *{role}* 👍")
}

pub fn defer_ack() -> String {
    "De acuerdo, te esperamos 👍 Responde 1 (*ACEPTO*) o 2 (*RECHAZO*) cuando puedas.".to_string()
}

/// Admin notice: a role ran out of candidates.
pub fn no_candidate(role: &str) -> String {
    format!("⚠️ No hay candidato disponible para *{role}*. Resolver manualmente.")
}

pub fn round_started(round: u32, by_name: &str) -> String {
    format!("✅ Ronda #{round} iniciada por {by_name}. Escribe ESTADO para ver pendientes.")
}

/// The assignments block: every role of the club in catalog order.
pub fn summary(catalog: &Catalog, state: &RoundState) -> String {
    let mut lines = vec![format!("🗓️ Reunión #{} – Roles asignados:", state.round)];
    for role in &catalog.roles {
        match state.accepted.get(&role.name) {
            Some(acc) => lines.push(format!("• {}: {}", role.name, acc.name)),
            None => lines.push(format!("• {}: (pendiente)", role.name)),
        }
    }
    lines.join("\n")
}

pub fn summary_broadcast(summary: &str) -> String {
    format!("✅ {summary}\n\n¡Nos vemos en la próxima reunión!")
}

pub fn canceled_candidate() -> String {
    "⚠️ La ronda de roles fue *cancelada*; tu propuesta queda sin efecto.".to_string()
}

pub fn canceled_admins(round: u32, by_name: &str) -> String {
    format!("❌ Ronda #{round} cancelada por {by_name}.")
}

pub fn reset_done(by_name: &str) -> String {
    format!("🔄 Estado de ronda reiniciado por {by_name}.")
}

/// Full admin status: assignments, open offers, unfilled roles.
pub fn status(catalog: &Catalog, state: &RoundState) -> String {
    let mut lines = vec![summary(catalog, state), String::new(), "Pendientes:".to_string()];
    if state.pending.is_empty() {
        lines.push("• (ninguno)".to_string());
    } else {
        for (role, offer) in &state.pending {
            lines.push(format!(
                "• {}: propuesto a {} (declinaron: {})",
                role,
                catalog.member_name(&offer.candidate),
                offer.declined_by.len()
            ));
        }
    }

    let unfilled: Vec<&str> = catalog
        .roles
        .iter()
        .map(|r| r.name.as_str())
        .filter(|name| !state.pending.contains_key(*name) && !state.accepted.contains_key(*name))
        .collect();
    if state.round > 0 && !unfilled.is_empty() {
        lines.push(String::new());
        lines.push("Sin candidato:".to_string());
        for role in unfilled {
            lines.push(format!("• {role}"));
        }
    }

    if state.canceled {
        lines.push(String::new());
        lines.push("Estado: ❌ Ronda cancelada.".to_string());
    }
    lines.join("\n")
}

/// A member's own view: pending offer, accepted role, or nothing.
pub fn whoami(state: &RoundState, sender_id: &str) -> String {
    if let Some(role) = state.pending_role_of(sender_id) {
        return format!(
            "Tienes pendiente el rol *{}* en la ronda #{}.\n\
             Responde 1 (*ACEPTO*), 2 (*RECHAZO*) o 3 (contesto luego).",
            role, state.round
        );
    }
    if let Some(role) = state.accepted_role_of(sender_id) {
        return format!("Ya aceptaste el rol *{}* en la ronda #{}.", role, state.round);
    }
    "No tienes asignaciones pendientes. Si esperas una propuesta, consulta al admin.".to_string()
}

pub fn greeting() -> String {
    "¡Hola! Soy el bot de roles 🤖. Envía cualquier mensaje para ver el menú.".to_string()
}

pub fn unknown_sender() -> String {
    "No te reconozco en ningún club. Si crees que es un error, consulta al admin.".to_string()
}

/// Hint for multi-club admins asking for personal status outside a club
/// binding.
pub fn pick_a_club_first() -> String {
    "Eres administrador de varios clubes; entra al menú de administrador para elegir uno."
        .to_string()
}

// ---- Menus ----

pub fn root_menu(is_admin: bool) -> String {
    let mut lines = vec!["¿Qué quieres hacer?".to_string(), "1) Menú de miembro".to_string()];
    if is_admin {
        lines.push("2) Menú de administrador".to_string());
        lines.push("3) Mi estado".to_string());
    } else {
        lines.push("2) Mi estado".to_string());
    }
    lines.join("\n")
}

pub fn member_menu() -> String {
    "Menú de miembro:\n1) Mi rol\n2) Estado de la ronda\n3) Volver".to_string()
}

pub fn admin_menu(club_id: &str) -> String {
    format!(
        "Menú de administrador ({club_id}):\n\
         1) Iniciar ronda\n2) Estado\n3) Cancelar ronda\n4) Reset\n\
         5) Miembros\n6) Agregar miembro\n7) Eliminar miembro\n8) Volver"
    )
}

pub fn admin_pick_menu(club_ids: &[String]) -> String {
    let mut lines = vec!["¿Sobre qué club?".to_string()];
    for (i, id) in club_ids.iter().enumerate() {
        lines.push(format!("{}) {}", i + 1, id));
    }
    lines.join("\n")
}

pub fn add_member_prompt() -> String {
    "Envía: Nombre, Número (E.164 sin +). Ejemplo: Sheila, 5219211787763".to_string()
}

pub fn add_member_usage() -> String {
    "No entendí. El formato es: Nombre, Número (solo dígitos, 8 a 15). Ejemplo: Sheila, 5219211787763"
        .to_string()
}

pub fn remove_member_prompt() -> String {
    "Envía el número o el nombre del miembro a eliminar.".to_string()
}

pub fn member_added(name: &str, id: &str) -> String {
    format!("✅ Miembro agregado: {name} ({id}).")
}

pub fn member_removed(name: &str) -> String {
    format!("✅ Miembro eliminado: {name}.")
}

/// Member roster: name, id and level, sorted by name.
pub fn members_list(catalog: &Catalog) -> String {
    if catalog.members.is_empty() {
        return "El club no tiene miembros registrados.".to_string();
    }
    let mut members: Vec<_> = catalog.members.iter().collect();
    members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    let mut lines = vec!["Miembros del club:".to_string()];
    for m in members {
        lines.push(format!("• {} ({}) – nivel {}", m.name, m.id, m.level));
    }
    lines.join("\n")
}

/// One-line, user-visible rendering of an error.
pub fn error_line(err: &EngineError) -> String {
    match err {
        EngineError::NotFound(what) => format!("No encontré a {what}."),
        EngineError::DuplicateId(id) => format!("Ya existe un miembro con el número {id}."),
        EngineError::Unauthorized => "Este comando es solo para administradores.".to_string(),
        EngineError::RoundInProgress => "Ya hay una ronda con roles pendientes.".to_string(),
        EngineError::NoPendingOffer => {
            "No tienes una propuesta de rol pendiente ahora mismo. Escribe *MI ROL* para verificar."
                .to_string()
        }
        EngineError::NoCandidateAvailable(what) => {
            format!("⚠️ No hay candidato disponible para {what}.")
        }
        EngineError::MemberBusy(name) => {
            format!("{name} tiene un rol pendiente o aceptado en la ronda actual.")
        }
        EngineError::CorruptState(_) => {
            "El club está temporalmente fuera de servicio. Avisa al operador.".to_string()
        }
        EngineError::Transport(_) => "No se pudo entregar un mensaje. Intenta de nuevo.".to_string(),
        EngineError::Storage(_) => "Error interno. Intenta de nuevo más tarde.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use club_data::{AcceptedRole, Member, Role};

    #[test]
    fn summary_lists_roles_in_catalog_order() {
        let catalog = Catalog {
            members: vec![Member::new("Paco", "222")],
            roles: vec![
                Role::new("Evaluador del tiempo", 1),
                Role::new("Evaluador general", 6),
            ],
        };
        let mut state = RoundState::default();
        state.round = 3;
        state.accepted.insert(
            "Evaluador general".into(),
            AcceptedRole {
                waid: "222".into(),
                name: "Paco".into(),
            },
        );
        let text = summary(&catalog, &state);
        assert_eq!(
            text,
            "🗓️ Reunión #3 – Roles asignados:\n\
             • Evaluador del tiempo: (pendiente)\n\
             • Evaluador general: Paco"
        );
    }

    #[test]
    fn root_menu_numbering_depends_on_admin() {
        assert!(root_menu(true).contains("2) Menú de administrador"));
        assert!(root_menu(true).contains("3) Mi estado"));
        assert!(root_menu(false).contains("2) Mi estado"));
        assert!(!root_menu(false).contains("administrador"));
    }

    #[test]
    fn status_marks_unfilled_roles_once_a_round_ran() {
        let catalog = Catalog {
            members: vec![],
            roles: vec![Role::new("Evaluador general", 6)],
        };
        let mut state = RoundState::default();
        assert!(!status(&catalog, &state).contains("Sin candidato"));
        state.round = 1;
        assert!(status(&catalog, &state).contains("Sin candidato:\n• Evaluador general"));
    }
}
