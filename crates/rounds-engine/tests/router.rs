//! Menu routing, precedence and tenant disambiguation through the engine.

use std::path::Path;
use std::sync::Arc;

use club_data::{Catalog, ClubStore, Member, Role};
use rounds_engine::{Engine, Outbound, Registry};

const ADMIN_S: &str = "5215550000900";
const MEMBER_T: &str = "5215550000001";
const ADMIN_MEMBER: &str = "5215550000002";

fn write_manifest(dir: &Path, body: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("registry.json"), body).unwrap();
}

fn small_catalog(member: (&str, &str)) -> Catalog {
    Catalog {
        members: vec![Member::new(member.0, member.1).with_level(2)],
        roles: vec![Role::new("Evaluador del tiempo", 1)],
    }
}

/// Two clubs: S administers both, T is a member of club_x only.
fn two_club_engine() -> (tempfile::TempDir, Engine) {
    let tmp = tempfile::tempdir().unwrap();
    write_manifest(
        tmp.path(),
        &format!(
            r#"{{"clubs": {{
                "club_x": {{"admins": ["{ADMIN_S}"]}},
                "club_y": {{"admins": ["{ADMIN_S}"]}}
            }}}}"#
        ),
    );
    ClubStore::new(tmp.path().join("club_x"))
        .save_catalog(&small_catalog(("Tina", MEMBER_T)))
        .unwrap();
    ClubStore::new(tmp.path().join("club_y"))
        .save_catalog(&small_catalog(("Yolanda", "5215550000055")))
        .unwrap();
    let engine = Engine::new(Arc::new(Registry::load(tmp.path()).unwrap()));
    (tmp, engine)
}

/// One club whose admin is also its only member.
fn one_club_engine() -> (tempfile::TempDir, Engine) {
    let tmp = tempfile::tempdir().unwrap();
    write_manifest(
        tmp.path(),
        &format!(r#"{{"clubs": {{"club_1": {{"admins": ["{ADMIN_MEMBER}"]}}}}}}"#),
    );
    ClubStore::new(tmp.path().join("club_1"))
        .save_catalog(&small_catalog(("Alba", ADMIN_MEMBER)))
        .unwrap();
    let engine = Engine::new(Arc::new(Registry::load(tmp.path()).unwrap()));
    (tmp, engine)
}

fn to_sender<'a>(out: &'a [Outbound], sender: &str) -> Vec<&'a str> {
    out.iter()
        .filter(|m| m.to == sender)
        .map(|m| m.text.as_str())
        .collect()
}

#[tokio::test]
async fn scenario_f_multi_club_admin_picks_then_sticks() {
    let (_tmp, engine) = two_club_engine();

    // Root menu option 2 is the admin menu; S administers two clubs, so the
    // pick menu comes back.
    let out = engine.handle_text(ADMIN_S, "2").await;
    let texts = to_sender(&out, ADMIN_S);
    assert!(texts[0].contains("¿Sobre qué club?"));
    assert!(texts[0].contains("1) club_x"));
    assert!(texts[0].contains("2) club_y"));

    // Picking 2 binds club_y; subsequent commands target it.
    let out = engine.handle_text(ADMIN_S, "2").await;
    assert!(to_sender(&out, ADMIN_S)[0].contains("Menú de administrador (club_y)"));

    let out = engine.handle_text(ADMIN_S, "1").await;
    // Round started in club_y: the offer goes to club_y's only member.
    assert!(!to_sender(&out, "5215550000055").is_empty());
    assert!(to_sender(&out, MEMBER_T).is_empty());
}

#[tokio::test]
async fn scenario_f_plain_member_always_targets_their_club() {
    let (_tmp, engine) = two_club_engine();

    let out = engine.handle_text(MEMBER_T, "mi rol").await;
    let texts = to_sender(&out, MEMBER_T);
    assert!(texts[0].contains("No tienes asignaciones pendientes"));

    // An admin of club_x starts a round there; T's offer reply lands in
    // club_x with no extra routing.
    engine.handle_text(ADMIN_S, "2").await;
    engine.handle_text(ADMIN_S, "1").await; // picks club_x
    engine.handle_text(ADMIN_S, "1").await; // starts the round
    let out = engine.handle_text(MEMBER_T, "1").await;
    assert!(to_sender(&out, MEMBER_T)[0].contains("🎉"));
}

#[tokio::test]
async fn scenario_g_pending_offer_beats_the_admin_menu() {
    let (_tmp, engine) = one_club_engine();

    // Enter the admin menu before any offer exists.
    let out = engine.handle_text(ADMIN_MEMBER, "2").await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0].contains("Menú de administrador"));

    // Admin option 1 starts the round; the offer lands on the admin, who is
    // the only member.
    let out = engine.handle_text(ADMIN_MEMBER, "1").await;
    assert!(to_sender(&out, ADMIN_MEMBER)
        .iter()
        .any(|t| t.contains("te propongo el rol")));

    // Still in the admin menu, "1" now accepts the offer instead of
    // starting another round.
    let out = engine.handle_text(ADMIN_MEMBER, "1").await;
    let texts = to_sender(&out, ADMIN_MEMBER);
    assert!(texts.iter().any(|t| t.contains("🎉")));
    assert!(!texts.iter().any(|t| t.contains("Ya hay una ronda")));
}

#[tokio::test]
async fn numeric_without_offer_walks_the_menus() {
    let (_tmp, engine) = two_club_engine();

    let out = engine.handle_text(MEMBER_T, "1").await;
    assert!(to_sender(&out, MEMBER_T)[0].contains("Menú de miembro"));

    let out = engine.handle_text(MEMBER_T, "2").await;
    assert!(to_sender(&out, MEMBER_T)[0].contains("Reunión #0"));

    let out = engine.handle_text(MEMBER_T, "3").await;
    assert!(to_sender(&out, MEMBER_T)[0].contains("¿Qué quieres hacer?"));
}

#[tokio::test]
async fn out_of_range_numeric_falls_back_to_the_root_menu() {
    let (_tmp, engine) = two_club_engine();

    // T is not an admin: the root menu only renders two options.
    let out = engine.handle_text(MEMBER_T, "5").await;
    let texts = to_sender(&out, MEMBER_T);
    assert!(texts[0].starts_with("¿Qué quieres hacer?"));
    assert!(!texts[0].contains("administrador"));
}

#[tokio::test]
async fn arbitrary_text_renders_the_root_menu() {
    let (_tmp, engine) = two_club_engine();
    let out = engine.handle_text(MEMBER_T, "buenos días!").await;
    assert!(to_sender(&out, MEMBER_T)[0].contains("¿Qué quieres hacer?"));
}

#[tokio::test]
async fn legacy_commands_and_authorization() {
    let (_tmp, engine) = one_club_engine();

    // Legacy INICIAR is accent- and case-insensitive and admin-gated.
    let out = engine.handle_text(ADMIN_MEMBER, "INICIAR").await;
    assert!(to_sender(&out, ADMIN_MEMBER)
        .iter()
        .any(|t| t.contains("te propongo el rol")));

    let stranger = "5215550000777";
    let out = engine.handle_text(stranger, "iniciar").await;
    assert!(to_sender(&out, stranger)[0].contains("solo para administradores"));

    // ESTADO renders the status block.
    let out = engine.handle_text(ADMIN_MEMBER, "estado").await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0].contains("Pendientes:"));

    // Legacy ACEPTO resolves the pending offer.
    let out = engine.handle_text(ADMIN_MEMBER, "Acepto").await;
    assert!(to_sender(&out, ADMIN_MEMBER)
        .iter()
        .any(|t| t.contains("🎉")));
}

#[tokio::test]
async fn greeting_and_unknown_sender() {
    let (_tmp, engine) = two_club_engine();

    let out = engine.handle_text(MEMBER_T, "Hola").await;
    assert!(to_sender(&out, MEMBER_T)[0].contains("Soy el bot de roles"));

    let stranger = "5215550000777";
    let out = engine.handle_text(stranger, "mi rol").await;
    assert!(to_sender(&out, stranger)[0].contains("No te reconozco"));
}

#[tokio::test]
async fn add_member_flow_through_the_menu() {
    let (_tmp, engine) = one_club_engine();

    engine.handle_text(ADMIN_MEMBER, "2").await; // admin menu
    let out = engine.handle_text(ADMIN_MEMBER, "6").await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0].contains("Envía: Nombre, Número"));

    // The next message is consumed as the argument, keeping its case.
    let out = engine
        .handle_text(ADMIN_MEMBER, "Nuevo Socio, 5215551112233")
        .await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0]
        .contains("Miembro agregado: Nuevo Socio (5215551112233)"));

    let out = engine.handle_text(ADMIN_MEMBER, "5").await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0].contains("Nuevo Socio"));

    // A second add with the same number collides.
    engine.handle_text(ADMIN_MEMBER, "6").await;
    let out = engine.handle_text(ADMIN_MEMBER, "Otro, 5215551112233").await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0].contains("Ya existe un miembro"));
}

#[tokio::test]
async fn malformed_add_argument_reports_usage() {
    let (_tmp, engine) = one_club_engine();
    engine.handle_text(ADMIN_MEMBER, "2").await;
    engine.handle_text(ADMIN_MEMBER, "6").await;
    let out = engine.handle_text(ADMIN_MEMBER, "sin coma 123").await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0].contains("No entendí"));
}

#[tokio::test]
async fn legacy_agregar_and_eliminar() {
    let (_tmp, engine) = one_club_engine();

    let out = engine
        .handle_text(ADMIN_MEMBER, "AGREGAR María, 5215554445566")
        .await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0].contains("Miembro agregado: María"));

    let out = engine.handle_text(ADMIN_MEMBER, "eliminar María").await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0].contains("Miembro eliminado: María"));

    let out = engine.handle_text(ADMIN_MEMBER, "eliminar María").await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0].contains("No encontré"));
}

#[tokio::test]
async fn remove_member_refused_while_engaged() {
    let (_tmp, engine) = one_club_engine();

    engine.handle_text(ADMIN_MEMBER, "iniciar").await;
    // Alba holds the pending offer, so she cannot be removed.
    let out = engine.handle_text(ADMIN_MEMBER, "eliminar Alba").await;
    assert!(to_sender(&out, ADMIN_MEMBER)[0].contains("rol pendiente o aceptado"));
}
