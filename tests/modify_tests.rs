//! Integrationstests für den Modify-Flow:
//! - Knoten ziehen mit Geometrie-Propagation (Rohrenden, Pumpen-Symbole)
//! - Auto-Spleiß beim Ablegen auf fremden Rohren
//! - Rohr-Stützpunkte umformen

mod common;

use common::{add_junction, add_pipe, assert_invariants, state_with_single_pipe};
use glam::Vec2;
use waternet_editor::core::LinkType;
use waternet_editor::{AppController, AppIntent, AppState, EditorMode};

fn into_modify_mode(state: &mut AppState, controller: &mut AppController) {
    controller
        .handle_intent(state, AppIntent::SetEditorModeRequested { mode: EditorMode::Modify })
        .expect("Moduswechsel darf nicht scheitern");
}

fn drag(controller: &mut AppController, state: &mut AppState, from: Vec2, to: Vec2) {
    for intent in [
        AppIntent::BeginNodeDragRequested { world_pos: from },
        AppIntent::NodeDragMovedRequested { world_pos: to },
        AppIntent::EndNodeDragRequested { world_pos: to },
    ] {
        controller.handle_intent(state, intent).expect("Drag darf nicht paniken");
    }
}

// ─── Knoten ziehen ───────────────────────────────────────────────────────────

#[test]
fn test_drag_verschiebt_knoten_und_rohrenden_gemeinsam() {
    let mut controller = AppController::new();
    let mut state = state_with_single_pipe();
    into_modify_mode(&mut state, &mut controller);

    drag(&mut controller, &mut state, Vec2::new(0.3, 0.0), Vec2::new(-4.0, 3.0));

    assert_eq!(state.network.node("J-1").unwrap().position, Vec2::new(-4.0, 3.0));
    let pipe = state.network.link("P-1").unwrap();
    assert_eq!(pipe.geometry.vertices()[0], Vec2::new(-4.0, 3.0));
    assert!((pipe.length - Vec2::new(-4.0, 3.0).distance(Vec2::new(20.0, 0.0))).abs() < 1e-3);
    assert_invariants(&state.network);
}

#[test]
fn test_drag_einer_pumpen_junction_zieht_symbol_und_visuelle_linie_mit() {
    let mut controller = AppController::new();
    let mut state = state_with_single_pipe();

    // Pumpe einspleißen, dann eine Flanken-Junction verschieben
    controller
        .handle_intent(
            &mut state,
            AppIntent::InsertLinkOnPipeRequested {
                world_pos: Vec2::new(10.0, 0.0),
                link_type: LinkType::Pump,
            },
        )
        .expect("Spleiß darf nicht paniken");
    into_modify_mode(&mut state, &mut controller);

    let pump = state
        .network
        .links_iter()
        .find(|l| l.link_type == LinkType::Pump)
        .map(|l| l.id.clone())
        .unwrap();
    let j1 = state.network.link(&pump).unwrap().start_node.clone();
    let j1_pos = state.network.node(&j1).unwrap().position;

    let target = j1_pos + Vec2::new(0.0, 2.0);
    drag(&mut controller, &mut state, j1_pos, target);

    let pump_link = state.network.link(&pump).unwrap();
    let j2_pos = state
        .network
        .node(&pump_link.end_node)
        .unwrap()
        .position;
    assert_eq!(
        pump_link.geometry.symbol_position(),
        Some((target + j2_pos) / 2.0),
        "Symbol bleibt mittig zwischen den Junctions"
    );
    let visual = state
        .network
        .link(pump_link.visual_line.as_deref().unwrap())
        .unwrap();
    assert_eq!(visual.geometry.vertices()[0], target);
    assert_invariants(&state.network);
}

// ─── Auto-Spleiß beim Ablegen ────────────────────────────────────────────────

#[test]
fn test_ablegen_auf_fremdem_rohr_spleisst_den_knoten_ein() {
    let mut controller = AppController::new();
    let mut state = state_with_single_pipe();
    add_junction(&mut state.network, "J-3", Vec2::new(10.0, 15.0));
    into_modify_mode(&mut state, &mut controller);

    drag(&mut controller, &mut state, Vec2::new(10.0, 15.0), Vec2::new(10.0, 0.4));

    assert!(state.network.link("P-1").is_none(), "Trägerrohr wurde geteilt");
    assert_eq!(state.network.link_count(), 2);
    let j3 = state.network.node("J-3").unwrap();
    assert_eq!(j3.position, Vec2::new(10.0, 0.0), "Knoten sitzt exakt auf dem Rohr");
    assert_eq!(j3.connected_links.len(), 2);
    assert_invariants(&state.network);
}

#[test]
fn test_ablegen_neben_eigenem_rohr_spleisst_nicht() {
    let mut controller = AppController::new();
    let mut state = state_with_single_pipe();
    into_modify_mode(&mut state, &mut controller);

    // J-1 auf das eigene Rohr P-1 ziehen: eigene Links sind vom
    // Auto-Spleiß ausgenommen
    drag(&mut controller, &mut state, Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.2));

    assert!(state.network.link("P-1").is_some());
    assert_eq!(state.network.link_count(), 1);
    assert_invariants(&state.network);
}

#[test]
fn test_auto_spleiss_laesst_sich_abschalten() {
    let mut controller = AppController::new();
    let mut state = state_with_single_pipe();
    state.options.auto_split_on_drop = false;
    add_junction(&mut state.network, "J-3", Vec2::new(10.0, 15.0));
    into_modify_mode(&mut state, &mut controller);

    drag(&mut controller, &mut state, Vec2::new(10.0, 15.0), Vec2::new(10.0, 0.4));

    assert!(state.network.link("P-1").is_some(), "ohne Auto-Spleiß bleibt das Rohr ganz");
    assert_eq!(state.network.node("J-3").unwrap().position, Vec2::new(10.0, 0.4));
}

// ─── Stützpunkte umformen ────────────────────────────────────────────────────

#[test]
fn test_reshape_aendert_geometrie_aber_nie_topologie() {
    let mut controller = AppController::new();
    let mut state = state_with_single_pipe();
    add_junction(&mut state.network, "J-3", Vec2::new(40.0, 0.0));
    add_pipe(
        &mut state.network,
        "P-2",
        vec![Vec2::new(20.0, 0.0), Vec2::new(30.0, 0.0), Vec2::new(40.0, 0.0)],
        "J-2",
        "J-3",
    );
    into_modify_mode(&mut state, &mut controller);

    controller
        .handle_intent(
            &mut state,
            AppIntent::ReshapePipeVertexRequested {
                pipe_id: "P-2".into(),
                vertex_index: 1,
                world_pos: Vec2::new(30.0, 8.0),
            },
        )
        .expect("Reshape darf nicht paniken");

    let pipe = state.network.link("P-2").unwrap();
    assert_eq!(pipe.geometry.vertices()[1], Vec2::new(30.0, 8.0));
    assert_eq!(pipe.start_node, "J-2");
    assert_eq!(pipe.end_node, "J-3");
    assert!(pipe.length > 20.0);

    // Endpunkt-Index wird abgewiesen
    controller
        .handle_intent(
            &mut state,
            AppIntent::ReshapePipeVertexRequested {
                pipe_id: "P-2".into(),
                vertex_index: 2,
                world_pos: Vec2::new(99.0, 99.0),
            },
        )
        .expect("Reshape darf nicht paniken");
    assert_eq!(
        state.network.link("P-2").unwrap().geometry.vertices()[2],
        Vec2::new(40.0, 0.0)
    );
    assert_invariants(&state.network);
}
