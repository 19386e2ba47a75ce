//! Zeichen-Operationen: Klicks auf das Rohrketten-Werkzeug anwenden und
//! fertige Entwürfe in den Netz-Speicher übernehmen.
//!
//! Das Werkzeug selbst (`PipeChainTool`) verändert nie den Speicher. Jede
//! Mutation — Rohr anlegen, Adjazenz nachführen, Vorschau einpflegen —
//! passiert zentral hier.

use glam::Vec2;

use crate::app::tools::{ChainAction, PipeDraft};
use crate::app::AppState;
use crate::core::{ConnectionUpdate, Feature, LinkFeature, LinkType, NodeFeature, NodeType};

/// Id der transienten Vorschau-Linie im Speicher.
pub const PREVIEW_LINE_ID: &str = "PREVIEW-LINE";

/// Verarbeitet einen Einzelklick im Zeichen-Modus.
pub fn click(state: &mut AppState, world_pos: Vec2) {
    state.clear_status();
    let action = state.chain.on_click(world_pos, &state.network);
    apply_chain_action(state, action, world_pos);
}

/// Verarbeitet einen Doppelklick im Zeichen-Modus (Kette abschließen).
pub fn double_click(state: &mut AppState, world_pos: Vec2) {
    state.clear_status();
    let action = state.chain.on_double_click(world_pos, &state.network);
    apply_chain_action(state, action, world_pos);
}

/// Aktualisiert die Vorschau-Features für die aktuelle Cursor-Position.
pub fn hover(state: &mut AppState, world_pos: Vec2) {
    let preview = state.chain.preview(world_pos);
    state.network.remove_transient_features();
    if preview.line.is_empty() {
        return;
    }
    state
        .network
        .add_feature(Feature::Link(LinkFeature::preview_line(
            PREVIEW_LINE_ID.to_string(),
            preview.line,
        )));
    for (i, marker_pos) in preview.markers.into_iter().enumerate() {
        state
            .network
            .add_feature(Feature::Node(NodeFeature::vertex_marker(
                format!("PREVIEW-VERTEX-{i}"),
                marker_pos,
            )));
    }
}

/// Bricht die laufende Kette ab (Escape). Der Speicher bleibt unverändert,
/// nur Vorschau-Features werden entfernt.
pub fn cancel(state: &mut AppState) {
    state.chain.cancel();
    state.network.remove_transient_features();
    state.set_status("Zeichnen abgebrochen");
}

/// Beendet die laufende Kette an einem frischen Zwischenknoten
/// ("Chain Break"), z.B. bevor mitten im Zeichnen gespleißt wird.
pub fn break_chain(state: &mut AppState) {
    match state.chain.take_chain_for_break() {
        Ok((start_node, vertices)) => {
            let Some(&last) = vertices.last() else {
                return;
            };
            let junction_id = state.network.generate_unique_id(NodeType::Junction.prefix());
            state
                .network
                .add_feature(Feature::Node(NodeFeature::new(
                    junction_id.clone(),
                    NodeType::Junction,
                    last,
                )));
            materialize_pipe(
                state,
                &PipeDraft {
                    start_node,
                    end_node: junction_id.clone(),
                    vertices,
                },
            );
            state.chain.reseed(junction_id.clone(), last);
            state.network.remove_transient_features();
            log::info!("Kette an Zwischenknoten {junction_id} unterbrochen");
        }
        Err(reason) => {
            state.set_status(reason);
        }
    }
}

fn apply_chain_action(state: &mut AppState, action: ChainAction, world_pos: Vec2) {
    match action {
        ChainAction::None => {}
        ChainAction::Started(node_id) => {
            state.set_status(format!("Kette an Knoten {node_id} begonnen"));
            hover(state, world_pos);
        }
        ChainAction::VertexAdded => {
            hover(state, world_pos);
        }
        ChainAction::PipeReady(draft) => {
            let pipe_id = materialize_pipe(state, &draft);
            state.network.remove_transient_features();
            state.set_status(format!(
                "Rohr {pipe_id} zwischen {} und {} erstellt",
                draft.start_node, draft.end_node
            ));
        }
        ChainAction::Rejected(reason) => {
            state.set_status(reason);
        }
        ChainAction::Aborted(reason) => {
            state.network.remove_transient_features();
            state.set_status(reason);
        }
    }
}

/// Legt aus einem fertigen Entwurf ein logisches Rohr an und führt die
/// Adjazenz beider Endknoten nach.
fn materialize_pipe(state: &mut AppState, draft: &PipeDraft) -> String {
    let pipe_id = state.network.generate_unique_id(LinkType::Pipe.prefix());
    let pipe = LinkFeature::new_pipe(
        pipe_id.clone(),
        draft.vertices.clone(),
        draft.start_node.clone(),
        draft.end_node.clone(),
    );
    log::info!(
        "Rohr {pipe_id} erstellt: {} -> {} (Länge {:.2})",
        draft.start_node,
        draft.end_node,
        pipe.length
    );
    state.network.add_feature(Feature::Link(pipe));
    state.network.update_node_connections(
        &draft.start_node,
        &pipe_id,
        ConnectionUpdate::Add,
    );
    state
        .network
        .update_node_connections(&draft.end_node, &pipe_id, ConnectionUpdate::Add);
    pipe_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::EditorMode;
    use crate::app::use_cases::set_editor_mode;
    use crate::core::FeatureRole;
    use glam::Vec2;

    fn draw_state_with_junctions() -> AppState {
        let mut state = AppState::new();
        state.network.add_feature(Feature::Node(NodeFeature::new(
            "J-1".into(),
            NodeType::Junction,
            Vec2::new(0.0, 0.0),
        )));
        state.network.add_feature(Feature::Node(NodeFeature::new(
            "J-2".into(),
            NodeType::Junction,
            Vec2::new(20.0, 0.0),
        )));
        set_editor_mode(&mut state, EditorMode::Draw);
        state
    }

    #[test]
    fn klick_kette_erzeugt_rohr_mit_adjazenz() {
        let mut state = draw_state_with_junctions();
        click(&mut state, Vec2::new(0.5, 0.0)); // snap auf J-1
        click(&mut state, Vec2::new(10.0, 5.0));
        click(&mut state, Vec2::new(19.5, 0.0)); // snap auf J-2

        assert_eq!(state.network.link_count(), 1);
        let pipe = state.network.links_iter().next().unwrap();
        assert_eq!(pipe.start_node, "J-1");
        assert_eq!(pipe.end_node, "J-2");
        assert_eq!(pipe.geometry.vertices().len(), 3);
        assert!(state.network.node("J-1").unwrap().connected_links.contains(&pipe.id));
        assert!(state.network.node("J-2").unwrap().connected_links.contains(&pipe.id));
    }

    #[test]
    fn hover_erzeugt_nur_transiente_features() {
        let mut state = draw_state_with_junctions();
        click(&mut state, Vec2::new(0.0, 0.0));
        click(&mut state, Vec2::new(5.0, 0.0));
        hover(&mut state, Vec2::new(8.0, 2.0));

        assert_eq!(state.network.link_count(), 0, "Vorschau zählt nicht als Link");
        assert!(state
            .network
            .links_iter()
            .any(|l| l.role == FeatureRole::Preview));

        cancel(&mut state);
        assert!(state.network.links_iter().next().is_none());
        assert_eq!(state.network.node_count(), 2);
    }

    #[test]
    fn break_erzeugt_zwischenknoten_und_setzt_kette_fort() {
        let mut state = draw_state_with_junctions();
        click(&mut state, Vec2::new(0.0, 0.0));
        click(&mut state, Vec2::new(5.0, 3.0));
        break_chain(&mut state);

        assert_eq!(state.network.link_count(), 1);
        assert_eq!(state.network.node_count(), 3);
        // Kette ist am frischen Knoten neu verankert
        assert!(state.chain.start_node().is_some());
        assert_ne!(state.chain.start_node().unwrap().as_str(), "J-1");
    }
}
