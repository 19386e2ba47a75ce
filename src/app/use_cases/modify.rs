//! Modifikations-Operationen: Knoten ziehen und Rohr-Stützpunkte umformen.
//!
//! Beim Ziehen eines Knotens wandern alle angeschlossenen Rohrenden,
//! Punkt-Symbole und visuellen Linien live mit. Nach dem Ablegen auf einem
//! fremden Rohr wird der Knoten dort automatisch eingespleißt.

use glam::Vec2;

use crate::app::AppState;
use crate::core::{FeatureId, LinkType, NetworkStore};

/// Startet das Ziehen des nächstgelegenen Knotens im Fangradius.
pub fn begin_node_drag(state: &mut AppState, world_pos: Vec2) {
    state.clear_status();
    let Some(hit) = state.network.nearest_node(world_pos) else {
        return;
    };
    if hit.distance > state.options.snap_radius {
        log::debug!("Kein Knoten im Fangradius ({:.2} > {:.2})", hit.distance, state.options.snap_radius);
        return;
    }
    log::debug!("Ziehe Knoten {}", hit.node_id);
    state.drag.active_node = Some(hit.node_id);
}

/// Führt den gezogenen Knoten samt angeschlossener Geometrie nach.
pub fn move_node_drag(state: &mut AppState, world_pos: Vec2) {
    let Some(node_id) = state.drag.active_node.clone() else {
        return;
    };
    let Some(node) = state.network.node_mut(&node_id) else {
        state.drag.active_node = None;
        return;
    };
    node.position = world_pos;
    propagate_node_geometry(&mut state.network, &node_id);
    state.network.rebuild_spatial_index();
}

/// Beendet das Ziehen. Liegt der Knoten jetzt auf einem fremden Rohr,
/// wird er dort eingespleißt (sofern aktiviert).
pub fn end_node_drag(state: &mut AppState, world_pos: Vec2) {
    let Some(node_id) = state.drag.active_node.take() else {
        return;
    };
    if let Some(node) = state.network.node_mut(&node_id) {
        node.position = world_pos;
    }
    propagate_node_geometry(&mut state.network, &node_id);
    state.network.rebuild_spatial_index();

    if !state.options.auto_split_on_drop {
        return;
    }
    let Some(node) = state.network.node(&node_id) else {
        return;
    };
    let exclude = node.connected_links.clone();
    let Some(hit) =
        state
            .network
            .nearest_pipe_hit(world_pos, state.options.pipe_hit_tolerance, &exclude)
    else {
        return;
    };
    let pipe_id = hit.link_id.clone();
    match super::splice::insert_existing_node_on_pipe(
        &mut state.network,
        &state.options,
        &pipe_id,
        &node_id,
    ) {
        Some(pipes) => {
            state.set_status(format!(
                "Knoten {node_id} auf Rohr {pipe_id} abgelegt, geteilt in {} und {}",
                pipes[0], pipes[1]
            ));
        }
        None => {
            log::debug!("Auto-Spleiß von {node_id} auf {pipe_id} nicht möglich");
        }
    }
}

/// Verschiebt einen inneren Stützpunkt eines Rohrs. Endpunkte sind tabu,
/// sie folgen ausschließlich ihren Knoten.
pub fn reshape_pipe_vertex(
    state: &mut AppState,
    pipe_id: &str,
    vertex_index: usize,
    world_pos: Vec2,
) {
    let Some(link) = state.network.link_mut(pipe_id) else {
        state.set_status(format!("Rohr {pipe_id} nicht gefunden"));
        return;
    };
    if link.link_type != LinkType::Pipe {
        state.set_status(format!("{pipe_id} ist kein Rohr"));
        return;
    }
    let crate::core::LinkGeometry::Polyline(vertices) = &mut link.geometry else {
        return;
    };
    if vertex_index == 0 || vertex_index + 1 >= vertices.len() {
        state.set_status("Rohrenden folgen ihren Knoten und sind nicht direkt verschiebbar");
        return;
    }
    vertices[vertex_index] = world_pos;
    link.recompute_length();
    log::debug!("Stützpunkt {vertex_index} von {pipe_id} verschoben");
}

/// Führt die Geometrie aller an einen Knoten angeschlossenen Links nach:
/// Rohrenden, Punkt-Symbole und visuelle Linien.
pub(crate) fn propagate_node_geometry(network: &mut NetworkStore, node_id: &str) {
    let Some(node) = network.node(node_id) else {
        return;
    };
    let position = node.position;
    let link_ids: Vec<FeatureId> = node.connected_links.iter().cloned().collect();

    for link_id in link_ids {
        let Some(link) = network.link(&link_id) else {
            continue;
        };
        match link.link_type {
            LinkType::Pipe => {
                let at_start = link.start_node == node_id;
                let at_end = link.end_node == node_id;
                let Some(link) = network.link_mut(&link_id) else {
                    continue;
                };
                if let crate::core::LinkGeometry::Polyline(vertices) = &mut link.geometry {
                    if at_start {
                        if let Some(head) = vertices.first_mut() {
                            *head = position;
                        }
                    }
                    if at_end {
                        if let Some(tail) = vertices.last_mut() {
                            *tail = position;
                        }
                    }
                }
                link.recompute_length();
            }
            LinkType::Pump | LinkType::Valve => {
                sync_point_link(network, &link_id, node_id, position);
            }
        }
    }
}

/// Zieht Symbol und visuelle Linie eines Punkt-Links nach, wenn eine seiner
/// Junctions verschoben wurde.
fn sync_point_link(network: &mut NetworkStore, link_id: &str, moved_node: &str, position: Vec2) {
    let Some(link) = network.link(link_id) else {
        return;
    };
    let other_id = if link.start_node == moved_node {
        link.end_node.clone()
    } else {
        link.start_node.clone()
    };
    let at_start = link.start_node == moved_node;
    let visual_id = link.visual_line.clone();

    let Some(other) = network.node(&other_id) else {
        return;
    };
    let midpoint = (position + other.position) / 2.0;

    if let Some(link) = network.link_mut(link_id) {
        link.geometry = crate::core::LinkGeometry::Point(midpoint);
    }
    let Some(visual_id) = visual_id else {
        return;
    };
    let Some(visual) = network.link_mut(&visual_id) else {
        return;
    };
    if let crate::core::LinkGeometry::Polyline(vertices) = &mut visual.geometry {
        if at_start {
            if let Some(head) = vertices.first_mut() {
                *head = position;
            }
        } else if let Some(tail) = vertices.last_mut() {
            *tail = position;
        }
    }
    visual.recompute_length();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::EditorMode;
    use crate::app::use_cases::set_editor_mode;
    use crate::core::{ConnectionUpdate, Feature, LinkFeature, NodeFeature, NodeType};
    use approx::assert_relative_eq;

    fn modify_state() -> AppState {
        let mut state = AppState::new();
        state.network.add_feature(Feature::Node(NodeFeature::new(
            "J-1".into(),
            NodeType::Junction,
            Vec2::new(0.0, 0.0),
        )));
        state.network.add_feature(Feature::Node(NodeFeature::new(
            "J-2".into(),
            NodeType::Junction,
            Vec2::new(10.0, 0.0),
        )));
        state.network.add_feature(Feature::Link(LinkFeature::new_pipe(
            "P-1".into(),
            vec![Vec2::new(0.0, 0.0), Vec2::new(5.0, 2.0), Vec2::new(10.0, 0.0)],
            "J-1".into(),
            "J-2".into(),
        )));
        state
            .network
            .update_node_connections("J-1", "P-1", ConnectionUpdate::Add);
        state
            .network
            .update_node_connections("J-2", "P-1", ConnectionUpdate::Add);
        set_editor_mode(&mut state, EditorMode::Modify);
        state
    }

    #[test]
    fn drag_zieht_rohrende_mit() {
        let mut state = modify_state();
        begin_node_drag(&mut state, Vec2::new(0.2, 0.1));
        assert_eq!(state.drag.active_node.as_deref(), Some("J-1"));

        move_node_drag(&mut state, Vec2::new(-3.0, 4.0));
        let pipe = state.network.link("P-1").unwrap();
        assert_eq!(pipe.geometry.vertices()[0], Vec2::new(-3.0, 4.0));

        end_node_drag(&mut state, Vec2::new(-3.0, 4.0));
        assert!(state.drag.active_node.is_none());
        assert_eq!(state.network.node("J-1").unwrap().position, Vec2::new(-3.0, 4.0));
    }

    #[test]
    fn drag_ausserhalb_fangradius_startet_nicht() {
        let mut state = modify_state();
        begin_node_drag(&mut state, Vec2::new(5.0, 8.0));
        assert!(state.drag.active_node.is_none());
    }

    #[test]
    fn ablegen_auf_fremdem_rohr_spleisst_automatisch() {
        let mut state = modify_state();
        state.network.add_feature(Feature::Node(NodeFeature::new(
            "T-1".into(),
            NodeType::Tank,
            Vec2::new(5.0, 10.0),
        )));

        begin_node_drag(&mut state, Vec2::new(5.0, 10.0));
        assert_eq!(state.drag.active_node.as_deref(), Some("T-1"));
        end_node_drag(&mut state, Vec2::new(5.0, 2.3));

        // Rohr P-1 wurde am Tank geteilt
        assert!(state.network.link("P-1").is_none());
        assert_eq!(state.network.link_count(), 2);
        let tank = state.network.node("T-1").unwrap();
        assert_eq!(tank.connected_links.len(), 2);
        assert_relative_eq!(tank.position.y, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn reshape_verschiebt_nur_innere_stuetzpunkte() {
        let mut state = modify_state();
        let before = state.network.link("P-1").unwrap().length;

        reshape_pipe_vertex(&mut state, "P-1", 1, Vec2::new(5.0, 6.0));
        let pipe = state.network.link("P-1").unwrap();
        assert_eq!(pipe.geometry.vertices()[1], Vec2::new(5.0, 6.0));
        assert!(pipe.length > before);

        // Endpunkte bleiben unangetastet
        reshape_pipe_vertex(&mut state, "P-1", 0, Vec2::new(99.0, 99.0));
        let pipe = state.network.link("P-1").unwrap();
        assert_eq!(pipe.geometry.vertices()[0], Vec2::new(0.0, 0.0));
        assert_eq!(pipe.start_node, "J-1");
    }
}
