//! Lösch-Operationen mit Kaskade.
//!
//! Das Löschen eines Knotens reißt alle angeschlossenen Links mit, samt
//! ihrer visuellen Linien; die Adjazenz der verbleibenden Gegenknoten wird
//! vor dem Entfernen bereinigt, damit nie baumelnde Referenzen entstehen.

use crate::app::AppState;
use crate::core::{ConnectionUpdate, FeatureId, NetworkStore};

/// Löscht einen Knoten und alle an ihm hängenden Links.
pub fn delete_node(state: &mut AppState, node_id: &str) {
    let Some(node) = state.network.node(node_id) else {
        state.set_status(format!("Knoten {node_id} nicht gefunden"));
        return;
    };
    let link_ids: Vec<FeatureId> = node.connected_links.iter().cloned().collect();

    for link_id in &link_ids {
        remove_link_cascade(&mut state.network, link_id);
    }
    state.network.remove_feature(node_id);
    state.network.rebuild_spatial_index();

    log::info!("Knoten {node_id} gelöscht ({} Links entfernt)", link_ids.len());
    state.set_status(format!(
        "Knoten {node_id} und {} Links gelöscht",
        link_ids.len()
    ));
}

/// Löscht einen einzelnen Link. Seine Endknoten bleiben bestehen, auch
/// wenn sie dadurch verwaist sind (dafür meldet sich der Validator).
pub fn delete_link(state: &mut AppState, link_id: &str) {
    if state.network.link(link_id).is_none() {
        state.set_status(format!("Link {link_id} nicht gefunden"));
        return;
    }
    remove_link_cascade(&mut state.network, link_id);
    log::info!("Link {link_id} gelöscht");
    state.set_status(format!("Link {link_id} gelöscht"));
}

/// Entfernt einen Link samt visueller Linie und bereinigt die Adjazenz
/// beider Endknoten.
fn remove_link_cascade(network: &mut NetworkStore, link_id: &str) {
    let Some(link) = network.link(link_id) else {
        return;
    };
    let start = link.start_node.clone();
    let end = link.end_node.clone();
    let visual = link.visual_line.clone();

    network.update_node_connections(&start, link_id, ConnectionUpdate::Remove);
    network.update_node_connections(&end, link_id, ConnectionUpdate::Remove);
    if let Some(visual_id) = visual {
        network.remove_feature(&visual_id);
    }
    network.remove_feature(link_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Feature, LinkFeature, LinkType, NodeFeature, NodeType};
    use glam::Vec2;

    fn state_with_pump() -> AppState {
        let mut state = AppState::new();
        for (id, x) in [("J-1", 0.0_f32), ("J-2", 2.0), ("J-3", 10.0)] {
            state.network.add_feature(Feature::Node(NodeFeature::new(
                id.into(),
                NodeType::Junction,
                Vec2::new(x, 0.0),
            )));
        }
        let mut pump = LinkFeature::new_point_link(
            "PU-1".into(),
            LinkType::Pump,
            Vec2::new(1.0, 0.0),
            "J-1".into(),
            "J-2".into(),
        );
        pump.visual_line = Some("VL-1".into());
        state.network.add_feature(Feature::Link(pump));
        state.network.add_feature(Feature::Link(LinkFeature::visual_line(
            "VL-1".into(),
            vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0)],
            "J-1".into(),
            "J-2".into(),
        )));
        state.network.add_feature(Feature::Link(LinkFeature::new_pipe(
            "P-1".into(),
            vec![Vec2::new(2.0, 0.0), Vec2::new(10.0, 0.0)],
            "J-2".into(),
            "J-3".into(),
        )));
        state.network.update_node_connections("J-1", "PU-1", ConnectionUpdate::Add);
        state.network.update_node_connections("J-2", "PU-1", ConnectionUpdate::Add);
        state.network.update_node_connections("J-2", "P-1", ConnectionUpdate::Add);
        state.network.update_node_connections("J-3", "P-1", ConnectionUpdate::Add);
        state
    }

    #[test]
    fn knoten_loeschen_reisst_links_und_visuelle_linien_mit() {
        let mut state = state_with_pump();
        delete_node(&mut state, "J-2");

        assert!(state.network.node("J-2").is_none());
        assert!(state.network.link("PU-1").is_none());
        assert!(state.network.link("VL-1").is_none());
        assert!(state.network.link("P-1").is_none());

        // Gegenknoten bleiben, aber ohne baumelnde Referenzen
        assert!(state.network.node("J-1").unwrap().connected_links.is_empty());
        assert!(state.network.node("J-3").unwrap().connected_links.is_empty());
    }

    #[test]
    fn link_loeschen_laesst_endknoten_bestehen() {
        let mut state = state_with_pump();
        delete_link(&mut state, "PU-1");

        assert!(state.network.link("PU-1").is_none());
        assert!(state.network.link("VL-1").is_none());
        assert!(state.network.node("J-1").is_some());
        assert!(!state.network.node("J-1").unwrap().connected_links.contains("PU-1"));
        assert!(state.network.link("P-1").is_some());
    }
}
