//! Gemeinsame Helfer für die Integrationstests: Netz-Builder und
//! Invarianten-Checks.

use glam::Vec2;
use waternet_editor::core::{
    ConnectionUpdate, Feature, LinkFeature, LinkGeometry, NetworkStore, NodeFeature, NodeType,
};
use waternet_editor::AppState;

/// Erstellt einen AppState mit zwei Junctions (J-1 bei x=0, J-2 bei x=20)
/// und einem geraden Rohr P-1 dazwischen.
pub fn state_with_single_pipe() -> AppState {
    let mut state = AppState::new();
    add_junction(&mut state.network, "J-1", Vec2::new(0.0, 0.0));
    add_junction(&mut state.network, "J-2", Vec2::new(20.0, 0.0));
    add_pipe(
        &mut state.network,
        "P-1",
        vec![Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0)],
        "J-1",
        "J-2",
    );
    state
}

pub fn add_junction(network: &mut NetworkStore, id: &str, position: Vec2) {
    network.add_feature(Feature::Node(NodeFeature::new(
        id.to_string(),
        NodeType::Junction,
        position,
    )));
}

pub fn add_pipe(
    network: &mut NetworkStore,
    id: &str,
    vertices: Vec<Vec2>,
    start: &str,
    end: &str,
) {
    network.add_feature(Feature::Link(LinkFeature::new_pipe(
        id.to_string(),
        vertices,
        start.to_string(),
        end.to_string(),
    )));
    network.update_node_connections(start, id, ConnectionUpdate::Add);
    network.update_node_connections(end, id, ConnectionUpdate::Add);
}

/// Prüft die Kern-Invarianten des Netz-Speichers:
/// 1. alle Ids eindeutig
/// 2. Adjazenz bidirektional (Knoten ↔ Link kennen einander)
/// 3. Rohr-Endstützpunkte liegen exakt auf ihren Knoten
pub fn assert_invariants(network: &NetworkStore) {
    let snapshot = network.snapshot();
    let mut ids: Vec<&str> = snapshot.iter().map(|f| f.id().as_str()).collect();
    let before = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), before, "Feature-Ids müssen eindeutig sein");

    for link in network.links_iter().filter(|l| !l.role.is_transient()) {
        let start = network
            .node(&link.start_node)
            .unwrap_or_else(|| panic!("Link {} hängt: Startknoten {} fehlt", link.id, link.start_node));
        let end = network
            .node(&link.end_node)
            .unwrap_or_else(|| panic!("Link {} hängt: Endknoten {} fehlt", link.id, link.end_node));
        assert!(
            start.connected_links.contains(&link.id),
            "Adjazenz von {} kennt {} nicht",
            start.id,
            link.id
        );
        assert!(
            end.connected_links.contains(&link.id),
            "Adjazenz von {} kennt {} nicht",
            end.id,
            link.id
        );

        if let LinkGeometry::Polyline(vertices) = &link.geometry {
            assert_eq!(
                vertices.first().copied(),
                Some(start.position),
                "Rohr {} beginnt nicht am Knoten {}",
                link.id,
                start.id
            );
            assert_eq!(
                vertices.last().copied(),
                Some(end.position),
                "Rohr {} endet nicht am Knoten {}",
                link.id,
                end.id
            );
        }
    }

    for node in network.nodes_iter().filter(|n| !n.role.is_transient()) {
        for link_id in &node.connected_links {
            let link = network
                .link(link_id)
                .unwrap_or_else(|| panic!("Knoten {} referenziert toten Link {}", node.id, link_id));
            assert!(
                link.start_node == node.id || link.end_node == node.id,
                "Link {} kennt Knoten {} nicht zurück",
                link.id,
                node.id
            );
        }
    }
}
