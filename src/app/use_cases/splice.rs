//! Spleiß-Operationen: Knoten, Pumpen und Ventile in bestehende Rohre
//! einfügen.
//!
//! Ein Spleiß ersetzt das getroffene Rohr immer atomar durch zwei neue
//! Rohre; das Original verschwindet aus dem Speicher, die Adjazenz aller
//! beteiligten Knoten wird im selben Schritt nachgeführt. Schlägt die
//! Projektion oder die Geometrie-Teilung fehl, bleibt das Rohr unberührt.

use glam::Vec2;
use indexmap::IndexSet;

use crate::app::AppState;
use crate::core::{
    segment_direction, split_polyline, ConnectionUpdate, Feature, FeatureId, LinkFeature,
    LinkType, NetworkStore, NodeFeature, NodeType,
};
use crate::shared::EditorOptions;

/// Ergebnis eines Knoten-Spleißes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpliceOutcome {
    /// Das Rohr wurde am neuen Knoten in zwei Rohre geteilt.
    Split {
        node_id: FeatureId,
        pipes: [FeatureId; 2],
    },
    /// Kein teilbarer Treffer: der Knoten wurde freistehend angelegt.
    Standalone { node_id: FeatureId },
}

/// Ergebnis eines Punkt-Link-Spleißes (Pumpe oder Ventil).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSplice {
    pub link_id: FeatureId,
    pub junctions: [FeatureId; 2],
    pub pipes: [FeatureId; 2],
    pub visual_line: FeatureId,
}

/// Controller-Einstieg: Knoten an der Klickposition einfügen. Liegt kein
/// Rohr in Trefferweite, entsteht ein freistehender Knoten.
pub fn insert_node_at(state: &mut AppState, world_pos: Vec2, node_type: NodeType) {
    let exclude = IndexSet::new();
    let hit = state
        .network
        .nearest_pipe_hit(world_pos, state.options.pipe_hit_tolerance, &exclude);

    let outcome = match hit {
        Some(hit) => insert_node_on_pipe(
            &mut state.network,
            &state.options,
            &hit.link_id.clone(),
            world_pos,
            node_type,
        ),
        None => Some(standalone_node(&mut state.network, world_pos, node_type)),
    };

    match outcome {
        Some(SpliceOutcome::Split { node_id, pipes }) => {
            state.set_status(format!(
                "Knoten {node_id} eingefügt, Rohr geteilt in {} und {}",
                pipes[0], pipes[1]
            ));
        }
        Some(SpliceOutcome::Standalone { node_id }) => {
            state.set_status(format!("Freistehender Knoten {node_id} angelegt"));
        }
        None => {
            state.set_status("Einfügen fehlgeschlagen: Rohr nicht gefunden");
        }
    }
}

/// Controller-Einstieg: Pumpe oder Ventil an der Klickposition einfügen.
/// Ohne Rohrtreffer passiert nichts (Punkt-Links brauchen ein Trägerrohr).
pub fn insert_link_at(state: &mut AppState, world_pos: Vec2, link_type: LinkType) {
    let exclude = IndexSet::new();
    let Some(hit) = state
        .network
        .nearest_pipe_hit(world_pos, state.options.pipe_hit_tolerance, &exclude)
    else {
        state.set_status("Kein Rohr in Trefferweite");
        return;
    };

    let pipe_id = hit.link_id.clone();
    match insert_link_on_pipe(&mut state.network, &state.options, &pipe_id, world_pos, link_type) {
        Some(splice) => {
            state.set_status(format!(
                "{:?} {} in Rohr {pipe_id} eingefügt",
                link_type, splice.link_id
            ));
        }
        None => {
            state.set_status("Einfügen fehlgeschlagen: zu nah am Rohrende");
        }
    }
}

/// Fügt einen neuen Knoten auf dem angegebenen Rohr ein und teilt es dort.
///
/// Fällt auf einen freistehenden Knoten an `coordinate` zurück, wenn die
/// Projektion kein teilbares Segment liefert. Gibt `None` zurück, wenn
/// `pipe_id` kein logisches Rohr bezeichnet.
pub fn insert_node_on_pipe(
    network: &mut NetworkStore,
    options: &EditorOptions,
    pipe_id: &str,
    coordinate: Vec2,
    node_type: NodeType,
) -> Option<SpliceOutcome> {
    let pipe = network.link(pipe_id)?;
    if pipe.link_type != LinkType::Pipe {
        log::warn!("Spleiß abgelehnt: {pipe_id} ist kein Rohr");
        return None;
    }
    let vertices = pipe.geometry.vertices().to_vec();

    let Some(projection) = crate::core::project_onto_polyline(coordinate, &vertices) else {
        log::debug!("Projektion auf {pipe_id} fehlgeschlagen, lege freistehenden Knoten an");
        return Some(standalone_node(network, coordinate, node_type));
    };
    let Some((first, second)) =
        split_polyline(&vertices, &projection, options.vertex_merge_tolerance)
    else {
        log::debug!("Teilung von {pipe_id} nicht möglich, lege freistehenden Knoten an");
        return Some(standalone_node(network, coordinate, node_type));
    };

    let node_id = network.generate_unique_id(node_type.prefix());
    network.add_feature(Feature::Node(NodeFeature::new(
        node_id.clone(),
        node_type,
        projection.point,
    )));

    let pipes = split_pipe_with_node(network, pipe_id, &node_id, first, second)?;
    log::info!(
        "Knoten {node_id} in {pipe_id} gespleißt, neue Rohre {} / {}",
        pipes[0],
        pipes[1]
    );
    Some(SpliceOutcome::Split { node_id, pipes })
}

/// Spleißt einen bereits existierenden Knoten in das angegebene Rohr ein
/// (z.B. nach dem Ablegen eines gezogenen Knotens auf einem Rohr).
///
/// Der Knoten wird auf den projizierten Punkt gezogen, seine bestehenden
/// Verbindungen werden geometrisch nachgeführt, dann wird geteilt.
pub fn insert_existing_node_on_pipe(
    network: &mut NetworkStore,
    options: &EditorOptions,
    pipe_id: &str,
    node_id: &str,
) -> Option<[FeatureId; 2]> {
    let pipe = network.link(pipe_id)?;
    if pipe.link_type != LinkType::Pipe {
        return None;
    }
    let vertices = pipe.geometry.vertices().to_vec();
    let position = network.node(node_id)?.position;

    let projection = crate::core::project_onto_polyline(position, &vertices)?;
    let (first, second) = split_polyline(&vertices, &projection, options.vertex_merge_tolerance)?;

    // Knoten exakt auf das Rohr ziehen und seine Rohre mitnehmen
    network.node_mut(node_id)?.position = projection.point;
    super::modify::propagate_node_geometry(network, node_id);
    network.rebuild_spatial_index();

    split_pipe_with_node(network, pipe_id, node_id, first, second)
}

/// Fügt eine Pumpe oder ein Ventil auf dem angegebenen Rohr ein.
///
/// Es entstehen zwei frische Junctions beidseits des Einfügepunkts, das
/// Punkt-Symbol dazwischen und eine visuelle Verbindungslinie. Das
/// getroffene Rohr wird durch zwei Rohre ersetzt, die an den Junctions
/// enden.
pub fn insert_link_on_pipe(
    network: &mut NetworkStore,
    options: &EditorOptions,
    pipe_id: &str,
    coordinate: Vec2,
    link_type: LinkType,
) -> Option<LinkSplice> {
    if !link_type.is_point_link() {
        log::warn!("Punkt-Spleiß abgelehnt: {:?} ist kein Punkt-Link", link_type);
        return None;
    }
    let pipe = network.link(pipe_id)?;
    if pipe.link_type != LinkType::Pipe {
        return None;
    }
    let old_start = pipe.start_node.clone();
    let old_end = pipe.end_node.clone();
    let properties = pipe.properties.clone();
    let vertices = pipe.geometry.vertices().to_vec();

    let projection = crate::core::project_onto_polyline(coordinate, &vertices)?;
    let direction = segment_direction(&vertices, projection.segment)?;
    let (mut first, mut second) =
        split_polyline(&vertices, &projection, options.vertex_merge_tolerance)?;

    let half = options.link_half_length;
    let j1_pos = projection.point - direction * half;
    let j2_pos = projection.point + direction * half;

    // Die geteilten Polylinien enden an den flankierenden Junctions,
    // nicht am Einfügepunkt selbst.
    if let Some(last) = first.last_mut() {
        *last = j1_pos;
    }
    if let Some(head) = second.first_mut() {
        *head = j2_pos;
    }

    let j1 = network.generate_unique_id(NodeType::Junction.prefix());
    network.add_feature(Feature::Node(NodeFeature::new(
        j1.clone(),
        NodeType::Junction,
        j1_pos,
    )));
    let j2 = network.generate_unique_id(NodeType::Junction.prefix());
    network.add_feature(Feature::Node(NodeFeature::new(
        j2.clone(),
        NodeType::Junction,
        j2_pos,
    )));

    // Punkt-Link samt visueller Linie zwischen den Junctions
    let link_id = network.generate_unique_id(link_type.prefix());
    let visual_id = network.generate_unique_id("VL");
    let mut link = LinkFeature::new_point_link(
        link_id.clone(),
        link_type,
        projection.point,
        j1.clone(),
        j2.clone(),
    );
    link.visual_line = Some(visual_id.clone());
    network.add_feature(Feature::Link(link));
    network.add_feature(Feature::Link(LinkFeature::visual_line(
        visual_id.clone(),
        vec![j1_pos, j2_pos],
        j1.clone(),
        j2.clone(),
    )));
    network.update_node_connections(&j1, &link_id, ConnectionUpdate::Add);
    network.update_node_connections(&j2, &link_id, ConnectionUpdate::Add);

    // Altes Rohr durch zwei Teilrohre ersetzen
    let p1 = network.generate_unique_id(LinkType::Pipe.prefix());
    let mut pipe1 = LinkFeature::new_pipe(p1.clone(), first, old_start.clone(), j1.clone());
    pipe1.properties = properties.clone();
    network.add_feature(Feature::Link(pipe1));

    let p2 = network.generate_unique_id(LinkType::Pipe.prefix());
    let mut pipe2 = LinkFeature::new_pipe(p2.clone(), second, j2.clone(), old_end.clone());
    pipe2.properties = properties;
    network.add_feature(Feature::Link(pipe2));

    network.remove_feature(pipe_id);
    network.update_node_connections(&old_start, pipe_id, ConnectionUpdate::Remove);
    network.update_node_connections(&old_end, pipe_id, ConnectionUpdate::Remove);
    network.update_node_connections(&old_start, &p1, ConnectionUpdate::Add);
    network.update_node_connections(&j1, &p1, ConnectionUpdate::Add);
    network.update_node_connections(&j2, &p2, ConnectionUpdate::Add);
    network.update_node_connections(&old_end, &p2, ConnectionUpdate::Add);

    log::info!(
        "{:?} {link_id} in {pipe_id} gespleißt (Junctions {j1}/{j2}, Rohre {p1}/{p2})",
        link_type
    );
    Some(LinkSplice {
        link_id,
        junctions: [j1, j2],
        pipes: [p1, p2],
        visual_line: visual_id,
    })
}

fn standalone_node(
    network: &mut NetworkStore,
    coordinate: Vec2,
    node_type: NodeType,
) -> SpliceOutcome {
    let node_id = network.generate_unique_id(node_type.prefix());
    network.add_feature(Feature::Node(NodeFeature::new(
        node_id.clone(),
        node_type,
        coordinate,
    )));
    SpliceOutcome::Standalone { node_id }
}

/// Ersetzt ein Rohr durch zwei Teilrohre, die am angegebenen Knoten enden.
/// Eigenschaften des Originals werden auf beide Teilrohre kopiert, die
/// Adjazenz aller drei Knoten wird nachgeführt.
fn split_pipe_with_node(
    network: &mut NetworkStore,
    pipe_id: &str,
    node_id: &str,
    first: Vec<Vec2>,
    second: Vec<Vec2>,
) -> Option<[FeatureId; 2]> {
    let pipe = network.link(pipe_id)?;
    let old_start = pipe.start_node.clone();
    let old_end = pipe.end_node.clone();
    let properties = pipe.properties.clone();

    let p1 = network.generate_unique_id(LinkType::Pipe.prefix());
    let mut pipe1 = LinkFeature::new_pipe(p1.clone(), first, old_start.clone(), node_id.to_string());
    pipe1.properties = properties.clone();
    network.add_feature(Feature::Link(pipe1));

    let p2 = network.generate_unique_id(LinkType::Pipe.prefix());
    let mut pipe2 = LinkFeature::new_pipe(p2.clone(), second, node_id.to_string(), old_end.clone());
    pipe2.properties = properties;
    network.add_feature(Feature::Link(pipe2));

    network.remove_feature(pipe_id);
    network.update_node_connections(&old_start, pipe_id, ConnectionUpdate::Remove);
    network.update_node_connections(&old_end, pipe_id, ConnectionUpdate::Remove);
    network.update_node_connections(&old_start, &p1, ConnectionUpdate::Add);
    network.update_node_connections(node_id, &p1, ConnectionUpdate::Add);
    network.update_node_connections(node_id, &p2, ConnectionUpdate::Add);
    network.update_node_connections(&old_end, &p2, ConnectionUpdate::Add);

    Some([p1, p2])
}
