//! Import und Export als einfache Feature-Datensätze (JSON).
//!
//! Der Import lädt Knoten vor Links, prüft Id-Eindeutigkeit und
//! Referenzen hart und richtet Rohrenden auf ihre Knoten aus. Transiente
//! Features werden nie exportiert.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::{
    ConnectionUpdate, Feature, FeatureId, LinkFeature, LinkType, NetworkStore, NodeFeature,
    NodeType, PropertyBag,
};
use crate::shared::SNAP_RADIUS;

/// Feature-Klasse im Datensatz-Format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureClass {
    Junction,
    Tank,
    Reservoir,
    Pipe,
    Pump,
    Valve,
}

impl FeatureClass {
    fn as_node_type(self) -> Option<NodeType> {
        match self {
            FeatureClass::Junction => Some(NodeType::Junction),
            FeatureClass::Tank => Some(NodeType::Tank),
            FeatureClass::Reservoir => Some(NodeType::Reservoir),
            _ => None,
        }
    }

    fn as_link_type(self) -> Option<LinkType> {
        match self {
            FeatureClass::Pipe => Some(LinkType::Pipe),
            FeatureClass::Pump => Some(LinkType::Pump),
            FeatureClass::Valve => Some(LinkType::Valve),
            _ => None,
        }
    }

    fn from_node_type(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Junction => FeatureClass::Junction,
            NodeType::Tank => FeatureClass::Tank,
            NodeType::Reservoir => FeatureClass::Reservoir,
        }
    }

    fn from_link_type(link_type: LinkType) -> Self {
        match link_type {
            LinkType::Pipe => FeatureClass::Pipe,
            LinkType::Pump => FeatureClass::Pump,
            LinkType::Valve => FeatureClass::Valve,
        }
    }
}

/// Ein Feature als flacher Datensatz, wie er in der Austauschdatei steht.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub id: FeatureId,
    #[serde(rename = "type")]
    pub class: FeatureClass,
    pub coordinates: Vec<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<FeatureId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_node: Option<FeatureId>,
    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,
}

/// Lädt Datensätze aus einer JSON-Datei.
pub fn load_records(path: &Path) -> Result<Vec<FeatureRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Datei {} nicht lesbar", path.display()))?;
    let records: Vec<FeatureRecord> = serde_json::from_str(&text)
        .with_context(|| format!("Datei {} ist kein gültiges Datensatz-JSON", path.display()))?;
    Ok(records)
}

/// Schreibt Datensätze als JSON-Datei.
pub fn save_records(path: &Path, records: &[FeatureRecord]) -> Result<()> {
    let text = serde_json::to_string_pretty(records).context("Serialisierung fehlgeschlagen")?;
    fs::write(path, text).with_context(|| format!("Datei {} nicht schreibbar", path.display()))?;
    Ok(())
}

/// Importiert Datensätze in den Speicher: erst alle Knoten, dann alle
/// Links. Jeder Defekt (doppelte Id, fehlende Referenz, kaputte
/// Geometrie) bricht den Import mit Fehler ab.
pub fn import_records(network: &mut NetworkStore, records: &[FeatureRecord]) -> Result<usize> {
    let mut imported = 0usize;

    for record in records {
        let Some(node_type) = record.class.as_node_type() else {
            continue;
        };
        if network.contains_id(&record.id) {
            bail!("Doppelte Id beim Import: {}", record.id);
        }
        let [x, y] = single_coordinate(record)?;
        let mut node = NodeFeature::new(record.id.clone(), node_type, Vec2::new(x, y));
        node.properties = record.properties.clone();
        network.add_feature(Feature::Node(node));
        imported += 1;
    }

    for record in records {
        let Some(link_type) = record.class.as_link_type() else {
            continue;
        };
        if network.contains_id(&record.id) {
            bail!("Doppelte Id beim Import: {}", record.id);
        }
        let start = required_node(network, record, record.start_node.as_deref())?;
        let end = required_node(network, record, record.end_node.as_deref())?;

        let link = if link_type == LinkType::Pipe {
            let mut vertices = polyline_coordinates(record)?;
            align_endpoint(&mut vertices, 0, network, &start, &record.id)?;
            let last = vertices.len() - 1;
            align_endpoint(&mut vertices, last, network, &end, &record.id)?;
            let mut pipe =
                LinkFeature::new_pipe(record.id.clone(), vertices, start.clone(), end.clone());
            pipe.properties = record.properties.clone();
            pipe
        } else {
            let [x, y] = single_coordinate(record)?;
            let visual_id = network.generate_unique_id("VL");
            let start_pos = node_position(network, &start)?;
            let end_pos = node_position(network, &end)?;
            network.add_feature(Feature::Link(LinkFeature::visual_line(
                visual_id.clone(),
                vec![start_pos, end_pos],
                start.clone(),
                end.clone(),
            )));
            let mut link = LinkFeature::new_point_link(
                record.id.clone(),
                link_type,
                Vec2::new(x, y),
                start.clone(),
                end.clone(),
            );
            link.visual_line = Some(visual_id);
            link.properties = record.properties.clone();
            link
        };

        network.add_feature(Feature::Link(link));
        network.update_node_connections(&start, &record.id, ConnectionUpdate::Add);
        network.update_node_connections(&end, &record.id, ConnectionUpdate::Add);
        imported += 1;
    }

    log::info!("{imported} Features importiert");
    Ok(imported)
}

/// Exportiert alle logischen Features, Knoten vor Links, sortiert nach Id.
/// Visuelle Linien und Vorschau-Features werden übersprungen.
pub fn export_records(network: &NetworkStore) -> Vec<FeatureRecord> {
    let mut nodes: Vec<FeatureRecord> = network
        .nodes_iter()
        .filter(|n| !n.role.is_transient())
        .map(|n| FeatureRecord {
            id: n.id.clone(),
            class: FeatureClass::from_node_type(n.node_type),
            coordinates: vec![[n.position.x, n.position.y]],
            start_node: None,
            end_node: None,
            properties: n.properties.clone(),
        })
        .collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    let mut links: Vec<FeatureRecord> = network
        .links_iter()
        .filter(|l| !l.role.is_transient())
        .map(|l| FeatureRecord {
            id: l.id.clone(),
            class: FeatureClass::from_link_type(l.link_type),
            coordinates: match l.geometry.symbol_position() {
                Some(symbol) => vec![[symbol.x, symbol.y]],
                None => l.geometry.vertices().iter().map(|v| [v.x, v.y]).collect(),
            },
            start_node: Some(l.start_node.clone()),
            end_node: Some(l.end_node.clone()),
            properties: l.properties.clone(),
        })
        .collect();
    links.sort_by(|a, b| a.id.cmp(&b.id));

    nodes.extend(links);
    nodes
}

fn single_coordinate(record: &FeatureRecord) -> Result<[f32; 2]> {
    let [coordinate] = record.coordinates.as_slice() else {
        bail!(
            "Feature {} braucht genau eine Koordinate, hat {}",
            record.id,
            record.coordinates.len()
        );
    };
    ensure_finite(record, *coordinate)?;
    Ok(*coordinate)
}

fn polyline_coordinates(record: &FeatureRecord) -> Result<Vec<Vec2>> {
    if record.coordinates.len() < 2 {
        bail!(
            "Rohr {} braucht mindestens zwei Koordinaten, hat {}",
            record.id,
            record.coordinates.len()
        );
    }
    record
        .coordinates
        .iter()
        .map(|&c| {
            ensure_finite(record, c)?;
            Ok(Vec2::new(c[0], c[1]))
        })
        .collect()
}

fn ensure_finite(record: &FeatureRecord, coordinate: [f32; 2]) -> Result<()> {
    if !coordinate[0].is_finite() || !coordinate[1].is_finite() {
        bail!("Feature {} hat nicht-endliche Koordinaten", record.id);
    }
    Ok(())
}

fn required_node(
    network: &NetworkStore,
    record: &FeatureRecord,
    node_id: Option<&str>,
) -> Result<FeatureId> {
    let Some(node_id) = node_id else {
        bail!("Link {} ohne Start-/Endknoten", record.id);
    };
    if network.node(node_id).is_none() {
        bail!("Link {} verweist auf unbekannten Knoten {node_id}", record.id);
    }
    Ok(node_id.to_string())
}

fn node_position(network: &NetworkStore, node_id: &str) -> Result<Vec2> {
    network
        .node(node_id)
        .map(|n| n.position)
        .with_context(|| format!("Knoten {node_id} nicht gefunden"))
}

/// Richtet ein Rohrende exakt auf seinen Knoten aus. Liegt das Ende weiter
/// als der Fangradius vom Knoten entfernt, ist der Datensatz defekt.
fn align_endpoint(
    vertices: &mut [Vec2],
    index: usize,
    network: &NetworkStore,
    node_id: &str,
    pipe_id: &str,
) -> Result<()> {
    let position = node_position(network, node_id)?;
    let distance = vertices[index].distance(position);
    if distance > SNAP_RADIUS {
        bail!(
            "Rohr {pipe_id}: Endpunkt liegt {distance:.2} vom Knoten {node_id} entfernt"
        );
    }
    if distance > crate::shared::COORD_EPSILON {
        log::debug!("Rohr {pipe_id}: Endpunkt auf Knoten {node_id} ausgerichtet ({distance:.3})");
    }
    vertices[index] = position;
    Ok(())
}
