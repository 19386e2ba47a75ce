//! Topologie-Validator: reiner Batch-Pass über einen Store-Snapshot.
//!
//! Meldet Struktur-Fehler (blockieren die Simulation) und Warnungen
//! (informativ, Editieren läuft weiter). Repariert nie automatisch.

use std::collections::{HashMap, HashSet, VecDeque};

use glam::Vec2;

use super::geometry::segment_intersection;
use super::{Feature, FeatureId, LinkFeature, LinkGeometry, LinkType, NetworkStore, NodeFeature};
use crate::shared::options::CROSSING_NODE_TOLERANCE;

/// Kategorie eines Validierungs-Befunds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// ID mehrfach vergeben (Fehler)
    DuplicateId,
    /// Link-Endpunkt nicht auflösbar (Fehler)
    DanglingLink,
    /// Nicht-finite Koordinaten oder fehlgeformte Geometrie (Fehler)
    InvalidGeometry,
    /// Pflicht-Eigenschaft fehlt (Fehler)
    MissingRequiredProperty,
    /// Knoten ohne Verbindungen (Warnung)
    OrphanNode,
    /// Mehr als eine Zusammenhangskomponente (Warnung)
    DisconnectedComponents,
    /// Rohr-Kreuzung ohne Knoten (Warnung)
    UnjunctionedCrossing,
    /// Optionale Eigenschaft fehlt (Warnung)
    MissingOptionalProperty,
}

/// Einzelner Befund: Meldung plus betroffene Feature-IDs.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Kategorie des Befunds
    pub kind: IssueKind,
    /// Menschenlesbare Meldung
    pub message: String,
    /// Betroffene Feature-IDs
    pub feature_ids: Vec<FeatureId>,
}

impl ValidationIssue {
    fn new(kind: IssueKind, message: impl Into<String>, feature_ids: Vec<FeatureId>) -> Self {
        Self {
            kind,
            message: message.into(),
            feature_ids,
        }
    }

    /// Betroffene IDs als kommaseparierte Liste (Report-Format).
    pub fn joined_ids(&self) -> String {
        self.feature_ids.join(",")
    }
}

/// Ergebnis eines Validator-Laufs.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Struktur-Fehler (blockieren die weitere Nutzung)
    pub errors: Vec<ValidationIssue>,
    /// Warnungen (informativ)
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// `true` wenn keine Fehler vorliegen (Warnungen zählen nicht).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Kennzahlen-Sicht über dieselbe Graph-Traversierung.
#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    /// Anzahl logischer Knoten
    pub node_count: usize,
    /// Anzahl logischer Rohre
    pub pipe_count: usize,
    /// Anzahl logischer Links gesamt
    pub link_count: usize,
    /// Anzahl Zusammenhangskomponenten
    pub component_count: usize,
    /// Kanten-Dichte: links / (nodes * (nodes - 1) / 2)
    pub density: f32,
    /// Durchschnittlicher Knotengrad
    pub average_degree: f32,
}

/// Validiert einen Store (bequemer Einstieg über `snapshot()`).
pub fn validate_network(store: &NetworkStore) -> ValidationReport {
    validate_features(&store.snapshot())
}

/// Validiert einen Feature-Snapshot.
///
/// Reine Funktion: liest nur, mutiert nichts, repariert nichts.
/// Transiente Pseudo-Features werden über das gemeinsame Prädikat
/// komplett ignoriert.
pub fn validate_features(features: &[Feature]) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_duplicate_ids(features, &mut report);

    let logical: Vec<&Feature> = features.iter().filter(|f| !f.role().is_transient()).collect();
    let nodes: Vec<&NodeFeature> = logical
        .iter()
        .filter_map(|f| match f {
            Feature::Node(n) => Some(n),
            Feature::Link(_) => None,
        })
        .collect();
    let links: Vec<&LinkFeature> = logical
        .iter()
        .filter_map(|f| match f {
            Feature::Link(l) => Some(l),
            Feature::Node(_) => None,
        })
        .collect();

    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    check_dangling_links(&links, &node_ids, &mut report);
    check_geometry(&nodes, &links, &mut report);
    check_properties(&nodes, &links, &mut report);
    check_orphans(&nodes, &mut report);
    check_components(&nodes, &links, &node_ids, &mut report);
    check_crossings(&nodes, &links, &mut report);

    report
}

/// Berechnet Netz-Kennzahlen über dieselbe Traversierung wie der Validator.
pub fn network_stats(features: &[Feature]) -> NetworkStats {
    let logical: Vec<&Feature> = features.iter().filter(|f| !f.role().is_transient()).collect();
    let nodes: Vec<&NodeFeature> = logical
        .iter()
        .filter_map(|f| match f {
            Feature::Node(n) => Some(n),
            Feature::Link(_) => None,
        })
        .collect();
    let links: Vec<&LinkFeature> = logical
        .iter()
        .filter_map(|f| match f {
            Feature::Link(l) => Some(l),
            Feature::Node(_) => None,
        })
        .collect();
    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let node_count = nodes.len();
    let link_count = links.len();
    let pipe_count = links.iter().filter(|l| l.link_type == LinkType::Pipe).count();
    let component_count = count_components(&nodes, &links, &node_ids).len();

    let density = if node_count > 1 {
        link_count as f32 / (node_count as f32 * (node_count as f32 - 1.0) / 2.0)
    } else {
        0.0
    };
    let average_degree = if node_count > 0 {
        2.0 * link_count as f32 / node_count as f32
    } else {
        0.0
    };

    NetworkStats {
        node_count,
        pipe_count,
        link_count,
        component_count,
        density,
        average_degree,
    }
}

// ── Einzel-Checks ───────────────────────────────────────────────────

fn check_duplicate_ids(features: &[Feature], report: &mut ValidationReport) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for feature in features {
        *counts.entry(feature.id().as_str()).or_default() += 1;
    }

    let mut duplicated: Vec<&str> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect();
    duplicated.sort_unstable();

    for id in duplicated {
        report.errors.push(ValidationIssue::new(
            IssueKind::DuplicateId,
            format!("Feature-ID {} ist mehrfach vergeben", id),
            vec![id.to_string()],
        ));
    }
}

fn check_dangling_links(
    links: &[&LinkFeature],
    node_ids: &HashSet<&str>,
    report: &mut ValidationReport,
) {
    for link in links {
        let mut missing: Vec<&str> = Vec::new();
        if !node_ids.contains(link.start_node.as_str()) {
            missing.push(link.start_node.as_str());
        }
        if !node_ids.contains(link.end_node.as_str()) {
            missing.push(link.end_node.as_str());
        }
        if !missing.is_empty() {
            report.errors.push(ValidationIssue::new(
                IssueKind::DanglingLink,
                format!(
                    "Link {} referenziert fehlende Knoten: {}",
                    link.id,
                    missing.join(",")
                ),
                vec![link.id.clone()],
            ));
        }
    }
}

fn check_geometry(
    nodes: &[&NodeFeature],
    links: &[&LinkFeature],
    report: &mut ValidationReport,
) {
    for node in nodes {
        if !node.position.is_finite() {
            report.errors.push(ValidationIssue::new(
                IssueKind::InvalidGeometry,
                format!("Knoten {} hat nicht-finite Koordinaten", node.id),
                vec![node.id.clone()],
            ));
        }
    }

    for link in links {
        let problem = match (&link.geometry, link.link_type) {
            (LinkGeometry::Polyline(vertices), LinkType::Pipe) => {
                if vertices.len() < 2 {
                    Some("Rohr-Polyline hat weniger als 2 Stützpunkte".to_string())
                } else if vertices.iter().any(|v| !v.is_finite()) {
                    Some("Rohr-Polyline enthält nicht-finite Koordinaten".to_string())
                } else {
                    None
                }
            }
            (LinkGeometry::Point(pos), LinkType::Pump | LinkType::Valve) => {
                if !pos.is_finite() {
                    Some("Symbolposition ist nicht finit".to_string())
                } else {
                    None
                }
            }
            // Geometrie-Form passt nicht zum Linktyp
            (LinkGeometry::Point(_), LinkType::Pipe) => {
                Some("Rohr trägt Punkt- statt Polylinien-Geometrie".to_string())
            }
            (LinkGeometry::Polyline(_), LinkType::Pump | LinkType::Valve) => {
                Some("Punkt-Link trägt Polylinien-Geometrie".to_string())
            }
        };

        if let Some(message) = problem {
            report.errors.push(ValidationIssue::new(
                IssueKind::InvalidGeometry,
                format!("Link {}: {}", link.id, message),
                vec![link.id.clone()],
            ));
        }
    }
}

fn check_properties(
    nodes: &[&NodeFeature],
    links: &[&LinkFeature],
    report: &mut ValidationReport,
) {
    for node in nodes {
        for key in node.node_type.required_properties() {
            if !node.properties.contains_key(*key) {
                report.errors.push(ValidationIssue::new(
                    IssueKind::MissingRequiredProperty,
                    format!("Knoten {} fehlt Pflicht-Eigenschaft '{}'", node.id, key),
                    vec![node.id.clone()],
                ));
            }
        }
        for key in node.node_type.optional_properties() {
            if !node.properties.contains_key(*key) {
                report.warnings.push(ValidationIssue::new(
                    IssueKind::MissingOptionalProperty,
                    format!("Knoten {} fehlt Eigenschaft '{}'", node.id, key),
                    vec![node.id.clone()],
                ));
            }
        }
    }

    for link in links {
        for key in link.link_type.required_properties() {
            if !link.properties.contains_key(*key) {
                report.errors.push(ValidationIssue::new(
                    IssueKind::MissingRequiredProperty,
                    format!("Link {} fehlt Pflicht-Eigenschaft '{}'", link.id, key),
                    vec![link.id.clone()],
                ));
            }
        }
    }
}

fn check_orphans(nodes: &[&NodeFeature], report: &mut ValidationReport) {
    for node in nodes {
        if node.connected_links.is_empty() {
            report.warnings.push(ValidationIssue::new(
                IssueKind::OrphanNode,
                format!("Knoten {} hat keine Verbindungen", node.id),
                vec![node.id.clone()],
            ));
        }
    }
}

/// Flood-Fill über den ungerichteten Knoten/Link-Graphen.
///
/// Gibt pro Komponente einen repräsentativen Knoten zurück.
fn count_components<'a>(
    nodes: &[&'a NodeFeature],
    links: &[&LinkFeature],
    node_ids: &HashSet<&str>,
) -> Vec<&'a str> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for link in links {
        let (start, end) = (link.start_node.as_str(), link.end_node.as_str());
        if node_ids.contains(start) && node_ids.contains(end) {
            adjacency.entry(start).or_default().push(end);
            adjacency.entry(end).or_default().push(start);
        }
    }

    let mut sorted_nodes: Vec<&NodeFeature> = nodes.to_vec();
    sorted_nodes.sort_by(|a, b| a.id.cmp(&b.id));

    let mut visited: HashSet<&str> = HashSet::new();
    let mut representatives: Vec<&str> = Vec::new();

    for node in &sorted_nodes {
        if !visited.insert(node.id.as_str()) {
            continue;
        }
        representatives.push(node.id.as_str());

        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(node.id.as_str());
        while let Some(current) = queue.pop_front() {
            if let Some(neighbors) = adjacency.get(current) {
                for &neighbor in neighbors {
                    if visited.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    representatives
}

fn check_components(
    nodes: &[&NodeFeature],
    links: &[&LinkFeature],
    node_ids: &HashSet<&str>,
    report: &mut ValidationReport,
) {
    let representatives = count_components(nodes, links, node_ids);
    if representatives.len() > 1 {
        report.warnings.push(ValidationIssue::new(
            IssueKind::DisconnectedComponents,
            format!(
                "Netz zerfällt in {} Zusammenhangskomponenten",
                representatives.len()
            ),
            representatives.iter().map(|id| id.to_string()).collect(),
        ));
    }
}

fn check_crossings(
    nodes: &[&NodeFeature],
    links: &[&LinkFeature],
    report: &mut ValidationReport,
) {
    let pipes: Vec<&&LinkFeature> = links
        .iter()
        .filter(|l| l.link_type == LinkType::Pipe)
        .collect();
    let node_positions: Vec<Vec2> = nodes.iter().map(|n| n.position).collect();

    // O(Rohre²) — für interaktive Netzgrößen akzeptabel
    for (i, a) in pipes.iter().enumerate() {
        for b in pipes.iter().skip(i + 1) {
            // Rohre mit gemeinsamem Endpunkt kreuzen sich topologisch gewollt
            if a.start_node == b.start_node
                || a.start_node == b.end_node
                || a.end_node == b.start_node
                || a.end_node == b.end_node
            {
                continue;
            }

            if let Some(crossing) = first_crossing(a, b) {
                let covered = node_positions
                    .iter()
                    .any(|pos| pos.distance(crossing) <= CROSSING_NODE_TOLERANCE);
                if !covered {
                    report.warnings.push(ValidationIssue::new(
                        IssueKind::UnjunctionedCrossing,
                        format!(
                            "Rohre {} und {} kreuzen sich bei ({:.1}, {:.1}) ohne Knoten",
                            a.id, b.id, crossing.x, crossing.y
                        ),
                        vec![a.id.clone(), b.id.clone()],
                    ));
                }
            }
        }
    }
}

/// Erster echter Schnittpunkt zweier Rohr-Polylinien.
fn first_crossing(a: &LinkFeature, b: &LinkFeature) -> Option<Vec2> {
    let verts_a = a.geometry.vertices();
    let verts_b = b.geometry.vertices();
    for sa in verts_a.windows(2) {
        for sb in verts_b.windows(2) {
            if let Some(hit) = segment_intersection(sa[0], sa[1], sb[0], sb[1]) {
                return Some(hit);
            }
        }
    }
    None
}
