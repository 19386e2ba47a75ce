//! Domänentypen des Netzmodells: Knoten, Links und ihre Rollen.

use glam::Vec2;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::geometry::polyline_length;

/// Typ-präfixierte Feature-ID (z.B. `J-12`, `P-4`, `PU-1`).
pub type FeatureId = String;

/// Eigenschafts-Sammlung eines Features (Elevation, Durchmesser, …).
pub type PropertyBag = serde_json::Map<String, serde_json::Value>;

/// Knotentyp eines Punkt-Elements im Netz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Verbrauchs-/Verzweigungsknoten
    Junction,
    /// Speicherbehälter
    Tank,
    /// Reservoir (konstante Druckhöhe)
    Reservoir,
}

impl NodeType {
    /// ID-Präfix des Knotentyps.
    pub fn prefix(self) -> &'static str {
        match self {
            NodeType::Junction => "J",
            NodeType::Tank => "T",
            NodeType::Reservoir => "R",
        }
    }

    /// Pflicht-Eigenschaften des Knotentyps (fehlen = Fehler).
    pub fn required_properties(self) -> &'static [&'static str] {
        match self {
            NodeType::Junction => &["elevation"],
            NodeType::Tank => &["elevation", "capacity"],
            NodeType::Reservoir => &["head"],
        }
    }

    /// Optionale Eigenschaften (fehlen = Warnung).
    pub fn optional_properties(self) -> &'static [&'static str] {
        match self {
            NodeType::Junction => &["demand"],
            NodeType::Tank | NodeType::Reservoir => &[],
        }
    }
}

/// Linktyp eines Verbindungs-Elements im Netz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Rohr mit Polylinien-Geometrie
    Pipe,
    /// Pumpe (Punkt-Symbol zwischen zwei Flanken-Junctions)
    Pump,
    /// Ventil (Punkt-Symbol zwischen zwei Flanken-Junctions)
    Valve,
}

impl LinkType {
    /// ID-Präfix des Linktyps.
    pub fn prefix(self) -> &'static str {
        match self {
            LinkType::Pipe => "P",
            LinkType::Pump => "PU",
            LinkType::Valve => "V",
        }
    }

    /// Pflicht-Eigenschaften des Linktyps (fehlen = Fehler).
    pub fn required_properties(self) -> &'static [&'static str] {
        match self {
            LinkType::Pipe => &["diameter", "roughness"],
            LinkType::Pump => &["power"],
            LinkType::Valve => &["setting"],
        }
    }

    /// Punkt-Links (Pumpe/Ventil) tragen ein Symbol statt einer Polylinie.
    pub fn is_point_link(self) -> bool {
        matches!(self, LinkType::Pump | LinkType::Valve)
    }
}

/// Rolle eines Features im Store.
///
/// Genau EIN diskriminierendes Feld für alle transienten Pseudo-Features
/// (Vorschau, Stützpunkt-Marker, Visual-Links). Renderer, Hit-Test,
/// Validator und Export filtern über dasselbe Prädikat `is_transient()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureRole {
    /// Teil des logischen Graphen
    #[default]
    Logical,
    /// Vorschau-Linie während des Zeichnens
    Preview,
    /// Stützpunkt-Marker während des Zeichnens
    VertexMarker,
    /// Rendering-Polylinie zwischen den Flanken-Junctions einer Pumpe/eines Ventils
    VisualLink,
}

impl FeatureRole {
    /// Gemeinsames Prädikat: gehört das Feature NICHT zum logischen Graphen?
    pub fn is_transient(self) -> bool {
        !matches!(self, FeatureRole::Logical)
    }
}

/// Punkt-Element des Netzes (Junction, Tank, Reservoir).
#[derive(Debug, Clone)]
pub struct NodeFeature {
    /// Eindeutige, typ-präfixierte ID
    pub id: FeatureId,
    /// Knotentyp
    pub node_type: NodeType,
    /// Weltposition
    pub position: Vec2,
    /// IDs aller Links, die diesen Knoten berühren (bidirektionaler Index)
    pub connected_links: IndexSet<FeatureId>,
    /// Typ-spezifische Eigenschaften
    pub properties: PropertyBag,
    /// Rolle (logisch oder transient)
    pub role: FeatureRole,
}

impl NodeFeature {
    /// Erstellt einen neuen logischen Knoten ohne Verbindungen.
    pub fn new(id: FeatureId, node_type: NodeType, position: Vec2) -> Self {
        Self {
            id,
            node_type,
            position,
            connected_links: IndexSet::new(),
            properties: PropertyBag::new(),
            role: FeatureRole::Logical,
        }
    }

    /// Erstellt einen transienten Stützpunkt-Marker (reine Vorschau).
    pub fn vertex_marker(id: FeatureId, position: Vec2) -> Self {
        Self {
            role: FeatureRole::VertexMarker,
            ..Self::new(id, NodeType::Junction, position)
        }
    }
}

/// Geometrie eines Links: Polylinie (Rohr) oder Punkt (Pumpe/Ventil).
#[derive(Debug, Clone, PartialEq)]
pub enum LinkGeometry {
    /// Geordnete Stützpunktliste eines Rohrs
    Polyline(Vec<Vec2>),
    /// Symbolposition eines Punkt-Links
    Point(Vec2),
}

impl LinkGeometry {
    /// Stützpunkte einer Polylinien-Geometrie (leer für Punkt-Links).
    pub fn vertices(&self) -> &[Vec2] {
        match self {
            LinkGeometry::Polyline(v) => v,
            LinkGeometry::Point(_) => &[],
        }
    }

    /// Symbolposition einer Punkt-Geometrie (None für Polylinien).
    pub fn symbol_position(&self) -> Option<Vec2> {
        match self {
            LinkGeometry::Point(position) => Some(*position),
            LinkGeometry::Polyline(_) => None,
        }
    }
}

/// Verbindungs-Element des Netzes (Rohr, Pumpe, Ventil).
#[derive(Debug, Clone)]
pub struct LinkFeature {
    /// Eindeutige, typ-präfixierte ID
    pub id: FeatureId,
    /// Linktyp
    pub link_type: LinkType,
    /// Geometrie (Polylinie oder Symbol-Punkt)
    pub geometry: LinkGeometry,
    /// Start-Knoten-ID
    pub start_node: FeatureId,
    /// End-Knoten-ID
    pub end_node: FeatureId,
    /// Abgeleitete Länge (0 für Punkt-Links)
    pub length: f32,
    /// Gepaarter Visual-Link eines Punkt-Links (Rendering-Polylinie)
    pub visual_line: Option<FeatureId>,
    /// Typ-spezifische Eigenschaften
    pub properties: PropertyBag,
    /// Rolle (logisch oder transient)
    pub role: FeatureRole,
}

impl LinkFeature {
    /// Erstellt ein Rohr mit abgeleiteter Länge.
    pub fn new_pipe(
        id: FeatureId,
        vertices: Vec<Vec2>,
        start_node: FeatureId,
        end_node: FeatureId,
    ) -> Self {
        let length = polyline_length(&vertices);
        Self {
            id,
            link_type: LinkType::Pipe,
            geometry: LinkGeometry::Polyline(vertices),
            start_node,
            end_node,
            length,
            visual_line: None,
            properties: PropertyBag::new(),
            role: FeatureRole::Logical,
        }
    }

    /// Erstellt einen Punkt-Link (Pumpe/Ventil) am Symbol-Punkt.
    pub fn new_point_link(
        id: FeatureId,
        link_type: LinkType,
        position: Vec2,
        start_node: FeatureId,
        end_node: FeatureId,
    ) -> Self {
        Self {
            id,
            link_type,
            geometry: LinkGeometry::Point(position),
            start_node,
            end_node,
            length: 0.0,
            visual_line: None,
            properties: PropertyBag::new(),
            role: FeatureRole::Logical,
        }
    }

    /// Erstellt die Rendering-Polylinie zwischen den Flanken-Junctions.
    pub fn visual_line(
        id: FeatureId,
        vertices: Vec<Vec2>,
        start_node: FeatureId,
        end_node: FeatureId,
    ) -> Self {
        Self {
            role: FeatureRole::VisualLink,
            ..Self::new_pipe(id, vertices, start_node, end_node)
        }
    }

    /// Erstellt eine transiente Vorschau-Linie (ohne logische Endpunkte).
    pub fn preview_line(id: FeatureId, vertices: Vec<Vec2>) -> Self {
        Self {
            role: FeatureRole::Preview,
            ..Self::new_pipe(id, vertices, FeatureId::new(), FeatureId::new())
        }
    }

    /// Berechnet die Länge aus der aktuellen Polylinien-Geometrie neu.
    pub fn recompute_length(&mut self) {
        self.length = polyline_length(self.geometry.vertices());
    }
}

/// Feature-Datensatz des Stores: Knoten oder Link.
#[derive(Debug, Clone)]
pub enum Feature {
    /// Punkt-Element
    Node(NodeFeature),
    /// Verbindungs-Element
    Link(LinkFeature),
}

impl Feature {
    /// ID des Features.
    pub fn id(&self) -> &FeatureId {
        match self {
            Feature::Node(n) => &n.id,
            Feature::Link(l) => &l.id,
        }
    }

    /// Rolle des Features.
    pub fn role(&self) -> FeatureRole {
        match self {
            Feature::Node(n) => n.role,
            Feature::Link(l) => l.role,
        }
    }
}
