//! Core-Domänentypen: Features, NetworkStore, Geometrie, Spatial-Index, Validator.

pub mod feature;
pub mod geometry;
/// Core-Datenmodelle für Wassernetz-Konfigurationen
///
/// Dieses Modul definiert die Haupt-Datenstrukturen:
/// - NetworkStore: Container für alle Knoten und Links
/// - NodeFeature: Punkt-Element (Junction, Tank, Reservoir)
/// - LinkFeature: Verbindungs-Element (Rohr, Pumpe, Ventil)
pub mod network;
pub mod spatial;
pub mod validate;

pub use feature::{
    Feature, FeatureId, FeatureRole, LinkFeature, LinkGeometry, LinkType, NodeFeature, NodeType,
    PropertyBag,
};
pub use geometry::{
    polyline_length, project_onto_polyline, segment_direction, split_polyline, PolylineProjection,
};
pub use network::{ConnectionUpdate, NetworkStore, PipeHit};
pub use spatial::{SpatialIndex, SpatialMatch};
pub use validate::{
    network_stats, validate_features, validate_network, IssueKind, NetworkStats, ValidationIssue,
    ValidationReport,
};
