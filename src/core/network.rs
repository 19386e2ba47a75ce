//! Der zentrale Feature-Store mit Knoten, Links und Spatial-Index.

use std::collections::HashMap;

use glam::Vec2;

use super::geometry::{project_onto_polyline, PolylineProjection};
use super::{Feature, FeatureId, LinkFeature, LinkType, NodeFeature, PropertyBag};
use super::{SpatialIndex, SpatialMatch};

/// Richtung einer Adjazenz-Mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionUpdate {
    /// Link-ID in `connected_links` eintragen
    Add,
    /// Link-ID aus `connected_links` entfernen
    Remove,
}

/// Treffer eines Hit-Tests gegen Rohr-Polylinien.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeHit {
    /// ID des getroffenen Rohrs
    pub link_id: FeatureId,
    /// Projektion auf die Rohr-Polyline
    pub projection: PolylineProjection,
}

/// Autoritativer Container für das gesamte Wassernetz.
///
/// Der Store führt keine impliziten Kaskaden aus: zusammengesetzte
/// Operationen (Splice, Delete) sind selbst dafür verantwortlich, jede
/// nötige Schreiboperation abzuschließen, bevor sie zurückkehren —
/// kein Aufrufer sieht je einen halb umverdrahteten Graphen.
#[derive(Debug, Clone)]
pub struct NetworkStore {
    nodes: HashMap<FeatureId, NodeFeature>,
    links: HashMap<FeatureId, LinkFeature>,
    /// Monoton steigende Zähler pro ID-Präfix (wiederholen sich nie in einer Session)
    id_counters: HashMap<String, u64>,
    /// Persistenter Spatial-Index über den logischen Knoten
    spatial_index: SpatialIndex,
}

impl NetworkStore {
    /// Erstellt einen neuen leeren Store.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            links: HashMap::new(),
            id_counters: HashMap::new(),
            spatial_index: SpatialIndex::empty(),
        }
    }

    // ── ID-Vergabe ──────────────────────────────────────────────

    /// Erzeugt eine neue, store-weit eindeutige ID mit dem gegebenen Präfix.
    ///
    /// Der Zähler pro Präfix steigt monoton; bereits vorhandene IDs
    /// (z.B. nach einem Import) werden übersprungen.
    pub fn generate_unique_id(&mut self, prefix: &str) -> FeatureId {
        loop {
            let counter = self.id_counters.entry(prefix.to_string()).or_insert(0);
            *counter += 1;
            let candidate = format!("{}-{}", prefix, counter);
            if !self.contains_id(&candidate) {
                return candidate;
            }
        }
    }

    /// Prüft ob eine ID bereits vergeben ist (Knoten ODER Link).
    pub fn contains_id(&self, id: &str) -> bool {
        self.nodes.contains_key(id) || self.links.contains_key(id)
    }

    // ── Feature-Operationen ─────────────────────────────────────

    /// Fügt ein Feature hinzu. Eine bestehende ID wird überschrieben.
    pub fn add_feature(&mut self, feature: Feature) {
        match feature {
            Feature::Node(node) => {
                self.nodes.insert(node.id.clone(), node);
                self.rebuild_spatial_index();
            }
            Feature::Link(link) => {
                self.links.insert(link.id.clone(), link);
            }
        }
    }

    /// Entfernt ein Feature. Keine Kaskade — Adjazenz-Einträge auf das
    /// entfernte Feature muss der Aufrufer selbst bereinigen.
    pub fn remove_feature(&mut self, id: &str) -> Option<Feature> {
        if let Some(node) = self.nodes.remove(id) {
            self.rebuild_spatial_index();
            return Some(Feature::Node(node));
        }
        self.links.remove(id).map(Feature::Link)
    }

    /// Mischt Teil-Eigenschaften in die Property-Bag eines Features.
    ///
    /// Berührt weder Geometrie noch Adjazenz (Vertrag der Property-Formulare).
    pub fn update_feature(&mut self, id: &str, partial: &PropertyBag) -> bool {
        let bag = if let Some(node) = self.nodes.get_mut(id) {
            &mut node.properties
        } else if let Some(link) = self.links.get_mut(id) {
            &mut link.properties
        } else {
            log::warn!("update_feature: Feature {} existiert nicht", id);
            return false;
        };

        for (key, value) in partial {
            bag.insert(key.clone(), value.clone());
        }
        true
    }

    /// Mutiert den bidirektionalen Adjazenz-Index eines Knotens.
    ///
    /// Idempotent: das Eintragen einer bereits vorhandenen Link-ID und das
    /// Entfernen einer fehlenden sind No-Ops.
    pub fn update_node_connections(
        &mut self,
        node_id: &str,
        link_id: &str,
        update: ConnectionUpdate,
    ) -> bool {
        let Some(node) = self.nodes.get_mut(node_id) else {
            log::warn!("update_node_connections: Knoten {} existiert nicht", node_id);
            return false;
        };

        match update {
            ConnectionUpdate::Add => {
                node.connected_links.insert(link_id.to_string());
            }
            ConnectionUpdate::Remove => {
                node.connected_links.shift_remove(link_id);
            }
        }
        true
    }

    // ── Zugriff ─────────────────────────────────────────────────

    /// Knoten per ID (read-only).
    pub fn node(&self, id: &str) -> Option<&NodeFeature> {
        self.nodes.get(id)
    }

    /// Knoten per ID (mutable). Positionsänderungen erfordern anschließend
    /// `rebuild_spatial_index` durch den Aufrufer.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeFeature> {
        self.nodes.get_mut(id)
    }

    /// Link per ID (read-only).
    pub fn link(&self, id: &str) -> Option<&LinkFeature> {
        self.links.get(id)
    }

    /// Link per ID (mutable).
    pub fn link_mut(&mut self, id: &str) -> Option<&mut LinkFeature> {
        self.links.get_mut(id)
    }

    /// Iterator über alle Knoten (inkl. transienter).
    pub fn nodes_iter(&self) -> impl Iterator<Item = &NodeFeature> {
        self.nodes.values()
    }

    /// Iterator über alle Links (inkl. transienter).
    pub fn links_iter(&self) -> impl Iterator<Item = &LinkFeature> {
        self.links.values()
    }

    /// Anzahl der logischen Knoten.
    pub fn node_count(&self) -> usize {
        self.nodes.values().filter(|n| !n.role.is_transient()).count()
    }

    /// Anzahl der logischen Links.
    pub fn link_count(&self) -> usize {
        self.links.values().filter(|l| !l.role.is_transient()).count()
    }

    /// Konsistenter Snapshot aller Features für den Validator.
    pub fn snapshot(&self) -> Vec<Feature> {
        let mut features: Vec<Feature> = self
            .nodes
            .values()
            .cloned()
            .map(Feature::Node)
            .chain(self.links.values().cloned().map(Feature::Link))
            .collect();
        // Deterministische Reihenfolge für reproduzierbare Reports
        features.sort_by(|a, b| a.id().cmp(b.id()));
        features
    }

    /// Entfernt alle transienten Pseudo-Features (Vorschau, Marker).
    pub fn remove_transient_features(&mut self) {
        let had_transient_nodes = self.nodes.values().any(|n| n.role.is_transient());
        self.nodes.retain(|_, n| !n.role.is_transient());
        self.links
            .retain(|_, l| l.role != super::FeatureRole::Preview);
        if had_transient_nodes {
            self.rebuild_spatial_index();
        }
    }

    // ── Spatial-Abfragen ────────────────────────────────────────

    /// Baut den persistenten Spatial-Index aus den aktuellen Knoten neu auf.
    pub fn rebuild_spatial_index(&mut self) {
        self.spatial_index = SpatialIndex::from_nodes(&self.nodes);
    }

    /// Findet den nächstgelegenen logischen Knoten zur Weltposition.
    pub fn nearest_node(&self, query: Vec2) -> Option<SpatialMatch> {
        self.spatial_index.nearest(query)
    }

    /// Findet alle logischen Knoten innerhalb eines Radius.
    pub fn nodes_within_radius(&self, query: Vec2, radius: f32) -> Vec<SpatialMatch> {
        self.spatial_index.within_radius(query, radius)
    }

    /// Hit-Test gegen alle logischen Rohr-Polylinien.
    ///
    /// Gibt den global nächsten Treffer innerhalb `tolerance` zurück;
    /// Rohre in `exclude` werden übersprungen (z.B. die eigenen
    /// Verbindungen eines gezogenen Knotens).
    pub fn nearest_pipe_hit(
        &self,
        query: Vec2,
        tolerance: f32,
        exclude: &indexmap::IndexSet<FeatureId>,
    ) -> Option<PipeHit> {
        let mut best: Option<PipeHit> = None;

        for link in self.links.values() {
            if link.link_type != LinkType::Pipe || link.role.is_transient() {
                continue;
            }
            if exclude.contains(&link.id) {
                continue;
            }
            let Some(projection) = project_onto_polyline(query, link.geometry.vertices()) else {
                continue;
            };
            if projection.distance > tolerance {
                continue;
            }
            let better = match &best {
                Some(hit) => projection.distance < hit.projection.distance,
                None => true,
            };
            if better {
                best = Some(PipeHit {
                    link_id: link.id.clone(),
                    projection,
                });
            }
        }

        best
    }
}

impl Default for NetworkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeType;
    use indexmap::IndexSet;

    fn junction(store: &mut NetworkStore, pos: Vec2) -> FeatureId {
        let id = store.generate_unique_id("J");
        store.add_feature(Feature::Node(NodeFeature::new(
            id.clone(),
            NodeType::Junction,
            pos,
        )));
        id
    }

    #[test]
    fn generated_ids_are_unique_per_prefix() {
        let mut store = NetworkStore::new();
        let a = store.generate_unique_id("J");
        let b = store.generate_unique_id("J");
        let c = store.generate_unique_id("P");

        assert_eq!(a, "J-1");
        assert_eq!(b, "J-2");
        assert_eq!(c, "P-1");
    }

    #[test]
    fn generated_ids_skip_imported_collisions() {
        let mut store = NetworkStore::new();
        store.add_feature(Feature::Node(NodeFeature::new(
            "J-1".to_string(),
            NodeType::Junction,
            Vec2::ZERO,
        )));

        // Zähler startet bei 0, darf aber die importierte J-1 nicht wiederverwenden
        let id = store.generate_unique_id("J");
        assert_eq!(id, "J-2");
    }

    #[test]
    fn update_node_connections_is_idempotent() {
        let mut store = NetworkStore::new();
        let j = junction(&mut store, Vec2::ZERO);

        assert!(store.update_node_connections(&j, "P-1", ConnectionUpdate::Add));
        assert!(store.update_node_connections(&j, "P-1", ConnectionUpdate::Add));
        assert_eq!(store.node(&j).unwrap().connected_links.len(), 1);

        assert!(store.update_node_connections(&j, "P-1", ConnectionUpdate::Remove));
        // Entfernen einer fehlenden ID ist ein No-Op
        assert!(store.update_node_connections(&j, "P-1", ConnectionUpdate::Remove));
        assert!(store.node(&j).unwrap().connected_links.is_empty());
    }

    #[test]
    fn update_feature_merges_properties_only() {
        let mut store = NetworkStore::new();
        let j = junction(&mut store, Vec2::new(5.0, 5.0));

        let mut partial = PropertyBag::new();
        partial.insert("elevation".to_string(), serde_json::json!(120.5));
        assert!(store.update_feature(&j, &partial));

        let node = store.node(&j).unwrap();
        assert_eq!(node.properties["elevation"], serde_json::json!(120.5));
        assert_eq!(node.position, Vec2::new(5.0, 5.0));

        assert!(!store.update_feature("J-999", &partial));
    }

    #[test]
    fn remove_feature_does_not_cascade() {
        let mut store = NetworkStore::new();
        let a = junction(&mut store, Vec2::ZERO);
        let b = junction(&mut store, Vec2::new(10.0, 0.0));

        let pipe_id = store.generate_unique_id("P");
        store.add_feature(Feature::Link(LinkFeature::new_pipe(
            pipe_id.clone(),
            vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
            a.clone(),
            b.clone(),
        )));
        store.update_node_connections(&a, &pipe_id, ConnectionUpdate::Add);
        store.update_node_connections(&b, &pipe_id, ConnectionUpdate::Add);

        store.remove_feature(&pipe_id);
        // Adjazenz bleibt stehen — Bereinigung ist Sache des Aufrufers
        assert!(store.node(&a).unwrap().connected_links.contains(&pipe_id));
    }

    #[test]
    fn nearest_pipe_hit_respects_exclusion() {
        let mut store = NetworkStore::new();
        let a = junction(&mut store, Vec2::ZERO);
        let b = junction(&mut store, Vec2::new(100.0, 0.0));

        let pipe_id = store.generate_unique_id("P");
        store.add_feature(Feature::Link(LinkFeature::new_pipe(
            pipe_id.clone(),
            vec![Vec2::ZERO, Vec2::new(100.0, 0.0)],
            a,
            b,
        )));

        let hit = store
            .nearest_pipe_hit(Vec2::new(40.0, 1.0), 1.5, &IndexSet::new())
            .expect("Treffer erwartet");
        assert_eq!(hit.link_id, pipe_id);
        assert!((hit.projection.point.x - 40.0).abs() < 1e-4);

        let mut exclude = IndexSet::new();
        exclude.insert(pipe_id);
        assert!(store
            .nearest_pipe_hit(Vec2::new(40.0, 1.0), 1.5, &exclude)
            .is_none());
    }

    #[test]
    fn spatial_index_tracks_add_and_remove() {
        let mut store = NetworkStore::new();
        let a = junction(&mut store, Vec2::ZERO);
        let b = junction(&mut store, Vec2::new(10.0, 0.0));

        assert_eq!(
            store.nearest_node(Vec2::new(9.8, 0.1)).map(|m| m.node_id),
            Some(b.clone())
        );

        store.remove_feature(&b);
        assert_eq!(
            store.nearest_node(Vec2::new(9.8, 0.1)).map(|m| m.node_id),
            Some(a)
        );
    }
}
