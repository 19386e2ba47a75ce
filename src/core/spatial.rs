//! Spatial-Index (KD-Tree) für schnelle Knoten-Abfragen.

use std::collections::HashMap;

use glam::Vec2;
use kiddo::{KdTree, SquaredEuclidean};

use crate::core::{FeatureId, NodeFeature};

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialMatch {
    /// ID des gefundenen Knotens
    pub node_id: FeatureId,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f32,
}

/// Read-only Spatial-Index über den logischen Knoten eines Netzes.
///
/// Transiente Pseudo-Knoten (Vorschau-Marker) werden beim Aufbau
/// herausgefiltert, damit Snapping nie auf Vorschau-Geometrie einrastet.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    node_ids: Vec<FeatureId>,
    positions: HashMap<FeatureId, Vec2>,
}

impl SpatialIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            node_ids: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Baut einen neuen Index aus den übergebenen Knoten.
    pub fn from_nodes(nodes: &HashMap<FeatureId, NodeFeature>) -> Self {
        let mut node_ids: Vec<FeatureId> = nodes
            .values()
            .filter(|node| !node.role.is_transient())
            .map(|node| node.id.clone())
            .collect();
        node_ids.sort_unstable();

        let entries: Vec<[f64; 2]> = node_ids
            .iter()
            .filter_map(|id| {
                nodes
                    .get(id)
                    .map(|node| [node.position.x as f64, node.position.y as f64])
            })
            .collect();

        let tree: KdTree<f64, 2> = (&entries).into();

        let positions = node_ids
            .iter()
            .filter_map(|id| nodes.get(id).map(|node| (id.clone(), node.position)))
            .collect();

        Self {
            tree,
            node_ids,
            positions,
        }
    }

    /// Gibt die Anzahl indexierter Knoten zurück.
    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    /// Gibt `true` zurück, wenn keine Knoten im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Findet den nächsten Knoten zur gegebenen Weltposition.
    pub fn nearest(&self, query: Vec2) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[query.x as f64, query.y as f64]);
        let node_id = self.node_ids.get(result.item as usize)?.clone();

        Some(SpatialMatch {
            node_id,
            distance: (result.distance as f32).sqrt(),
        })
    }

    /// Findet alle Knoten innerhalb eines Radius um die Query-Position.
    pub fn within_radius(&self, query: Vec2, radius: f32) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&[query.x as f64, query.y as f64], (radius * radius) as f64)
            .into_iter()
            .filter_map(|entry| {
                let node_id = self.node_ids.get(entry.item as usize)?.clone();
                Some(SpatialMatch {
                    node_id,
                    distance: (entry.distance as f32).sqrt(),
                })
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }

    /// Indexierte Position eines Knotens (falls vorhanden).
    pub fn position_of(&self, node_id: &str) -> Option<Vec2> {
        self.positions.get(node_id).copied()
    }
}
