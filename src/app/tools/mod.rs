//! Klick-getriebene Zeichen-Werkzeuge.
//!
//! Das `PipeChainTool` erzeugt reine Daten (`PipeDraft`), die Mutation
//! erfolgt zentral in `use_cases::drawing`.

mod pipe_chain;

pub use pipe_chain::{ChainPhase, PipeChainTool};

use crate::core::{FeatureId, NetworkStore};
use glam::Vec2;

// ── Gemeinsame Utilities ─────────────────────────────────────

/// Versucht, auf einen existierenden Knoten innerhalb des Snap-Radius zu snappen.
pub fn snap_to_node(pos: Vec2, network: &NetworkStore, snap_radius: f32) -> Option<FeatureId> {
    network
        .nearest_node(pos)
        .filter(|hit| hit.distance <= snap_radius)
        .map(|hit| hit.node_id)
}

// ── Typen ────────────────────────────────────────────────────────

/// Fertig gezeichnetes Rohr — reine Daten, keine Mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeDraft {
    /// Start-Knoten der Kette
    pub start_node: FeatureId,
    /// End-Knoten (Klick-Ziel bzw. Doppelklick-Ziel)
    pub end_node: FeatureId,
    /// Vollständige Stützpunktliste inkl. beider Endpunkte
    pub vertices: Vec<Vec2>,
}

/// Rückgabe von `on_click`/`on_double_click` — steuert den Zeichen-Flow.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainAction {
    /// Nichts passiert (z.B. Klick außerhalb jeder Reichweite im Leerlauf)
    None,
    /// Kette an einem Knoten gestartet
    Started(FeatureId),
    /// Zwischen-Stützpunkt registriert
    VertexAdded,
    /// Rohr fertig — Aufrufer materialisiert den Draft
    PipeReady(PipeDraft),
    /// Eingabe abgewiesen, Store unberührt (Soft-Reject mit Diagnose)
    Rejected(String),
    /// Kette verworfen ohne Store-Mutation
    Aborted(String),
}

/// Vorschau-Geometrie für das Rendering (halbtransparent im Viewport).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainPreview {
    /// Vorschau-Linie: gesetzte Stützpunkte plus Cursor-Position
    pub line: Vec<Vec2>,
    /// Positionen der Stützpunkt-Marker
    pub markers: Vec<Vec2>,
}
