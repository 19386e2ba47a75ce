//! Rohrketten-Tool: klick-getriebene Zustandsmaschine des Zeichen-Modus.
//!
//! `Idle → AwaitingStart → Drawing(startNode, vertices) → … → AwaitingStart`
//!
//! Das Tool mutiert den Store nie selbst. Es sammelt Stützpunkte, prüft
//! Schwellwerte und gibt fertige `PipeDraft`-Daten an den Aufrufer zurück;
//! nach jedem fertigen Rohr wird die Kette am End-Knoten neu angesetzt,
//! damit verkettete Rohre ohne Neustart weitergezeichnet werden können.

use glam::Vec2;

use super::{snap_to_node, ChainAction, ChainPreview, PipeDraft};
use crate::core::{polyline_length, FeatureId, NetworkStore};
use crate::shared::EditorOptions;

/// Phase der Zeichen-Zustandsmaschine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainPhase {
    /// Tool inaktiv (Modus nicht Draw)
    #[default]
    Idle,
    /// Wartet auf Klick auf einen Start-Knoten
    AwaitingStart,
    /// Kette aktiv: Start-Knoten gesetzt, Stützpunkte werden gesammelt
    Drawing,
}

/// Klick-getriebenes Zeichen-Werkzeug für Rohrketten.
#[derive(Debug, Clone)]
pub struct PipeChainTool {
    phase: ChainPhase,
    start_node: Option<FeatureId>,
    vertices: Vec<Vec2>,
    /// Snap-Radius für Knoten-Picks (Welteinheiten)
    pub snap_radius: f32,
    /// Minimaler Abstand zwischen aufeinanderfolgenden Stützpunkten
    pub min_segment_length: f32,
    /// Minimale Gesamtlänge eines fertigen Rohrs
    pub min_pipe_length: f32,
    /// Maximale Anzahl Stützpunkte pro Kette
    pub max_vertices: usize,
}

impl PipeChainTool {
    /// Erstellt ein neues Tool mit den übergebenen Schwellwerten.
    pub fn from_options(options: &EditorOptions) -> Self {
        Self {
            phase: ChainPhase::Idle,
            start_node: None,
            vertices: Vec::new(),
            snap_radius: options.snap_radius,
            min_segment_length: options.min_segment_length,
            min_pipe_length: options.min_pipe_length,
            max_vertices: options.max_chain_vertices,
        }
    }

    /// Aktuelle Phase (read-only).
    pub fn phase(&self) -> ChainPhase {
        self.phase
    }

    /// Start-Knoten der aktiven Kette.
    pub fn start_node(&self) -> Option<&FeatureId> {
        self.start_node.as_ref()
    }

    /// Bisher gesammelte Stützpunkte.
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Hat das Tool angefangene Eingaben (für stufenweise Escape-Logik)?
    pub fn has_pending_input(&self) -> bool {
        self.phase == ChainPhase::Drawing
    }

    /// Aktiviert das Tool (Eintritt in den Zeichen-Modus).
    pub fn arm(&mut self) {
        self.phase = ChainPhase::AwaitingStart;
        self.start_node = None;
        self.vertices.clear();
    }

    /// Deaktiviert das Tool (Modus-Wechsel) und verwirft alle Eingaben.
    pub fn disarm(&mut self) {
        self.phase = ChainPhase::Idle;
        self.start_node = None;
        self.vertices.clear();
    }

    /// Escape: verwirft die laufende Kette, bleibt aber im Zeichen-Modus.
    pub fn cancel(&mut self) {
        if self.phase != ChainPhase::Idle {
            self.phase = ChainPhase::AwaitingStart;
        }
        self.start_node = None;
        self.vertices.clear();
    }

    /// Verarbeitet einen Viewport-Klick.
    pub fn on_click(&mut self, pos: Vec2, network: &NetworkStore) -> ChainAction {
        match self.phase {
            ChainPhase::Idle => ChainAction::None,
            ChainPhase::AwaitingStart => self.start_chain(pos, network),
            ChainPhase::Drawing => match snap_to_node(pos, network, self.snap_radius) {
                Some(node_id) => self.finish_at_node(node_id, network),
                None => self.append_vertex(pos),
            },
        }
    }

    /// Doppelklick: schließt die Kette wie ein Knoten-Klick ab, sofern
    /// beide Endpunkte bekannt sind und ≥2 Stützpunkte vorliegen.
    /// Andernfalls wird die Kette ohne Store-Mutation verworfen.
    pub fn on_double_click(&mut self, pos: Vec2, network: &NetworkStore) -> ChainAction {
        if self.phase != ChainPhase::Drawing {
            return ChainAction::None;
        }

        let Some(node_id) = snap_to_node(pos, network, self.snap_radius) else {
            let msg = "Doppelklick ohne Ziel-Knoten — Kette verworfen".to_string();
            self.cancel();
            return ChainAction::Aborted(msg);
        };

        match self.finish_at_node(node_id, network) {
            ChainAction::PipeReady(draft) => {
                // Doppelklick beendet die Kette endgültig: kein Re-Seed
                self.cancel();
                ChainAction::PipeReady(draft)
            }
            ChainAction::Rejected(reason) => {
                self.cancel();
                ChainAction::Aborted(reason)
            }
            other => other,
        }
    }

    /// Schließt die Kette an einem synthetischen Knoten am letzten
    /// Stützpunkt (Seiten-Aktion "mitten in der Kette einfügen").
    ///
    /// Gibt die Stützpunktliste des zu materialisierenden Rohrs zurück;
    /// der Aufrufer erstellt den synthetischen Knoten und setzt die Kette
    /// anschließend über `reseed` an ihm fort.
    pub fn take_chain_for_break(&mut self) -> Result<(FeatureId, Vec<Vec2>), String> {
        if self.phase != ChainPhase::Drawing {
            return Err("Keine aktive Kette".to_string());
        }
        if self.vertices.len() < 2 {
            return Err("Kette hat noch keinen Verlauf".to_string());
        }
        if polyline_length(&self.vertices) < self.min_pipe_length {
            return Err(format!(
                "Kette kürzer als Mindestlänge {:.1}",
                self.min_pipe_length
            ));
        }
        let start = self
            .start_node
            .clone()
            .ok_or_else(|| "Kette ohne Start-Knoten".to_string())?;
        Ok((start, self.vertices.clone()))
    }

    /// Setzt die Kette nach einem fertigen Rohr am End-Knoten neu an.
    pub fn reseed(&mut self, node_id: FeatureId, position: Vec2) {
        self.phase = ChainPhase::Drawing;
        self.start_node = Some(node_id);
        self.vertices.clear();
        self.vertices.push(position);
    }

    /// Vorschau-Geometrie für die aktuelle Cursor-Position.
    pub fn preview(&self, cursor: Vec2) -> ChainPreview {
        if self.phase != ChainPhase::Drawing || self.vertices.is_empty() {
            return ChainPreview::default();
        }
        let mut line = self.vertices.clone();
        line.push(cursor);
        ChainPreview {
            line,
            markers: self.vertices.clone(),
        }
    }

    // ── interne Übergänge ───────────────────────────────────────

    fn start_chain(&mut self, pos: Vec2, network: &NetworkStore) -> ChainAction {
        let Some(node_id) = snap_to_node(pos, network, self.snap_radius) else {
            return ChainAction::Rejected(
                "Kein Start-Knoten in Reichweite — Kette beginnt an einem Knoten".to_string(),
            );
        };
        let Some(node) = network.node(&node_id) else {
            return ChainAction::Rejected(format!("Knoten {} nicht im Store", node_id));
        };

        self.phase = ChainPhase::Drawing;
        self.start_node = Some(node_id.clone());
        self.vertices.clear();
        self.vertices.push(node.position);
        ChainAction::Started(node_id)
    }

    fn append_vertex(&mut self, pos: Vec2) -> ChainAction {
        if self.vertices.len() >= self.max_vertices {
            return ChainAction::Rejected(format!(
                "Stützpunkt-Limit {} erreicht",
                self.max_vertices
            ));
        }
        let Some(&last) = self.vertices.last() else {
            return ChainAction::Rejected("Kette ohne Start-Stützpunkt".to_string());
        };
        if last.distance(pos) < self.min_segment_length {
            return ChainAction::Rejected(format!(
                "Segment kürzer als Mindestabstand {:.1}",
                self.min_segment_length
            ));
        }

        self.vertices.push(pos);
        ChainAction::VertexAdded
    }

    fn finish_at_node(&mut self, node_id: FeatureId, network: &NetworkStore) -> ChainAction {
        let Some(start) = self.start_node.clone() else {
            return ChainAction::Rejected("Kette ohne Start-Knoten".to_string());
        };
        let Some(node) = network.node(&node_id) else {
            return ChainAction::Rejected(format!("Knoten {} nicht im Store", node_id));
        };

        // Direkter Zweitklick auf den Start-Knoten wäre ein degeneriertes Rohr
        if node_id == start && self.vertices.len() < 2 {
            return ChainAction::Rejected("Start- und End-Knoten identisch".to_string());
        }

        let mut vertices = self.vertices.clone();
        vertices.push(node.position);

        if vertices.len() < 2 {
            return ChainAction::Rejected("Rohr braucht mindestens 2 Stützpunkte".to_string());
        }
        let total = polyline_length(&vertices);
        if total < self.min_pipe_length {
            return ChainAction::Rejected(format!(
                "Rohr kürzer als Mindestlänge {:.1}",
                self.min_pipe_length
            ));
        }

        let draft = PipeDraft {
            start_node: start,
            end_node: node_id.clone(),
            vertices,
        };

        // Re-Seed: Kette läuft am End-Knoten weiter
        self.reseed(node_id, node.position);

        ChainAction::PipeReady(draft)
    }
}
