//! AppIntent- und AppCommand-Enums für den Intent/Command-Datenfluss.

use glam::Vec2;

use super::state::EditorMode;
use crate::core::{FeatureId, LinkType, NodeType, PropertyBag};

/// Intents sind Eingaben aus UI/System ohne direkte Mutationslogik.
#[derive(Debug, Clone)]
pub enum AppIntent {
    /// Interaktions-Modus wechseln
    SetEditorModeRequested { mode: EditorMode },

    // ── Zeichnen (nur im Draw-Modus wirksam) ────────────────────
    /// Viewport-Klick im Zeichen-Modus
    DrawClickRequested { world_pos: Vec2 },
    /// Doppelklick: Kette abschließen
    DrawDoubleClickRequested { world_pos: Vec2 },
    /// Cursor bewegt: Vorschau aktualisieren
    DrawHoverMoved { world_pos: Vec2 },
    /// Escape: laufende Kette verwerfen
    DrawCancelRequested,
    /// Seiten-Aktion: Kette an synthetischem Knoten schließen und fortsetzen
    DrawBreakRequested,

    // ── Splice ──────────────────────────────────────────────────
    /// Knoten in das nächstgelegene Rohr einspleißen
    InsertNodeOnPipeRequested { world_pos: Vec2, node_type: NodeType },
    /// Pumpe/Ventil in das nächstgelegene Rohr einspleißen
    InsertLinkOnPipeRequested { world_pos: Vec2, link_type: LinkType },

    // ── Modify (nur im Modify-Modus wirksam) ────────────────────
    /// Drag-Lifecycle Start: Knoten nahe der Position greifen
    BeginNodeDragRequested { world_pos: Vec2 },
    /// Drag-Lifecycle Update: gegriffenen Knoten verschieben
    NodeDragMovedRequested { world_pos: Vec2 },
    /// Drag-Lifecycle Ende: Position übernehmen, Geometrie propagieren
    EndNodeDragRequested { world_pos: Vec2 },
    /// Inneren Rohr-Stützpunkt verschieben (nur Längen-Update)
    ReshapePipeVertexRequested {
        pipe_id: FeatureId,
        vertex_index: usize,
        world_pos: Vec2,
    },

    // ── Externe Kollaborateure ──────────────────────────────────
    /// Knoten samt Kaskade löschen (Delete-Subsystem)
    DeleteNodeRequested { node_id: FeatureId },
    /// Link löschen (Delete-Subsystem)
    DeleteLinkRequested { link_id: FeatureId },
    /// Teil-Eigenschaften mischen (Property-Formulare)
    UpdateFeaturePropertiesRequested { id: FeatureId, partial: PropertyBag },
    /// Topologie-Validierung anstoßen
    ValidateRequested,
}

/// Commands sind vollständig aufgelöste, mutierende Operationen.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Interaktions-Modus setzen (Tool-Zustände zurücksetzen)
    SetEditorMode { mode: EditorMode },
    /// Zeichen-Klick verarbeiten
    DrawClick { world_pos: Vec2 },
    /// Zeichen-Doppelklick verarbeiten
    DrawDoubleClick { world_pos: Vec2 },
    /// Vorschau-Pseudo-Features aktualisieren
    DrawHover { world_pos: Vec2 },
    /// Laufende Kette verwerfen
    DrawCancel,
    /// Kette an synthetischem Knoten schließen
    DrawBreak,
    /// Knoten einspleißen
    InsertNodeOnPipe { world_pos: Vec2, node_type: NodeType },
    /// Pumpe/Ventil einspleißen
    InsertLinkOnPipe { world_pos: Vec2, link_type: LinkType },
    /// Knoten greifen
    BeginNodeDrag { world_pos: Vec2 },
    /// Knoten verschieben
    MoveNodeDrag { world_pos: Vec2 },
    /// Drag abschließen
    EndNodeDrag { world_pos: Vec2 },
    /// Rohr-Stützpunkt verschieben
    ReshapePipeVertex {
        pipe_id: FeatureId,
        vertex_index: usize,
        world_pos: Vec2,
    },
    /// Knoten samt Kaskade löschen
    DeleteNode { node_id: FeatureId },
    /// Link löschen
    DeleteLink { link_id: FeatureId },
    /// Teil-Eigenschaften mischen
    UpdateFeatureProperties { id: FeatureId, partial: PropertyBag },
    /// Validator-Lauf
    Validate,
}
