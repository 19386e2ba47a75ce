//! Application State — zentrale Datenhaltung.

use crate::app::tools::PipeChainTool;
use crate::core::{FeatureId, NetworkStore, ValidationReport};
use crate::shared::EditorOptions;

/// Aktiver Interaktions-Modus.
///
/// Genau EIN Modus ist aktiv; die Intent-Zuordnung schaltet Zeichen- und
/// Modify-Handler nur frei, solange ihr Modus aktuell ist. Zeichnen und
/// Verschieben verschachteln sich dadurch nie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    /// Standard: Features selektieren
    #[default]
    Select,
    /// Rohrketten zeichnen
    Draw,
    /// Knoten verschieben und Rohre umformen
    Modify,
}

/// Zustand eines laufenden Knoten-Drags (Modify-Modus).
#[derive(Debug, Clone, Default)]
pub struct DragState {
    /// Gegriffener Knoten (None = kein Drag aktiv)
    pub active_node: Option<FeatureId>,
}

/// Auswahlbezogener Anwendungszustand.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    /// Aktuell selektierter Knoten
    pub selected_node_id: Option<FeatureId>,
}

/// Zentraler Anwendungszustand: Store, Modus, Tool- und Drag-Zustand.
pub struct AppState {
    /// Der autoritative Feature-Store
    pub network: NetworkStore,
    /// Aktiver Interaktions-Modus
    pub mode: EditorMode,
    /// Zeichen-Werkzeug (Rohrketten)
    pub chain: PipeChainTool,
    /// Laufender Knoten-Drag
    pub drag: DragState,
    /// Selektion
    pub selection: SelectionState,
    /// Laufzeit-Optionen
    pub options: EditorOptions,
    /// Transiente Statusmeldung (Soft-Reject-Diagnosen)
    pub status: Option<String>,
    /// Letzter Validator-Lauf
    pub last_validation: Option<ValidationReport>,
}

impl AppState {
    /// Erstellt einen frischen Zustand mit leerem Netz und Standard-Optionen.
    pub fn new() -> Self {
        let options = EditorOptions::default();
        Self {
            network: NetworkStore::new(),
            mode: EditorMode::Select,
            chain: PipeChainTool::from_options(&options),
            drag: DragState::default(),
            selection: SelectionState::default(),
            options,
            status: None,
            last_validation: None,
        }
    }

    /// Setzt die transiente Statusmeldung und loggt sie.
    pub fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("Status: {}", message);
        self.status = Some(message);
    }

    /// Löscht die Statusmeldung.
    pub fn clear_status(&mut self) {
        self.status = None;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
