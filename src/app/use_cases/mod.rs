//! Use-Case-Funktionen für die Topologie-Engines.
//!
//! Aufgeteilt nach Operation:
//! - `drawing` — Rohrketten zeichnen (Drawing Engine)
//! - `splice` — Knoten/Pumpen/Ventile in Rohre einspleißen (Splice Engine)
//! - `modify` — Knoten verschieben, Rohre umformen (Modify Engine)
//! - `delete` — Lösch-Kaskaden (externes Delete-Subsystem)
//! - `records` — Import/Export als einfache Datensätze

pub mod delete;
pub mod drawing;
pub mod modify;
pub mod records;
pub mod splice;

use super::state::EditorMode;
use super::AppState;
use crate::app::tools::PipeChainTool;

/// Wechselt den Interaktions-Modus und setzt alle Tool-Zustände zurück.
///
/// Beim Verlassen des Zeichen-Modus werden laufende Ketten und alle
/// transienten Vorschau-Features verworfen.
pub fn set_editor_mode(state: &mut AppState, mode: EditorMode) {
    if state.mode == mode {
        return;
    }

    state.network.remove_transient_features();
    state.drag = Default::default();
    state.mode = mode;

    if mode == EditorMode::Draw {
        // Schwellwerte frisch aus den Optionen übernehmen
        state.chain = PipeChainTool::from_options(&state.options);
        state.chain.arm();
    } else {
        state.chain.disarm();
    }

    log::info!("Interaktions-Modus gewechselt: {:?}", mode);
}
