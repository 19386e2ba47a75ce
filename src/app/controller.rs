//! Application Controller für zentrale Event-Verarbeitung.

use super::{use_cases, AppCommand, AppIntent, AppState};

/// Orchestriert Eingabe-Intents und Use-Cases auf dem AppState.
///
/// Jede Mutation läuft synchron innerhalb eines `handle_intent`-Aufrufs;
/// zusammengesetzte Operationen (Splice, Delete) schließen ihre komplette
/// Schreibsequenz ab, bevor der Aufruf zurückkehrt.
#[derive(Default)]
pub struct AppController;

impl AppController {
    /// Erstellt einen neuen Controller.
    pub fn new() -> Self {
        Self
    }

    /// Verarbeitet einen Intent über Intent→Command-Mapping.
    pub fn handle_intent(&mut self, state: &mut AppState, intent: AppIntent) -> anyhow::Result<()> {
        let commands = super::intent_mapping::map_intent_to_commands(state, intent);
        for command in commands {
            self.handle_command(state, command)?;
        }

        Ok(())
    }

    /// Führt mutierende Commands auf dem AppState aus.
    /// Dispatcht an die Use-Cases in `use_cases/`.
    pub fn handle_command(
        &mut self,
        state: &mut AppState,
        command: AppCommand,
    ) -> anyhow::Result<()> {
        match command {
            // === Modus ===
            AppCommand::SetEditorMode { mode } => use_cases::set_editor_mode(state, mode),

            // === Zeichnen ===
            AppCommand::DrawClick { world_pos } => use_cases::drawing::click(state, world_pos),
            AppCommand::DrawDoubleClick { world_pos } => {
                use_cases::drawing::double_click(state, world_pos)
            }
            AppCommand::DrawHover { world_pos } => use_cases::drawing::hover(state, world_pos),
            AppCommand::DrawCancel => use_cases::drawing::cancel(state),
            AppCommand::DrawBreak => use_cases::drawing::break_chain(state),

            // === Splice ===
            AppCommand::InsertNodeOnPipe {
                world_pos,
                node_type,
            } => use_cases::splice::insert_node_at(state, world_pos, node_type),
            AppCommand::InsertLinkOnPipe {
                world_pos,
                link_type,
            } => use_cases::splice::insert_link_at(state, world_pos, link_type),

            // === Modify ===
            AppCommand::BeginNodeDrag { world_pos } => {
                use_cases::modify::begin_node_drag(state, world_pos)
            }
            AppCommand::MoveNodeDrag { world_pos } => {
                use_cases::modify::move_node_drag(state, world_pos)
            }
            AppCommand::EndNodeDrag { world_pos } => {
                use_cases::modify::end_node_drag(state, world_pos)
            }
            AppCommand::ReshapePipeVertex {
                pipe_id,
                vertex_index,
                world_pos,
            } => use_cases::modify::reshape_pipe_vertex(state, &pipe_id, vertex_index, world_pos),

            // === Externe Kollaborateure ===
            AppCommand::DeleteNode { node_id } => use_cases::delete::delete_node(state, &node_id),
            AppCommand::DeleteLink { link_id } => use_cases::delete::delete_link(state, &link_id),
            AppCommand::UpdateFeatureProperties { id, partial } => {
                if !state.network.update_feature(&id, &partial) {
                    state.set_status(format!("Feature {} existiert nicht", id));
                }
            }
            AppCommand::Validate => {
                let report = crate::core::validate_network(&state.network);
                log::info!(
                    "Validierung: {} Fehler, {} Warnungen",
                    report.errors.len(),
                    report.warnings.len()
                );
                state.last_validation = Some(report);
            }
        }

        Ok(())
    }
}
