//! Zuordnung von Intents zu Commands, inkl. Modus-Gating.
//!
//! Zeichen- und Modify-Intents werden nur übersetzt, solange ihr Modus
//! aktiv ist — Handler sind damit genau dann "live", wenn der Koordinator
//! ihren Modus hält, statt von Attach/Detach-Reihenfolgen abzuhängen.

use super::{AppCommand, AppIntent, AppState, EditorMode};

/// Übersetzt einen Intent in null oder mehr Commands.
pub fn map_intent_to_commands(state: &AppState, intent: AppIntent) -> Vec<AppCommand> {
    match intent {
        AppIntent::SetEditorModeRequested { mode } => {
            vec![AppCommand::SetEditorMode { mode }]
        }

        // ── Zeichnen: nur im Draw-Modus ─────────────────────────
        AppIntent::DrawClickRequested { world_pos } => {
            gated(state, EditorMode::Draw, AppCommand::DrawClick { world_pos })
        }
        AppIntent::DrawDoubleClickRequested { world_pos } => gated(
            state,
            EditorMode::Draw,
            AppCommand::DrawDoubleClick { world_pos },
        ),
        AppIntent::DrawHoverMoved { world_pos } => {
            gated(state, EditorMode::Draw, AppCommand::DrawHover { world_pos })
        }
        AppIntent::DrawCancelRequested => gated(state, EditorMode::Draw, AppCommand::DrawCancel),
        AppIntent::DrawBreakRequested => gated(state, EditorMode::Draw, AppCommand::DrawBreak),

        // ── Splice: im Draw-Modus erst Kette schließen ──────────
        AppIntent::InsertNodeOnPipeRequested {
            world_pos,
            node_type,
        } => {
            let insert = AppCommand::InsertNodeOnPipe {
                world_pos,
                node_type,
            };
            if state.mode == EditorMode::Draw && state.chain.has_pending_input() {
                vec![AppCommand::DrawBreak, insert]
            } else {
                vec![insert]
            }
        }
        AppIntent::InsertLinkOnPipeRequested {
            world_pos,
            link_type,
        } => {
            let insert = AppCommand::InsertLinkOnPipe {
                world_pos,
                link_type,
            };
            if state.mode == EditorMode::Draw && state.chain.has_pending_input() {
                vec![AppCommand::DrawBreak, insert]
            } else {
                vec![insert]
            }
        }

        // ── Modify: nur im Modify-Modus ─────────────────────────
        AppIntent::BeginNodeDragRequested { world_pos } => gated(
            state,
            EditorMode::Modify,
            AppCommand::BeginNodeDrag { world_pos },
        ),
        AppIntent::NodeDragMovedRequested { world_pos } => gated(
            state,
            EditorMode::Modify,
            AppCommand::MoveNodeDrag { world_pos },
        ),
        AppIntent::EndNodeDragRequested { world_pos } => gated(
            state,
            EditorMode::Modify,
            AppCommand::EndNodeDrag { world_pos },
        ),
        AppIntent::ReshapePipeVertexRequested {
            pipe_id,
            vertex_index,
            world_pos,
        } => gated(
            state,
            EditorMode::Modify,
            AppCommand::ReshapePipeVertex {
                pipe_id,
                vertex_index,
                world_pos,
            },
        ),

        // ── Externe Kollaborateure: modusunabhängig ─────────────
        AppIntent::DeleteNodeRequested { node_id } => vec![AppCommand::DeleteNode { node_id }],
        AppIntent::DeleteLinkRequested { link_id } => vec![AppCommand::DeleteLink { link_id }],
        AppIntent::UpdateFeaturePropertiesRequested { id, partial } => {
            vec![AppCommand::UpdateFeatureProperties { id, partial }]
        }
        AppIntent::ValidateRequested => vec![AppCommand::Validate],
    }
}

/// Gibt den Command nur zurück, wenn der geforderte Modus aktiv ist.
fn gated(state: &AppState, required: EditorMode, command: AppCommand) -> Vec<AppCommand> {
    if state.mode == required {
        vec![command]
    } else {
        log::debug!(
            "Intent ignoriert: Modus {:?} erforderlich, aktiv ist {:?}",
            required,
            state.mode
        );
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn draw_intents_are_gated_on_draw_mode() {
        let state = AppState::new();
        assert_eq!(state.mode, EditorMode::Select);

        let commands = map_intent_to_commands(
            &state,
            AppIntent::DrawClickRequested {
                world_pos: Vec2::ZERO,
            },
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn modify_intents_are_gated_on_modify_mode() {
        let mut state = AppState::new();
        state.mode = EditorMode::Modify;

        let commands = map_intent_to_commands(
            &state,
            AppIntent::BeginNodeDragRequested {
                world_pos: Vec2::ZERO,
            },
        );
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn validate_is_mode_independent() {
        let state = AppState::new();
        let commands = map_intent_to_commands(&state, AppIntent::ValidateRequested);
        assert!(matches!(commands.as_slice(), [AppCommand::Validate]));
    }
}
