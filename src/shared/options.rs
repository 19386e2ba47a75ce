//! Zentrale Konfiguration für den Wassernetz-Editor.
//!
//! `EditorOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.
//!
//! Alle Toleranzen und Schwellwerte sind in Welteinheiten (Meter) definiert —
//! es gibt bewusst keine Screen-Pixel-Toleranzen, damit Snapping und
//! Längen-Schwellwerte nicht relativ zueinander mit dem Zoom driften.

use serde::{Deserialize, Serialize};

// ── Snapping & Hit-Test ─────────────────────────────────────────────

/// Snap-Radius (Welteinheiten): Klick innerhalb dieses Radius rastet auf
/// einen existierenden Knoten ein.
pub const SNAP_RADIUS: f32 = 3.0;
/// Toleranz für Treffer auf Rohr-Polylinien (Drop-onto-Pipe, Splice-Picks).
pub const PIPE_HIT_TOLERANCE: f32 = 1.5;

// ── Zeichnen ────────────────────────────────────────────────────────

/// Minimaler Abstand zwischen zwei aufeinanderfolgenden Stützpunkten.
pub const MIN_SEGMENT_LENGTH: f32 = 0.5;
/// Minimale Gesamtlänge eines Rohrs beim Abschluss einer Kette.
pub const MIN_PIPE_LENGTH: f32 = 1.0;
/// Maximale Anzahl Stützpunkte pro Rohrkette.
pub const MAX_CHAIN_VERTICES: usize = 100;

// ── Splice ──────────────────────────────────────────────────────────

/// Toleranz, innerhalb derer ein Split auf einen existierenden
/// Zwischen-Stützpunkt zusammenfällt statt einen neuen einzufügen.
pub const VERTEX_MERGE_TOLERANCE: f32 = 0.25;
/// Halber Abstand der beiden Flanken-Junctions einer Pumpe/eines Ventils
/// vom projizierten Einfügepunkt.
pub const LINK_HALF_LENGTH: f32 = 1.0;

// ── Validierung ─────────────────────────────────────────────────────

/// Toleranz, innerhalb derer ein Knoten eine Rohr-Kreuzung "abdeckt".
pub const CROSSING_NODE_TOLERANCE: f32 = 0.1;
/// Float-Toleranz für Koordinatenvergleiche (Endpunkt == Knotenposition).
pub const COORD_EPSILON: f32 = 1e-4;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Editor-Optionen.
/// Wird als `waternet_editor.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorOptions {
    // ── Snapping & Hit-Test ─────────────────────────────────────
    /// Snap-Radius (Welteinheiten) für Knoten-Picks
    pub snap_radius: f32,
    /// Toleranz für Treffer auf Rohr-Polylinien
    pub pipe_hit_tolerance: f32,

    // ── Zeichnen ────────────────────────────────────────────────
    /// Minimaler Abstand zwischen aufeinanderfolgenden Stützpunkten
    pub min_segment_length: f32,
    /// Minimale Gesamtlänge eines Rohrs
    pub min_pipe_length: f32,
    /// Maximale Anzahl Stützpunkte pro Kette
    pub max_chain_vertices: usize,

    // ── Splice ──────────────────────────────────────────────────
    /// Toleranz für Split auf existierenden Stützpunkt
    pub vertex_merge_tolerance: f32,
    /// Halber Flanken-Abstand für Pumpen/Ventile
    pub link_half_length: f32,

    // ── Modify ──────────────────────────────────────────────────
    /// Knoten beim Ablegen auf ein fremdes Rohr automatisch einspleißen
    #[serde(default = "default_auto_split_on_drop")]
    pub auto_split_on_drop: bool,

    // ── Validierung ─────────────────────────────────────────────
    /// Toleranz für Knoten auf Rohr-Kreuzungen
    pub crossing_node_tolerance: f32,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            snap_radius: SNAP_RADIUS,
            pipe_hit_tolerance: PIPE_HIT_TOLERANCE,
            min_segment_length: MIN_SEGMENT_LENGTH,
            min_pipe_length: MIN_PIPE_LENGTH,
            max_chain_vertices: MAX_CHAIN_VERTICES,
            vertex_merge_tolerance: VERTEX_MERGE_TOLERANCE,
            link_half_length: LINK_HALF_LENGTH,
            auto_split_on_drop: true,
            crossing_node_tolerance: CROSSING_NODE_TOLERANCE,
        }
    }
}

/// Serde-Default für `auto_split_on_drop` (Abwärtskompatibilität).
fn default_auto_split_on_drop() -> bool {
    true
}

impl EditorOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("waternet_editor"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("waternet_editor.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_consistent() {
        let opts = EditorOptions::default();
        // Segment-Minimum darf die Rohr-Mindestlänge nicht überschreiten,
        // sonst wäre jede Ein-Segment-Kette unzulässig.
        assert!(opts.min_segment_length <= opts.min_pipe_length);
        assert!(opts.link_half_length > 0.0);
    }

    #[test]
    fn options_roundtrip_toml() {
        let opts = EditorOptions {
            snap_radius: 5.0,
            auto_split_on_drop: false,
            ..EditorOptions::default()
        };
        let text = toml::to_string_pretty(&opts).expect("TOML-Serialisierung");
        let parsed: EditorOptions = toml::from_str(&text).expect("TOML-Parse");
        assert_eq!(parsed.snap_radius, 5.0);
        assert!(!parsed.auto_split_on_drop);
    }
}
