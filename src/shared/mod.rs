//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält Konstanten und Optionen, die von `core` und `app`
//! gleichermaßen genutzt werden, ohne Zirkel-Abhängigkeiten zu erzeugen.

pub mod options;

pub use options::EditorOptions;
pub use options::{COORD_EPSILON, LINK_HALF_LENGTH, PIPE_HIT_TOLERANCE, SNAP_RADIUS};
