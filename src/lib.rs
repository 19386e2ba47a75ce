//! Topologie-Editor-Engine für Wasserverteilnetze.
//!
//! Kernstück ist der [`core::NetworkStore`] mit Knoten (Junctions, Tanks,
//! Reservoirs) und Links (Rohre, Pumpen, Ventile) samt räumlichem Index.
//! Die Applikationsschicht ([`app`]) übersetzt rohe Eingaben modusabhängig
//! in Kommandos und führt sie über Use-Cases aus: Rohrketten zeichnen,
//! Features in Rohre einspleißen, Knoten ziehen, Netze validieren.

pub mod app;
pub mod core;
pub mod shared;

pub use app::{AppController, AppIntent, AppState, EditorMode};
pub use core::{NetworkStore, ValidationReport};
pub use shared::EditorOptions;
