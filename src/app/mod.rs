//! Applikationsschicht: Zustand, Intents, Controller und Werkzeuge.
//!
//! Der Fluss ist strikt einspurig: rohe `AppIntent`s werden per
//! [`intent_mapping`] modusabhängig in `AppCommand`s übersetzt, der
//! [`AppController`] führt sie über Use-Case-Funktionen aus. Nur die
//! Use-Cases mutieren den Netz-Speicher.

pub mod controller;
pub mod events;
pub mod intent_mapping;
pub mod state;
pub mod tools;
pub mod use_cases;

pub use controller::AppController;
pub use events::{AppCommand, AppIntent};
pub use state::{AppState, DragState, EditorMode, SelectionState};
