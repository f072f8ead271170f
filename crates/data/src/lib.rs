//! leihbar-data – Datenschicht des Ausleihsystems
//!
//! Definiert den `DatenService`-Trait, den der Session-Kern als externen
//! Kollaborateur konsumiert, sowie eine In-Memory-Implementierung fuer den
//! Einzelprozess-Betrieb und fuer isolierte Tests.

pub mod error;
pub mod service;
pub mod speicher;

// Bequeme Re-Exporte
pub use error::{DatenFehler, DatenResult};
pub use service::DatenService;
pub use speicher::SpeicherDatenService;
