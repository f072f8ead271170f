//! leihbar-core – Gemeinsame Typen fuer das Leihbar-Ausleihsystem
//!
//! Enthaelt die Newtype-IDs und die Domaenen-Records, die von Protokoll,
//! Datenschicht, Session-Kern und Client gemeinsam verwendet werden.

pub mod models;
pub mod types;

// Bequeme Re-Exporte
pub use models::{LaptopRecord, LeihRecord, StudentRecord};
pub use types::{LaptopId, LeihId, StudentId, VerbindungsId};
