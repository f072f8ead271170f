//! leihbar-client – Typisierter Client-Stub
//!
//! Kapselt das Wire-Protokoll hinter typisierten Methoden. Ein interner
//! IO-Task besitzt die TCP-Verbindung; Anfragen laufen ueber eine Queue
//! der Tiefe 1, es ist also immer hoechstens ein Kommando in Flug.
//! Server-Events werden unabhaengig davon sofort an Abonnenten zugestellt,
//! auch waehrend eine Anfrage auf ihre Antwort wartet.

pub mod client;
pub mod error;
pub mod events;

// Bequeme Re-Exporte
pub use client::{LeihClient, LeihClientConfig};
pub use error::{ClientFehler, ClientResult};
pub use events::{AboId, Event, EventAbo, WILDCARD};
