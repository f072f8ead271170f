//! leihbar-session – TCP Session- und Kommando-Schicht
//!
//! Dieser Crate implementiert den Session-Service fuer Leihbar. Er nimmt
//! TCP-Verbindungen an, fuehrt pro Verbindung einen Kanal durch seinen
//! Lebenszyklus und routet Kommandos an die Datenschicht.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (SessionServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  Kanal-Lebenszyklus: Verbindet -> Offen -> Schliessend -> Geschlossen
//!     |  welcome-Event beim Oeffnen, danach Kommando/Antwort serialisiert
//!     |
//!     v
//! KommandoDispatcher
//!     |
//!     +-- BestandHandler  (GET_ALL_LAPTOPS, GET_AVAILABLE_LAPTOPS, GET_ALL_STUDENTS)
//!     +-- LeiheHandler    (CREATE_LOAN, RETURN_LAPTOP)
//!
//! EventBroadcaster – inventory_changed an alle offenen Kanaele
//! ```
//!
//! Alle Kollaborateure (DatenService, Broadcaster) werden beim Aufbau des
//! `SessionState` explizit uebergeben; es gibt keinen globalen Zustand.

pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod handlers;
pub mod server_state;
pub mod tcp;

// Bequeme Re-Exporte
pub use broadcast::EventBroadcaster;
pub use connection::ClientConnection;
pub use dispatcher::{DispatchErgebnis, KommandoDispatcher};
pub use server_state::{SessionConfig, SessionState};
pub use tcp::SessionServer;
