//! leihbar-protocol – Wire-Format des Leihbar-Session-Protokolls
//!
//! Definiert alles was die TCP-Verbindung zwischen Client und Server
//! kreuzt: den Nachrichten-Umschlag (`WireNachricht`), die feste Menge der
//! Payload-Formen (`NutzDaten`), die Kommando-Tabelle (`Befehl`) und das
//! Frame-Format (`FrameCodec`, u32 BE Laenge + JSON).
//!
//! ## Design
//! - `kind` + `name` bestimmen allein wie eine Payload zu interpretieren
//!   ist; es gibt keine Schema-Aushandlung pro Nachricht.
//! - Die Kommando-Tabelle bildet Namen explizit auf Payload-Formen ab und
//!   validiert beim Aufloesen, nicht erst zur Laufzeit im Handler.
//! - Encode/Decode sind exakte Umkehrungen: `decode(encode(m)) == m` fuer
//!   jede gueltige Nachricht.

pub mod befehl;
pub mod nachricht;
pub mod wire;

// Bequeme Re-Exporte
pub use befehl::{Befehl, BefehlFehler, CreateLoanArgs, ReturnLaptopArgs};
pub use nachricht::{
    NutzDaten, ProtokollFehler, SitzungsInfo, WireNachricht, EVENT_INVENTORY_CHANGED,
    EVENT_WELCOME,
};
pub use wire::{FrameCodec, DEFAULT_MAX_FRAME_SIZE};
