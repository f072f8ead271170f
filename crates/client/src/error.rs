//! Fehlertypen des Client-Stubs

use leihbar_protocol::ProtokollFehler;
use thiserror::Error;

/// Fehler die bei der Arbeit mit dem LeihClient auftreten koennen
#[derive(Debug, Error)]
pub enum ClientFehler {
    /// Verbindungsaufbau fehlgeschlagen (TCP oder welcome blieb aus)
    #[error("Verbindungsaufbau fehlgeschlagen: {0}")]
    Verbindung(String),

    /// Server hat das Kommando mit einer error-Nachricht beantwortet
    #[error("Server-Fehler fuer {name}: {message}")]
    Remote { name: String, message: String },

    /// Antwort kam nicht innerhalb des Anfrage-Timeouts
    #[error("Zeitueberschreitung beim Warten auf die Antwort")]
    Timeout,

    /// Verbindung waehrend einer Anfrage verloren
    #[error("Transportfehler: {0}")]
    Transport(String),

    /// Nachricht konnte nicht kodiert oder dekodiert werden
    #[error(transparent)]
    Protokoll(#[from] ProtokollFehler),

    /// Antwort hatte eine andere Payload-Form als erwartet
    #[error("Unerwartete Antwort: {0}")]
    UnerwarteteAntwort(String),
}

/// Result-Typ des Client-Stubs
pub type ClientResult<T> = Result<T, ClientFehler>;
