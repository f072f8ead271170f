//! Wire-Nachrichten des Leihbar-Protokolls
//!
//! Jede Nachricht ist ein Umschlag mit `kind`-Diskriminator ("command",
//! "result", "error", "event"), einem Namen und einer kind-abhaengigen
//! Payload. Command-Payloads bleiben im Umschlag roh (`serde_json::Value`)
//! und werden erst gegen die Kommando-Tabelle validiert – so wird ein
//! unbekannter Kommandoname zu einem Fehler mit dem Namen im Text statt zu
//! einem Deserialisierungsfehler.
//!
//! ## Richtungen
//! - `command`: nur Client -> Server
//! - `result` / `error`: nur Server -> Client, genau eine pro Kommando,
//!   in Anfrage-Reihenfolge
//! - `event`: nur Server -> Client, jederzeit, ohne Bezug zu einer Anfrage

use leihbar_core::{LaptopRecord, LeihRecord, StudentRecord, VerbindungsId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Event-Namen
// ---------------------------------------------------------------------------

/// Einmal pro Verbindung, unmittelbar nach dem Oeffnen des Kanals
pub const EVENT_WELCOME: &str = "welcome";

/// An alle offenen Kanaele nach einem erfolgreichen mutierenden Kommando
pub const EVENT_INVENTORY_CHANGED: &str = "inventory_changed";

// ---------------------------------------------------------------------------
// Fehler
// ---------------------------------------------------------------------------

/// Fehler beim Dekodieren einer Wire-Nachricht
#[derive(Debug, Error)]
pub enum ProtokollFehler {
    /// Frame ist kein gueltiger Nachrichten-Umschlag
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(#[from] serde_json::Error),

    /// Payload passt nicht zur Form die der Name verlangt
    #[error("Ungueltige Payload fuer {name}: {grund}")]
    UngueltigePayload { name: String, grund: String },
}

// ---------------------------------------------------------------------------
// Payload-Formen
// ---------------------------------------------------------------------------

/// Sitzungs-Metadaten, vom Server im `welcome`-Event vergeben
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitzungsInfo {
    pub verbindungs_id: VerbindungsId,
    pub server_name: String,
    pub server_version: String,
}

/// Feste Menge der Payload-Formen die das Protokoll transportiert
///
/// `kind` + `name` des Umschlags bestimmen welche Form erwartet wird;
/// die Form selbst ist zusaetzlich getaggt damit Decoding ohne Kontext
/// eindeutig ist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum NutzDaten {
    Laptop(LaptopRecord),
    LaptopListe(Vec<LaptopRecord>),
    Student(StudentRecord),
    StudentListe(Vec<StudentRecord>),
    Leihe(LeihRecord),
    Sitzung(SitzungsInfo),
    Text(String),
    Leer,
}

// ---------------------------------------------------------------------------
// Nachrichten-Umschlag
// ---------------------------------------------------------------------------

/// Der Umschlag der in beide Richtungen ueber die Verbindung geht
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WireNachricht {
    /// Kommando vom Client; Payload roh, Validierung in der Kommando-Tabelle
    Command {
        name: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
    /// Erfolgreiche Antwort auf genau ein Kommando
    Result { name: String, payload: NutzDaten },
    /// Fehler-Antwort auf genau ein Kommando
    Error { name: String, message: String },
    /// Asynchron gepushtes Event ohne Bezug zu einer Anfrage
    Event { name: String, payload: NutzDaten },
}

impl WireNachricht {
    /// Erstellt eine Result-Nachricht
    pub fn result(name: impl Into<String>, payload: NutzDaten) -> Self {
        Self::Result {
            name: name.into(),
            payload,
        }
    }

    /// Erstellt eine Error-Nachricht
    pub fn fehler(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Erstellt eine Event-Nachricht
    pub fn event(name: impl Into<String>, payload: NutzDaten) -> Self {
        Self::Event {
            name: name.into(),
            payload,
        }
    }

    /// Gibt den Kommando- bzw. Event-Namen der Nachricht zurueck
    pub fn name(&self) -> &str {
        match self {
            Self::Command { name, .. }
            | Self::Result { name, .. }
            | Self::Error { name, .. }
            | Self::Event { name, .. } => name,
        }
    }

    /// Serialisiert die Nachricht als JSON-Bytes (ohne Laengen-Prefix)
    pub fn encode(&self) -> Result<Vec<u8>, ProtokollFehler> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Dekodiert eine Nachricht aus JSON-Bytes
    ///
    /// Ein unbekannter `kind`-Diskriminator oder eine Payload die nicht zur
    /// Form passt ergibt einen `ProtokollFehler` – niemals einen Abbruch der
    /// Leseschleife des aufrufenden Kanals.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtokollFehler> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
