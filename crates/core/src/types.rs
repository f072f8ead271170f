//! Gemeinsame Identifikationstypen fuer Leihbar
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Laptop-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaptopId(pub Uuid);

impl LaptopId {
    /// Erstellt eine neue zufaellige LaptopId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for LaptopId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LaptopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "laptop:{}", self.0)
    }
}

/// Eindeutige Studenten-ID (Entleiher)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(pub Uuid);

impl StudentId {
    /// Erstellt eine neue zufaellige StudentId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "student:{}", self.0)
    }
}

/// Eindeutige Leihvorgang-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeihId(pub Uuid);

impl LeihId {
    /// Erstellt eine neue zufaellige LeihId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for LeihId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LeihId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "leihe:{}", self.0)
    }
}

/// Eindeutige Verbindungs-ID eines Session-Kanals
///
/// Wird pro akzeptierter TCP-Verbindung vergeben und solange die Verbindung
/// registriert ist nicht wiederverwendet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerbindungsId(pub Uuid);

impl VerbindungsId {
    /// Erstellt eine neue zufaellige VerbindungsId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for VerbindungsId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VerbindungsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "verbindung:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn laptop_id_eindeutig() {
        let a = LaptopId::new();
        let b = LaptopId::new();
        assert_ne!(a, b, "Zwei neue LaptopIds muessen verschieden sein");
    }

    #[test]
    fn verbindungs_id_eindeutig() {
        let a = VerbindungsId::new();
        let b = VerbindungsId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn leih_id_display() {
        let id = LeihId(Uuid::nil());
        assert!(id.to_string().starts_with("leihe:"));
    }

    #[test]
    fn ids_sind_serde_kompatibel() {
        let sid = StudentId::new();
        let json = serde_json::to_string(&sid).unwrap();
        let sid2: StudentId = serde_json::from_str(&json).unwrap();
        assert_eq!(sid, sid2);
    }
}
