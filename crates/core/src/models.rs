//! Domaenen-Records des Ausleihsystems
//!
//! Records sind reine Datentraeger ohne Verhalten. Sie werden unveraendert
//! ueber das Wire-Format serialisiert; alle Typen sind deshalb `PartialEq`
//! damit Encode/Decode-Roundtrips exakt pruefbar sind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LaptopId, LeihId, StudentId};

/// Ein verleihbarer Laptop im Bestand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaptopRecord {
    pub id: LaptopId,
    /// Inventarnummer (z.B. "IT-0042")
    pub inventarnummer: String,
    /// Hersteller und Modell
    pub modell: String,
    /// Ob der Laptop aktuell ausleihbar ist
    pub verfuegbar: bool,
}

/// Ein registrierter Student (Entleiher)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    /// Matrikelnummer
    pub matrikelnummer: String,
}

/// Ein Leihvorgang
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeihRecord {
    pub id: LeihId,
    pub laptop_id: LaptopId,
    pub student_id: StudentId,
    pub ausgeliehen_am: DateTime<Utc>,
    /// None solange die Leihe offen ist
    pub zurueckgegeben_am: Option<DateTime<Utc>>,
}

impl LeihRecord {
    /// Ob der Laptop noch nicht zurueckgegeben wurde
    pub fn ist_offen(&self) -> bool {
        self.zurueckgegeben_am.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leih_record_offen_und_geschlossen() {
        let mut leihe = LeihRecord {
            id: LeihId::new(),
            laptop_id: LaptopId::new(),
            student_id: StudentId::new(),
            ausgeliehen_am: Utc::now(),
            zurueckgegeben_am: None,
        };
        assert!(leihe.ist_offen());

        leihe.zurueckgegeben_am = Some(Utc::now());
        assert!(!leihe.ist_offen());
    }

    #[test]
    fn records_sind_serde_kompatibel() {
        let laptop = LaptopRecord {
            id: LaptopId::new(),
            inventarnummer: "IT-0007".into(),
            modell: "ThinkPad T14".into(),
            verfuegbar: true,
        };
        let json = serde_json::to_string(&laptop).unwrap();
        let laptop2: LaptopRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(laptop, laptop2);
    }
}
