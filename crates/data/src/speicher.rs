//! In-Memory-Implementierung des DatenService
//!
//! Haelt den gesamten Bestand in einem RwLock-geschuetzten Inneren.
//! Gedacht fuer den Einzelprozess-Betrieb und fuer Tests, die pro
//! Server-Instanz einen eigenen, unabhaengigen Bestand brauchen.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use leihbar_core::{LaptopId, LaptopRecord, LeihId, LeihRecord, StudentId, StudentRecord};
use parking_lot::RwLock;

use crate::error::{DatenFehler, DatenResult};
use crate::service::DatenService;

#[derive(Default)]
struct Bestand {
    laptops: HashMap<LaptopId, LaptopRecord>,
    studenten: HashMap<StudentId, StudentRecord>,
    leihen: HashMap<LeihId, LeihRecord>,
}

/// In-Memory-Bestand, thread-safe fuer nebenlaeufige Dispatcher-Aufrufe
#[derive(Default)]
pub struct SpeicherDatenService {
    bestand: RwLock<Bestand>,
}

impl SpeicherDatenService {
    /// Erstellt einen leeren Bestand
    pub fn neu() -> Self {
        Self::default()
    }

    /// Fuegt einen Laptop zum Bestand hinzu (Seeding)
    pub fn laptop_hinzufuegen(&self, inventarnummer: &str, modell: &str) -> LaptopRecord {
        let record = LaptopRecord {
            id: LaptopId::new(),
            inventarnummer: inventarnummer.to_string(),
            modell: modell.to_string(),
            verfuegbar: true,
        };
        self.bestand
            .write()
            .laptops
            .insert(record.id, record.clone());
        record
    }

    /// Registriert einen Studenten (Seeding)
    pub fn student_hinzufuegen(&self, name: &str, matrikelnummer: &str) -> StudentRecord {
        let record = StudentRecord {
            id: StudentId::new(),
            name: name.to_string(),
            matrikelnummer: matrikelnummer.to_string(),
        };
        self.bestand
            .write()
            .studenten
            .insert(record.id, record.clone());
        record
    }
}

#[async_trait]
impl DatenService for SpeicherDatenService {
    async fn laptops_auflisten(&self) -> DatenResult<Vec<LaptopRecord>> {
        let mut liste: Vec<_> = self.bestand.read().laptops.values().cloned().collect();
        liste.sort_by(|a, b| a.inventarnummer.cmp(&b.inventarnummer));
        Ok(liste)
    }

    async fn verfuegbare_laptops(&self) -> DatenResult<Vec<LaptopRecord>> {
        let mut liste: Vec<_> = self
            .bestand
            .read()
            .laptops
            .values()
            .filter(|l| l.verfuegbar)
            .cloned()
            .collect();
        liste.sort_by(|a, b| a.inventarnummer.cmp(&b.inventarnummer));
        Ok(liste)
    }

    async fn studenten_auflisten(&self) -> DatenResult<Vec<StudentRecord>> {
        let mut liste: Vec<_> = self.bestand.read().studenten.values().cloned().collect();
        liste.sort_by(|a, b| a.matrikelnummer.cmp(&b.matrikelnummer));
        Ok(liste)
    }

    async fn leihe_anlegen(
        &self,
        student_id: StudentId,
        laptop_id: LaptopId,
    ) -> DatenResult<LeihRecord> {
        let mut bestand = self.bestand.write();

        if !bestand.studenten.contains_key(&student_id) {
            return Err(DatenFehler::StudentNichtGefunden(student_id));
        }

        let laptop = bestand
            .laptops
            .get_mut(&laptop_id)
            .ok_or(DatenFehler::LaptopNichtGefunden(laptop_id))?;
        if !laptop.verfuegbar {
            return Err(DatenFehler::LaptopBereitsVerliehen(laptop_id));
        }
        laptop.verfuegbar = false;

        let leihe = LeihRecord {
            id: LeihId::new(),
            laptop_id,
            student_id,
            ausgeliehen_am: Utc::now(),
            zurueckgegeben_am: None,
        };
        bestand.leihen.insert(leihe.id, leihe.clone());
        Ok(leihe)
    }

    async fn leihe_zurueckgeben(&self, leih_id: LeihId) -> DatenResult<LeihRecord> {
        let mut bestand = self.bestand.write();

        let leihe = bestand
            .leihen
            .get_mut(&leih_id)
            .ok_or(DatenFehler::LeiheNichtGefunden(leih_id))?;
        if leihe.zurueckgegeben_am.is_some() {
            return Err(DatenFehler::LeiheBereitsZurueckgegeben(leih_id));
        }
        leihe.zurueckgegeben_am = Some(Utc::now());
        let leihe = leihe.clone();

        if let Some(laptop) = bestand.laptops.get_mut(&leihe.laptop_id) {
            laptop.verfuegbar = true;
        }
        Ok(leihe)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn leerer_bestand_liefert_leere_listen() {
        let daten = SpeicherDatenService::neu();
        assert!(daten.laptops_auflisten().await.unwrap().is_empty());
        assert!(daten.verfuegbare_laptops().await.unwrap().is_empty());
        assert!(daten.studenten_auflisten().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn leihe_lebenszyklus() {
        let daten = SpeicherDatenService::neu();
        let laptop = daten.laptop_hinzufuegen("IT-0001", "ThinkPad X1");
        let student = daten.student_hinzufuegen("Max Mustermann", "1234567");

        // Ausleihen: Laptop verschwindet aus der Verfuegbar-Liste
        let leihe = daten.leihe_anlegen(student.id, laptop.id).await.unwrap();
        assert!(leihe.ist_offen());
        assert!(daten.verfuegbare_laptops().await.unwrap().is_empty());
        assert_eq!(daten.laptops_auflisten().await.unwrap().len(), 1);

        // Doppelte Ausleihe wird abgelehnt
        let fehler = daten.leihe_anlegen(student.id, laptop.id).await.unwrap_err();
        assert_eq!(fehler, DatenFehler::LaptopBereitsVerliehen(laptop.id));

        // Rueckgabe: Laptop ist wieder verfuegbar
        let geschlossen = daten.leihe_zurueckgeben(leihe.id).await.unwrap();
        assert!(!geschlossen.ist_offen());
        assert_eq!(daten.verfuegbare_laptops().await.unwrap().len(), 1);

        // Doppelte Rueckgabe wird abgelehnt
        let fehler = daten.leihe_zurueckgeben(leihe.id).await.unwrap_err();
        assert_eq!(fehler, DatenFehler::LeiheBereitsZurueckgegeben(leihe.id));
    }

    #[tokio::test]
    async fn leihe_mit_unbekannten_ids() {
        let daten = SpeicherDatenService::neu();
        let laptop = daten.laptop_hinzufuegen("IT-0002", "Latitude 5440");

        let student_id = StudentId::new();
        let fehler = daten.leihe_anlegen(student_id, laptop.id).await.unwrap_err();
        assert_eq!(fehler, DatenFehler::StudentNichtGefunden(student_id));

        let student = daten.student_hinzufuegen("Erika Musterfrau", "7654321");
        let laptop_id = LaptopId::new();
        let fehler = daten.leihe_anlegen(student.id, laptop_id).await.unwrap_err();
        assert_eq!(fehler, DatenFehler::LaptopNichtGefunden(laptop_id));

        let leih_id = LeihId::new();
        let fehler = daten.leihe_zurueckgeben(leih_id).await.unwrap_err();
        assert_eq!(fehler, DatenFehler::LeiheNichtGefunden(leih_id));
    }

    #[tokio::test]
    async fn listen_sind_sortiert() {
        let daten = SpeicherDatenService::neu();
        daten.laptop_hinzufuegen("IT-0002", "B");
        daten.laptop_hinzufuegen("IT-0001", "A");

        let liste = daten.laptops_auflisten().await.unwrap();
        let nummern: Vec<_> = liste.iter().map(|l| l.inventarnummer.as_str()).collect();
        assert_eq!(nummern, vec!["IT-0001", "IT-0002"]);
    }
}
