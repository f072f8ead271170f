//! DatenService-Trait – Schnittstelle zur Bestandsverwaltung
//!
//! Der Session-Kern behandelt den DatenService als externen Kollaborateur:
//! er reicht Aufrufe unveraendert durch und fuegt keine eigene
//! Synchronisation hinzu. Implementierungen muessen deshalb fuer
//! nebenlaeufige Aufrufe aus mehreren Verbindungs-Tasks sicher sein.

use async_trait::async_trait;
use leihbar_core::{LaptopId, LaptopRecord, LeihId, LeihRecord, StudentId, StudentRecord};

use crate::error::DatenResult;

/// Schnittstelle die der Kommando-Dispatcher konsumiert
#[async_trait]
pub trait DatenService: Send + Sync {
    /// Alle Laptops im Bestand
    async fn laptops_auflisten(&self) -> DatenResult<Vec<LaptopRecord>>;

    /// Nur aktuell verfuegbare Laptops
    async fn verfuegbare_laptops(&self) -> DatenResult<Vec<LaptopRecord>>;

    /// Alle registrierten Studenten
    async fn studenten_auflisten(&self) -> DatenResult<Vec<StudentRecord>>;

    /// Legt eine neue Leihe an und markiert den Laptop als verliehen
    async fn leihe_anlegen(
        &self,
        student_id: StudentId,
        laptop_id: LaptopId,
    ) -> DatenResult<LeihRecord>;

    /// Schliesst eine offene Leihe und gibt den Laptop wieder frei
    async fn leihe_zurueckgeben(&self, leih_id: LeihId) -> DatenResult<LeihRecord>;
}
