//! Fehlertypen der Datenschicht

use leihbar_core::{LaptopId, LeihId, StudentId};
use thiserror::Error;

/// Domaenenfehler der Datenschicht
///
/// Alle Varianten sind fuer den Client wiederherstellbar: der Dispatcher
/// uebersetzt sie in eine error-Nachricht mit Klartext, der Kanal bleibt
/// offen.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatenFehler {
    #[error("Laptop nicht gefunden: {0}")]
    LaptopNichtGefunden(LaptopId),

    #[error("Student nicht gefunden: {0}")]
    StudentNichtGefunden(StudentId),

    #[error("Leihe nicht gefunden: {0}")]
    LeiheNichtGefunden(LeihId),

    #[error("Laptop bereits verliehen: {0}")]
    LaptopBereitsVerliehen(LaptopId),

    #[error("Leihe bereits zurueckgegeben: {0}")]
    LeiheBereitsZurueckgegeben(LeihId),
}

/// Result-Typ der Datenschicht
pub type DatenResult<T> = Result<T, DatenFehler>;
