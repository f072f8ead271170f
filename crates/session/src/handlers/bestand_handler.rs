//! Bestand-Handler – Abfrage-Kommandos ueber Laptops und Studenten

use leihbar_data::{DatenResult, DatenService};
use leihbar_protocol::NutzDaten;

/// GET_ALL_LAPTOPS
pub async fn alle_laptops<D: DatenService>(daten: &D) -> DatenResult<NutzDaten> {
    let laptops = daten.laptops_auflisten().await?;
    Ok(NutzDaten::LaptopListe(laptops))
}

/// GET_AVAILABLE_LAPTOPS
pub async fn verfuegbare_laptops<D: DatenService>(daten: &D) -> DatenResult<NutzDaten> {
    let laptops = daten.verfuegbare_laptops().await?;
    Ok(NutzDaten::LaptopListe(laptops))
}

/// GET_ALL_STUDENTS
pub async fn alle_studenten<D: DatenService>(daten: &D) -> DatenResult<NutzDaten> {
    let studenten = daten.studenten_auflisten().await?;
    Ok(NutzDaten::StudentListe(studenten))
}
