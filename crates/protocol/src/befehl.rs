//! Kommando-Tabelle – explizite Abbildung von Kommandonamen auf Payload-Formen
//!
//! Die Tabelle ist die einzige Stelle die Kommandonamen kennt. Aufloesen
//! validiert die Argumente gegen die erwartete Form; ein unbekannter Name
//! wird zu `BefehlFehler::Unbekannt` mit dem Namen im Fehlertext und
//! erreicht nie die Handler. Neue Kommandos brauchen einen Eintrag im Enum,
//! in `parse` und in `name`.

use leihbar_core::{LaptopId, LeihId, StudentId};
use serde::{Deserialize, Serialize};

use crate::nachricht::{ProtokollFehler, WireNachricht};

// ---------------------------------------------------------------------------
// Kommandonamen
// ---------------------------------------------------------------------------

pub const CMD_GET_ALL_LAPTOPS: &str = "GET_ALL_LAPTOPS";
pub const CMD_GET_AVAILABLE_LAPTOPS: &str = "GET_AVAILABLE_LAPTOPS";
pub const CMD_GET_ALL_STUDENTS: &str = "GET_ALL_STUDENTS";
pub const CMD_CREATE_LOAN: &str = "CREATE_LOAN";
pub const CMD_RETURN_LAPTOP: &str = "RETURN_LAPTOP";

// ---------------------------------------------------------------------------
// Argument-Formen
// ---------------------------------------------------------------------------

/// Argumente fuer CREATE_LOAN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLoanArgs {
    pub student_id: StudentId,
    pub laptop_id: LaptopId,
}

/// Argumente fuer RETURN_LAPTOP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnLaptopArgs {
    pub leih_id: LeihId,
}

// ---------------------------------------------------------------------------
// Befehl
// ---------------------------------------------------------------------------

/// Geparstes, typisiertes Kommando
#[derive(Debug, Clone, PartialEq)]
pub enum Befehl {
    GetAllLaptops,
    GetAvailableLaptops,
    GetAllStudents,
    CreateLoan(CreateLoanArgs),
    ReturnLaptop(ReturnLaptopArgs),
}

/// Fehler beim Aufloesen eines Kommandos gegen die Tabelle
#[derive(Debug, thiserror::Error)]
pub enum BefehlFehler {
    /// Name ist in der Kommando-Tabelle nicht vorhanden
    #[error("Unbekanntes Kommando: {0}")]
    Unbekannt(String),

    /// Payload passt nicht zur Form des Kommandos
    #[error(transparent)]
    Protokoll(#[from] ProtokollFehler),
}

impl Befehl {
    /// Loest `(name, payload)` gegen die Kommando-Tabelle auf
    pub fn parse(name: &str, payload: &serde_json::Value) -> Result<Self, BefehlFehler> {
        match name {
            CMD_GET_ALL_LAPTOPS => Ok(Self::GetAllLaptops),
            CMD_GET_AVAILABLE_LAPTOPS => Ok(Self::GetAvailableLaptops),
            CMD_GET_ALL_STUDENTS => Ok(Self::GetAllStudents),
            CMD_CREATE_LOAN => Ok(Self::CreateLoan(args(name, payload)?)),
            CMD_RETURN_LAPTOP => Ok(Self::ReturnLaptop(args(name, payload)?)),
            unbekannt => Err(BefehlFehler::Unbekannt(unbekannt.to_string())),
        }
    }

    /// Gibt den Wire-Namen des Kommandos zurueck
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetAllLaptops => CMD_GET_ALL_LAPTOPS,
            Self::GetAvailableLaptops => CMD_GET_AVAILABLE_LAPTOPS,
            Self::GetAllStudents => CMD_GET_ALL_STUDENTS,
            Self::CreateLoan(_) => CMD_CREATE_LOAN,
            Self::ReturnLaptop(_) => CMD_RETURN_LAPTOP,
        }
    }

    /// Ob das Kommando den Bestand veraendert (loest `inventory_changed` aus)
    pub fn ist_mutierend(&self) -> bool {
        matches!(self, Self::CreateLoan(_) | Self::ReturnLaptop(_))
    }

    /// Baut den Command-Frame fuer den Versand durch den Client
    pub fn zu_frame(&self) -> Result<WireNachricht, ProtokollFehler> {
        let payload = match self {
            Self::GetAllLaptops | Self::GetAvailableLaptops | Self::GetAllStudents => {
                serde_json::Value::Null
            }
            Self::CreateLoan(args) => serde_json::to_value(args)?,
            Self::ReturnLaptop(args) => serde_json::to_value(args)?,
        };
        Ok(WireNachricht::Command {
            name: self.name().to_string(),
            payload,
        })
    }
}

fn args<T: serde::de::DeserializeOwned>(
    name: &str,
    payload: &serde_json::Value,
) -> Result<T, BefehlFehler> {
    serde_json::from_value(payload.clone()).map_err(|e| {
        BefehlFehler::Protokoll(ProtokollFehler::UngueltigePayload {
            name: name.to_string(),
            grund: e.to_string(),
        })
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abfrage_kommandos_ohne_argumente() {
        let befehl = Befehl::parse(CMD_GET_ALL_LAPTOPS, &serde_json::Value::Null).unwrap();
        assert_eq!(befehl, Befehl::GetAllLaptops);
        assert!(!befehl.ist_mutierend());
    }

    #[test]
    fn create_loan_mit_argumenten() {
        let args = CreateLoanArgs {
            student_id: StudentId::new(),
            laptop_id: LaptopId::new(),
        };
        let payload = serde_json::to_value(&args).unwrap();
        let befehl = Befehl::parse(CMD_CREATE_LOAN, &payload).unwrap();
        assert_eq!(befehl, Befehl::CreateLoan(args));
        assert!(befehl.ist_mutierend());
    }

    #[test]
    fn unbekannter_name_traegt_den_namen() {
        let fehler = Befehl::parse("NOPE", &serde_json::Value::Null).unwrap_err();
        match &fehler {
            BefehlFehler::Unbekannt(name) => assert_eq!(name, "NOPE"),
            andere => panic!("Erwartet Unbekannt, erhalten: {andere:?}"),
        }
        assert!(fehler.to_string().contains("NOPE"));
    }

    #[test]
    fn falsche_payload_form_ist_protokollfehler() {
        let payload = serde_json::json!({ "student_id": 42 });
        let fehler = Befehl::parse(CMD_CREATE_LOAN, &payload).unwrap_err();
        assert!(matches!(fehler, BefehlFehler::Protokoll(_)));
        assert!(fehler.to_string().contains(CMD_CREATE_LOAN));
    }

    #[test]
    fn frame_roundtrip_ueber_die_tabelle() {
        let original = Befehl::ReturnLaptop(ReturnLaptopArgs {
            leih_id: LeihId::new(),
        });
        let frame = original.zu_frame().unwrap();
        match frame {
            WireNachricht::Command { name, payload } => {
                let geparst = Befehl::parse(&name, &payload).unwrap();
                assert_eq!(original, geparst);
            }
            andere => panic!("Erwartet Command, erhalten: {andere:?}"),
        }
    }
}
