//! Kommando-Dispatcher – Routet Kommandos an die richtigen Handler
//!
//! Der Dispatcher loest `(name, payload)` gegen die Kommando-Tabelle auf,
//! ruft den passenden Handler und gibt genau eine Antwort zurueck –
//! result bei Erfolg, error bei unbekanntem Namen, ungueltiger Payload
//! oder Domaenenfehler. Kein Kommando-Pfad schliesst den Kanal.
//!
//! Mutierende Kommandos liefern zusaetzlich das `inventory_changed`-Event,
//! das die ClientConnection NACH der Antwort an den Broadcaster gibt. So
//! sieht der Ausloeser sein Event garantiert erst nach der eigenen Antwort.

use leihbar_data::DatenService;
use leihbar_protocol::{Befehl, NutzDaten, WireNachricht, EVENT_INVENTORY_CHANGED};
use std::sync::Arc;

use crate::handlers::{bestand_handler, leihe_handler};
use crate::server_state::SessionState;

/// Ergebnis eines Dispatch-Durchlaufs
///
/// `antwort` geht nur an den Ausloeser; `broadcast` (wenn gesetzt) danach
/// an alle offenen Kanaele.
#[derive(Debug)]
pub struct DispatchErgebnis {
    pub antwort: WireNachricht,
    pub broadcast: Option<WireNachricht>,
}

/// Zentraler Kommando-Dispatcher
pub struct KommandoDispatcher<D>
where
    D: DatenService + 'static,
{
    state: Arc<SessionState<D>>,
}

impl<D> KommandoDispatcher<D>
where
    D: DatenService + 'static,
{
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<SessionState<D>>) -> Self {
        Self { state }
    }

    /// Verarbeitet ein eingehendes Kommando und gibt das Ergebnis zurueck
    pub async fn dispatch(&self, name: &str, payload: &serde_json::Value) -> DispatchErgebnis {
        let befehl = match Befehl::parse(name, payload) {
            Ok(befehl) => befehl,
            Err(e) => {
                tracing::debug!(kommando = name, fehler = %e, "Kommando nicht aufloesbar");
                return DispatchErgebnis {
                    antwort: WireNachricht::fehler(name, e.to_string()),
                    broadcast: None,
                };
            }
        };

        let kommando_name = befehl.name();
        let daten = self.state.daten.as_ref();

        let ergebnis = match &befehl {
            Befehl::GetAllLaptops => bestand_handler::alle_laptops(daten).await,
            Befehl::GetAvailableLaptops => bestand_handler::verfuegbare_laptops(daten).await,
            Befehl::GetAllStudents => bestand_handler::alle_studenten(daten).await,
            Befehl::CreateLoan(args) => leihe_handler::leihe_anlegen(daten, args).await,
            Befehl::ReturnLaptop(args) => leihe_handler::laptop_zurueckgeben(daten, args).await,
        };

        match ergebnis {
            Ok(payload) => {
                let broadcast = befehl.ist_mutierend().then(|| {
                    WireNachricht::event(
                        EVENT_INVENTORY_CHANGED,
                        NutzDaten::Text(kommando_name.to_string()),
                    )
                });
                DispatchErgebnis {
                    antwort: WireNachricht::result(kommando_name, payload),
                    broadcast,
                }
            }
            Err(e) => {
                tracing::debug!(kommando = kommando_name, fehler = %e, "Domaenenfehler");
                DispatchErgebnis {
                    antwort: WireNachricht::fehler(kommando_name, e.to_string()),
                    broadcast: None,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
