//! Event-Abonnements des Client-Stubs
//!
//! Abonnenten registrieren sich auf einen Event-Namen (oder den Wildcard
//! `*`) und bekommen eine eigene Empfangs-Queue. Zustellung ist
//! best-effort: eine volle Queue verwirft das Event fuer diesen
//! Abonnenten, haelt die uebrigen aber nie auf.

use dashmap::DashMap;
use leihbar_protocol::NutzDaten;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Abonniert jedes Event unabhaengig vom Namen
pub const WILDCARD: &str = "*";

/// Groesse der Empfangs-Queue pro Abonnement
const ABO_QUEUE_GROESSE: usize = 64;

/// Ein vom Server gepushtes Event
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub payload: NutzDaten,
}

/// Kennung eines Abonnements
pub type AboId = u64;

/// Empfangsseite eines Abonnements
pub struct EventAbo {
    id: AboId,
    rx: mpsc::Receiver<Event>,
}

impl EventAbo {
    /// Gibt die Abonnement-Kennung zurueck
    pub fn id(&self) -> AboId {
        self.id
    }

    /// Wartet auf das naechste Event
    ///
    /// `None` wenn das Abonnement beendet oder die Verbindung weg ist.
    pub async fn empfangen(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Holt ein bereits eingetroffenes Event ohne zu warten
    pub fn try_empfangen(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

// ---------------------------------------------------------------------------
// AboRegistry
// ---------------------------------------------------------------------------

struct AboEintrag {
    event_name: String,
    tx: mpsc::Sender<Event>,
}

/// Registry aller Abonnements eines Clients
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand; der
/// IO-Task stellt zu, die Client-Seite registriert.
#[derive(Clone)]
pub(crate) struct AboRegistry {
    inner: Arc<AboRegistryInner>,
}

struct AboRegistryInner {
    naechste_id: AtomicU64,
    abos: DashMap<AboId, AboEintrag>,
}

impl AboRegistry {
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(AboRegistryInner {
                naechste_id: AtomicU64::new(1),
                abos: DashMap::new(),
            }),
        }
    }

    /// Registriert ein Abonnement auf einen Event-Namen
    pub fn abonnieren(&self, event_name: &str) -> EventAbo {
        let id = self.inner.naechste_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(ABO_QUEUE_GROESSE);
        self.inner.abos.insert(
            id,
            AboEintrag {
                event_name: event_name.to_string(),
                tx,
            },
        );
        tracing::debug!(abo = id, event = event_name, "Abonnement registriert");
        EventAbo { id, rx }
    }

    /// Entfernt ein Abonnement
    pub fn abbestellen(&self, id: AboId) {
        self.inner.abos.remove(&id);
        tracing::debug!(abo = id, "Abonnement entfernt");
    }

    /// Beendet alle Abonnements
    ///
    /// Entfernt jeden Eintrag und droppt damit dessen Sender; jede
    /// Empfangs-Queue endet daraufhin mit `None`.
    pub fn schliessen(&self) {
        self.inner.abos.clear();
        tracing::debug!("Alle Abonnements beendet");
    }

    /// Stellt ein Event an alle passenden Abonnements zu
    pub fn zustellen(&self, event: Event) {
        // Aufgegebene Abonnements (Receiver gedroppt) aufraeumen
        self.inner.abos.retain(|_, eintrag| !eintrag.tx.is_closed());

        for eintrag in self.inner.abos.iter() {
            if eintrag.event_name != WILDCARD && eintrag.event_name != event.name {
                continue;
            }
            if eintrag.tx.try_send(event.clone()).is_err() {
                tracing::warn!(event = %event.name, "Abo-Queue voll – Event verworfen");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
