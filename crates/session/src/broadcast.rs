//! Event-Broadcaster – Sendet Events an alle offenen Kanaele
//!
//! Der EventBroadcaster verwaltet die Send-Queues aller offenen Verbindungen.
//! Ein Kanal wird beim Oeffnen registriert und beim Schliessen entfernt;
//! die Registrierung IST die Menge der offenen Kanaele.
//!
//! ## Zustellgarantie
//! Best-effort und nicht-blockierend: ein voller oder geschlossener
//! Empfaenger wird uebersprungen und haelt die uebrigen Kanaele nie auf.

use dashmap::DashMap;
use leihbar_core::VerbindungsId;
use leihbar_protocol::WireNachricht;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Verbindung
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// VerbindungsSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue eines offenen Kanals
#[derive(Clone, Debug)]
pub struct VerbindungsSender {
    pub verbindungs_id: VerbindungsId,
    pub tx: mpsc::Sender<WireNachricht>,
}

impl VerbindungsSender {
    /// Sendet eine Nachricht nicht-blockierend an den Kanal
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, nachricht: WireNachricht) -> bool {
        match self.tx.try_send(nachricht) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    verbindung = %self.verbindungs_id,
                    "Send-Queue voll – Event verworfen"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(
                    verbindung = %self.verbindungs_id,
                    "Send-Queue geschlossen (Kanal getrennt)"
                );
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Zentraler Event-Broadcaster fuer alle offenen Kanaele
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct EventBroadcaster {
    inner: Arc<EventBroadcasterInner>,
}

struct EventBroadcasterInner {
    /// Send-Queues, indiziert nach VerbindungsId
    verbindungen: DashMap<VerbindungsId, VerbindungsSender>,
}

impl EventBroadcaster {
    /// Erstellt einen neuen EventBroadcaster
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(EventBroadcasterInner {
                verbindungen: DashMap::new(),
            }),
        }
    }

    /// Registriert einen Kanal und gibt seine Empfangs-Queue zurueck
    ///
    /// Die `ClientConnection` liest aus dieser Queue und sendet via TCP.
    pub fn verbindung_registrieren(
        &self,
        verbindungs_id: VerbindungsId,
    ) -> mpsc::Receiver<WireNachricht> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        let sender = VerbindungsSender { verbindungs_id, tx };
        self.inner.verbindungen.insert(verbindungs_id, sender);
        tracing::debug!(verbindung = %verbindungs_id, "Kanal im Broadcaster registriert");
        rx
    }

    /// Entfernt einen Kanal aus dem Broadcaster
    pub fn verbindung_entfernen(&self, verbindungs_id: &VerbindungsId) {
        self.inner.verbindungen.remove(verbindungs_id);
        tracing::debug!(verbindung = %verbindungs_id, "Kanal aus Broadcaster entfernt");
    }

    /// Sendet eine Nachricht an alle offenen Kanaele
    ///
    /// Gibt die Anzahl der erfolgreichen Einreihungen zurueck.
    pub fn an_alle_senden(&self, nachricht: WireNachricht) -> usize {
        let mut gesendet = 0;
        self.inner.verbindungen.iter().for_each(|entry| {
            if entry.value().senden(nachricht.clone()) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Gibt die Anzahl der offenen Kanaele zurueck
    pub fn verbindungs_anzahl(&self) -> usize {
        self.inner.verbindungen.len()
    }

    /// Prueft ob ein Kanal registriert ist
    pub fn ist_registriert(&self, verbindungs_id: &VerbindungsId) -> bool {
        self.inner.verbindungen.contains_key(verbindungs_id)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use leihbar_protocol::{NutzDaten, EVENT_INVENTORY_CHANGED};

    fn test_event(text: &str) -> WireNachricht {
        WireNachricht::event(EVENT_INVENTORY_CHANGED, NutzDaten::Text(text.into()))
    }

    #[tokio::test]
    async fn registrieren_und_an_alle_senden() {
        let broadcaster = EventBroadcaster::neu();

        let ids: Vec<VerbindungsId> = (0..3).map(|_| VerbindungsId::new()).collect();
        let mut receivers: Vec<_> = ids
            .iter()
            .map(|id| broadcaster.verbindung_registrieren(*id))
            .collect();

        let gesendet = broadcaster.an_alle_senden(test_event("CREATE_LOAN"));
        assert_eq!(gesendet, 3);

        for rx in &mut receivers {
            let nachricht = rx.try_recv().expect("Event muss vorhanden sein");
            assert_eq!(nachricht.name(), EVENT_INVENTORY_CHANGED);
        }
    }

    #[tokio::test]
    async fn entfernter_kanal_empfaengt_nichts_mehr() {
        let broadcaster = EventBroadcaster::neu();
        let id = VerbindungsId::new();

        let mut rx = broadcaster.verbindung_registrieren(id);
        assert!(broadcaster.ist_registriert(&id));

        broadcaster.verbindung_entfernen(&id);
        assert!(!broadcaster.ist_registriert(&id));
        assert_eq!(broadcaster.verbindungs_anzahl(), 0);

        let gesendet = broadcaster.an_alle_senden(test_event("RETURN_LAPTOP"));
        assert_eq!(gesendet, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn volle_queue_blockiert_andere_kanaele_nicht() {
        let broadcaster = EventBroadcaster::neu();
        let voll = VerbindungsId::new();
        let normal = VerbindungsId::new();

        let _rx_voll = broadcaster.verbindung_registrieren(voll);
        let mut rx_normal = broadcaster.verbindung_registrieren(normal);

        // Queue des ersten Kanals bis zum Rand fuellen
        for _ in 0..SEND_QUEUE_GROESSE {
            broadcaster.an_alle_senden(test_event("CREATE_LOAN"));
            // rx_normal leeren, damit nur die erste Queue voll laeuft
            let _ = rx_normal.try_recv();
        }

        // Der volle Kanal wird uebersprungen, der normale beliefert
        let gesendet = broadcaster.an_alle_senden(test_event("RETURN_LAPTOP"));
        assert_eq!(gesendet, 1);
        assert!(rx_normal.try_recv().is_ok());
    }

    #[tokio::test]
    async fn geschlossener_empfaenger_wird_uebersprungen() {
        let broadcaster = EventBroadcaster::neu();
        let tot = VerbindungsId::new();
        let lebendig = VerbindungsId::new();

        let rx_tot = broadcaster.verbindung_registrieren(tot);
        drop(rx_tot);
        let mut rx = broadcaster.verbindung_registrieren(lebendig);

        let gesendet = broadcaster.an_alle_senden(test_event("CREATE_LOAN"));
        assert_eq!(gesendet, 1);
        assert!(rx.try_recv().is_ok());
    }
}
