//! Client-Connection – Verwaltet einen einzelnen Session-Kanal
//!
//! Jede TCP-Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Der Kanal durchlaeuft einen festen Lebenszyklus.
//!
//! ## Lebenszyklus
//! ```text
//! Verbindet -> Offen -> Schliessend -> Geschlossen
//! ```
//! Beim Uebergang zu Offen wird der Kanal im Broadcaster registriert und
//! das `welcome`-Event gesendet. Geschlossen ist terminal.
//!
//! ## Fehler-Isolation
//! - Ungueltiges JSON in einem sauber gerahmten Frame ergibt eine
//!   error-Nachricht; der Kanal bleibt offen (der Laengen-Prefix haelt den
//!   Strom ausgerichtet).
//! - Transportfehler (auch ueberlange Frames) schliessen nur diesen Kanal.

use futures_util::{SinkExt, StreamExt};
use leihbar_core::VerbindungsId;
use leihbar_data::DatenService;
use leihbar_protocol::{
    FrameCodec, NutzDaten, SitzungsInfo, WireNachricht, EVENT_WELCOME,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::dispatcher::KommandoDispatcher;
use crate::server_state::SessionState;

// ---------------------------------------------------------------------------
// Kanal-Lebenszyklus
// ---------------------------------------------------------------------------

/// Zustand eines Session-Kanals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KanalZustand {
    /// TCP steht, welcome noch nicht gesendet
    Verbindet,
    /// Registriert und bereit fuer Kommandos
    Offen,
    /// Abbau laeuft, keine neuen Kommandos mehr
    Schliessend,
    /// Terminal
    Geschlossen,
}

// ---------------------------------------------------------------------------
// ClientConnection
// ---------------------------------------------------------------------------

/// Verarbeitet einen einzelnen Session-Kanal
///
/// Liest Frames via `FrameCodec`, dispatcht Kommandos und sendet Antworten
/// und Events zurueck. Laeuft in einem eigenen tokio-Task.
pub struct ClientConnection<D>
where
    D: DatenService + 'static,
{
    state: Arc<SessionState<D>>,
    verbindungs_id: VerbindungsId,
    peer_addr: SocketAddr,
}

impl<D> ClientConnection<D>
where
    D: DatenService + 'static,
{
    /// Erstellt eine neue ClientConnection mit frischer VerbindungsId
    pub fn neu(state: Arc<SessionState<D>>, peer_addr: SocketAddr) -> Self {
        Self {
            state,
            verbindungs_id: VerbindungsId::new(),
            peer_addr,
        }
    }

    /// Gibt die VerbindungsId des Kanals zurueck
    pub fn verbindungs_id(&self) -> VerbindungsId {
        self.verbindungs_id
    }

    /// Startet die Verarbeitungsschleife des Kanals
    ///
    /// Laeuft bis der Client trennt, ein Transportfehler auftritt oder ein
    /// Shutdown-Signal eingeht.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let peer_addr = self.peer_addr;
        let verbindungs_id = self.verbindungs_id;
        let mut zustand = KanalZustand::Verbindet;

        tracing::info!(
            peer = %peer_addr,
            verbindung = %verbindungs_id,
            zustand = ?zustand,
            "Neue Verbindung"
        );

        let codec = FrameCodec::with_max_size(self.state.config.max_frame_bytes);
        let mut framed = Framed::new(stream, codec);

        // Registrierung im Broadcaster macht den Kanal "offen"
        let mut broadcast_rx = self
            .state
            .broadcaster
            .verbindung_registrieren(verbindungs_id);

        // welcome-Event als allererste Nachricht auf dem Kanal
        let willkommen = WireNachricht::event(
            EVENT_WELCOME,
            NutzDaten::Sitzung(SitzungsInfo {
                verbindungs_id,
                server_name: self.state.config.server_name.clone(),
                server_version: env!("CARGO_PKG_VERSION").to_string(),
            }),
        );
        if let Err(e) = framed.send(willkommen).await {
            tracing::warn!(peer = %peer_addr, fehler = %e, "welcome-Senden fehlgeschlagen");
            self.state.broadcaster.verbindung_entfernen(&verbindungs_id);
            return;
        }
        zustand = KanalZustand::Offen;
        tracing::debug!(verbindung = %verbindungs_id, zustand = ?zustand, "Kanal offen");

        let dispatcher = KommandoDispatcher::neu(Arc::clone(&self.state));

        loop {
            tokio::select! {
                // Eingehender Frame vom Client
                frame = framed.next() => {
                    match frame {
                        Some(Ok(bytes)) => {
                            let antwort_ok = self
                                .frame_verarbeiten(&bytes, &dispatcher, &mut framed)
                                .await;
                            if !antwort_ok {
                                zustand = KanalZustand::Schliessend;
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(
                                peer = %peer_addr,
                                fehler = %e,
                                "Frame-Lesefehler"
                            );
                            zustand = KanalZustand::Schliessend;
                            break;
                        }
                        None => {
                            tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
                            zustand = KanalZustand::Schliessend;
                            break;
                        }
                    }
                }

                // Ausgehendes Event aus dem Broadcaster
                Some(event) = broadcast_rx.recv() => {
                    if let Err(e) = framed.send(event).await {
                        tracing::warn!(
                            peer = %peer_addr,
                            fehler = %e,
                            "Event-Senden fehlgeschlagen"
                        );
                        zustand = KanalZustand::Schliessend;
                        break;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(
                            peer = %peer_addr,
                            "Shutdown-Signal – Kanal wird geschlossen"
                        );
                        zustand = KanalZustand::Schliessend;
                        break;
                    }
                }
            }
        }

        // Cleanup: erst abmelden, dann Transport schliessen
        tracing::debug!(verbindung = %verbindungs_id, zustand = ?zustand, "Kanal wird abgebaut");
        self.state.broadcaster.verbindung_entfernen(&verbindungs_id);
        let _ = framed.close().await;
        zustand = KanalZustand::Geschlossen;

        tracing::info!(
            peer = %peer_addr,
            verbindung = %verbindungs_id,
            zustand = ?zustand,
            "Verbindungs-Task beendet"
        );
    }

    /// Verarbeitet einen sauber gerahmten Frame
    ///
    /// Gibt `false` zurueck wenn der Kanal geschlossen werden muss
    /// (Senden fehlgeschlagen); Dekodier-Fehler halten den Kanal offen.
    async fn frame_verarbeiten(
        &self,
        bytes: &[u8],
        dispatcher: &KommandoDispatcher<D>,
        framed: &mut Framed<TcpStream, FrameCodec>,
    ) -> bool {
        let nachricht = match WireNachricht::decode(bytes) {
            Ok(nachricht) => nachricht,
            Err(e) => {
                tracing::debug!(peer = %self.peer_addr, fehler = %e, "Ungueltiger Frame");
                let antwort = WireNachricht::fehler("", e.to_string());
                return framed.send(antwort).await.is_ok();
            }
        };

        match nachricht {
            WireNachricht::Command { name, payload } => {
                let ergebnis = dispatcher.dispatch(&name, &payload).await;
                if framed.send(ergebnis.antwort).await.is_err() {
                    return false;
                }
                // Broadcast erst nach der Antwort: der Ausloeser sieht sein
                // Event ueber die eigene Queue garantiert danach
                if let Some(event) = ergebnis.broadcast {
                    let empfaenger = self.state.broadcaster.an_alle_senden(event);
                    tracing::debug!(
                        verbindung = %self.verbindungs_id,
                        empfaenger,
                        "inventory_changed verteilt"
                    );
                }
                true
            }
            andere => {
                tracing::debug!(
                    peer = %self.peer_addr,
                    name = andere.name(),
                    "Unerwartete Nachrichten-Art vom Client"
                );
                let antwort = WireNachricht::fehler(
                    andere.name(),
                    "Unerwartete Nachricht: nur command ist client-seitig erlaubt",
                );
                framed.send(antwort).await.is_ok()
            }
        }
    }
}
