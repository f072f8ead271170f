//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! Der `SessionServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen tokio-Task mit einer
//! `ClientConnection`. Binden und Starten sind getrennt, damit Tests an
//! Port 0 binden und die tatsaechliche Adresse abfragen koennen.

use leihbar_data::DatenService;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::connection::ClientConnection;
use crate::server_state::SessionState;

/// TCP-Session-Server
///
/// Akzeptiert Verbindungen in einer Loop bis das Shutdown-Signal eingeht.
/// Beim Shutdown faellt der Listener aus dem Scope; weitere
/// Verbindungsversuche werden vom Betriebssystem abgelehnt.
pub struct SessionServer<D>
where
    D: DatenService + 'static,
{
    state: Arc<SessionState<D>>,
    listener: TcpListener,
}

impl<D> SessionServer<D>
where
    D: DatenService + 'static,
{
    /// Bindet den Socket und erstellt den Server
    pub async fn binden(
        state: Arc<SessionState<D>>,
        bind_addr: SocketAddr,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        Ok(Self { state, listener })
    }

    /// Gibt die tatsaechlich gebundene Adresse zurueck
    pub fn lokale_adresse(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Startet die Accept-Loop
    ///
    /// Laeuft bis `shutdown_rx` ein `true`-Signal empfaengt.
    pub async fn starten(
        self,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) -> std::io::Result<()> {
        let lokale_addr = self.listener.local_addr()?;
        tracing::info!(adresse = %lokale_addr, "TCP Session-Server gestartet");

        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            // Verbindungs-Limit pruefen. Die Zaehlung liest den
                            // Broadcaster, registriert wird erst im Verbindungs-Task;
                            // ein Accept-Burst kann das Limit kurzzeitig ueberschreiten.
                            let offen = self.state.broadcaster.verbindungs_anzahl() as u32;
                            if offen >= self.state.config.max_verbindungen {
                                tracing::warn!(
                                    peer = %peer_addr,
                                    max = self.state.config.max_verbindungen,
                                    "Server voll – Verbindung abgelehnt"
                                );
                                drop(stream);
                                continue;
                            }

                            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");

                            let verbindung = ClientConnection::neu(
                                Arc::clone(&self.state),
                                peer_addr,
                            );
                            let shutdown_rx_clone = shutdown_rx.clone();

                            tokio::spawn(async move {
                                verbindung.verarbeiten(stream, shutdown_rx_clone).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Session-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!("TCP Session-Server gestoppt");
        Ok(())
    }
}
