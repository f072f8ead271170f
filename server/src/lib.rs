//! leihbar-server – Bibliotheks-Root
//!
//! Baut die Subsysteme explizit zusammen (Datenschicht -> SessionState ->
//! SessionServer) und stellt den oeffentlichen Einstiegspunkt fuer
//! Integrationstests bereit.

pub mod config;

use anyhow::{Context, Result};
use leihbar_data::{DatenService, SpeicherDatenService};
use leihbar_session::{SessionConfig, SessionServer, SessionState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;

use config::ServerConfig;

/// Handle zum Stoppen eines laufenden Servers
///
/// Stoppen ist idempotent: weitere Aufrufe nach dem ersten sind wirkungslos.
#[derive(Clone)]
pub struct StoppHandle {
    tx: watch::Sender<bool>,
}

impl StoppHandle {
    /// Signalisiert den Shutdown an Listener und alle offenen Kanaele
    pub fn stoppen(&self) {
        self.tx.send_replace(true);
    }
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    config: ServerConfig,
    shutdown_tx: watch::Sender<bool>,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            shutdown_tx,
        }
    }

    /// Gibt ein Handle zurueck mit dem der Server gestoppt werden kann
    pub fn stopp_handle(&self) -> StoppHandle {
        StoppHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Startet den Server mit einem leeren In-Memory-Bestand
    pub async fn starten(self) -> Result<()> {
        let daten = Arc::new(SpeicherDatenService::neu());
        self.starten_mit(daten).await
    }

    /// Startet den Server mit einer uebergebenen Datenschicht
    ///
    /// Laeuft bis Ctrl-C eingeht oder das [`StoppHandle`] ausgeloest wird.
    pub async fn starten_mit<D>(self, daten: Arc<D>) -> Result<()>
    where
        D: DatenService + 'static,
    {
        let session_config = SessionConfig {
            server_name: self.config.server.name.clone(),
            max_verbindungen: self.config.server.max_verbindungen,
            max_frame_bytes: self.config.netzwerk.max_frame_bytes,
        };
        let state = SessionState::neu(session_config, daten);

        let bind_addr: SocketAddr = self
            .config
            .tcp_bind_adresse()
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse: {}", self.config.tcp_bind_adresse()))?;

        let server = SessionServer::binden(state, bind_addr)
            .await
            .with_context(|| format!("Socket {bind_addr} konnte nicht gebunden werden"))?;

        tracing::info!(
            adresse = %server.lokale_adresse()?,
            server_name = %self.config.server.name,
            "Leihbar Server bereit"
        );

        // Ctrl-C loest denselben Shutdown-Pfad aus wie das StoppHandle
        let shutdown_tx = self.shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C empfangen, Server wird beendet");
                shutdown_tx.send_replace(true);
            }
        });

        server.starten(self.shutdown_tx.subscribe()).await?;
        Ok(())
    }
}
