//! Gemeinsamer Server-Zustand fuer den Session-Service
//!
//! Haelt die geteilten Kollaborateure als Arc-Referenzen, die sicher
//! zwischen tokio-Tasks geteilt werden koennen. Der DatenService wird
//! beim Aufbau uebergeben, nicht global aufgeloest.

use leihbar_data::DatenService;
use leihbar_protocol::DEFAULT_MAX_FRAME_SIZE;
use std::sync::Arc;

use crate::broadcast::EventBroadcaster;

/// Konfiguration fuer den Session-Service
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Anzeigename des Servers (geht im welcome-Event an den Client)
    pub server_name: String,
    /// Maximale gleichzeitige Verbindungen
    pub max_verbindungen: u32,
    /// Maximale Frame-Groesse in Bytes
    pub max_frame_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_name: "Leihbar Server".to_string(),
            max_verbindungen: 64,
            max_frame_bytes: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SessionState<D>
where
    D: DatenService + 'static,
{
    /// Server-Konfiguration
    pub config: Arc<SessionConfig>,
    /// Datenschicht (Bestand, Leihen)
    pub daten: Arc<D>,
    /// Event-Broadcaster (inventory_changed an alle offenen Kanaele)
    pub broadcaster: EventBroadcaster,
}

impl<D> SessionState<D>
where
    D: DatenService + 'static,
{
    /// Erstellt einen neuen SessionState
    pub fn neu(config: SessionConfig, daten: Arc<D>) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            daten,
            broadcaster: EventBroadcaster::neu(),
        })
    }
}
