//! LeihClient – Verbindungsaufbau, typisierte Kommandos, Event-Zustellung
//!
//! Ein interner IO-Task besitzt die Framed-Verbindung. Anfragen gehen
//! ueber eine Queue der Tiefe 1 an den Task; es ist immer hoechstens ein
//! Kommando in Flug, Antworten werden in Anfrage-Reihenfolge zugeordnet.
//! Eingehende Events werden sofort an die Abonnements gegeben, auch
//! waehrend eine Anfrage auf ihre Antwort wartet.

use futures_util::{SinkExt, StreamExt};
use leihbar_core::{LaptopId, LaptopRecord, LeihId, LeihRecord, StudentId, StudentRecord};
use leihbar_protocol::{
    Befehl, CreateLoanArgs, FrameCodec, NutzDaten, ReturnLaptopArgs, SitzungsInfo, WireNachricht,
    DEFAULT_MAX_FRAME_SIZE, EVENT_WELCOME,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_util::codec::Framed;

use crate::error::{ClientFehler, ClientResult};
use crate::events::{AboId, AboRegistry, Event, EventAbo};

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Konfiguration des LeihClient
#[derive(Debug, Clone)]
pub struct LeihClientConfig {
    /// Timeout fuer TCP-Aufbau und das Warten auf das welcome-Event
    pub verbindungs_timeout: Duration,
    /// Timeout pro Kommando
    pub anfrage_timeout: Duration,
    /// Maximale Frame-Groesse in Bytes
    pub max_frame_bytes: usize,
}

impl Default for LeihClientConfig {
    fn default() -> Self {
        Self {
            verbindungs_timeout: Duration::from_secs(5),
            anfrage_timeout: Duration::from_secs(10),
            max_frame_bytes: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// LeihClient
// ---------------------------------------------------------------------------

/// Eine an den IO-Task gereichte Anfrage
struct Anfrage {
    befehl: Befehl,
    antwort_tx: oneshot::Sender<ClientResult<NutzDaten>>,
}

/// Typisierter Client fuer das Leihbar-Session-Protokoll
pub struct LeihClient {
    sitzung: SitzungsInfo,
    anfrage_tx: mpsc::Sender<Anfrage>,
    abos: AboRegistry,
    anfrage_timeout: Duration,
}

impl LeihClient {
    /// Verbindet mit Default-Konfiguration
    pub async fn verbinden(addr: SocketAddr) -> ClientResult<Self> {
        Self::verbinden_mit(addr, LeihClientConfig::default()).await
    }

    /// Verbindet mit dem Server und wartet auf das welcome-Event
    ///
    /// Erst wenn das welcome-Event eingetroffen ist gilt die Verbindung
    /// als aufgebaut; bleibt es aus, schlaegt der Aufbau mit
    /// [`ClientFehler::Verbindung`] fehl.
    pub async fn verbinden_mit(
        addr: SocketAddr,
        config: LeihClientConfig,
    ) -> ClientResult<Self> {
        let stream = tokio::time::timeout(config.verbindungs_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                ClientFehler::Verbindung(format!("Zeitueberschreitung beim Verbinden mit {addr}"))
            })?
            .map_err(|e| ClientFehler::Verbindung(e.to_string()))?;

        let codec = FrameCodec::with_max_size(config.max_frame_bytes);
        let mut framed = Framed::new(stream, codec);

        let sitzung =
            tokio::time::timeout(config.verbindungs_timeout, willkommen_erwarten(&mut framed))
                .await
                .map_err(|_| {
                    ClientFehler::Verbindung("Zeitueberschreitung beim Warten auf welcome".into())
                })??;

        tracing::info!(
            server = %sitzung.server_name,
            verbindung = %sitzung.verbindungs_id,
            "Verbindung aufgebaut"
        );

        let abos = AboRegistry::neu();
        // Tiefe 1: hoechstens ein Kommando in Flug
        let (anfrage_tx, anfrage_rx) = mpsc::channel(1);

        let io = IoTask {
            framed,
            anfrage_rx,
            abos: abos.clone(),
        };
        tokio::spawn(io.ausfuehren());

        Ok(Self {
            sitzung,
            anfrage_tx,
            abos,
            anfrage_timeout: config.anfrage_timeout,
        })
    }

    /// Gibt die Sitzungs-Metadaten aus dem welcome-Event zurueck
    pub fn sitzung(&self) -> &SitzungsInfo {
        &self.sitzung
    }

    /// Abonniert Events mit dem gegebenen Namen (`*` fuer alle)
    pub fn abonnieren(&self, event_name: &str) -> EventAbo {
        self.abos.abonnieren(event_name)
    }

    /// Beendet ein Abonnement
    pub fn abbestellen(&self, id: AboId) {
        self.abos.abbestellen(id);
    }

    /// Trennt die Verbindung
    ///
    /// Der IO-Task schliesst den Transport sobald die Anfrage-Queue
    /// wegfaellt; offene Abonnements enden danach mit `None`.
    pub fn trennen(self) {
        drop(self.anfrage_tx);
    }

    // -----------------------------------------------------------------------
    // Typisierte Kommandos
    // -----------------------------------------------------------------------

    /// GET_ALL_LAPTOPS
    pub async fn alle_laptops(&self) -> ClientResult<Vec<LaptopRecord>> {
        match self.anfrage(Befehl::GetAllLaptops).await? {
            NutzDaten::LaptopListe(laptops) => Ok(laptops),
            andere => Err(unerwartet("LaptopListe", &andere)),
        }
    }

    /// GET_AVAILABLE_LAPTOPS
    pub async fn verfuegbare_laptops(&self) -> ClientResult<Vec<LaptopRecord>> {
        match self.anfrage(Befehl::GetAvailableLaptops).await? {
            NutzDaten::LaptopListe(laptops) => Ok(laptops),
            andere => Err(unerwartet("LaptopListe", &andere)),
        }
    }

    /// GET_ALL_STUDENTS
    pub async fn alle_studenten(&self) -> ClientResult<Vec<StudentRecord>> {
        match self.anfrage(Befehl::GetAllStudents).await? {
            NutzDaten::StudentListe(studenten) => Ok(studenten),
            andere => Err(unerwartet("StudentListe", &andere)),
        }
    }

    /// CREATE_LOAN
    pub async fn leihe_anlegen(
        &self,
        student_id: StudentId,
        laptop_id: LaptopId,
    ) -> ClientResult<LeihRecord> {
        let befehl = Befehl::CreateLoan(CreateLoanArgs {
            student_id,
            laptop_id,
        });
        match self.anfrage(befehl).await? {
            NutzDaten::Leihe(leihe) => Ok(leihe),
            andere => Err(unerwartet("Leihe", &andere)),
        }
    }

    /// RETURN_LAPTOP
    pub async fn laptop_zurueckgeben(&self, leih_id: LeihId) -> ClientResult<LeihRecord> {
        let befehl = Befehl::ReturnLaptop(ReturnLaptopArgs { leih_id });
        match self.anfrage(befehl).await? {
            NutzDaten::Leihe(leihe) => Ok(leihe),
            andere => Err(unerwartet("Leihe", &andere)),
        }
    }

    /// Reicht ein Kommando an den IO-Task und wartet auf die Antwort
    async fn anfrage(&self, befehl: Befehl) -> ClientResult<NutzDaten> {
        let (antwort_tx, antwort_rx) = oneshot::channel();
        self.anfrage_tx
            .send(Anfrage { befehl, antwort_tx })
            .await
            .map_err(|_| ClientFehler::Transport("Verbindungs-Task beendet".into()))?;

        match tokio::time::timeout(self.anfrage_timeout, antwort_rx).await {
            Ok(Ok(ergebnis)) => ergebnis,
            Ok(Err(_)) => Err(ClientFehler::Transport("Verbindungs-Task beendet".into())),
            Err(_) => Err(ClientFehler::Timeout),
        }
    }
}

fn unerwartet(erwartet: &str, erhalten: &NutzDaten) -> ClientFehler {
    ClientFehler::UnerwarteteAntwort(format!("Erwartet {erwartet}, erhalten: {erhalten:?}"))
}

/// Liest Frames bis das welcome-Event eintrifft
async fn willkommen_erwarten(
    framed: &mut Framed<TcpStream, FrameCodec>,
) -> ClientResult<SitzungsInfo> {
    match framed.next().await {
        Some(Ok(bytes)) => match WireNachricht::decode(&bytes)? {
            WireNachricht::Event { name, payload } if name == EVENT_WELCOME => match payload {
                NutzDaten::Sitzung(info) => Ok(info),
                andere => Err(unerwartet("Sitzung", &andere)),
            },
            andere => Err(ClientFehler::UnerwarteteAntwort(format!(
                "Erwartet welcome-Event, erhalten: {andere:?}"
            ))),
        },
        Some(Err(e)) => Err(ClientFehler::Transport(e.to_string())),
        None => Err(ClientFehler::Verbindung(
            "Verbindung vor welcome geschlossen".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// IO-Task
// ---------------------------------------------------------------------------

/// Besitzt die Framed-Verbindung und multiplexed Anfragen und Events
struct IoTask {
    framed: Framed<TcpStream, FrameCodec>,
    anfrage_rx: mpsc::Receiver<Anfrage>,
    abos: AboRegistry,
}

impl IoTask {
    async fn ausfuehren(mut self) {
        let mut ausstehend: Option<oneshot::Sender<ClientResult<NutzDaten>>> = None;

        loop {
            tokio::select! {
                // Neue Anfrage nur annehmen wenn keine in Flug ist
                anfrage = self.anfrage_rx.recv(), if ausstehend.is_none() => {
                    match anfrage {
                        Some(Anfrage { befehl, antwort_tx }) => {
                            let frame = match befehl.zu_frame() {
                                Ok(frame) => frame,
                                Err(e) => {
                                    let _ = antwort_tx.send(Err(e.into()));
                                    continue;
                                }
                            };
                            if let Err(e) = self.framed.send(frame).await {
                                let _ = antwort_tx
                                    .send(Err(ClientFehler::Transport(e.to_string())));
                                break;
                            }
                            ausstehend = Some(antwort_tx);
                        }
                        None => break, // Client wurde getrennt
                    }
                }

                // Eingehender Frame vom Server
                frame = self.framed.next() => {
                    match frame {
                        Some(Ok(bytes)) => self.frame_verarbeiten(&bytes, &mut ausstehend),
                        Some(Err(e)) => {
                            if let Some(tx) = ausstehend.take() {
                                let _ = tx.send(Err(ClientFehler::Transport(e.to_string())));
                            }
                            tracing::debug!(fehler = %e, "Transportfehler – IO-Task endet");
                            break;
                        }
                        None => {
                            if let Some(tx) = ausstehend.take() {
                                let _ = tx.send(Err(ClientFehler::Transport(
                                    "Verbindung vom Server getrennt".into(),
                                )));
                            }
                            tracing::debug!("Verbindung vom Server getrennt");
                            break;
                        }
                    }
                }
            }
        }

        // Offene Abonnements muessen mit None enden, nicht haengen
        self.abos.schliessen();
        let _ = self.framed.close().await;
    }

    fn frame_verarbeiten(
        &self,
        bytes: &[u8],
        ausstehend: &mut Option<oneshot::Sender<ClientResult<NutzDaten>>>,
    ) {
        match WireNachricht::decode(bytes) {
            // Events sofort zustellen, auch mitten in einer Anfrage
            Ok(WireNachricht::Event { name, payload }) => {
                self.abos.zustellen(Event { name, payload });
            }
            Ok(WireNachricht::Result { name, payload }) => match ausstehend.take() {
                Some(tx) => {
                    let _ = tx.send(Ok(payload));
                }
                None => tracing::warn!(name = %name, "Antwort ohne ausstehende Anfrage"),
            },
            Ok(WireNachricht::Error { name, message }) => match ausstehend.take() {
                Some(tx) => {
                    let _ = tx.send(Err(ClientFehler::Remote { name, message }));
                }
                None => {
                    tracing::warn!(name = %name, message = %message, "Fehler ohne ausstehende Anfrage");
                }
            },
            Ok(WireNachricht::Command { name, .. }) => {
                tracing::warn!(name = %name, "Kommando vom Server – verworfen");
            }
            Err(e) => {
                tracing::warn!(fehler = %e, "Ungueltiger Frame vom Server – verworfen");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use leihbar_core::VerbindungsId;
    use leihbar_protocol::EVENT_INVENTORY_CHANGED;
    use tokio::net::TcpListener;

    fn kurze_config() -> LeihClientConfig {
        LeihClientConfig {
            verbindungs_timeout: Duration::from_millis(500),
            anfrage_timeout: Duration::from_secs(1),
            ..LeihClientConfig::default()
        }
    }

    /// Startet einen minimalen Gegenpart der genau ein welcome sendet und
    /// dann Kommandos mit den uebergebenen Antworten beantwortet.
    async fn fake_server(
        antworten: Vec<WireNachricht>,
    ) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = Framed::new(stream, FrameCodec::new());

            let willkommen = WireNachricht::event(
                EVENT_WELCOME,
                NutzDaten::Sitzung(SitzungsInfo {
                    verbindungs_id: VerbindungsId::new(),
                    server_name: "Testserver".into(),
                    server_version: "0.0.0".into(),
                }),
            );
            framed.send(willkommen).await.unwrap();

            for antwort in antworten {
                let bytes = framed.next().await.unwrap().unwrap();
                let nachricht = WireNachricht::decode(&bytes).unwrap();
                assert!(matches!(nachricht, WireNachricht::Command { .. }));
                framed.send(antwort).await.unwrap();
            }

            // Verbindung offen halten bis der Client trennt
            let _ = framed.next().await;
        });

        addr
    }

    #[tokio::test]
    async fn verbinden_ohne_server_schlaegt_fehl() {
        // Port reservieren und sofort wieder freigeben
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let ergebnis = LeihClient::verbinden_mit(addr, kurze_config()).await;
        assert!(matches!(ergebnis, Err(ClientFehler::Verbindung(_))));
    }

    #[tokio::test]
    async fn verbinden_wartet_auf_welcome_und_fragt_ab() {
        let addr = fake_server(vec![WireNachricht::result(
            "GET_ALL_LAPTOPS",
            NutzDaten::LaptopListe(vec![]),
        )])
        .await;

        let client = LeihClient::verbinden_mit(addr, kurze_config()).await.unwrap();
        assert_eq!(client.sitzung().server_name, "Testserver");

        let laptops = client.alle_laptops().await.unwrap();
        assert!(laptops.is_empty());

        client.trennen();
    }

    #[tokio::test]
    async fn error_antwort_wird_remote_fehler() {
        let addr = fake_server(vec![WireNachricht::fehler(
            "GET_ALL_STUDENTS",
            "Kaputt",
        )])
        .await;

        let client = LeihClient::verbinden_mit(addr, kurze_config()).await.unwrap();
        let fehler = client.alle_studenten().await.unwrap_err();
        match fehler {
            ClientFehler::Remote { name, message } => {
                assert_eq!(name, "GET_ALL_STUDENTS");
                assert_eq!(message, "Kaputt");
            }
            andere => panic!("Erwartet Remote, erhalten: {andere:?}"),
        }

        client.trennen();
    }

    #[tokio::test]
    async fn verbindungsende_beendet_abonnements() {
        // Der Server trennt direkt nach dem welcome; offene Abonnements
        // muessen daraufhin mit None enden statt zu haengen.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = Framed::new(stream, FrameCodec::new());
            let willkommen = WireNachricht::event(
                EVENT_WELCOME,
                NutzDaten::Sitzung(SitzungsInfo {
                    verbindungs_id: VerbindungsId::new(),
                    server_name: "Testserver".into(),
                    server_version: "0.0.0".into(),
                }),
            );
            framed.send(willkommen).await.unwrap();
            // framed wird gedroppt, der Client sieht EOF
        });

        let client = LeihClient::verbinden_mit(addr, kurze_config()).await.unwrap();
        let mut abo = client.abonnieren(crate::events::WILDCARD);

        let ende = tokio::time::timeout(Duration::from_secs(1), abo.empfangen())
            .await
            .expect("Abonnement muss enden, nicht haengen");
        assert_eq!(ende, None);
    }

    #[tokio::test]
    async fn event_erreicht_abonnement_waehrend_anfrage() {
        // Der Server schiebt das Event VOR der Antwort auf den Draht; das
        // Abonnement muss es trotz laufender Anfrage sofort bekommen.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = Framed::new(stream, FrameCodec::new());
            let willkommen = WireNachricht::event(
                EVENT_WELCOME,
                NutzDaten::Sitzung(SitzungsInfo {
                    verbindungs_id: VerbindungsId::new(),
                    server_name: "Testserver".into(),
                    server_version: "0.0.0".into(),
                }),
            );
            framed.send(willkommen).await.unwrap();

            let _ = framed.next().await.unwrap().unwrap();
            framed
                .send(WireNachricht::event(
                    EVENT_INVENTORY_CHANGED,
                    NutzDaten::Text("CREATE_LOAN".into()),
                ))
                .await
                .unwrap();
            framed
                .send(WireNachricht::result(
                    "GET_ALL_LAPTOPS",
                    NutzDaten::LaptopListe(vec![]),
                ))
                .await
                .unwrap();
            let _ = framed.next().await;
        });

        let client = LeihClient::verbinden_mit(addr, kurze_config()).await.unwrap();
        let mut abo = client.abonnieren(EVENT_INVENTORY_CHANGED);

        let laptops = client.alle_laptops().await.unwrap();
        assert!(laptops.is_empty());

        let event = tokio::time::timeout(Duration::from_secs(1), abo.empfangen())
            .await
            .expect("Event muss zugestellt werden")
            .expect("Abonnement darf nicht enden");
        assert_eq!(event.name, EVENT_INVENTORY_CHANGED);
        assert_eq!(event.payload, NutzDaten::Text("CREATE_LOAN".into()));

        client.trennen();
    }
}
