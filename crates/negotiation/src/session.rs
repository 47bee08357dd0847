//! Call-Session – verdrahtet Kanal, Verhandlung und Peer-Verbindung
//!
//! Eine [`CallSession`] besitzt pro Call genau einen Signaling-Kanal, eine
//! Verhandlungs-Engine und eine Peer-Verbindung aus der uebergebenen
//! Fabrik. Eine Ereignis-Pumpe verbindet die drei: eingehende
//! Signaling-Nachrichten laufen durch die Engine, lokal generierte
//! Kandidaten gehen ueber den Kanal hinaus, und der Aufrufer beobachtet
//! alles ueber [`SessionEvent`]s.

use peerline_core::{CallId, PeerlineError, VerbindungsStatus};
use peerline_protocol::{SdpType, SignalingMessage};
use peerline_signaling::{SignalConfig, SignalingChannel, SignalingEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capability::{PeerConnectionCapability, PeerConnectionEvent, PeerConnectionFactory};
use crate::engine::NegotiationEngine;

/// Kapazitaet der internen Ereignis-Queues
const QUEUE_KAPAZITAET: usize = 64;

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// Beobachtbare Ereignisse einer Call-Session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Transport-Status des Signaling-Kanals
    StatusGeaendert(VerbindungsStatus),
    /// Eine Beschreibung der Gegenseite wurde erfolgreich angewendet
    RemoteBeschreibungGesetzt(SdpType),
    /// Verbindungszustand der Peer-Verbindung
    PeerZustand(crate::capability::PeerVerbindungsZustand),
    /// Eine eingehende Nachricht konnte nicht angewendet werden
    VerhandlungsFehler(String),
}

// ---------------------------------------------------------------------------
// CallSession
// ---------------------------------------------------------------------------

/// Orchestrierung eines einzelnen Calls
pub struct CallSession<C: PeerConnectionCapability> {
    call_id: CallId,
    engine: Arc<NegotiationEngine<C>>,
    kanal: SignalingChannel,
    pumpe: JoinHandle<()>,
}

impl<C: PeerConnectionCapability> CallSession<C> {
    /// Baut eine neue Call-Session auf
    ///
    /// Erstellt die Peer-Verbindung ueber die Fabrik, startet den
    /// Verbindungsaufbau des Signaling-Kanals und spawnt die
    /// Ereignis-Pumpe. Der Kanal-Status kommt als
    /// [`SessionEvent::StatusGeaendert`] beim Empfaenger an.
    pub async fn aufbauen<F>(
        config: SignalConfig,
        factory: &F,
    ) -> peerline_core::Result<(Self, mpsc::Receiver<SessionEvent>)>
    where
        F: PeerConnectionFactory<Verbindung = C>,
    {
        let call_id = CallId::new();
        let (kanal, kanal_rx) = SignalingChannel::neu(config);

        let (peer_tx, peer_rx) = mpsc::channel(QUEUE_KAPAZITAET);
        let capability = factory
            .erstellen(peer_tx)
            .await
            .map_err(|e| PeerlineError::Verhandlung(e.to_string()))?;

        let (ausgang_tx, ausgang_rx) = mpsc::channel(QUEUE_KAPAZITAET);
        let engine = Arc::new(NegotiationEngine::neu(capability, ausgang_tx, call_id));

        let (session_tx, session_rx) = mpsc::channel(QUEUE_KAPAZITAET);
        kanal.verbinden();

        let pumpe = tokio::spawn(ereignis_pumpe(
            Arc::clone(&engine),
            kanal.clone(),
            kanal_rx,
            peer_rx,
            ausgang_rx,
            session_tx,
        ));

        tracing::info!(call = %call_id, "Call-Session aufgebaut");
        Ok((
            Self {
                call_id,
                engine,
                kanal,
                pumpe,
            },
            session_rx,
        ))
    }

    /// Kennung dieser Session
    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    /// Startet den Call als Anrufer und sendet die Offer
    ///
    /// Schlaegt die Verhandlung fehl, wird nichts gesendet.
    pub async fn offer_senden(&self) -> peerline_core::Result<()> {
        let beschreibung = self.engine.offer_starten().await?;
        self.kanal.senden(&SignalingMessage::Sdp(beschreibung));
        Ok(())
    }

    /// Beantwortet den Call als Angerufener und sendet die Answer
    pub async fn answer_senden(&self) -> peerline_core::Result<()> {
        let beschreibung = self.engine.answer_starten().await?;
        self.kanal.senden(&SignalingMessage::Sdp(beschreibung));
        Ok(())
    }

    /// Beendet die Session (idempotent)
    ///
    /// Baut die Verhandlung ab, schliesst den Kanal und stoppt die
    /// Ereignis-Pumpe. In-flight Engine-Bestaetigungen werden ab hier
    /// verworfen.
    pub fn beenden(&self) {
        self.engine.abbauen();
        self.kanal.schliessen();
        self.pumpe.abort();
        tracing::info!(call = %self.call_id, "Call-Session beendet");
    }
}

impl<C: PeerConnectionCapability> Drop for CallSession<C> {
    fn drop(&mut self) {
        self.beenden();
    }
}

// ---------------------------------------------------------------------------
// Ereignis-Pumpe
// ---------------------------------------------------------------------------

async fn ereignis_pumpe<C: PeerConnectionCapability>(
    engine: Arc<NegotiationEngine<C>>,
    kanal: SignalingChannel,
    mut kanal_rx: mpsc::Receiver<SignalingEvent>,
    mut peer_rx: mpsc::Receiver<PeerConnectionEvent>,
    mut ausgang_rx: mpsc::Receiver<SignalingMessage>,
    session_tx: mpsc::Sender<SessionEvent>,
) {
    loop {
        tokio::select! {
            // Ereignisse des Signaling-Kanals
            ereignis = kanal_rx.recv() => {
                let Some(ereignis) = ereignis else { break };
                match ereignis {
                    SignalingEvent::StatusGeaendert(status) => {
                        let _ = session_tx
                            .send(SessionEvent::StatusGeaendert(status))
                            .await;
                    }
                    SignalingEvent::Nachricht(SignalingMessage::Sdp(beschreibung)) => {
                        let typ = beschreibung.typ;
                        match engine.remote_beschreibung_anwenden(beschreibung).await {
                            Ok(()) => {
                                let _ = session_tx
                                    .send(SessionEvent::RemoteBeschreibungGesetzt(typ))
                                    .await;
                            }
                            Err(e) => {
                                tracing::warn!(fehler = %e, "Remote-Beschreibung abgelehnt");
                                let _ = session_tx
                                    .send(SessionEvent::VerhandlungsFehler(e.to_string()))
                                    .await;
                            }
                        }
                    }
                    SignalingEvent::Nachricht(SignalingMessage::Candidate(kandidat)) => {
                        if let Err(e) = engine.remote_kandidat_anwenden(kandidat).await {
                            tracing::warn!(fehler = %e, "Remote-Kandidat abgelehnt");
                            let _ = session_tx
                                .send(SessionEvent::VerhandlungsFehler(e.to_string()))
                                .await;
                        }
                    }
                }
            }

            // Benachrichtigungen der Peer-Verbindung
            ereignis = peer_rx.recv() => {
                let Some(ereignis) = ereignis else { break };
                match ereignis {
                    PeerConnectionEvent::KandidatGeneriert(kandidat) => {
                        engine.lokalen_kandidat_melden(kandidat).await;
                    }
                    PeerConnectionEvent::ZustandGeaendert(zustand) => {
                        tracing::debug!(zustand = ?zustand, "Peer-Verbindungszustand");
                        let _ = session_tx
                            .send(SessionEvent::PeerZustand(zustand))
                            .await;
                    }
                }
            }

            // Lokale Kandidaten aus der Engine auf den Draht
            nachricht = ausgang_rx.recv() => {
                let Some(nachricht) = nachricht else { break };
                kanal.senden(&nachricht);
            }
        }
    }
    tracing::debug!("Ereignis-Pumpe beendet");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
