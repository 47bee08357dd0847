//! Signaling-Kanal – Verwaltet die TCP-Verbindung zum Signaling-Server
//!
//! Pro Verbindung laeuft ein eigener tokio-Task der eingehende Frames
//! dekodiert und ausgehende Frames aus einer Sende-Queue schreibt.
//!
//! ## Vertrag
//!
//! - `verbinden()` ist idempotent und blockiert nie; der Abschluss wird
//!   ueber `StatusGeaendert(Verbunden)` gemeldet, nicht per Rueckgabewert.
//! - `senden()` ist Fire-and-Forget: ohne Verbindung wird die Nachricht
//!   verworfen, es gibt keine Zustellbestaetigung und der Aufrufer wird
//!   niemals blockiert.
//! - Ein nicht dekodierbarer Frame wird geloggt und verworfen; der Kanal
//!   laeuft weiter.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use peerline_core::VerbindungsStatus;
use peerline_protocol::{FrameCodec, SignalingMessage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;

use crate::config::SignalConfig;
use crate::event::SignalingEvent;

/// Kapazitaet der Sende- und Ereignis-Queues
const QUEUE_KAPAZITAET: usize = 64;

// ---------------------------------------------------------------------------
// SignalingChannel
// ---------------------------------------------------------------------------

/// Client-seitiger Signaling-Kanal
///
/// Klonbar; alle Klone teilen sich dieselbe Verbindung.
#[derive(Clone)]
pub struct SignalingChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    config: SignalConfig,
    /// Abonnent fuer Status- und Nachrichten-Ereignisse
    event_tx: mpsc::Sender<SignalingEvent>,
    /// Sende-Queue der aktiven Verbindung (None wenn getrennt)
    ausgang: Mutex<Option<mpsc::Sender<Bytes>>>,
    /// Transport-Status
    verbunden: AtomicBool,
    /// Verhindert parallele Verbindungs-Tasks
    verbindung_laeuft: AtomicBool,
    /// Gesetzt von schliessen(); ein noch laufender Verbindungsaufbau
    /// bricht damit ab statt live zu gehen
    geschlossen: AtomicBool,
}

impl SignalingChannel {
    /// Erstellt einen neuen Kanal samt Ereignis-Empfaenger
    pub fn neu(config: SignalConfig) -> (Self, mpsc::Receiver<SignalingEvent>) {
        let (event_tx, event_rx) = mpsc::channel(QUEUE_KAPAZITAET);
        let kanal = Self {
            inner: Arc::new(ChannelInner {
                config,
                event_tx,
                ausgang: Mutex::new(None),
                verbunden: AtomicBool::new(false),
                verbindung_laeuft: AtomicBool::new(false),
                geschlossen: AtomicBool::new(false),
            }),
        };
        (kanal, event_rx)
    }

    /// Startet den Verbindungsaufbau (idempotent, nicht blockierend)
    ///
    /// Laeuft bereits ein Verbindungs-Task, passiert nichts. Erfolg oder
    /// Misserfolg werden als `StatusGeaendert`-Ereignis gemeldet.
    pub fn verbinden(&self) {
        if self.inner.verbindung_laeuft.swap(true, Ordering::SeqCst) {
            tracing::debug!("Verbindungsaufbau laeuft bereits");
            return;
        }
        self.inner.geschlossen.store(false, Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(verbindungs_task(inner));
    }

    /// Sendet eine Nachricht an die Gegenseite (Fire-and-Forget)
    ///
    /// Ohne aktive Verbindung wird die Nachricht stillschweigend verworfen –
    /// Aufrufer duerfen keine Zustellung annehmen.
    pub fn senden(&self, nachricht: &SignalingMessage) {
        let ausgang = self.inner.ausgang.lock().clone();
        let Some(tx) = ausgang else {
            tracing::debug!("Nicht verbunden, Nachricht verworfen");
            return;
        };
        match nachricht.zu_bytes() {
            Ok(bytes) => {
                if tx.try_send(Bytes::from(bytes)).is_err() {
                    tracing::warn!("Sende-Queue voll oder geschlossen, Nachricht verworfen");
                }
            }
            Err(e) => {
                // Fuer wohlgeformte Nachrichten nicht erreichbar
                tracing::error!(fehler = %e, "Nachricht nicht serialisierbar");
            }
        }
    }

    /// Gibt true zurueck wenn die Transport-Verbindung steht
    pub fn ist_verbunden(&self) -> bool {
        self.inner.verbunden.load(Ordering::SeqCst)
    }

    /// Schliesst die Verbindung (idempotent)
    ///
    /// Gilt auch fuer einen noch laufenden Verbindungsaufbau: der Task
    /// geht dann nicht mehr live sondern meldet `Getrennt`. Das Flag muss
    /// vor dem Entnehmen des Senders gesetzt werden, damit der Task es in
    /// jedem Fall sieht (entweder ueber das Flag oder ueber die
    /// geschlossene Sende-Queue).
    pub fn schliessen(&self) {
        self.inner.geschlossen.store(true, Ordering::SeqCst);
        // Das Fallenlassen des Senders beendet die Sende-Queue im Task
        self.inner.ausgang.lock().take();
    }
}

// ---------------------------------------------------------------------------
// Verbindungs-Task
// ---------------------------------------------------------------------------

async fn verbindungs_task(inner: Arc<ChannelInner>) {
    let endpunkt = inner.config.endpunkt();
    let timeout_dauer = Duration::from_secs(inner.config.verbindungs_timeout_sek);

    tracing::info!(endpunkt = %endpunkt, "Verbinde mit Signaling-Server");

    let stream = match tokio::time::timeout(timeout_dauer, TcpStream::connect(&endpunkt)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            tracing::warn!(endpunkt = %endpunkt, fehler = %e, "Verbindungsaufbau fehlgeschlagen");
            inner.verbindung_laeuft.store(false, Ordering::SeqCst);
            let _ = inner
                .event_tx
                .send(SignalingEvent::StatusGeaendert(VerbindungsStatus::Getrennt))
                .await;
            return;
        }
        Err(_) => {
            tracing::warn!(endpunkt = %endpunkt, timeout_sek = timeout_dauer.as_secs(), "Verbindungs-Timeout");
            inner.verbindung_laeuft.store(false, Ordering::SeqCst);
            let _ = inner
                .event_tx
                .send(SignalingEvent::StatusGeaendert(VerbindungsStatus::Getrennt))
                .await;
            return;
        }
    };

    tracing::info!(endpunkt = %endpunkt, "Signaling-Verbindung hergestellt");

    let mut framed = Framed::new(stream, FrameCodec::new());
    let (sende_tx, mut sende_rx) = mpsc::channel::<Bytes>(QUEUE_KAPAZITAET);
    *inner.ausgang.lock() = Some(sende_tx);

    // Kam schliessen() waehrend des Verbindungsaufbaus, darf der Kanal
    // nicht live gehen. Die Pruefung passiert nach dem Registrieren des
    // Senders: ein spaeteres schliessen() sieht den Sender und beendet die
    // Sende-Queue, ein frueheres wird hier ueber das Flag erkannt.
    if inner.geschlossen.load(Ordering::SeqCst) {
        tracing::info!(endpunkt = %endpunkt, "Kanal waehrend des Verbindungsaufbaus geschlossen");
        inner.ausgang.lock().take();
        inner.verbindung_laeuft.store(false, Ordering::SeqCst);
        let _ = inner
            .event_tx
            .send(SignalingEvent::StatusGeaendert(VerbindungsStatus::Getrennt))
            .await;
        return;
    }

    inner.verbunden.store(true, Ordering::SeqCst);
    let _ = inner
        .event_tx
        .send(SignalingEvent::StatusGeaendert(VerbindungsStatus::Verbunden))
        .await;

    loop {
        tokio::select! {
            // Eingehender Frame von der Gegenseite
            frame = framed.next() => {
                match frame {
                    Some(Ok(payload)) => match SignalingMessage::aus_bytes(&payload) {
                        Ok(nachricht) => {
                            if inner
                                .event_tx
                                .send(SignalingEvent::Nachricht(nachricht))
                                .await
                                .is_err()
                            {
                                // Abonnent weg, Kanal kann zumachen
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(fehler = %e, "Frame nicht dekodierbar, verworfen");
                        }
                    },
                    Some(Err(e)) => {
                        tracing::warn!(fehler = %e, "Frame-Lesefehler");
                        break;
                    }
                    None => {
                        tracing::info!("Verbindung von der Gegenseite getrennt");
                        break;
                    }
                }
            }

            // Ausgehende Nachricht aus der Sende-Queue
            ausgehend = sende_rx.recv() => {
                match ausgehend {
                    Some(bytes) => {
                        if let Err(e) = framed.send(bytes).await {
                            tracing::warn!(fehler = %e, "Senden fehlgeschlagen");
                            break;
                        }
                    }
                    None => {
                        // schliessen() hat den Sender fallen gelassen
                        tracing::info!("Kanal lokal geschlossen");
                        break;
                    }
                }
            }
        }
    }

    inner.verbunden.store(false, Ordering::SeqCst);
    inner.ausgang.lock().take();
    inner.verbindung_laeuft.store(false, Ordering::SeqCst);
    let _ = inner
        .event_tx
        .send(SignalingEvent::StatusGeaendert(VerbindungsStatus::Getrennt))
        .await;
    tracing::info!("Verbindungs-Task beendet");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
