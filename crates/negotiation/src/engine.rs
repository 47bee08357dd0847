//! Verhandlungs-Zustandsmaschine
//!
//! Besitzt den Verhandlungszustand einer Call-Session und reagiert auf
//! Nachrichten der Gegenseite sowie auf Benachrichtigungen der
//! Peer-Connection-Engine.
//!
//! ## Zustandsmaschine
//!
//! ```text
//! Anrufer:    idle -> Offer erstellt -> lokal gesetzt -> (Answer kommt) -> stabil
//! Angerufener: idle -> Remote-Offer gesetzt -> Answer erstellt -> lokal gesetzt -> stabil
//! ```
//!
//! Remote-Kandidaten die vor der Remote-Beschreibung eintreffen werden in
//! Empfangsreihenfolge zurueckgestellt und erst nach erfolgreichem
//! setRemoteDescription nachgezogen. Das ist eine reale Bedingung des
//! ungeordneten Signaling-Kanals, kein Defekt.
//!
//! ## Nebenlaeufigkeit
//!
//! Der Zustand liegt hinter einem Mutex der niemals ueber einen
//! Capability-Await gehalten wird: jede Operation merkt sich die Epoche,
//! wartet auf die Engine, sperrt erneut und prueft die Epoche bevor sie
//! committet. `abbauen()` erhoeht die Epoche, wodurch verspaetete
//! Bestaetigungen verworfen statt auf einen zurueckgesetzten Zustand
//! angewendet werden.

use parking_lot::Mutex;
use peerline_core::CallId;
use peerline_protocol::{IceCandidate, SessionDescription, SignalingMessage};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::capability::PeerConnectionCapability;
use crate::error::{NegotiationError, NegotiationResult};

// ---------------------------------------------------------------------------
// Zustand
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Zustand {
    /// Wird bei jedem Abbau erhoeht; Operationen committen nur wenn die
    /// Epoche seit ihrem Start unveraendert ist
    epoche: u64,
    /// true nach abbauen() – alle weiteren Operationen werden verworfen
    abgebaut: bool,
    /// Lokale Beschreibung erfolgreich gesetzt
    lokal_gesetzt: bool,
    /// Remote-Beschreibung erfolgreich gesetzt und Warteschlange geleert
    remote_gesetzt: bool,
    /// Remote-Kandidaten die auf die Remote-Beschreibung warten
    /// (Empfangsreihenfolge)
    warteschlange: VecDeque<IceCandidate>,
}

// ---------------------------------------------------------------------------
// NegotiationEngine
// ---------------------------------------------------------------------------

/// Die Verhandlungs-Zustandsmaschine einer Call-Session
pub struct NegotiationEngine<C: PeerConnectionCapability> {
    capability: Arc<C>,
    /// Ausgehender Signaling-Pfad (lokale Kandidaten)
    ausgang: mpsc::Sender<SignalingMessage>,
    call_id: CallId,
    zustand: Mutex<Zustand>,
}

impl<C: PeerConnectionCapability> NegotiationEngine<C> {
    /// Erstellt eine neue Engine fuer eine Call-Session
    pub fn neu(
        capability: Arc<C>,
        ausgang: mpsc::Sender<SignalingMessage>,
        call_id: CallId,
    ) -> Self {
        Self {
            capability,
            ausgang,
            call_id,
            zustand: Mutex::new(Zustand::default()),
        }
    }

    /// Startet die Verhandlung als Anrufer
    ///
    /// Erstellt eine Offer-Beschreibung, setzt sie als lokale Beschreibung
    /// und gibt sie erst nach erfolgreichem Commit an den Aufrufer zur
    /// Uebertragung heraus. Schlaegt einer der Schritte fehl, bleibt die
    /// Engine in ihrem bisherigen Zustand und es wird keine Beschreibung
    /// herausgegeben.
    pub async fn offer_starten(&self) -> NegotiationResult<SessionDescription> {
        self.lokale_beschreibung_erstellen(false).await
    }

    /// Startet die Antwort als Angerufener
    ///
    /// Symmetrisch zu [`offer_starten`](Self::offer_starten); setzt
    /// engine-seitig eine gesetzte Remote-Offer voraus, deren Fehlen als
    /// Capability-Fehler durchgereicht wird.
    pub async fn answer_starten(&self) -> NegotiationResult<SessionDescription> {
        self.lokale_beschreibung_erstellen(true).await
    }

    async fn lokale_beschreibung_erstellen(
        &self,
        antwort: bool,
    ) -> NegotiationResult<SessionDescription> {
        let epoche = self.epoche_lesen()?;

        let beschreibung = if antwort {
            self.capability.create_local_answer().await
        } else {
            self.capability.create_local_offer().await
        }
        .map_err(NegotiationError::Erstellen)?;

        self.capability
            .set_local_description(beschreibung.clone())
            .await
            .map_err(NegotiationError::LokalSetzen)?;

        // Commit nur wenn die Session inzwischen nicht abgebaut wurde
        {
            let mut zustand = self.zustand.lock();
            if zustand.abgebaut || zustand.epoche != epoche {
                return Err(NegotiationError::Abgebaut);
            }
            zustand.lokal_gesetzt = true;
        }

        tracing::info!(
            call = %self.call_id,
            typ = ?beschreibung.typ,
            "Lokale Beschreibung gesetzt"
        );
        Ok(beschreibung)
    }

    /// Wendet eine Beschreibung der Gegenseite an
    ///
    /// Nach erfolgreichem setRemoteDescription werden zurueckgestellte
    /// Kandidaten in Empfangsreihenfolge nachgezogen. `remote_gesetzt`
    /// wird erst markiert wenn die Warteschlange leer ist, damit Kandidaten
    /// die waehrend des Nachziehens eintreffen nicht ueberholen koennen.
    pub async fn remote_beschreibung_anwenden(
        &self,
        beschreibung: SessionDescription,
    ) -> NegotiationResult<()> {
        let epoche = self.epoche_lesen()?;
        let typ = beschreibung.typ;

        self.capability
            .set_remote_description(beschreibung)
            .await
            .map_err(NegotiationError::RemoteSetzen)?;

        let mut nachgezogen = 0usize;
        loop {
            let naechster = {
                let mut zustand = self.zustand.lock();
                if zustand.abgebaut || zustand.epoche != epoche {
                    return Err(NegotiationError::Abgebaut);
                }
                match zustand.warteschlange.pop_front() {
                    Some(kandidat) => kandidat,
                    None => {
                        zustand.remote_gesetzt = true;
                        break;
                    }
                }
            };

            if let Err(e) = self.capability.add_remote_candidate(naechster).await {
                // Die Beschreibung selbst ist committet; die restliche
                // Warteschlange ist ohne die abgelehnte Reihenfolge wertlos
                // und wird verworfen.
                let verworfen = {
                    let mut zustand = self.zustand.lock();
                    let anzahl = zustand.warteschlange.len();
                    zustand.warteschlange.clear();
                    zustand.remote_gesetzt = true;
                    anzahl
                };
                tracing::warn!(
                    call = %self.call_id,
                    verworfen,
                    fehler = %e,
                    "Zurueckgestellter Kandidat abgelehnt"
                );
                return Err(NegotiationError::Kandidat(e));
            }
            nachgezogen += 1;
        }

        tracing::info!(
            call = %self.call_id,
            typ = ?typ,
            nachgezogen,
            "Remote-Beschreibung gesetzt"
        );
        Ok(())
    }

    /// Wendet einen Kandidaten der Gegenseite an
    ///
    /// Ohne gesetzte Remote-Beschreibung wird der Kandidat in
    /// Empfangsreihenfolge zurueckgestellt, sonst direkt an die Engine
    /// weitergereicht.
    pub async fn remote_kandidat_anwenden(
        &self,
        kandidat: IceCandidate,
    ) -> NegotiationResult<()> {
        {
            let mut zustand = self.zustand.lock();
            if zustand.abgebaut {
                return Err(NegotiationError::Abgebaut);
            }
            if !zustand.remote_gesetzt {
                zustand.warteschlange.push_back(kandidat);
                tracing::debug!(
                    call = %self.call_id,
                    wartend = zustand.warteschlange.len(),
                    "Kandidat zurueckgestellt (keine Remote-Beschreibung)"
                );
                return Ok(());
            }
        }

        self.capability
            .add_remote_candidate(kandidat)
            .await
            .map_err(NegotiationError::Kandidat)
    }

    /// Meldet einen lokal generierten Kandidaten
    ///
    /// Wird genau einmal und in Generierungsreihenfolge auf den
    /// ausgehenden Signaling-Pfad gelegt – unabhaengig vom
    /// Verhandlungszustand. Nach dem Abbau werden Kandidaten verworfen.
    pub async fn lokalen_kandidat_melden(&self, kandidat: IceCandidate) {
        if self.zustand.lock().abgebaut {
            tracing::debug!(call = %self.call_id, "Kandidat nach Abbau verworfen");
            return;
        }
        tracing::debug!(call = %self.call_id, "Lokaler Kandidat wird gesendet");
        if self
            .ausgang
            .send(SignalingMessage::Candidate(kandidat))
            .await
            .is_err()
        {
            tracing::warn!(call = %self.call_id, "Ausgangs-Queue geschlossen, Kandidat verworfen");
        }
    }

    /// Baut die Verhandlung ab (idempotent)
    ///
    /// Erhoeht die Epoche, sodass in-flight Bestaetigungen der Engine
    /// verworfen werden statt auf den abgebauten Zustand zu wirken.
    pub fn abbauen(&self) {
        let mut zustand = self.zustand.lock();
        if zustand.abgebaut {
            return;
        }
        zustand.abgebaut = true;
        zustand.epoche += 1;
        zustand.lokal_gesetzt = false;
        zustand.remote_gesetzt = false;
        zustand.warteschlange.clear();
        tracing::info!(call = %self.call_id, "Verhandlung abgebaut");
    }

    /// Liest die aktuelle Epoche oder lehnt ab wenn bereits abgebaut
    fn epoche_lesen(&self) -> NegotiationResult<u64> {
        let zustand = self.zustand.lock();
        if zustand.abgebaut {
            return Err(NegotiationError::Abgebaut);
        }
        Ok(zustand.epoche)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
