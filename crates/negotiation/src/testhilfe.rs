//! Gemeinsame Test-Attrappen fuer Engine- und Session-Tests

use async_trait::async_trait;
use peerline_protocol::{IceCandidate, SdpType, SessionDescription};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Semaphore};

use crate::capability::{
    CapabilityError, PeerConnectionCapability, PeerConnectionEvent, PeerConnectionFactory,
};

/// Aufgezeichneter Capability-Aufruf
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Aufruf {
    CreateOffer,
    CreateAnswer,
    SetLocal(SdpType),
    SetRemote(SdpType),
    /// Traegt das sdp-Feld des Kandidaten zur Identifikation
    AddCandidate(String),
}

/// Attrappe der Peer-Connection-Engine
///
/// Zeichnet jeden Aufruf in Reihenfolge auf; ueber die Fehler-Flags laesst
/// sich jede Operation einzeln zum Scheitern bringen. `set_remote_sperre`
/// haelt setRemoteDescription an, bis der Test ein Permit freigibt.
#[derive(Default)]
pub(crate) struct MockCapability {
    pub aufrufe: Mutex<Vec<Aufruf>>,
    pub create_offer_fehler: bool,
    pub create_answer_fehler: bool,
    pub set_local_fehler: bool,
    pub set_remote_fehler: bool,
    pub add_candidate_fehler: bool,
    pub set_remote_sperre: Option<Arc<Semaphore>>,
}

impl MockCapability {
    pub fn aufrufe(&self) -> Vec<Aufruf> {
        self.aufrufe.lock().unwrap().clone()
    }

    fn aufzeichnen(&self, aufruf: Aufruf) {
        self.aufrufe.lock().unwrap().push(aufruf);
    }
}

#[async_trait]
impl PeerConnectionCapability for MockCapability {
    async fn create_local_offer(&self) -> Result<SessionDescription, CapabilityError> {
        self.aufzeichnen(Aufruf::CreateOffer);
        if self.create_offer_fehler {
            return Err(CapabilityError::neu("createOffer fehlgeschlagen"));
        }
        Ok(SessionDescription::neu(SdpType::Offer, "v=0 lokal"))
    }

    async fn create_local_answer(&self) -> Result<SessionDescription, CapabilityError> {
        self.aufzeichnen(Aufruf::CreateAnswer);
        if self.create_answer_fehler {
            return Err(CapabilityError::neu("createAnswer fehlgeschlagen"));
        }
        Ok(SessionDescription::neu(SdpType::Answer, "v=0 lokal"))
    }

    async fn set_local_description(
        &self,
        beschreibung: SessionDescription,
    ) -> Result<(), CapabilityError> {
        self.aufzeichnen(Aufruf::SetLocal(beschreibung.typ));
        if self.set_local_fehler {
            return Err(CapabilityError::neu("setLocalDescription fehlgeschlagen"));
        }
        Ok(())
    }

    async fn set_remote_description(
        &self,
        beschreibung: SessionDescription,
    ) -> Result<(), CapabilityError> {
        self.aufzeichnen(Aufruf::SetRemote(beschreibung.typ));
        if let Some(sperre) = &self.set_remote_sperre {
            let permit = sperre
                .acquire()
                .await
                .map_err(|e| CapabilityError::neu(e.to_string()))?;
            permit.forget();
        }
        if self.set_remote_fehler {
            return Err(CapabilityError::neu("setRemoteDescription fehlgeschlagen"));
        }
        Ok(())
    }

    async fn add_remote_candidate(&self, kandidat: IceCandidate) -> Result<(), CapabilityError> {
        self.aufzeichnen(Aufruf::AddCandidate(kandidat.sdp));
        if self.add_candidate_fehler {
            return Err(CapabilityError::neu("addRemoteCandidate fehlgeschlagen"));
        }
        Ok(())
    }
}

/// Fabrik-Attrappe
///
/// Gibt eine vorab konstruierte [`MockCapability`] heraus und merkt sich
/// den Ereignis-Sender, damit Tests Engine-Benachrichtigungen einspeisen
/// koennen.
#[derive(Default)]
pub(crate) struct MockFactory {
    pub capability: Arc<MockCapability>,
    pub erstellen_fehler: bool,
    pub ereignisse: Mutex<Option<mpsc::Sender<PeerConnectionEvent>>>,
}

impl MockFactory {
    /// Sender den die Session bei der Erstellung uebergeben hat
    pub fn ereignis_sender(&self) -> mpsc::Sender<PeerConnectionEvent> {
        self.ereignisse
            .lock()
            .unwrap()
            .clone()
            .expect("Fabrik wurde noch nicht aufgerufen")
    }
}

#[async_trait]
impl PeerConnectionFactory for MockFactory {
    type Verbindung = MockCapability;

    async fn erstellen(
        &self,
        ereignisse: mpsc::Sender<PeerConnectionEvent>,
    ) -> Result<Arc<MockCapability>, CapabilityError> {
        if self.erstellen_fehler {
            return Err(CapabilityError::neu("Fabrik fehlgeschlagen"));
        }
        *self.ereignisse.lock().unwrap() = Some(ereignisse);
        Ok(Arc::clone(&self.capability))
    }
}
