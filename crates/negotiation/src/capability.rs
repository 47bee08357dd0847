//! Schnittstelle zur externen Peer-Connection-Engine
//!
//! Die Engine (ICE, DTLS/SRTP, Medien) liegt ausserhalb dieses Systems.
//! Der Kern spricht sie ausschliesslich ueber [`PeerConnectionCapability`]
//! an und empfaengt ihre Benachrichtigungen als [`PeerConnectionEvent`]s
//! ueber einen tokio-Kanal – kein geteilter Delegate-Slot, keine
//! versteckten Singletons.

use async_trait::async_trait;
use peerline_protocol::{IceCandidate, SessionDescription};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Fehler aus einer Operation der Peer-Connection-Engine
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

impl CapabilityError {
    /// Erstellt einen Capability-Fehler aus einer beliebigen Nachricht
    pub fn neu(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Verbindungszustand der Peer-Verbindung (nur Beobachtung)
///
/// Wird geloggt und an die Session weitergereicht, traegt aber nicht zur
/// Korrektheit der Verhandlung bei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerVerbindungsZustand {
    Neu,
    Verbindet,
    Verbunden,
    Getrennt,
    Fehlgeschlagen,
    Geschlossen,
}

/// Benachrichtigungen der Peer-Connection-Engine an die Verhandlung
#[derive(Debug, Clone)]
pub enum PeerConnectionEvent {
    /// Ein lokaler ICE-Kandidat wurde entdeckt (kann jederzeit kommen,
    /// auch bevor die Verhandlung abgeschlossen ist)
    KandidatGeneriert(IceCandidate),
    /// Der Verbindungszustand hat sich geaendert
    ZustandGeaendert(PeerVerbindungsZustand),
}

/// Operationen die die Verhandlung von der Engine benoetigt
///
/// Alle Operationen sind asynchron und duerfen fehlschlagen; der Kern
/// nimmt niemals Erfolg an.
#[async_trait]
pub trait PeerConnectionCapability: Send + Sync + 'static {
    /// Erstellt eine lokale Offer-Beschreibung
    async fn create_local_offer(&self) -> Result<SessionDescription, CapabilityError>;

    /// Erstellt eine lokale Answer-Beschreibung
    ///
    /// Setzt engine-seitig eine bereits gesetzte Remote-Offer voraus; die
    /// Verhandlung dupliziert diese Pruefung nicht, sondern reicht den
    /// Fehler durch.
    async fn create_local_answer(&self) -> Result<SessionDescription, CapabilityError>;

    /// Setzt die lokale Beschreibung
    async fn set_local_description(
        &self,
        beschreibung: SessionDescription,
    ) -> Result<(), CapabilityError>;

    /// Setzt die Beschreibung der Gegenseite
    async fn set_remote_description(
        &self,
        beschreibung: SessionDescription,
    ) -> Result<(), CapabilityError>;

    /// Fuegt einen Kandidaten der Gegenseite hinzu
    async fn add_remote_candidate(&self, kandidat: IceCandidate) -> Result<(), CapabilityError>;
}

/// Fabrik fuer Peer-Verbindungen
///
/// Explizit besessene Instanz statt prozessweitem Singleton: die Fabrik
/// gehoert der Wurzel der Call-Session und erstellt pro Session genau eine
/// Verbindung. Der Ereignis-Sender wird bei der Erstellung uebergeben.
#[async_trait]
pub trait PeerConnectionFactory: Send + Sync + 'static {
    /// Typ der erstellten Peer-Verbindung
    type Verbindung: PeerConnectionCapability;

    /// Erstellt eine neue Peer-Verbindung die ihre Benachrichtigungen an
    /// `ereignisse` sendet
    async fn erstellen(
        &self,
        ereignisse: mpsc::Sender<PeerConnectionEvent>,
    ) -> Result<Arc<Self::Verbindung>, CapabilityError>;
}
