//! Fehlertypen fuer die Verhandlung

use peerline_core::PeerlineError;
use thiserror::Error;

use crate::capability::CapabilityError;

/// Fehlertyp der Verhandlungs-Zustandsmaschine
///
/// Jede Variante benennt die gescheiterte Capability-Operation. Die
/// Verhandlung bleibt bei jedem Fehler in ihrem letzten gueltigen Zustand;
/// eine fatale Fehlerklasse gibt es nicht.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// createLocalOffer/createLocalAnswer fehlgeschlagen
    #[error("Beschreibung erstellen fehlgeschlagen: {0}")]
    Erstellen(#[source] CapabilityError),

    /// setLocalDescription fehlgeschlagen
    #[error("Lokale Beschreibung setzen fehlgeschlagen: {0}")]
    LokalSetzen(#[source] CapabilityError),

    /// setRemoteDescription fehlgeschlagen
    #[error("Remote-Beschreibung setzen fehlgeschlagen: {0}")]
    RemoteSetzen(#[source] CapabilityError),

    /// addRemoteCandidate fehlgeschlagen
    #[error("Kandidat hinzufuegen fehlgeschlagen: {0}")]
    Kandidat(#[source] CapabilityError),

    /// Die Session wurde abgebaut; die Operation wurde verworfen
    #[error("Session bereits abgebaut")]
    Abgebaut,
}

/// Result-Typ fuer die Verhandlung
pub type NegotiationResult<T> = Result<T, NegotiationError>;

impl From<NegotiationError> for PeerlineError {
    fn from(e: NegotiationError) -> Self {
        PeerlineError::Verhandlung(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = NegotiationError::RemoteSetzen(CapabilityError::neu("ungueltiges SDP"));
        assert_eq!(
            e.to_string(),
            "Remote-Beschreibung setzen fehlgeschlagen: ungueltiges SDP"
        );
    }

    #[test]
    fn konvertierung_zu_peerline_fehler() {
        let e: PeerlineError = NegotiationError::Abgebaut.into();
        assert!(matches!(e, PeerlineError::Verhandlung(_)));
    }
}
