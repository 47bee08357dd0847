//! Gemeinsame Typen fuer Peerline
//!
//! Die Call-ID verwendet das Newtype-Pattern, damit sie nicht mit anderen
//! UUIDs verwechselt werden kann. Der Verbindungsstatus beschreibt nur die
//! Transport-Ebene und sagt nichts ueber den Verhandlungszustand aus.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige ID einer Call-Session (fuer Log-Korrelation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(pub Uuid);

impl CallId {
    /// Erstellt eine neue zufaellige CallId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call:{}", self.0)
    }
}

/// Status der Signaling-Verbindung (nur Transport-Ebene)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbindungsStatus {
    /// TCP-Verbindung zum Signaling-Server steht
    Verbunden,
    /// Keine Verbindung (initial oder nach Trennung)
    Getrennt,
}

impl std::fmt::Display for VerbindungsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerbindungsStatus::Verbunden => write!(f, "verbunden"),
            VerbindungsStatus::Getrennt => write!(f, "getrennt"),
        }
    }
}
