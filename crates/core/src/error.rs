//! Fehlertypen fuer Peerline
//!
//! Zentraler Fehler-Enum der alle moeglichen Fehlerzustaende abdeckt.
//! Untermodule definieren eigene Fehler und konvertieren sie hierher
//! (via `#[from]` oder eigener From-Implementierung).

use thiserror::Error;

/// Globaler Result-Alias fuer Peerline
pub type Result<T> = std::result::Result<T, PeerlineError>;

/// Alle moeglichen Fehler im Peerline-System
#[derive(Debug, Error)]
pub enum PeerlineError {
    // --- Verbindung & Netzwerk ---
    #[error("Verbindung fehlgeschlagen: {0}")]
    Verbindung(String),

    #[error("Verbindung getrennt: {0}")]
    Getrennt(String),

    // --- Protokoll ---
    #[error("Nachricht nicht dekodierbar: {0}")]
    Dekodierung(String),

    // --- Verhandlung ---
    #[error("Verhandlung fehlgeschlagen: {0}")]
    Verhandlung(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl PeerlineError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler transportbedingt ist und ein
    /// erneuter Verbindungsaufbau sinnvoll sein koennte
    pub fn ist_transportfehler(&self) -> bool {
        matches!(self, Self::Verbindung(_) | Self::Getrennt(_))
    }
}
