//! Transport-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Kanal ohne Konfigurationsdatei
//! lauffaehig ist. Mehr als Adresse, Port und Verbindungs-Timeout gibt es
//! bewusst nicht – der Kern kennt keine weiteren Umgebungsvariablen.

use peerline_core::PeerlineError;
use serde::{Deserialize, Serialize};

/// Konfiguration des Signaling-Transports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Adresse des Signaling-Servers
    pub adresse: String,
    /// Port des Signaling-Servers
    pub port: u16,
    /// Timeout fuer den Verbindungsaufbau in Sekunden
    pub verbindungs_timeout_sek: u64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            adresse: "127.0.0.1".into(),
            port: 8080,
            verbindungs_timeout_sek: 5,
        }
    }
}

impl SignalConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> peerline_core::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str(&inhalt).map_err(|e| {
                PeerlineError::Konfiguration(format!("Fehler in '{pfad}': {e}"))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(pfad, "Keine Konfigurationsdatei, verwende Standardwerte");
                Ok(Self::default())
            }
            Err(e) => Err(PeerlineError::Konfiguration(format!(
                "'{pfad}' nicht lesbar: {e}"
            ))),
        }
    }

    /// Gibt den Endpunkt als `adresse:port` zurueck
    pub fn endpunkt(&self) -> String {
        format!("{}:{}", self.adresse, self.port)
    }
}
