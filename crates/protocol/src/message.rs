//! Signaling-Umschlag (SDP und ICE-Kandidaten)
//!
//! Genau zwei Nachrichtenarten werden zwischen den Endpunkten ausgetauscht:
//! eine Session-Beschreibung (Offer/Answer) oder ein ICE-Kandidat. Der
//! Umschlag traegt einen expliziten Diskriminanten (`sdp` bzw. `candidate`),
//! damit der Decoder ohne strukturelles Raten dispatchen kann.
//!
//! ## Wire-Format (JSON)
//!
//! ```text
//! { "sdp": { "type": <int>, "sdp": <string> } }
//! { "candidate": { "sdpMid": <string|null>, "sdpMLineIndex": <int32>, "sdp": <string> } }
//! ```
//!
//! Der SDP-Typ wird als Integer-Ordinal kodiert. Ein unbekanntes Ordinal
//! faellt beim Dekodieren auf `Rollback` zurueck (dokumentierte
//! Kompatibilitaetsentscheidung, siehe [`SdpType::von_ordinal`]).

use serde::de::{Deserializer, Error as _};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Fehler-Typ
// ---------------------------------------------------------------------------

/// Fehler beim Dekodieren eines Signaling-Umschlags
///
/// Tritt auf bei unbekanntem oder fehlendem Diskriminanten, fehlenden
/// Pflichtfeldern oder wenn das `type`-Feld kein Integer ist. Ein
/// fehlgeschlagenes Dekodieren konstruiert niemals eine Teilnachricht.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Ungueltiger Signaling-Umschlag: {0}")]
    Umschlag(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// SDP-Typ
// ---------------------------------------------------------------------------

/// Art einer Session-Beschreibung
///
/// Die Ordinale entsprechen der Enumeration der Peer-Connection-Engine
/// und duerfen nicht umsortiert werden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpType {
    /// Verhandlungsvorschlag des Anrufers
    Offer = 0,
    /// Vorlaeufige Antwort
    PrAnswer = 1,
    /// Antwort des Angerufenen
    Answer = 2,
    /// Verhandlung zuruecksetzen
    Rollback = 3,
}

impl SdpType {
    /// Gibt das Integer-Ordinal fuer die Wire-Kodierung zurueck
    pub fn ordinal(&self) -> i64 {
        *self as i64
    }

    /// Dekodiert ein Ordinal zurueck in den SDP-Typ
    ///
    /// Ein Ordinal ohne passenden Enum-Wert faellt auf `Rollback` zurueck
    /// statt das Dekodieren scheitern zu lassen. Das uebernimmt das
    /// Verhalten der Gegenseite und wird hier bewusst laut geloggt, damit
    /// ein echter Protokoll-Mismatch im Log sichtbar bleibt.
    pub fn von_ordinal(ordinal: i64) -> Self {
        match ordinal {
            0 => SdpType::Offer,
            1 => SdpType::PrAnswer,
            2 => SdpType::Answer,
            3 => SdpType::Rollback,
            unbekannt => {
                tracing::warn!(
                    ordinal = unbekannt,
                    "Unbekanntes SDP-Typ-Ordinal, Fallback auf Rollback"
                );
                SdpType::Rollback
            }
        }
    }
}

impl Serialize for SdpType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for SdpType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Das type-Feld muss ein Integer sein; alles andere ist ein
        // Umschlag-Fehler und kein Fallback-Fall.
        let ordinal = i64::deserialize(deserializer)
            .map_err(|e| D::Error::custom(format!("SDP-Typ muss ein Integer-Ordinal sein: {e}")))?;
        Ok(SdpType::von_ordinal(ordinal))
    }
}

// ---------------------------------------------------------------------------
// Nachrichten-Typen
// ---------------------------------------------------------------------------

/// Lokaler oder entfernter Verhandlungsvorschlag (unveraenderlich)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    /// Art der Beschreibung, als Ordinal kodiert
    #[serde(rename = "type")]
    pub typ: SdpType,
    /// SDP-Textblock (opak, wird nicht interpretiert)
    pub sdp: String,
}

impl SessionDescription {
    /// Erstellt eine neue Session-Beschreibung
    pub fn neu(typ: SdpType, sdp: impl Into<String>) -> Self {
        Self {
            typ,
            sdp: sdp.into(),
        }
    }
}

/// Ein entdeckter Netzwerkpfad fuer die Peer-to-Peer-Verbindung
///
/// Pro Session existieren viele Kandidaten, untereinander ungeordnet, aber
/// jeder an eine bestimmte Media-Line gebunden (sdpMLineIndex/sdpMid).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    /// Media-Stream-Identifikation (optional)
    #[serde(rename = "sdpMid", default)]
    pub sdp_mid: Option<String>,
    /// Index der Media-Line auf die sich der Kandidat bezieht
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_mline_index: i32,
    /// candidate-Attributzeile (opak)
    pub sdp: String,
}

/// Umschlag fuer alle Signaling-Nachrichten
///
/// Extern getaggtes Enum: der Variantenname ist der Diskriminant im
/// JSON-Objekt (`sdp` bzw. `candidate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalingMessage {
    /// SDP Offer/Answer
    Sdp(SessionDescription),
    /// ICE-Kandidat
    Candidate(IceCandidate),
}

impl SignalingMessage {
    /// Serialisiert die Nachricht in ihre Byte-Form
    ///
    /// Deterministisch und fuer wohlgeformte Nachrichten immer erfolgreich.
    pub fn zu_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Dekodiert eine Nachricht aus ihrer Byte-Form
    pub fn aus_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_kandidat() -> IceCandidate {
        IceCandidate {
            sdp_mid: Some("0".to_string()),
            sdp_mline_index: 0,
            sdp: "candidate:1 1 UDP 2122252543 192.168.1.10 49203 typ host".to_string(),
        }
    }

    #[test]
    fn sdp_round_trip() {
        let original = SignalingMessage::Sdp(SessionDescription::neu(SdpType::Offer, "v=0\r\n"));
        let bytes = original.zu_bytes().unwrap();
        let decoded = SignalingMessage::aus_bytes(&bytes).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn kandidat_round_trip() {
        let original = SignalingMessage::Candidate(test_kandidat());
        let bytes = original.zu_bytes().unwrap();
        let decoded = SignalingMessage::aus_bytes(&bytes).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn sdp_wire_format_exakt() {
        let msg = SignalingMessage::Sdp(SessionDescription::neu(SdpType::Answer, "v=0\r\n"));
        let wert: serde_json::Value = serde_json::from_slice(&msg.zu_bytes().unwrap()).unwrap();
        assert_eq!(wert["sdp"]["type"], 2);
        assert_eq!(wert["sdp"]["sdp"], "v=0\r\n");
    }

    #[test]
    fn kandidat_wire_format_exakt() {
        let msg = SignalingMessage::Candidate(test_kandidat());
        let wert: serde_json::Value = serde_json::from_slice(&msg.zu_bytes().unwrap()).unwrap();
        assert_eq!(wert["candidate"]["sdpMid"], "0");
        assert_eq!(wert["candidate"]["sdpMLineIndex"], 0);
        assert!(wert["candidate"]["sdp"]
            .as_str()
            .unwrap()
            .starts_with("candidate:"));
    }

    #[test]
    fn sdp_mid_null_wird_none() {
        let json = br#"{"candidate":{"sdpMid":null,"sdpMLineIndex":1,"sdp":"candidate:x"}}"#;
        let decoded = SignalingMessage::aus_bytes(json).unwrap();
        if let SignalingMessage::Candidate(k) = decoded {
            assert_eq!(k.sdp_mid, None);
            assert_eq!(k.sdp_mline_index, 1);
        } else {
            panic!("Erwartet Candidate-Variante");
        }
    }

    #[test]
    fn sdp_mid_fehlend_wird_none() {
        let json = br#"{"candidate":{"sdpMLineIndex":0,"sdp":"candidate:x"}}"#;
        let decoded = SignalingMessage::aus_bytes(json).unwrap();
        if let SignalingMessage::Candidate(k) = decoded {
            assert_eq!(k.sdp_mid, None);
        } else {
            panic!("Erwartet Candidate-Variante");
        }
    }

    #[test]
    fn unbekanntes_ordinal_faellt_auf_rollback() {
        let json = br#"{"sdp":{"type":7,"sdp":"v=0\r\n"}}"#;
        let decoded = SignalingMessage::aus_bytes(json).unwrap();
        if let SignalingMessage::Sdp(sdp) = decoded {
            assert_eq!(sdp.typ, SdpType::Rollback);
        } else {
            panic!("Erwartet Sdp-Variante");
        }
    }

    #[test]
    fn alle_ordinale_round_trip() {
        for typ in [
            SdpType::Offer,
            SdpType::PrAnswer,
            SdpType::Answer,
            SdpType::Rollback,
        ] {
            assert_eq!(SdpType::von_ordinal(typ.ordinal()), typ);
        }
    }

    #[test]
    fn typ_als_string_schlaegt_fehl() {
        let json = br#"{"sdp":{"type":"offer","sdp":"v=0\r\n"}}"#;
        assert!(SignalingMessage::aus_bytes(json).is_err());
    }

    #[test]
    fn unbekannter_diskriminant_schlaegt_fehl() {
        let json = br#"{"blob":{"daten":"x"}}"#;
        assert!(SignalingMessage::aus_bytes(json).is_err());
    }

    #[test]
    fn fehlender_diskriminant_schlaegt_fehl() {
        assert!(SignalingMessage::aus_bytes(b"{}").is_err());
        assert!(SignalingMessage::aus_bytes(b"").is_err());
    }

    #[test]
    fn fehlendes_pflichtfeld_schlaegt_fehl() {
        let json = br#"{"candidate":{"sdpMid":"0"}}"#;
        assert!(SignalingMessage::aus_bytes(json).is_err());
    }

    #[test]
    fn negative_mline_index_erlaubt() {
        // Einige Engines liefern -1 wenn der Index unbekannt ist
        let json = br#"{"candidate":{"sdpMid":"audio","sdpMLineIndex":-1,"sdp":"candidate:x"}}"#;
        let decoded = SignalingMessage::aus_bytes(json).unwrap();
        if let SignalingMessage::Candidate(k) = decoded {
            assert_eq!(k.sdp_mline_index, -1);
        } else {
            panic!("Erwartet Candidate-Variante");
        }
    }
}
