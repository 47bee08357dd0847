//! Wire-Format fuer den Signaling-Transport
//!
//! Frame-basiertes Protokoll: Length(u32 big-endian) + Payload.
//!
//! ## Frame-Format
//!
//! ```text
//! +--------+--------+--------+--------+----...----+
//! | Laenge (u32 BE) | 4 Bytes        | Payload    |
//! +--------+--------+--------+--------+----...----+
//! ```
//!
//! Die Laenge gibt die Anzahl der Payload-Bytes an (ohne die 4
//! Laengen-Bytes). Der Codec liefert die Payload als rohe Bytes; das
//! JSON-Dekodieren passiert eine Ebene hoeher in [`crate::message`], damit
//! ein kaputter Payload verworfen werden kann ohne den Frame-Strom zu
//! desynchronisieren.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Standard-maximale Frame-Groesse (1 MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Groesse des Laengen-Felds in Bytes
pub const LENGTH_FIELD_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// FrameCodec
// ---------------------------------------------------------------------------

/// tokio-util Codec fuer den frame-basierten Signaling-Transport
///
/// Implementiert `Encoder<Bytes>` und `Decoder` fuer die Integration mit
/// `tokio_util::codec::Framed`.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    /// Maximale erlaubte Frame-Groesse in Bytes
    max_frame_size: usize,
}

impl FrameCodec {
    /// Erstellt einen neuen `FrameCodec` mit Standard-Limits
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Erstellt einen `FrameCodec` mit benutzerdefinierter maximaler Frame-Groesse
    pub fn with_max_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Gibt die konfigurierte maximale Frame-Groesse zurueck
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Decoder-Implementierung
// ---------------------------------------------------------------------------

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Warte auf mindestens 4 Bytes fuer das Laengen-Feld
        if src.len() < LENGTH_FIELD_SIZE {
            return Ok(None);
        }

        // Laenge lesen (big-endian u32) ohne den Buffer zu veraendern
        let length = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;

        // Maximale Frame-Groesse pruefen
        if length > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Frame zu gross: {} Bytes (Maximum: {} Bytes)",
                    length, self.max_frame_size
                ),
            ));
        }

        // Pruefen ob der vollstaendige Frame bereits im Buffer ist
        let total_size = LENGTH_FIELD_SIZE + length;
        if src.len() < total_size {
            // Speicher vorbelegen um Reallocations zu vermeiden
            src.reserve(total_size - src.len());
            return Ok(None);
        }

        // Laengen-Feld verbrauchen und Payload extrahieren
        src.advance(LENGTH_FIELD_SIZE);
        let payload = src.split_to(length).freeze();

        Ok(Some(payload))
    }
}

// ---------------------------------------------------------------------------
// Encoder-Implementierung
// ---------------------------------------------------------------------------

impl Encoder<Bytes> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        // Groesse pruefen
        if item.len() > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Nachricht zu gross: {} Bytes (Maximum: {} Bytes)",
                    item.len(),
                    self.max_frame_size
                ),
            ));
        }

        // Laengen-Feld + Payload schreiben
        dst.reserve(LENGTH_FIELD_SIZE + item.len());
        dst.put_u32(item.len() as u32);
        dst.put_slice(&item);

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{SdpType, SessionDescription, SignalingMessage};

    fn test_nachricht_bytes() -> Bytes {
        let msg = SignalingMessage::Sdp(SessionDescription::neu(SdpType::Offer, "v=0\r\n"));
        Bytes::from(msg.zu_bytes().unwrap())
    }

    #[test]
    fn frame_codec_encode_decode_round_trip() {
        let mut codec = FrameCodec::new();
        let original = test_nachricht_bytes();

        // Kodieren
        let mut buf = BytesMut::new();
        codec.encode(original.clone(), &mut buf).unwrap();

        // Laengen-Feld pruefen
        let payload_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(payload_len, original.len());
        assert_eq!(buf.len(), LENGTH_FIELD_SIZE + payload_len);

        // Dekodieren
        let decoded = codec
            .decode(&mut buf)
            .unwrap()
            .expect("Muss einen Frame enthalten");
        assert_eq!(decoded, original);
    }

    #[test]
    fn frame_codec_unvollstaendiger_frame() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(test_nachricht_bytes(), &mut buf).unwrap();

        // Nur die Haelfte der Bytes behalten
        let half = buf.len() / 2;
        let mut partial = buf.split_to(half);

        // Sollte None zurueckgeben (wartet auf mehr Daten)
        let result = codec.decode(&mut partial).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn frame_codec_zu_wenig_bytes_fuer_laengenfeld() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&[0x00, 0x00][..]);
        let result = codec.decode(&mut buf).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn frame_codec_ablehnung_zu_grosser_frame() {
        let mut codec = FrameCodec::with_max_size(100);

        // Frame-Laenge von 200 Bytes im Buffer simulieren
        let mut buf = BytesMut::new();
        buf.put_u32(200);
        buf.put_slice(&[b'x'; 200]);

        let result = codec.decode(&mut buf);
        assert!(result.is_err());
    }

    #[test]
    fn frame_codec_ablehnung_beim_encode_zu_grosse_nachricht() {
        let mut codec = FrameCodec::with_max_size(10);
        let original = test_nachricht_bytes(); // Sicher > 10 Bytes

        let mut buf = BytesMut::new();
        let result = codec.encode(original, &mut buf);
        assert!(result.is_err());
    }

    #[test]
    fn frame_codec_mehrere_frames_im_buffer() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        // Drei Frames kodieren
        for i in 0..3u8 {
            codec
                .encode(Bytes::from(vec![i, i, i]), &mut buf)
                .unwrap();
        }

        // Alle drei dekodieren
        for i in 0..3u8 {
            let frame = codec.decode(&mut buf).unwrap().expect("Frame erwartet");
            assert_eq!(&frame[..], &[i, i, i]);
        }

        // Buffer muss leer sein
        assert!(buf.is_empty());
    }

    #[test]
    fn frame_codec_kaputter_payload_desynchronisiert_nicht() {
        // Ein Frame mit ungueltigem JSON gefolgt von einem gueltigen Frame:
        // der Codec liefert beide Payloads, die Bewertung passiert oben.
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        codec
            .encode(Bytes::from_static(b"kein json"), &mut buf)
            .unwrap();
        let gueltig = test_nachricht_bytes();
        codec.encode(gueltig.clone(), &mut buf).unwrap();

        let erster = codec.decode(&mut buf).unwrap().unwrap();
        assert!(SignalingMessage::aus_bytes(&erster).is_err());

        let zweiter = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(zweiter, gueltig);
        assert!(SignalingMessage::aus_bytes(&zweiter).is_ok());
    }

    #[test]
    fn frame_codec_default_max_size() {
        let codec = FrameCodec::new();
        assert_eq!(codec.max_frame_size(), DEFAULT_MAX_FRAME_SIZE);
    }
}
