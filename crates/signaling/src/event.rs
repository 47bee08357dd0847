//! Ereignisse des Signaling-Kanals
//!
//! Der Kanal meldet sich ausschliesslich ueber diese Ereignisse beim
//! Abonnenten – es gibt keinen geteilten Delegate-Slot.

use peerline_core::VerbindungsStatus;
use peerline_protocol::SignalingMessage;

/// Ereignis aus dem Signaling-Kanal
#[derive(Debug, Clone, PartialEq)]
pub enum SignalingEvent {
    /// Transport-Status hat sich geaendert (verbunden/getrennt)
    StatusGeaendert(VerbindungsStatus),
    /// Eine dekodierte Nachricht der Gegenseite ist eingetroffen
    Nachricht(SignalingMessage),
}
