//! peerline-protocol – Signaling-Protokoll-Definitionen
//!
//! Dieses Crate definiert den Nachrichten-Umschlag der zwischen den beiden
//! Call-Endpunkten ausgetauscht wird (SDP Offer/Answer und ICE-Kandidaten)
//! sowie das Frame-Format fuer den Byte-Transport.

pub mod message;
pub mod wire;

pub use message::{DecodeError, IceCandidate, SdpType, SessionDescription, SignalingMessage};
pub use wire::FrameCodec;
