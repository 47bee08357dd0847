//! peerline-negotiation – Verhandlungs-Zustandsmaschine
//!
//! Dieser Crate besitzt den Verhandlungszustand eines Calls: welche
//! Beschreibungen gesetzt sind und welche Remote-Kandidaten noch auf die
//! Remote-Beschreibung warten. Die eigentliche Peer-Connection-Engine
//! (ICE-Gathering, DTLS/SRTP, Medien) ist ein externer Mitspieler und wird
//! nur ueber die schmale [`PeerConnectionCapability`]-Schnittstelle
//! angesprochen.
//!
//! ## Architektur
//!
//! ```text
//! CallSession (Orchestrierung)
//!     |
//!     +-- SignalingChannel  -> SignalingEvent  --+
//!     +-- Capability-Events -> mpsc             -+-> Ereignis-Pumpe
//!                                                     |
//!                                                     v
//!                                            NegotiationEngine
//!                                                     |
//!                                                     v
//!                                          PeerConnectionCapability
//! ```
//!
//! Alle Operationen sind async; jede Zustandsaenderung wird unter einem
//! Mutex committet und aeussere Seiteneffekte passieren erst danach.

pub mod capability;
pub mod engine;
pub mod error;
pub mod session;

#[cfg(test)]
pub(crate) mod testhilfe;

// Bequeme Re-Exporte
pub use capability::{
    CapabilityError, PeerConnectionCapability, PeerConnectionEvent, PeerConnectionFactory,
    PeerVerbindungsZustand,
};
pub use engine::NegotiationEngine;
pub use error::{NegotiationError, NegotiationResult};
pub use session::{CallSession, SessionEvent};
