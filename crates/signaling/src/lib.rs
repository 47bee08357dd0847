//! peerline-signaling – Client-seitiger Signaling-Kanal
//!
//! Dieser Crate abstrahiert den bidirektionalen Byte-Transport zum
//! Signaling-Server samt Verbindungslebenszyklus. Die Verhandlungslogik
//! sieht nur noch typisierte [`SignalingEvent`]s und eine
//! Fire-and-Forget-Sendemethode.
//!
//! ## Architektur
//!
//! ```text
//! SignalingChannel::verbinden()
//!     |
//!     v
//! Verbindungs-Task (ein tokio-Task pro Verbindung)
//!     |  Framed<TcpStream, FrameCodec>
//!     |
//!     +-- eingehende Frames  -> SignalingMessage -> SignalingEvent::Nachricht
//!     +-- Statuswechsel      -> SignalingEvent::StatusGeaendert
//!     +-- Sende-Queue (mpsc) -> Frames zum Server
//! ```
//!
//! Wiederverbindungs- und Backoff-Politik liegt beim Aufrufer: nach einem
//! `Getrennt`-Event darf `verbinden()` erneut gerufen werden.

pub mod channel;
pub mod config;
pub mod event;

// Bequeme Re-Exporte
pub use channel::SignalingChannel;
pub use config::SignalConfig;
pub use event::SignalingEvent;
