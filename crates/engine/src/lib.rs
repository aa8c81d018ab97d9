//! whisper-engine – Handshake, Konfliktaufloesung, Quorum und Schluesselverteilung
//!
//! ## Module
//! - `engine` - `WhisperEngine`, verarbeitet Umschlaege und Transport-Ereignisse
//! - `registry` - Peers und Handshake-Status je Peer
//! - `token` - Verhandlungs-Tokens mit Ablauf und Einmal-Abschluss
//! - `konflikt` - Tie-Break bei Handle-Kollisionen
//! - `quorum` - Mehrheitsentscheidung ueber den eigenen Handle
//! - `kanal` - Broadcast-Paare, Versiegeln und Oeffnen von Umschlaegen
//! - `session` - Tokio-Task, der die Engine besitzt

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod ich;
pub mod kanal;
pub mod konflikt;
pub mod quorum;
pub mod registry;
pub mod session;
pub mod token;

#[cfg(test)]
mod tests;

pub use config::{EngineKonfiguration, Vertrauensmodus};
pub use engine::WhisperEngine;
pub use error::{EngineError, EngineResult};
pub use event::EngineEvent;
pub use ich::Ich;
pub use registry::{Peer, PeerRegistry, Verbindungsstatus};
pub use session::{sitzung_starten, SitzungsHandle};
