//! whisper-transport – Verbindung zum Relay
//!
//! Der Transport liefert rohe Textnachrichten und Verbindungsereignisse an
//! die Sitzung. Er kennt weder Umschlaege noch Schluessel.
//!
//! ## Wiederverbindung
//! - Abnormales Ende: `Getrennt`, dann `Wiederverbinden(ms)`, neuer Versuch
//! - Normales Ende (eigenes `schliessen()` oder Relay-Close 1000): nur `Getrennt`

pub mod config;
pub mod error;
pub mod ws;

pub use config::TransportKonfiguration;
pub use error::{TransportError, TransportResult};
pub use ws::WsTransport;

use std::time::Duration;

/// Ereignisse, die ein Transport an seinen Besitzer meldet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Verbunden,
    /// Verbindung beendet, optional mit Grund des Relays (z.B. `room.dispose`)
    Getrennt { grund: Option<String> },
    /// Naechster Verbindungsversuch nach `verzoegerung`
    Wiederverbinden { verzoegerung: Duration },
    Nachricht(String),
}

/// Sendeseite eines Transports
///
/// Die Engine haelt den Transport als `Box<dyn Transport>`, Tests koennen
/// eigene Implementierungen einsetzen.
pub trait Transport: Send {
    /// Reicht eine Textnachricht an die Verbindung weiter
    fn senden(&self, daten: String) -> TransportResult<()>;

    /// Beendet die Verbindung ohne Wiederverbindung
    fn schliessen(&self);

    fn ist_verbunden(&self) -> bool;
}
