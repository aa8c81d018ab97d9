use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport-Einstellungen (`[transport]` in der Client-Konfiguration)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportKonfiguration {
    /// Wartezeit vor einem neuen Verbindungsversuch (0 = nie wiederverbinden)
    pub wiederverbindung_ms: u64,
    /// Maximale Groesse einer einzelnen Nachricht in Bytes
    pub max_nachricht_bytes: usize,
}

impl Default for TransportKonfiguration {
    fn default() -> Self {
        Self {
            wiederverbindung_ms: 4000,
            max_nachricht_bytes: 1024 * 1024,
        }
    }
}

impl TransportKonfiguration {
    pub fn wiederverbindung(&self) -> Option<Duration> {
        (self.wiederverbindung_ms > 0).then(|| Duration::from_millis(self.wiederverbindung_ms))
    }
}
