//! Gemeinsame Werttypen fuer Whisper
//!
//! `Since` ist der vom Relay vergebene Beitrittszeitpunkt eines Teilnehmers.
//! Er geht als Zeichenkette in den Challenge-Hash ein und muss deshalb auf
//! allen Clients byte-identisch formatiert werden.

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WhisperError;

/// Kanonisches Zeitformat des Relays (kompatibel mit `Date.parse`)
pub const SINCE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Vom Relay vergebener Beitrittszeitpunkt (UTC, Millisekunden-Aufloesung)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Since(DateTime<Utc>);

impl Since {
    /// Erstellt einen Since-Wert, abgeschnitten auf Millisekunden
    pub fn neu(zeit: DateTime<Utc>) -> Self {
        let millis = zeit.timestamp_millis();
        Self(DateTime::from_timestamp_millis(millis).unwrap_or(zeit))
    }

    /// Parst die Wire-Darstellung `2024-01-02T03:04:05.678Z`
    pub fn parsen(s: &str) -> Result<Self, WhisperError> {
        if let Ok(naiv) = NaiveDateTime::parse_from_str(s, SINCE_FORMAT) {
            return Ok(Self::neu(naiv.and_utc()));
        }
        // Fallback fuer RFC3339 mit Offset
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self::neu(dt.with_timezone(&Utc)))
            .map_err(|e| WhisperError::UngueltigerZeitstempel(format!("{}: {}", s, e)))
    }

    /// Kanonische Wire-Darstellung
    pub fn als_text(&self) -> String {
        self.0.format(SINCE_FORMAT).to_string()
    }

    pub fn zeit(&self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Since {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.als_text())
    }
}

impl Serialize for Since {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.als_text())
    }
}

impl<'de> Deserialize<'de> for Since {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Since::parsen(&s).map_err(serde::de::Error::custom)
    }
}

/// Erzeugt eine zufaellige alphanumerische Zeichenkette der Laenge `laenge`
///
/// Wird fuer Verhandlungs-Token (16 Zeichen) und erneuerte Handles
/// (5 Zeichen) verwendet.
pub fn zufalls_id(laenge: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(laenge)
        .map(char::from)
        .collect()
}
