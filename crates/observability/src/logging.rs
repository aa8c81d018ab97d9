//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Datei (`[logging]`) und Umgebungsvariable:
//! - `WH_LOG_LEVEL`: Filter-Direktive (z.B. `debug` oder `whisper_engine=trace`)
//! - `WH_LOG_FORMAT`: Format (text/json)
//!
//! Umgebungsvariablen haben Vorrang vor der Datei.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

pub const ENV_LEVEL: &str = "WH_LOG_LEVEL";
pub const ENV_FORMAT: &str = "WH_LOG_FORMAT";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Ungueltiges Log-Format: {0}")]
    UngueltigesFormat(String),

    #[error("Ungueltiger Log-Filter '{filter}': {grund}")]
    UngueltigerFilter { filter: String, grund: String },

    #[error("Logging bereits initialisiert")]
    BereitsInitialisiert,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            anderes => Err(LoggingError::UngueltigesFormat(anderes.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogKonfiguration {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogKonfiguration {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogKonfiguration {
    /// Uebernimmt `WH_LOG_LEVEL` / `WH_LOG_FORMAT`, falls gesetzt
    pub fn mit_umgebung(self) -> Result<Self, LoggingError> {
        self.ueberschreiben(
            std::env::var(ENV_LEVEL).ok(),
            std::env::var(ENV_FORMAT).ok(),
        )
    }

    fn ueberschreiben(
        mut self,
        level: Option<String>,
        format: Option<String>,
    ) -> Result<Self, LoggingError> {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.level = level.trim().to_string();
        }
        if let Some(format) = format {
            self.format = format.trim().parse()?;
        }
        Ok(self)
    }

    pub fn filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.level).map_err(|e| LoggingError::UngueltigerFilter {
            filter: self.level.clone(),
            grund: e.to_string(),
        })
    }
}

/// Initialisiert den globalen Subscriber. Ausgabe nach stderr.
pub fn logging_initialisieren(konfig: &LogKonfiguration) -> Result<(), LoggingError> {
    let filter = konfig.filter()?;

    let ergebnis = match konfig.format {
        LogFormat::Json => tfmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Text => tfmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    ergebnis.map_err(|_| LoggingError::BereitsInitialisiert)
}
