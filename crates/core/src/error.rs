//! Fehlertypen fuer Whisper
//!
//! Zentraler Fehler-Enum fuer Werttypen aus `whisper-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WhisperError {
    #[error("Ungueltiger Zeitstempel: {0}")]
    UngueltigerZeitstempel(String),
}
