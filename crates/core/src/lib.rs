//! whisper-core – Gemeinsame Typen, Uhr und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Whisper-Crates gemeinsam genutzt werden.

pub mod error;
pub mod types;
pub mod uhr;

// Re-Exporte fuer bequemen Zugriff
pub use error::WhisperError;
pub use types::{zufalls_id, Since};
pub use uhr::{ManuelleUhr, SystemUhr, Uhr};
