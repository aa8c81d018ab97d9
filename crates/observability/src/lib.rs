//! # whisper-observability
//!
//! Structured Logging via tracing-subscriber (Text oder JSON).
//! Das Chat-Terminal gehoert stdout, Logs gehen nach stderr.

pub mod logging;

pub use logging::{logging_initialisieren, LogFormat, LogKonfiguration, LoggingError};
