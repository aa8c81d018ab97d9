//! Whisper Client – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und betritt den Raum.

use anyhow::Result;
use whisper_client::{config::ClientConfig, Client};
use whisper_observability::logging_initialisieren;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("WHISPER_CONFIG").unwrap_or_else(|_| "whisper.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = ClientConfig::laden(&config_pfad)?;

    let logging = config.logging.clone().mit_umgebung()?;
    logging_initialisieren(&logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        relay = %config.raum.relay_url,
        "Whisper Client wird initialisiert"
    );

    Client::neu(config).starten().await
}
