//! Client-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! Standardwerte, nur der oeffentliche Schluessel des Relays muss
//! angegeben werden.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use whisper_core::zufalls_id;
use whisper_crypto::{KeyPair, PublicKey, SecretKey, VersiegelteAuth};
use whisper_engine::{EngineKonfiguration, Ich};
use whisper_observability::LogKonfiguration;
use whisper_transport::TransportKonfiguration;

#[derive(Debug, thiserror::Error)]
pub enum KonfigFehler {
    #[error("Kein Relay-Schluessel konfiguriert ([raum] relay_schluessel)")]
    RelaySchluesselFehlt,

    #[error("Ungueltiger Identitaets-Schluessel: {0}")]
    UngueltigeIdentitaet(#[from] whisper_crypto::CryptoError),
}

/// Vollstaendige Client-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub raum: RaumEinstellungen,
    pub engine: EngineKonfiguration,
    pub transport: TransportKonfiguration,
    pub logging: LogKonfiguration,
}

/// Raum- und Identitaets-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaumEinstellungen {
    /// WebSocket-URL des Relays
    pub relay_url: String,
    /// Oeffentlicher Schluessel des Relays (Base64)
    pub relay_schluessel: Option<PublicKey>,
    /// Gemeinsames Raum-Passwort
    pub passwort: String,
    /// Vom Relay beim Login ausgegebenes Geheimnis
    pub sitzungs_geheimnis: Option<String>,
    /// Gewuenschter Handle (leer = zufaellig)
    pub handle: String,
    /// Privater Identitaets-Schluessel (Base64, leer = neu erzeugen)
    pub identitaet: Option<String>,
    /// Versiegelte Auths je Ziel-Peer (Base64-Schluessel => Token)
    pub sealed_auths: HashMap<PublicKey, VersiegelteAuth>,
}

impl Default for RaumEinstellungen {
    fn default() -> Self {
        Self {
            relay_url: "ws://127.0.0.1:8080/".into(),
            relay_schluessel: None,
            passwort: String::new(),
            sitzungs_geheimnis: None,
            handle: String::new(),
            identitaet: None,
            sealed_auths: HashMap::new(),
        }
    }
}

impl RaumEinstellungen {
    pub fn relay_schluessel(&self) -> Result<PublicKey, KonfigFehler> {
        self.relay_schluessel.ok_or(KonfigFehler::RelaySchluesselFehlt)
    }

    /// Identitaet aus der Konfiguration oder ein frisches Paar
    pub fn identitaet(&self) -> Result<KeyPair, KonfigFehler> {
        match self.identitaet.as_deref().map(str::trim) {
            Some(b64) if !b64.is_empty() => {
                let secret = SecretKey::from_base64(b64)?;
                Ok(KeyPair::aus_secret_bytes(*secret.as_bytes()))
            }
            _ => Ok(KeyPair::generieren()),
        }
    }

    /// Baut den eigenen Teilnehmer-Zustand. Ohne Handle wird einer erzeugt.
    pub fn ich(&self, handle_laenge: usize) -> Result<Ich, KonfigFehler> {
        let handle = match self.handle.trim() {
            "" => zufalls_id(handle_laenge.max(1)),
            h => h.to_string(),
        };
        let mut ich = Ich::neu(self.identitaet()?, handle, self.passwort.clone())
            .mit_sealed_auths(self.sealed_auths.clone());
        if let Some(geheimnis) = &self.sitzungs_geheimnis {
            ich = ich.mit_sitzungs_geheimnis(geheimnis.clone());
        }
        Ok(ich)
    }
}

impl ClientConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whisper_engine::Vertrauensmodus;
    use whisper_observability::LogFormat;

    #[test]
    fn standard_config() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.raum.relay_url, "ws://127.0.0.1:8080/");
        assert_eq!(cfg.transport.wiederverbindung_ms, 4000);
        assert_eq!(cfg.engine.handle_laenge, 5);
        assert_eq!(cfg.logging.level, "info");
        assert!(matches!(
            cfg.raum.relay_schluessel(),
            Err(KonfigFehler::RelaySchluesselFehlt)
        ));
    }

    #[test]
    fn config_aus_toml_string() {
        let relay = KeyPair::generieren().public_key;
        let toml = format!(
            r#"
            [raum]
            relay_url = "wss://relay.example/raum/42"
            relay_schluessel = "{relay}"
            passwort = "geheim"
            handle = "alice"

            [engine]
            vertrauensmodus = "nachsichtig"

            [logging]
            format = "json"
        "#
        );
        let cfg: ClientConfig = toml::from_str(&toml).unwrap();
        assert_eq!(cfg.raum.relay_url, "wss://relay.example/raum/42");
        assert_eq!(cfg.raum.relay_schluessel().unwrap(), relay);
        assert_eq!(cfg.engine.vertrauensmodus, Vertrauensmodus::Nachsichtig);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.engine.token_lebensdauer_sek, 300);
        assert_eq!(cfg.transport.max_nachricht_bytes, 1024 * 1024);
    }

    #[test]
    fn ich_ohne_handle_bekommt_zufaelligen() {
        let raum = RaumEinstellungen {
            passwort: "pw".into(),
            sitzungs_geheimnis: Some("s".into()),
            ..Default::default()
        };
        let ich = raum.ich(7).unwrap();
        assert_eq!(ich.handle.len(), 7);
        assert_eq!(ich.raum_passwort, "pw");
        assert_eq!(ich.sitzungs_geheimnis.as_deref(), Some("s"));
        assert!(ich.since.is_none());
    }

    #[test]
    fn identitaet_aus_konfiguration_ist_stabil() {
        let paar = KeyPair::generieren();
        let raum = RaumEinstellungen {
            identitaet: Some(base64_secret(&paar)),
            handle: " bob ".into(),
            ..Default::default()
        };
        let ich = raum.ich(5).unwrap();
        assert_eq!(ich.public_key(), paar.public_key);
        assert_eq!(ich.handle, "bob");
    }

    #[test]
    fn kaputte_identitaet() {
        let raum = RaumEinstellungen {
            identitaet: Some("kein base64!".into()),
            ..Default::default()
        };
        assert!(matches!(
            raum.identitaet(),
            Err(KonfigFehler::UngueltigeIdentitaet(_))
        ));
    }

    fn base64_secret(paar: &KeyPair) -> String {
        serde_json::to_value(paar).unwrap()["secretKey"]
            .as_str()
            .unwrap()
            .to_string()
    }
}
