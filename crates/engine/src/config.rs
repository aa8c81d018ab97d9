//! Engine-Konfiguration (`[engine]` in der Client-Konfiguration)

use serde::{Deserialize, Serialize};

/// Wann ein Peer als akzeptiert gilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vertrauensmodus {
    /// Beide Richtungen muessen `ok` sein
    #[default]
    Streng,
    /// Das zuletzt geschriebene Urteil entscheidet (eine Richtung genuegt)
    Nachsichtig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineKonfiguration {
    /// Lebensdauer eines Verhandlungs-Tokens in Sekunden
    pub token_lebensdauer_sek: i64,
    /// Maximales Alter einer versiegelten Auth in Sekunden
    pub sealed_auth_lebensdauer_sek: i64,
    /// Laenge automatisch erneuerter Handles
    pub handle_laenge: usize,
    /// Anzahl gemerkter Nonces
    pub nonce_historie: usize,
    pub vertrauensmodus: Vertrauensmodus,
}

impl Default for EngineKonfiguration {
    fn default() -> Self {
        Self {
            token_lebensdauer_sek: 300,
            sealed_auth_lebensdauer_sek: 300,
            handle_laenge: 5,
            nonce_historie: 500,
            vertrauensmodus: Vertrauensmodus::Streng,
        }
    }
}

impl EngineKonfiguration {
    pub fn token_lebensdauer(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_lebensdauer_sek)
    }

    pub fn sealed_auth_lebensdauer(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.sealed_auth_lebensdauer_sek)
    }
}
