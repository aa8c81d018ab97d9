//! Umschlag (Wire-Einheit zwischen Client und Relay)
//!
//! ```json
//! { "data": "<b64 chiffrat>", "nonce": "<b64>", "from": "<b64 pub>", "to": "<b64 pub>" }
//! ```
//!
//! Das Relay sieht nur diese vier Felder. `to` ist entweder der
//! Identitaets-Schluessel eines Peers oder ein geteilter Broadcast-Schluessel.

use serde::{Deserialize, Serialize};
use whisper_crypto::types::b64;
use whisper_crypto::{Nonce, PublicKey};

use crate::error::ProtokollResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Umschlag {
    #[serde(with = "b64")]
    pub data: Vec<u8>,
    pub nonce: Nonce,
    pub from: PublicKey,
    pub to: PublicKey,
}

impl Umschlag {
    pub fn to_json(&self) -> ProtokollResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> ProtokollResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
