//! Versiegelte Wiederaufnahme-Tokens (Sealed Auth)
//!
//! Das Relay versiegelt `{secret, date}` mit seinem eigenen Schluessel an
//! einen Peer. Ein anderer Teilnehmer traegt das Token zu diesem Peer, der es
//! mit dem Relay-Public-Key als Absender oeffnet und gegen sein eigenes
//! Sitzungs-Geheimnis prueft.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use whisper_core::Since;

use crate::e2e::seal::{entschluesseln, verschluesseln};
use crate::error::CryptoResult;
use crate::types::{b64, Nonce, PublicKey, SecretKey};

/// Wire-Form eines versiegelten Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersiegelteAuth {
    #[serde(with = "b64")]
    pub data: Vec<u8>,
    pub nonce: Nonce,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// Inhalt eines geoeffneten Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInhalt {
    pub secret: String,
    pub date: Since,
}

/// Grund fuer die Ablehnung eines Tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SealedAuthFehler {
    #[error("Token kann nicht geoeffnet werden")]
    NichtLesbar,

    #[error("Sitzungs-Geheimnis stimmt nicht")]
    FalschesGeheimnis,

    #[error("Token ist abgelaufen")]
    Abgelaufen,
}

impl VersiegelteAuth {
    /// Versiegelt `inhalt` an `empfaenger` (Relay-Seite)
    pub fn versiegeln(
        inhalt: &AuthInhalt,
        nonce: Nonce,
        empfaenger: &PublicKey,
        relay_secret: &SecretKey,
    ) -> CryptoResult<Self> {
        let klartext = serde_json::to_vec(inhalt)?;
        let data = verschluesseln(&klartext, &nonce, empfaenger, relay_secret)?;
        Ok(Self {
            data,
            nonce,
            from: None,
            to: Some(empfaenger.to_base64()),
        })
    }

    /// Oeffnet das Token mit dem Relay als Absender
    pub fn oeffnen(
        &self,
        relay: &PublicKey,
        eigenes_secret: &SecretKey,
    ) -> Result<AuthInhalt, SealedAuthFehler> {
        let klartext = entschluesseln(&self.data, &self.nonce, relay, eigenes_secret)
            .map_err(|_| SealedAuthFehler::NichtLesbar)?;
        serde_json::from_slice(&klartext).map_err(|_| SealedAuthFehler::NichtLesbar)
    }

    /// Oeffnet und prueft Geheimnis und Alter in einem Schritt
    pub fn pruefen(
        &self,
        relay: &PublicKey,
        eigenes_secret: &SecretKey,
        sitzungs_geheimnis: &str,
        jetzt: DateTime<Utc>,
        max_alter: Duration,
    ) -> Result<AuthInhalt, SealedAuthFehler> {
        let inhalt = self.oeffnen(relay, eigenes_secret)?;
        if inhalt.secret != sitzungs_geheimnis {
            return Err(SealedAuthFehler::FalschesGeheimnis);
        }
        if jetzt.signed_duration_since(inhalt.date.zeit()) > max_alter {
            return Err(SealedAuthFehler::Abgelaufen);
        }
        Ok(inhalt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
