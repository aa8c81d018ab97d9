//! Gemeinsame Typen fuer das Kryptografie-Subsystem
//!
//! Alle Binaerwerte werden auf dem Draht als Base64 (Standard-Alphabet)
//! transportiert. Oeffentliche Schluessel werden ausserdem als Base64 geloggt.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CryptoError, CryptoResult};

/// Laenge eines X25519-Schluessels in Bytes
pub const SCHLUESSEL_LAENGE: usize = 32;

/// Laenge einer XChaCha20-Nonce in Bytes
pub const NONCE_LAENGE: usize = 24;

/// Laenge eines Raum-Commitments (SHA-512) in Bytes
pub const COMMITMENT_LAENGE: usize = 64;

fn fest_dekodieren<const N: usize>(b64: &str) -> CryptoResult<[u8; N]> {
    let bytes = STANDARD.decode(b64)?;
    let laenge = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CryptoError::UngueltigeSchluesselLaenge {
            erwartet: N,
            erhalten: laenge,
        })
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// Oeffentlicher X25519-Schluessel
///
/// Die Ordnung (byteweise) dient als deterministischer Tie-Break.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; SCHLUESSEL_LAENGE]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; SCHLUESSEL_LAENGE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SCHLUESSEL_LAENGE] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn from_base64(b64: &str) -> CryptoResult<Self> {
        Ok(Self(fest_dekodieren(b64)?))
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// SecretKey
// ---------------------------------------------------------------------------

/// Privater X25519-Schluessel (wird beim Drop genullt)
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; SCHLUESSEL_LAENGE]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; SCHLUESSEL_LAENGE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SCHLUESSEL_LAENGE] {
        &self.0
    }

    pub fn from_base64(b64: &str) -> CryptoResult<Self> {
        Ok(Self(fest_dekodieren(b64)?))
    }

    fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

impl Serialize for SecretKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SecretKey::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// Ein X25519-Schluessel-Paar (oeffentlich + privat)
///
/// Wire-Form: `{"publicKey": "<b64>", "secretKey": "<b64>"}`. Nur das
/// Broadcast-Paar wird jemals serialisiert, das Identitaets-Paar nie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub secret_key: SecretKey,
}

// ---------------------------------------------------------------------------
// Nonce
// ---------------------------------------------------------------------------

/// 24-Byte Nonce fuer XChaCha20-Poly1305
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_LAENGE]);

impl Nonce {
    pub fn from_bytes(bytes: [u8; NONCE_LAENGE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LAENGE] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn from_base64(b64: &str) -> CryptoResult<Self> {
        let bytes = STANDARD.decode(b64)?;
        let laenge = bytes.len();
        let arr: [u8; NONCE_LAENGE] = bytes.try_into().map_err(|_| CryptoError::UngueltigeNonce {
            erwartet: NONCE_LAENGE,
            erhalten: laenge,
        })?;
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Nonce({})", self.to_base64())
    }
}

impl Serialize for Nonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Nonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Nonce::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Commitment
// ---------------------------------------------------------------------------

/// SHA-512 Commitment ueber das Raum-Passwort (siehe `e2e::commit`)
#[derive(Clone, PartialEq, Eq)]
pub struct Commitment([u8; COMMITMENT_LAENGE]);

impl Commitment {
    pub fn from_bytes(bytes: [u8; COMMITMENT_LAENGE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; COMMITMENT_LAENGE] {
        &self.0
    }
}

impl std::fmt::Debug for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Commitment({})", STANDARD.encode(self.0))
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        fest_dekodieren(&s)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Base64-Serde fuer Byte-Vektoren
// ---------------------------------------------------------------------------

/// `#[serde(with = "whisper_crypto::types::b64")]` fuer `Vec<u8>`-Felder
pub mod b64 {
    use super::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}
