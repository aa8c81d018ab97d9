//! Authentifizierte Public-Key-Box
//!
//! ```text
//! dh     = X25519(absender_secret, empfaenger_public)
//! key    = HKDF-SHA256(ikm = dh, info = "whisper-box-v1")
//! chiffr = XChaCha20-Poly1305(key, nonce(24), klartext)
//! ```
//!
//! Da `X25519(a, B) == X25519(b, A)`, kann der Empfaenger mit seinem
//! privaten Schluessel und dem oeffentlichen Schluessel des Absenders
//! denselben Schluessel ableiten. Wer das Broadcast-Secret kennt, kann
//! damit jeden an den Broadcast-Public-Key adressierten Umschlag oeffnen.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use crate::error::{CryptoError, CryptoResult};
use crate::types::{Nonce, PublicKey, SecretKey};

const BOX_INFO: &[u8] = b"whisper-box-v1";

/// Leitet den symmetrischen Box-Schluessel aus dem DH-Output ab
fn box_schluessel(secret: &SecretKey, public: &PublicKey) -> CryptoResult<XChaCha20Poly1305> {
    let secret = StaticSecret::from(*secret.as_bytes());
    let public = X25519PublicKey::from(*public.as_bytes());
    let dh_output = secret.diffie_hellman(&public);

    if !dh_output.was_contributory() {
        return Err(CryptoError::KeyExchange(
            "Nicht-kontributiver DH-Output (Low-Order-Punkt)".to_string(),
        ));
    }

    let key = hkdf_ableiten(dh_output.as_bytes(), &[], BOX_INFO, 32)?;
    XChaCha20Poly1305::new_from_slice(&key).map_err(|_| CryptoError::UngueltigeSchluesselLaenge {
        erwartet: 32,
        erhalten: key.len(),
    })
}

/// Verschluesselt `klartext` fuer `empfaenger`, authentifiziert durch
/// `absender_secret`
pub fn verschluesseln(
    klartext: &[u8],
    nonce: &Nonce,
    empfaenger: &PublicKey,
    absender_secret: &SecretKey,
) -> CryptoResult<Vec<u8>> {
    let cipher = box_schluessel(absender_secret, empfaenger)?;
    cipher
        .encrypt(XNonce::from_slice(nonce.as_bytes()), klartext)
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))
}

/// Oeffnet eine Box von `absender` mit dem eigenen `empfaenger_secret`
///
/// Schlaegt fehl (statt Muell zu liefern), wenn Schluessel, Nonce oder
/// Chiffrat nicht zusammenpassen.
pub fn entschluesseln(
    chiffrat: &[u8],
    nonce: &Nonce,
    absender: &PublicKey,
    empfaenger_secret: &SecretKey,
) -> CryptoResult<Vec<u8>> {
    let cipher = box_schluessel(empfaenger_secret, absender)?;
    cipher
        .decrypt(XNonce::from_slice(nonce.as_bytes()), chiffrat)
        .map_err(|e| CryptoError::Entschluesselung(e.to_string()))
}

/// HKDF-basierte Key Derivation (allgemein verwendbar)
pub fn hkdf_ableiten(ikm: &[u8], salt: &[u8], info: &[u8], len: usize) -> CryptoResult<Vec<u8>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; len];
    hk.expand(info, &mut okm)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(okm)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
