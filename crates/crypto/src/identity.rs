//! Identitaets- und Broadcast-Schluessel (X25519)
//!
//! Jeder Teilnehmer erzeugt pro Raum-Sitzung ein Identitaets-Paar. Der
//! oeffentliche Schluessel identifiziert ihn beim Relay und bei allen Peers,
//! der private Schluessel verlaesst den Prozess nie.
//!
//! Das ephemere Broadcast-Paar wird mit derselben Funktion erzeugt, aber
//! absichtlich (beide Haelften) an alle verifizierten Peers verteilt.

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use crate::types::{KeyPair, PublicKey, SecretKey};

impl KeyPair {
    /// Generiert ein neues X25519-Schluessel-Paar
    pub fn generieren() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        Self::aus_static_secret(&secret)
    }

    /// Stellt ein Paar aus einem privaten Schluessel (32 Bytes) wieder her
    pub fn aus_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        Self::aus_static_secret(&secret)
    }

    fn aus_static_secret(secret: &StaticSecret) -> Self {
        let public = X25519PublicKey::from(secret);
        Self {
            public_key: PublicKey::from_bytes(public.to_bytes()),
            secret_key: SecretKey::from_bytes(secret.to_bytes()),
        }
    }
}

/// Erzeugt das Identitaets-Paar eines Teilnehmers
pub fn identitaet_generieren() -> KeyPair {
    KeyPair::generieren()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
