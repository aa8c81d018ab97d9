//! # whisper-crypto
//!
//! Krypto-Faehigkeit fuer Whisper. Der Handshake-Engine gegenueber ist dies
//! eine Black Box mit wenigen Operationen.
//!
//! ## Module
//! - `identity` - X25519 Identitaets- und Broadcast-Schluesselpaare
//! - `e2e` - Box-Verschluesselung, Raum-Commitment, Nonces, versiegelte Auth
//! - `types` - Gemeinsame Typen (PublicKey, SecretKey, KeyPair, Nonce)
//! - `error` - Fehlertypen

pub mod e2e;
pub mod error;
pub mod identity;
pub mod types;

// Bequeme Re-Exports
pub use error::{CryptoError, CryptoResult};
pub use types::{Commitment, KeyPair, Nonce, PublicKey, SecretKey};

pub use e2e::{
    commit, entschluesseln, hkdf_ableiten, verschluesseln, AuthInhalt, NoncePool,
    SealedAuthFehler, VersiegelteAuth,
};
