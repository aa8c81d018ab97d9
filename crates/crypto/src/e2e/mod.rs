//! E2E Verschluesselung (End-to-End)
//!
//! Client <-> Client Verschluesselung. Das Relay forwardet Umschlaege blind
//! und kann weder Inhalt noch Schluessel lesen.
//!
//! ## Ablauf
//! 1. Jeder Client hat eine Identitaet (X25519, pro Sitzung)
//! 2. Challenge: SHA-512 Commitment ueber das Raum-Passwort
//! 3. Nach erfolgreicher Challenge: Broadcast-Paar an den Peer
//! 4. Nachrichten: authentifizierte Box (X25519 + HKDF + XChaCha20-Poly1305)
//! 5. Wiedereinstieg: vom Relay versiegelte Auth-Token

pub mod commit;
pub mod nonce;
pub mod sealed_auth;
pub mod seal;

pub use commit::commit;
pub use nonce::NoncePool;
pub use sealed_auth::{AuthInhalt, SealedAuthFehler, VersiegelteAuth};
pub use seal::{entschluesseln, hkdf_ableiten, verschluesseln};
