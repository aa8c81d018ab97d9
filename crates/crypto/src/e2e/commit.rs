//! Raum-Passwort Commitment
//!
//! Beweist die Kenntnis des Raum-Passworts, ohne es zu uebertragen:
//!
//! ```text
//! SHA-512( initiator_pub_b64 || since || nonce_b64 || responder_pub_b64 || passwort )
//! ```
//!
//! Der Initiator verwendet das `since` des Responders. Der Responder rechnet
//! mit seinem eigenen `since` nach, beide Werte muessen also gleich sein.

use sha2::{Digest, Sha512};

use crate::types::{Commitment, Nonce, PublicKey};

/// Berechnet das Commitment ueber die fuenf Eingaben in fester Reihenfolge
pub fn commit(
    initiator: &PublicKey,
    since: &str,
    nonce: &Nonce,
    responder: &PublicKey,
    raum_passwort: &str,
) -> Commitment {
    let mut hasher = Sha512::new();
    hasher.update(initiator.to_base64().as_bytes());
    hasher.update(since.as_bytes());
    hasher.update(nonce.to_base64().as_bytes());
    hasher.update(responder.to_base64().as_bytes());
    hasher.update(raum_passwort.as_bytes());
    Commitment::from_bytes(hasher.finalize().into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::e2e::nonce::NoncePool;
    use crate::types::KeyPair;

    const SINCE: &str = "2024-03-01T12:00:00.000Z";

    #[test]
    fn commit_ist_deterministisch() {
        let a = KeyPair::generieren().public_key;
        let b = KeyPair::generieren().public_key;
        let nonce = NoncePool::neu(500).frische_nonce();

        assert_eq!(
            commit(&a, SINCE, &nonce, &b, "passwort"),
            commit(&a, SINCE, &nonce, &b, "passwort")
        );
    }

    #[test]
    fn jede_einzelne_eingabe_aendert_das_commitment() {
        let a = KeyPair::generieren().public_key;
        let b = KeyPair::generieren().public_key;
        let c = KeyPair::generieren().public_key;
        let mut pool = NoncePool::neu(500);
        let nonce = pool.frische_nonce();
        let andere_nonce = pool.frische_nonce();

        let basis = commit(&a, SINCE, &nonce, &b, "passwort");
        assert_ne!(basis, commit(&a, SINCE, &nonce, &b, "falsch"));
        assert_ne!(basis, commit(&a, SINCE, &andere_nonce, &b, "passwort"));
        assert_ne!(basis, commit(&a, "2024-03-01T12:00:00.001Z", &nonce, &b, "passwort"));
        assert_ne!(basis, commit(&c, SINCE, &nonce, &b, "passwort"));
        assert_ne!(basis, commit(&a, SINCE, &nonce, &c, "passwort"));
    }

    #[test]
    fn commitment_ist_sha512_lang() {
        let a = KeyPair::generieren().public_key;
        let nonce = NoncePool::neu(500).frische_nonce();
        assert_eq!(commit(&a, SINCE, &nonce, &a, "").as_bytes().len(), 64);
    }
}
