//! Sicherer Kanal und Schluesselverteilung
//!
//! Jeder Teilnehmer erzeugt pro Verbindung ein Broadcast-Paar und gibt beide
//! Haelften mit jeder `ok`-Antwort heraus. Ein Broadcast ist genau ein
//! Umschlag, adressiert an das Broadcast-Paar eines akzeptierten Peers. Jeder,
//! der dieses Paar erhalten hat, kann ihn oeffnen.

use whisper_core::Since;
use whisper_crypto::{entschluesseln, verschluesseln, KeyPair, Nonce, PublicKey, SecretKey};
use whisper_protocol::{Nutzlast, Umschlag};

use crate::error::EngineResult;
use crate::registry::Peer;

/// Broadcast-Paar eines Peers (oder das eigene unter der eigenen Identitaet)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeteilterSchluessel {
    pub von: PublicKey,
    pub paar: KeyPair,
    pub since: Since,
}

#[derive(Debug)]
pub struct SchluesselTabelle {
    eigenes: KeyPair,
    eintraege: Vec<GeteilterSchluessel>,
}

impl SchluesselTabelle {
    pub fn neu() -> Self {
        Self {
            eigenes: KeyPair::generieren(),
            eintraege: Vec::new(),
        }
    }

    /// Erzeugt ein neues eigenes Broadcast-Paar
    pub fn rotieren(&mut self) {
        self.eigenes = KeyPair::generieren();
        tracing::debug!(public_key = %self.eigenes.public_key, "Broadcast-Paar rotiert");
    }

    pub fn eigenes_paar(&self) -> &KeyPair {
        &self.eigenes
    }

    /// Ersetzt den Eintrag von `von`
    pub fn setzen(&mut self, von: PublicKey, paar: KeyPair, since: Since) {
        self.eintraege.retain(|e| e.von != von);
        self.eintraege.push(GeteilterSchluessel { von, paar, since });
    }

    pub fn entfernen_von(&mut self, von: &PublicKey) {
        self.eintraege.retain(|e| &e.von != von);
    }

    pub fn von(&self, peer: &PublicKey) -> Option<&GeteilterSchluessel> {
        self.eintraege.iter().find(|e| &e.von == peer)
    }

    /// Paar, dessen oeffentlicher Schluessel `an` ist. Mehrere Eintraege
    /// koennen denselben Schluessel tragen, der zuletzt gesetzte gewinnt.
    pub fn fuer_empfaenger(&self, an: &PublicKey) -> Option<&KeyPair> {
        self.eintraege
            .iter()
            .rev()
            .find(|e| &e.paar.public_key == an)
            .map(|e| &e.paar)
    }

    pub fn leeren(&mut self) {
        self.eintraege.clear();
    }

    pub fn len(&self) -> usize {
        self.eintraege.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eintraege.is_empty()
    }
}

impl Default for SchluesselTabelle {
    fn default() -> Self {
        Self::neu()
    }
}

/// Verschluesselt `nutzlast` von `absender` an `an`
pub fn versiegeln(
    nutzlast: &Nutzlast,
    nonce: Nonce,
    absender: &KeyPair,
    an: PublicKey,
) -> EngineResult<Umschlag> {
    let klartext = nutzlast.zu_bytes()?;
    let data = verschluesseln(&klartext, &nonce, &an, &absender.secret_key)?;
    Ok(Umschlag {
        data,
        nonce,
        from: absender.public_key,
        to: an,
    })
}

pub fn oeffnen(umschlag: &Umschlag, empfaenger_secret: &SecretKey) -> EngineResult<Nutzlast> {
    let klartext = entschluesseln(
        &umschlag.data,
        &umschlag.nonce,
        &umschlag.from,
        empfaenger_secret,
    )?;
    Ok(Nutzlast::aus_bytes(&klartext)?)
}

/// Der akzeptierte Peer mit dem groessten `(since, Schluessel)`
pub fn broadcast_ziel<'a>(kandidaten: impl IntoIterator<Item = &'a Peer>) -> Option<&'a Peer> {
    kandidaten
        .into_iter()
        .max_by(|a, b| (a.since, a.public_key).cmp(&(b.since, b.public_key)))
}
