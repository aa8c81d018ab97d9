//! Aufloesung von Handle-Kollisionen
//!
//! Rangfolge (kleiner gewinnt):
//! 1. gueltige versiegelte Auth vor keiner
//! 2. frueheres `since`
//! 3. kleinerer oeffentlicher Schluessel (byteweise)
//!
//! Die Ordnung ist total, jeder Client kommt ohne Abstimmung zum selben Ergebnis.

use whisper_core::Since;
use whisper_crypto::PublicKey;

use crate::registry::Peer;

/// Eine Seite einer Kollision
#[derive(Debug, Clone, Copy)]
pub struct Anspruch<'a> {
    pub public_key: &'a PublicKey,
    pub since: Since,
    pub sealed_auth: bool,
}

impl<'a> Anspruch<'a> {
    fn rang(&self) -> (bool, Since, &'a PublicKey) {
        (!self.sealed_auth, self.since, self.public_key)
    }
}

impl<'a> From<&'a Peer> for Anspruch<'a> {
    fn from(peer: &'a Peer) -> Self {
        Self {
            public_key: &peer.public_key,
            since: peer.since,
            sealed_auth: peer.sealed_auth_bestanden,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verlierer {
    /// Der Peer, dessen Challenge gerade geprueft wird
    Herausforderer,
    /// Der Peer, der den Handle bisher hielt
    Bestehender,
}

pub fn aufloesen(herausforderer: &Anspruch<'_>, bestehender: &Anspruch<'_>) -> Verlierer {
    if herausforderer.rang() < bestehender.rang() {
        Verlierer::Bestehender
    } else {
        Verlierer::Herausforderer
    }
}
