//! Eigener Teilnehmer-Zustand

use std::collections::HashMap;

use whisper_core::Since;
use whisper_crypto::{KeyPair, PublicKey, VersiegelteAuth};

/// Alles, was dieser Client ueber sich selbst weiss
#[derive(Debug, Clone)]
pub struct Ich {
    pub identitaet: KeyPair,
    pub handle: String,
    pub raum_passwort: String,
    /// Vom Relay beim Login ausgegeben
    pub sitzungs_geheimnis: Option<String>,
    /// Erst nach der ersten Mitgliederliste bekannt
    pub since: Option<Since>,
    /// Einmal-Tokens je Ziel-Peer, werden beim Versand entnommen
    pub sealed_auths: HashMap<PublicKey, VersiegelteAuth>,
}

impl Ich {
    pub fn neu(identitaet: KeyPair, handle: impl Into<String>, raum_passwort: impl Into<String>) -> Self {
        Self {
            identitaet,
            handle: handle.into(),
            raum_passwort: raum_passwort.into(),
            sitzungs_geheimnis: None,
            since: None,
            sealed_auths: HashMap::new(),
        }
    }

    pub fn mit_sitzungs_geheimnis(mut self, geheimnis: impl Into<String>) -> Self {
        self.sitzungs_geheimnis = Some(geheimnis.into());
        self
    }

    pub fn mit_sealed_auths(mut self, auths: HashMap<PublicKey, VersiegelteAuth>) -> Self {
        self.sealed_auths = auths;
        self
    }

    pub fn public_key(&self) -> PublicKey {
        self.identitaet.public_key
    }
}
