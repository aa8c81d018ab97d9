//! Verhandlungs-Tokens
//!
//! Pro Peer gibt es hoechstens ein offenes Token. Eine Antwort wird nur
//! akzeptiert, wenn sie das zuletzt ausgestellte Token traegt, nicht zu alt
//! ist und das Token noch kein Ergebnis hat.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use whisper_core::zufalls_id;
use whisper_crypto::PublicKey;
use whisper_protocol::Ergebnis;

pub const TOKEN_LAENGE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verhandlung {
    pub token: String,
    pub erstellt: DateTime<Utc>,
    pub ergebnis: Ergebnis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenFehler {
    #[error("Kein Token fuer diesen Peer")]
    Unbekannt,
    #[error("Token stimmt nicht")]
    Falsch,
    #[error("Token ist abgelaufen")]
    Abgelaufen,
    #[error("Token ist bereits abgeschlossen")]
    BereitsAbgeschlossen,
    #[error("Antwort ohne Endergebnis")]
    KeinEndergebnis,
}

#[derive(Debug, Default)]
pub struct TokenTabelle {
    eintraege: HashMap<PublicKey, Verhandlung>,
}

impl TokenTabelle {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Stellt ein neues Token aus und ersetzt ein eventuell vorhandenes
    pub fn ausstellen(&mut self, peer: PublicKey, jetzt: DateTime<Utc>) -> String {
        let token = zufalls_id(TOKEN_LAENGE);
        self.eintraege.insert(
            peer,
            Verhandlung {
                token: token.clone(),
                erstellt: jetzt,
                ergebnis: Ergebnis::InArbeit,
            },
        );
        token
    }

    /// Schliesst die Verhandlung mit `peer` genau einmal ab
    pub fn abschliessen(
        &mut self,
        peer: &PublicKey,
        token: &str,
        ergebnis: Ergebnis,
        jetzt: DateTime<Utc>,
        lebensdauer: Duration,
    ) -> Result<(), TokenFehler> {
        if !ergebnis.ist_terminal() {
            return Err(TokenFehler::KeinEndergebnis);
        }
        let verhandlung = self.eintraege.get_mut(peer).ok_or(TokenFehler::Unbekannt)?;
        if verhandlung.token != token {
            return Err(TokenFehler::Falsch);
        }
        if jetzt.signed_duration_since(verhandlung.erstellt) > lebensdauer {
            return Err(TokenFehler::Abgelaufen);
        }
        if verhandlung.ergebnis.ist_terminal() {
            return Err(TokenFehler::BereitsAbgeschlossen);
        }
        verhandlung.ergebnis = ergebnis;
        Ok(())
    }

    pub fn get(&self, peer: &PublicKey) -> Option<&Verhandlung> {
        self.eintraege.get(peer)
    }

    /// Anzahl der Verhandlungen ohne Ergebnis
    pub fn offene(&self) -> usize {
        self.eintraege
            .values()
            .filter(|v| v.ergebnis == Ergebnis::InArbeit)
            .count()
    }

    pub fn entfernen(&mut self, peer: &PublicKey) -> Option<Verhandlung> {
        self.eintraege.remove(peer)
    }

    pub fn leeren(&mut self) {
        self.eintraege.clear();
    }
}
