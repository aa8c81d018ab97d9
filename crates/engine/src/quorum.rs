//! Quorum-Auswertung
//!
//! Waehler sind die Peers, denen ich selbst vertraue. Gezaehlt wird, wie
//! alle bekannten Peers mich beurteilt haben. Eine Mehrheit ist die Haelfte
//! der Waehler (reellwertig, `>=`).

use whisper_protocol::Ergebnis;

use crate::config::Vertrauensmodus;
use crate::registry::Peer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entscheidung {
    /// Keine Waehler, nichts zu entscheiden
    Keine,
    HandleErneuern,
    Abgelehnt,
    Akzeptiert,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Auszaehlung {
    pub waehler: usize,
    pub doppelter_handle: usize,
    pub ungueltiger_hash: usize,
    pub ungueltige_sealed_auth: usize,
    pub ok: usize,
}

pub fn auszaehlen<'a>(
    peers: impl IntoIterator<Item = &'a Peer>,
    modus: Vertrauensmodus,
) -> Auszaehlung {
    let mut z = Auszaehlung::default();
    for peer in peers {
        if peer.status.vertraut(modus) {
            z.waehler += 1;
        }
        match peer.status.urteil_ueber_mich(modus) {
            Some(Ergebnis::DoppelterHandle) => z.doppelter_handle += 1,
            Some(Ergebnis::UngueltigerHash) => z.ungueltiger_hash += 1,
            Some(Ergebnis::UngueltigeSealedAuth) => z.ungueltige_sealed_auth += 1,
            Some(Ergebnis::Ok) => z.ok += 1,
            _ => {}
        }
    }
    z
}

impl Auszaehlung {
    pub fn mehrheit(&self) -> f64 {
        self.waehler as f64 / 2.0
    }

    pub fn ablehnungen(&self) -> usize {
        self.doppelter_handle + self.ungueltiger_hash + self.ungueltige_sealed_auth
    }

    pub fn entscheiden(&self) -> Entscheidung {
        if self.waehler == 0 {
            return Entscheidung::Keine;
        }
        let mehrheit = self.mehrheit();
        if self.doppelter_handle as f64 >= mehrheit || self.ungueltige_sealed_auth as f64 >= mehrheit
        {
            Entscheidung::HandleErneuern
        } else if self.ablehnungen() as f64 >= mehrheit {
            Entscheidung::Abgelehnt
        } else {
            Entscheidung::Akzeptiert
        }
    }
}
