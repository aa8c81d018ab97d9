//! Peer-Registry
//!
//! Lokale Sicht auf die Raum-Mitglieder und den Handshake-Zustand je Peer.
//! Der eigene Eintrag steht ebenfalls in der Liste (aus der Mitgliederliste
//! des Relays), hat aber nie ein Urteil und gilt daher nie als akzeptiert.

use whisper_core::Since;
use whisper_crypto::PublicKey;
use whisper_protocol::{Ergebnis, PeerEintrag};

use crate::config::Vertrauensmodus;

// ---------------------------------------------------------------------------
// Verbindungsstatus
// ---------------------------------------------------------------------------

/// Ergebnis des beidseitigen Handshakes mit einem Peer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbindungsstatus {
    /// Mein Urteil ueber den Peer (gesetzt beim Beantworten seiner Challenge)
    pub unser_urteil: Option<Ergebnis>,
    /// Sein Urteil ueber mich (gesetzt beim Empfang seiner Antwort)
    pub ihr_urteil: Option<Ergebnis>,
    /// Zuletzt geschriebenes Urteil, egal aus welcher Richtung
    pub letztes: Option<Ergebnis>,
}

impl Verbindungsstatus {
    pub fn unser_setzen(&mut self, ergebnis: Ergebnis) {
        self.unser_urteil = Some(ergebnis);
        self.letztes = Some(ergebnis);
    }

    pub fn ihr_setzen(&mut self, ergebnis: Ergebnis) {
        self.ihr_urteil = Some(ergebnis);
        self.letztes = Some(ergebnis);
    }

    /// Neue Challenge an den Peer: eine Ablehnung der vorigen gilt nicht mehr
    pub fn neu_verhandeln(&mut self) {
        if !self.ihr_urteil.is_some_and(|e| e.ist_ablehnung()) {
            return;
        }
        if self.letztes == self.ihr_urteil {
            self.letztes = Some(Ergebnis::InArbeit);
        }
        self.ihr_urteil = Some(Ergebnis::InArbeit);
    }

    pub fn ist_akzeptiert(&self, modus: Vertrauensmodus) -> bool {
        match modus {
            Vertrauensmodus::Streng => {
                self.unser_urteil == Some(Ergebnis::Ok) && self.ihr_urteil == Some(Ergebnis::Ok)
            }
            Vertrauensmodus::Nachsichtig => self.letztes == Some(Ergebnis::Ok),
        }
    }

    /// Ob ich diesem Peer vertraue (er zaehlt im Quorum mit)
    pub fn vertraut(&self, modus: Vertrauensmodus) -> bool {
        match modus {
            Vertrauensmodus::Streng => self.unser_urteil == Some(Ergebnis::Ok),
            Vertrauensmodus::Nachsichtig => self.letztes == Some(Ergebnis::Ok),
        }
    }

    /// Das Urteil, das im Quorum ueber mich gezaehlt wird
    pub fn urteil_ueber_mich(&self, modus: Vertrauensmodus) -> Option<Ergebnis> {
        match modus {
            Vertrauensmodus::Streng => self.ihr_urteil,
            Vertrauensmodus::Nachsichtig => self.letztes,
        }
    }
}

// ---------------------------------------------------------------------------
// Peer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub public_key: PublicKey,
    /// Bekannt erst nach seiner ersten Challenge
    pub handle: Option<String>,
    pub since: Since,
    pub sealed_auth_bestanden: bool,
    pub status: Verbindungsstatus,
}

impl Peer {
    pub fn neu(public_key: PublicKey, since: Since) -> Self {
        Self {
            public_key,
            handle: None,
            since,
            sealed_auth_bestanden: false,
            status: Verbindungsstatus::default(),
        }
    }

    pub fn hat_handle(&self, handle: &str) -> bool {
        self.handle.as_deref() == Some(handle)
    }
}

impl From<&PeerEintrag> for Peer {
    fn from(eintrag: &PeerEintrag) -> Self {
        Self::neu(eintrag.public_key, eintrag.since)
    }
}

// ---------------------------------------------------------------------------
// PeerRegistry
// ---------------------------------------------------------------------------

/// Mitgliederliste in Relay-Reihenfolge, nachgeschlagen per Schluessel
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: Vec<Peer>,
}

impl PeerRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Ersetzt die komplette Liste
    pub fn ersetzen(&mut self, peers: Vec<Peer>) {
        self.peers = peers;
    }

    /// Fuegt einen Peer hinzu oder ersetzt einen vorhandenen mit gleichem Schluessel
    pub fn einfuegen(&mut self, peer: Peer) {
        match self.get_mut(&peer.public_key) {
            Some(vorhanden) => *vorhanden = peer,
            None => self.peers.push(peer),
        }
    }

    pub fn entfernen(&mut self, public_key: &PublicKey) -> Option<Peer> {
        let index = self.peers.iter().position(|p| &p.public_key == public_key)?;
        Some(self.peers.remove(index))
    }

    pub fn get(&self, public_key: &PublicKey) -> Option<&Peer> {
        self.peers.iter().find(|p| &p.public_key == public_key)
    }

    pub fn get_mut(&mut self, public_key: &PublicKey) -> Option<&mut Peer> {
        self.peers.iter_mut().find(|p| &p.public_key == public_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.iter()
    }

    /// Alle Peers ausser dem mit `ausser`
    pub fn andere<'a>(&'a self, ausser: &'a PublicKey) -> impl Iterator<Item = &'a Peer> + 'a {
        self.peers.iter().filter(move |p| &p.public_key != ausser)
    }

    /// Erster anderer Peer, der `handle` beansprucht
    pub fn mit_handle<'a>(&'a self, handle: &str, ausser: &'a PublicKey) -> Option<&'a Peer> {
        self.andere(ausser).find(|p| p.hat_handle(handle))
    }

    pub fn akzeptierte(&self, modus: Vertrauensmodus) -> impl Iterator<Item = &Peer> {
        self.peers.iter().filter(move |p| p.status.ist_akzeptiert(modus))
    }

    pub fn ist_akzeptiert(&self, public_key: &PublicKey, modus: Vertrauensmodus) -> bool {
        self.get(public_key)
            .is_some_and(|p| p.status.ist_akzeptiert(modus))
    }

    pub fn leeren(&mut self) {
        self.peers.clear();
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
