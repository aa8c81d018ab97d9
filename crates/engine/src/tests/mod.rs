//! Test-Hilfen: In-Memory-Transport, simuliertes Relay und fremde Peers

mod raum_tests;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use whisper_core::{ManuelleUhr, Since};
use whisper_crypto::{commit, KeyPair, NoncePool, PublicKey, VersiegelteAuth};
use whisper_protocol::{
    ChallengeAnfrage, ChallengeAntwort, Ergebnis, Nachricht, Nutzlast, PeerEintrag, Umschlag,
};
use whisper_transport::{Transport, TransportError, TransportResult};

use crate::config::EngineKonfiguration;
use crate::engine::WhisperEngine;
use crate::event::EngineEvent;
use crate::ich::Ich;
use crate::kanal;

pub(crate) const PASSWORT: &str = "raum-passwort";

pub(crate) fn startzeit() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub(crate) fn since_nach(sekunden: i64) -> Since {
    Since::neu(startzeit() + Duration::seconds(sekunden))
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Sammelt alles, was eine Engine sendet
#[derive(Clone, Default)]
pub(crate) struct Postausgang {
    gesendet: Arc<Mutex<Vec<String>>>,
    geschlossen: Arc<AtomicBool>,
}

struct TestTransport {
    post: Postausgang,
}

impl Transport for TestTransport {
    fn senden(&self, daten: String) -> TransportResult<()> {
        if self.post.geschlossen.load(Ordering::SeqCst) {
            return Err(TransportError::Geschlossen);
        }
        self.post.gesendet.lock().push(daten);
        Ok(())
    }

    fn schliessen(&self) {
        self.post.geschlossen.store(true, Ordering::SeqCst);
    }

    fn ist_verbunden(&self) -> bool {
        !self.post.geschlossen.load(Ordering::SeqCst)
    }
}

impl Postausgang {
    pub(crate) fn transport(&self) -> Box<dyn Transport> {
        Box::new(TestTransport { post: self.clone() })
    }

    /// Entnimmt alle bisher gesendeten Umschlaege
    pub(crate) fn abholen(&self) -> Vec<Umschlag> {
        self.gesendet
            .lock()
            .drain(..)
            .map(|json| Umschlag::from_json(&json).unwrap())
            .collect()
    }

    pub(crate) fn ist_geschlossen(&self) -> bool {
        self.geschlossen.load(Ordering::SeqCst)
    }
}

pub(crate) fn ereignisse_holen(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut ereignisse = Vec::new();
    while let Ok(e) = rx.try_recv() {
        ereignisse.push(e);
    }
    ereignisse
}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

pub(crate) struct Relay {
    pub paar: KeyPair,
    nonces: NoncePool,
}

impl Relay {
    pub(crate) fn neu() -> Self {
        Self {
            paar: KeyPair::generieren(),
            nonces: NoncePool::default(),
        }
    }

    pub(crate) fn public_key(&self) -> PublicKey {
        self.paar.public_key
    }

    pub(crate) fn an(&mut self, empfaenger: PublicKey, nachricht: Nachricht) -> Umschlag {
        kanal::versiegeln(
            &Nutzlast::from(nachricht),
            self.nonces.frische_nonce(),
            &self.paar,
            empfaenger,
        )
        .unwrap()
    }

    pub(crate) fn liste(&mut self, empfaenger: PublicKey, peers: Vec<PeerEintrag>) -> Umschlag {
        self.an(empfaenger, Nachricht::PeerListe { peers })
    }

    /// Versiegelte Auth fuer `empfaenger` mit dessen Sitzungs-Geheimnis
    pub(crate) fn sealed_auth(
        &mut self,
        empfaenger: PublicKey,
        geheimnis: &str,
        date: DateTime<Utc>,
    ) -> VersiegelteAuth {
        let inhalt = whisper_crypto::AuthInhalt {
            secret: geheimnis.to_string(),
            date: Since::neu(date),
        };
        VersiegelteAuth::versiegeln(
            &inhalt,
            self.nonces.frische_nonce(),
            &empfaenger,
            &self.paar.secret_key,
        )
        .unwrap()
    }
}

// ---------------------------------------------------------------------------
// Fremder Peer (von Hand gesteuert)
// ---------------------------------------------------------------------------

pub(crate) struct FremderPeer {
    pub paar: KeyPair,
    pub shared: KeyPair,
    pub since: Since,
    pub handle: String,
    pub passwort: String,
    nonces: NoncePool,
}

impl FremderPeer {
    pub(crate) fn neu(handle: &str, since: Since) -> Self {
        Self {
            paar: KeyPair::generieren(),
            shared: KeyPair::generieren(),
            since,
            handle: handle.to_string(),
            passwort: PASSWORT.to_string(),
            nonces: NoncePool::default(),
        }
    }

    pub(crate) fn key(&self) -> PublicKey {
        self.paar.public_key
    }

    pub(crate) fn eintrag(&self) -> PeerEintrag {
        PeerEintrag {
            public_key: self.paar.public_key,
            since: self.since,
        }
    }

    pub(crate) fn an(&mut self, empfaenger: PublicKey, nachricht: Nachricht) -> Umschlag {
        kanal::versiegeln(
            &Nutzlast::from(nachricht),
            self.nonces.frische_nonce(),
            &self.paar,
            empfaenger,
        )
        .unwrap()
    }

    /// Alle an diesen Peer adressierten Nutzlasten
    pub(crate) fn lesen(&self, umschlaege: &[Umschlag]) -> Vec<Nutzlast> {
        umschlaege
            .iter()
            .filter(|u| u.to == self.paar.public_key)
            .map(|u| kanal::oeffnen(u, &self.paar.secret_key).unwrap())
            .collect()
    }

    pub(crate) fn anfragen(&self, umschlaege: &[Umschlag]) -> Vec<ChallengeAnfrage> {
        self.lesen(umschlaege)
            .into_iter()
            .filter_map(|n| match n {
                Nutzlast::Protokoll(Nachricht::ChallengeAnfrage(a)) => Some(a),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn antworten(&self, umschlaege: &[Umschlag]) -> Vec<ChallengeAntwort> {
        self.lesen(umschlaege)
            .into_iter()
            .filter_map(|n| match n {
                Nutzlast::Protokoll(Nachricht::ChallengeAntwort(a)) => Some(a),
                _ => None,
            })
            .collect()
    }

    /// Gueltige Challenge an `ziel`, dessen `since` bekannt ist
    pub(crate) fn challenge(
        &mut self,
        ziel: PublicKey,
        ziel_since: Since,
        token: &str,
        sealedauth: Option<VersiegelteAuth>,
    ) -> Umschlag {
        let nonce = self.nonces.frische_nonce();
        let data = commit(
            &self.paar.public_key,
            &ziel_since.als_text(),
            &nonce,
            &ziel,
            &self.passwort,
        );
        let anfrage = ChallengeAnfrage {
            data,
            nonce,
            handle: self.handle.clone(),
            sealedauth,
            token: token.to_string(),
        };
        self.an(ziel, Nachricht::ChallengeAnfrage(anfrage))
    }

    pub(crate) fn antwort(&mut self, ziel: PublicKey, token: &str, ergebnis: Ergebnis) -> Umschlag {
        let antwort = ChallengeAntwort {
            token: token.to_string(),
            result: ergebnis,
            shared: (ergebnis == Ergebnis::Ok).then(|| self.shared.clone()),
            handle: None,
        };
        self.an(ziel, Nachricht::ChallengeAntwort(antwort))
    }
}

// ---------------------------------------------------------------------------
// Einzelne Engine mit Relay
// ---------------------------------------------------------------------------

pub(crate) struct Aufbau {
    pub engine: WhisperEngine,
    pub ereignisse: mpsc::UnboundedReceiver<EngineEvent>,
    pub post: Postausgang,
    pub relay: Relay,
    pub uhr: ManuelleUhr,
    pub identitaet: KeyPair,
    pub ich: PublicKey,
    pub since: Since,
}

pub(crate) const SITZUNGS_GEHEIMNIS: &str = "sitzung-1234";

pub(crate) fn aufbau(handle: &str, since: Since) -> Aufbau {
    aufbau_mit(handle, since, EngineKonfiguration::default())
}

pub(crate) fn aufbau_mit(handle: &str, since: Since, konfig: EngineKonfiguration) -> Aufbau {
    let uhr = ManuelleUhr::neu(startzeit());
    let (mut engine, ereignisse) = WhisperEngine::neu(konfig, Arc::new(uhr.clone()));
    let post = Postausgang::default();
    let relay = Relay::neu();
    let identitaet = KeyPair::generieren();
    let ich = identitaet.public_key;
    engine.verbinden(
        post.transport(),
        relay.public_key(),
        Ich::neu(identitaet.clone(), handle, PASSWORT).mit_sitzungs_geheimnis(SITZUNGS_GEHEIMNIS),
    );
    Aufbau {
        engine,
        ereignisse,
        post,
        relay,
        uhr,
        identitaet,
        ich,
        since,
    }
}

impl Aufbau {
    pub(crate) fn eigener_eintrag(&self) -> PeerEintrag {
        PeerEintrag {
            public_key: self.ich,
            since: self.since,
        }
    }

    /// Relay sendet die Mitgliederliste (eigener Eintrag zuletzt)
    pub(crate) fn snapshot(&mut self, peers: &[&FremderPeer]) {
        let mut eintraege: Vec<PeerEintrag> = peers.iter().map(|p| p.eintrag()).collect();
        eintraege.push(self.eigener_eintrag());
        let umschlag = self.relay.liste(self.ich, eintraege);
        self.engine.umschlag_empfangen(umschlag);
    }

    pub(crate) fn relay_sendet(&mut self, nachricht: Nachricht) {
        let umschlag = self.relay.an(self.ich, nachricht);
        self.engine.umschlag_empfangen(umschlag);
    }

    pub(crate) fn ereignisse(&mut self) -> Vec<EngineEvent> {
        ereignisse_holen(&mut self.ereignisse)
    }

    /// Beidseitiger Handshake mit Peers, die bereits eine Challenge der
    /// Engine im Postausgang haben. Jeder Peer fordert zuerst heraus und
    /// antwortet dann mit `ok`.
    pub(crate) fn handshakes(&mut self, peers: &mut [FremderPeer]) {
        let post = self.post.abholen();
        for peer in peers.iter_mut() {
            let anfrage = peer
                .anfragen(&post)
                .pop()
                .expect("Keine Challenge an den Peer");
            let challenge = peer.challenge(self.ich, self.since, "fremd-token", None);
            self.engine.umschlag_empfangen(challenge);
            let antwort = peer.antwort(self.ich, &anfrage.token, Ergebnis::Ok);
            self.engine.umschlag_empfangen(antwort);
        }
        let post = self.post.abholen();
        for peer in peers.iter() {
            let antworten = peer.antworten(&post);
            assert_eq!(antworten.len(), 1);
            assert_eq!(antworten[0].result, Ergebnis::Ok);
        }
    }

    /// Verbindet neu mit derselben Identitaet und frischem Postausgang
    pub(crate) fn neu_verbinden(
        &mut self,
        handle: &str,
        sealed_auths: HashMap<PublicKey, VersiegelteAuth>,
    ) {
        self.post = Postausgang::default();
        let ich = Ich::neu(self.identitaet.clone(), handle, PASSWORT)
            .mit_sitzungs_geheimnis(SITZUNGS_GEHEIMNIS)
            .mit_sealed_auths(sealed_auths);
        self.engine
            .verbinden(self.post.transport(), self.relay.public_key(), ich);
    }
}

// ---------------------------------------------------------------------------
// Raum mit mehreren echten Engines
// ---------------------------------------------------------------------------

pub(crate) struct Teilnehmer {
    pub engine: WhisperEngine,
    pub ereignisse: mpsc::UnboundedReceiver<EngineEvent>,
    pub post: Postausgang,
    pub key: PublicKey,
    pub since: Since,
}

/// Stern-Relay: adressiert an eine Identitaet => nur dieser Teilnehmer,
/// sonst an alle (auch den Absender)
pub(crate) struct Raum {
    pub relay: Relay,
    pub uhr: ManuelleUhr,
    pub teilnehmer: Vec<Teilnehmer>,
}

impl Raum {
    pub(crate) fn neu() -> Self {
        Self {
            relay: Relay::neu(),
            uhr: ManuelleUhr::neu(startzeit()),
            teilnehmer: Vec::new(),
        }
    }

    /// Verbindet eine neue Engine, `since` steigt je Teilnehmer um eine Sekunde
    pub(crate) fn beitreten(&mut self, handle: &str) -> usize {
        let index = self.teilnehmer.len();
        let since = since_nach(index as i64);
        let (mut engine, ereignisse) =
            WhisperEngine::neu(EngineKonfiguration::default(), Arc::new(self.uhr.clone()));
        let post = Postausgang::default();
        let identitaet = KeyPair::generieren();
        let key = identitaet.public_key;
        engine.verbinden(
            post.transport(),
            self.relay.public_key(),
            Ich::neu(identitaet, handle, PASSWORT).mit_sitzungs_geheimnis(SITZUNGS_GEHEIMNIS),
        );

        let eintrag = PeerEintrag {
            public_key: key,
            since,
        };
        for t in &mut self.teilnehmer {
            let umschlag = self.relay.an(t.key, Nachricht::PeerBeitritt(eintrag.clone()));
            t.engine.umschlag_empfangen(umschlag);
        }

        let mut liste: Vec<PeerEintrag> = self
            .teilnehmer
            .iter()
            .map(|t| PeerEintrag {
                public_key: t.key,
                since: t.since,
            })
            .collect();
        liste.push(eintrag);
        let umschlag = self.relay.liste(key, liste);
        engine.umschlag_empfangen(umschlag);

        self.teilnehmer.push(Teilnehmer {
            engine,
            ereignisse,
            post,
            key,
            since,
        });
        index
    }

    /// Verteilt Umschlaege, bis niemand mehr etwas sendet
    pub(crate) fn pumpen(&mut self) {
        for _ in 0..1000 {
            let mut warteschlange = VecDeque::new();
            for t in &self.teilnehmer {
                warteschlange.extend(t.post.abholen());
            }
            if warteschlange.is_empty() {
                return;
            }
            while let Some(umschlag) = warteschlange.pop_front() {
                self.verteilen(umschlag);
            }
        }
        panic!("Raum kommt nicht zur Ruhe");
    }

    fn verteilen(&mut self, umschlag: Umschlag) {
        if umschlag.to == self.relay.public_key() {
            return;
        }
        match self.teilnehmer.iter_mut().find(|t| t.key == umschlag.to) {
            Some(t) => t.engine.umschlag_empfangen(umschlag),
            None => {
                for t in &mut self.teilnehmer {
                    t.engine.umschlag_empfangen(umschlag.clone());
                }
            }
        }
    }

    pub(crate) fn ereignisse(&mut self, index: usize) -> Vec<EngineEvent> {
        ereignisse_holen(&mut self.teilnehmer[index].ereignisse)
    }
}
