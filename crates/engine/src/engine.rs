//! WhisperEngine – Handshake, Quorum und Schluesselverteilung
//!
//! Die Engine ist synchron und gehoert genau einer Sitzung (siehe
//! `session`). Jedes Ereignis wird vollstaendig verarbeitet, bevor das
//! naechste kommt. Nach aussen gehen nur `EngineEvent`s ueber den
//! Ereignis-Kanal.
//!
//! ## Ablauf je Peer
//! 1. Relay meldet den Peer (Mitgliederliste oder Beitritt)
//! 2. Wir senden ihm eine Challenge, er sendet uns eine
//! 3. Beide Antworten `ok` => Peer akzeptiert, Broadcast-Paare getauscht
//! 4. Nach jeder Antwort entscheidet das Quorum ueber unseren Handle

use std::sync::Arc;

use tokio::sync::mpsc;
use whisper_core::{zufalls_id, Since, Uhr};
use whisper_crypto::{commit, NoncePool, PublicKey, SealedAuthFehler, VersiegelteAuth};
use whisper_protocol::{
    AnwendungsNachricht, ChallengeAnfrage, ChallengeAntwort, Ergebnis, Nachricht, Nutzlast,
    PeerEintrag, Umschlag,
};
use whisper_transport::{Transport, TransportEvent};

use crate::config::EngineKonfiguration;
use crate::error::{EngineError, EngineResult};
use crate::event::EngineEvent;
use crate::ich::Ich;
use crate::kanal::{self, SchluesselTabelle};
use crate::konflikt::{self, Anspruch, Verlierer};
use crate::quorum::{self, Entscheidung};
use crate::registry::{Peer, PeerRegistry, Verbindungsstatus};
use crate::token::TokenTabelle;

/// Aktive Verbindung zu einem Raum
struct Verbindung {
    transport: Box<dyn Transport>,
    relay: PublicKey,
    ich: Ich,
    /// Die erste Mitgliederliste je Verbindung setzt den Zustand zurueck
    snapshot_erhalten: bool,
}

pub struct WhisperEngine {
    konfig: EngineKonfiguration,
    uhr: Arc<dyn Uhr>,
    ereignisse: mpsc::UnboundedSender<EngineEvent>,
    verbindung: Option<Verbindung>,
    registry: PeerRegistry,
    tokens: TokenTabelle,
    schluessel: SchluesselTabelle,
    nonces: NoncePool,
}

impl WhisperEngine {
    pub fn neu(
        konfig: EngineKonfiguration,
        uhr: Arc<dyn Uhr>,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let nonces = NoncePool::neu(konfig.nonce_historie);
        let engine = Self {
            konfig,
            uhr,
            ereignisse: tx,
            verbindung: None,
            registry: PeerRegistry::neu(),
            tokens: TokenTabelle::neu(),
            schluessel: SchluesselTabelle::neu(),
            nonces,
        };
        (engine, rx)
    }

    // -----------------------------------------------------------------------
    // Verbindung
    // -----------------------------------------------------------------------

    /// Bindet die Engine an einen Transport. Eine bestehende Verbindung wird
    /// vorher geschlossen.
    pub fn verbinden(&mut self, transport: Box<dyn Transport>, relay: PublicKey, ich: Ich) {
        if self.verbindung.is_some() {
            self.schliessen();
        }
        self.schluessel.rotieren();
        tracing::info!(
            identitaet = %ich.public_key(),
            relay = %relay,
            handle = %ich.handle,
            "Mit Raum verbunden"
        );
        self.verbindung = Some(Verbindung {
            transport,
            relay,
            ich,
            snapshot_erhalten: false,
        });
    }

    /// Trennt vom Transport und verwirft Peers, Tokens und geteilte Schluessel
    pub fn schliessen(&mut self) {
        if let Some(verbindung) = self.verbindung.take() {
            verbindung.transport.schliessen();
            tracing::info!("Verbindung zum Raum geschlossen");
        }
        self.registry.leeren();
        self.tokens.leeren();
        self.schluessel.leeren();
    }

    pub fn ist_verbunden(&self) -> bool {
        self.verbindung.is_some()
    }

    /// Verarbeitet ein Ereignis des Transports
    pub fn transport_ereignis(&mut self, ereignis: TransportEvent) {
        match ereignis {
            TransportEvent::Verbunden => {
                self.schluessel.rotieren();
                if let Some(verbindung) = self.verbindung.as_mut() {
                    verbindung.snapshot_erhalten = false;
                }
                self.melden(EngineEvent::Verbunden);
            }
            TransportEvent::Getrennt { grund } => {
                tracing::info!(grund = ?grund, "Transport getrennt");
                self.melden(EngineEvent::Getrennt { grund });
            }
            TransportEvent::Wiederverbinden { verzoegerung } => {
                self.melden(EngineEvent::Wiederverbinden { verzoegerung });
            }
            TransportEvent::Nachricht(text) => self.nachricht_empfangen(&text),
        }
    }

    /// Dekodiert einen Umschlag aus der Wire-Form
    pub fn nachricht_empfangen(&mut self, text: &str) {
        match Umschlag::from_json(text) {
            Ok(umschlag) => self.umschlag_empfangen(umschlag),
            Err(e) => tracing::warn!(fehler = %e, "Ungueltiger Umschlag verworfen"),
        }
    }

    /// Oeffnet einen Umschlag und leitet den Inhalt weiter
    pub fn umschlag_empfangen(&mut self, umschlag: Umschlag) {
        let Some(verbindung) = self.verbindung.as_ref() else {
            tracing::debug!("Umschlag ohne Verbindung verworfen");
            return;
        };
        let ich_key = verbindung.ich.public_key();
        let relay = verbindung.relay;

        // Broadcasts gehen auch an den Absender zurueck
        if umschlag.from == ich_key {
            tracing::trace!("Eigener Umschlag ignoriert");
            return;
        }

        let geoeffnet = if umschlag.to == ich_key {
            kanal::oeffnen(&umschlag, &verbindung.ich.identitaet.secret_key)
        } else if let Some(paar) = self.schluessel.fuer_empfaenger(&umschlag.to) {
            kanal::oeffnen(&umschlag, &paar.secret_key)
        } else {
            tracing::debug!(an = %umschlag.to, von = %umschlag.from, "Kein Schluessel fuer Empfaenger");
            return;
        };

        let nutzlast = match geoeffnet {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(von = %umschlag.from, fehler = %e, "Umschlag nicht lesbar");
                return;
            }
        };
        tracing::trace!(von = %umschlag.from, typ = nutzlast.typ(), "Nachricht empfangen");

        match nutzlast {
            Nutzlast::Protokoll(nachricht) => {
                self.protokoll_verarbeiten(umschlag.from, relay, nachricht)
            }
            Nutzlast::Anwendung(nachricht) => self.melden(EngineEvent::Nachricht {
                von: umschlag.from,
                nachricht,
            }),
        }
    }

    fn protokoll_verarbeiten(&mut self, von: PublicKey, relay: PublicKey, nachricht: Nachricht) {
        match nachricht {
            Nachricht::PeerListe { .. } | Nachricht::PeerBeitritt(_) | Nachricht::PeerAbgang(_)
                if von != relay =>
            {
                tracing::warn!(von = %von, "Mitgliedschafts-Nachricht nicht vom Relay ignoriert");
            }
            Nachricht::PeerListe { peers } => self.snapshot_anwenden(peers),
            Nachricht::PeerBeitritt(eintrag) => self.beitritt_anwenden(eintrag),
            Nachricht::PeerAbgang(austritt) => self.abgang_anwenden(&austritt.public_key),
            Nachricht::ChallengeAnfrage(anfrage) => self.challenge_beantworten(von, anfrage),
            Nachricht::ChallengeAntwort(antwort) => self.antwort_verarbeiten(von, antwort),
        }
    }

    // -----------------------------------------------------------------------
    // Mitgliedschaft
    // -----------------------------------------------------------------------

    fn snapshot_anwenden(&mut self, eintraege: Vec<PeerEintrag>) {
        let Some(verbindung) = self.verbindung.as_mut() else {
            return;
        };
        if verbindung.snapshot_erhalten {
            tracing::debug!(anzahl = eintraege.len(), "Weitere Mitgliederliste");
            self.melden(EngineEvent::PeerListe(eintraege));
            return;
        }
        verbindung.snapshot_erhalten = true;

        let ich_key = verbindung.ich.public_key();
        let mut peers: Vec<Peer> = eintraege.iter().map(Peer::from).collect();
        let mut selbst = None;
        for peer in peers.iter_mut().filter(|p| p.public_key == ich_key) {
            verbindung.ich.since = Some(peer.since);
            peer.handle = Some(verbindung.ich.handle.clone());
            selbst = Some(peer.clone());
        }

        self.tokens.leeren();
        self.schluessel.leeren();
        self.registry.ersetzen(peers);
        tracing::info!(anzahl = self.registry.len(), "Mitgliederliste uebernommen");

        match selbst {
            Some(selbst) => {
                let paar = self.schluessel.eigenes_paar().clone();
                self.schluessel.setzen(ich_key, paar, selbst.since);
                self.melden(EngineEvent::PeerAkzeptiert(selbst));
            }
            None => tracing::warn!("Eigener Eintrag fehlt in der Mitgliederliste"),
        }

        let andere: Vec<Peer> = self.registry.andere(&ich_key).cloned().collect();
        for peer in andere {
            let key = peer.public_key;
            self.melden(EngineEvent::PeerVerbunden(peer));
            self.challenge_ausstellen(&key);
        }
    }

    fn beitritt_anwenden(&mut self, eintrag: PeerEintrag) {
        let Some(ich_key) = self.eigener_schluessel() else {
            return;
        };
        if eintrag.public_key == ich_key {
            tracing::debug!("Eigener Beitritt ignoriert");
            return;
        }

        let peer = Peer::from(&eintrag);
        self.schluessel.entfernen_von(&peer.public_key);
        self.registry.einfuegen(peer.clone());
        tracing::info!(peer = %peer.public_key, since = %peer.since, "Peer beigetreten");

        self.melden(EngineEvent::PeerVerbunden(peer));
        self.challenge_ausstellen(&eintrag.public_key);
    }

    fn abgang_anwenden(&mut self, key: &PublicKey) {
        if self.eigener_schluessel().as_ref() == Some(key) {
            return;
        }
        let Some(peer) = self.registry.get(key).cloned() else {
            tracing::debug!(peer = %key, "Abgang eines unbekannten Peers");
            return;
        };

        if peer.status.ist_akzeptiert(self.konfig.vertrauensmodus) {
            self.melden(EngineEvent::PeerVerlassen(peer.clone()));
        }
        self.schluessel.entfernen_von(key);
        let verhandlung = self.tokens.entfernen(key);
        self.registry.entfernen(key);
        tracing::info!(peer = %key, "Peer hat den Raum verlassen");

        self.melden(EngineEvent::PeerGetrennt(peer));
        if verhandlung.is_some_and(|v| v.ergebnis == Ergebnis::InArbeit) {
            self.melden(EngineEvent::Verhandlungen(self.tokens.offene()));
        }
    }

    // -----------------------------------------------------------------------
    // Initiator
    // -----------------------------------------------------------------------

    /// Sendet `peer` eine neue Challenge (ersetzt ein offenes Token)
    pub fn challenge_ausstellen(&mut self, peer: &PublicKey) {
        let Some(verbindung) = self.verbindung.as_mut() else {
            tracing::warn!(peer = %peer, "Challenge ohne Verbindung");
            return;
        };
        let Some(since) = self.registry.get(peer).map(|p| p.since) else {
            tracing::debug!(peer = %peer, "Challenge an unbekannten Peer");
            return;
        };

        let token = self.tokens.ausstellen(*peer, self.uhr.jetzt());
        if let Some(eintrag) = self.registry.get_mut(peer) {
            eintrag.status.neu_verhandeln();
        }
        let nonce = self.nonces.frische_nonce();
        let ich = &mut verbindung.ich;
        let data = commit(
            &ich.identitaet.public_key,
            &since.als_text(),
            &nonce,
            peer,
            &ich.raum_passwort,
        );
        let anfrage = ChallengeAnfrage {
            data,
            nonce,
            handle: ich.handle.clone(),
            sealedauth: ich.sealed_auths.remove(peer),
            token,
        };
        tracing::debug!(
            peer = %peer,
            handle = %anfrage.handle,
            sealed_auth = anfrage.sealedauth.is_some(),
            "Challenge gesendet"
        );

        self.protokoll_senden(Nachricht::ChallengeAnfrage(anfrage), *peer);
        self.melden(EngineEvent::Verhandlungen(self.tokens.offene()));
    }

    fn antwort_verarbeiten(&mut self, von: PublicKey, antwort: ChallengeAntwort) {
        let ergebnis = antwort.result;
        if let Err(e) = self.tokens.abschliessen(
            &von,
            &antwort.token,
            ergebnis,
            self.uhr.jetzt(),
            self.konfig.token_lebensdauer(),
        ) {
            tracing::warn!(peer = %von, ergebnis = %ergebnis, fehler = %e, "Antwort verworfen");
            return;
        }
        self.melden(EngineEvent::Verhandlungen(self.tokens.offene()));

        let Some(since) = self.registry.get(&von).map(|p| p.since) else {
            tracing::debug!(peer = %von, "Antwort eines nicht mehr bekannten Peers");
            return;
        };
        tracing::debug!(peer = %von, ergebnis = %ergebnis, "Antwort erhalten");

        if ergebnis == Ergebnis::Ok {
            match antwort.shared {
                Some(paar) => self.schluessel.setzen(von, paar, since),
                None => tracing::warn!(peer = %von, "ok ohne Broadcast-Paar"),
            }
        }
        self.status_aendern(&von, |s| s.ihr_setzen(ergebnis));
        self.quorum_auswerten();
    }

    fn quorum_auswerten(&mut self) {
        let zaehlung = quorum::auszaehlen(self.registry.iter(), self.konfig.vertrauensmodus);
        let entscheidung = zaehlung.entscheiden();
        tracing::debug!(
            waehler = zaehlung.waehler,
            ok = zaehlung.ok,
            doppelt = zaehlung.doppelter_handle,
            hash = zaehlung.ungueltiger_hash,
            sealed_auth = zaehlung.ungueltige_sealed_auth,
            entscheidung = ?entscheidung,
            "Quorum ausgewertet"
        );

        match entscheidung {
            Entscheidung::Keine => {}
            Entscheidung::HandleErneuern => self.handle_erneuern(),
            Entscheidung::Abgelehnt => {
                tracing::warn!("Mehrheit hat uns abgelehnt");
                self.melden(EngineEvent::Fehler("Nicht in den Raum aufgenommen".to_string()));
            }
            Entscheidung::Akzeptiert => self.melden(EngineEvent::Akzeptiert),
        }
    }

    // -----------------------------------------------------------------------
    // Responder
    // -----------------------------------------------------------------------

    fn challenge_beantworten(&mut self, von: PublicKey, anfrage: ChallengeAnfrage) {
        let Some(verbindung) = self.verbindung.as_ref() else {
            return;
        };
        let ich_key = verbindung.ich.public_key();

        let Some(herausforderer) = self.registry.get(&von).cloned() else {
            tracing::debug!(peer = %von, "Challenge eines unbekannten Peers");
            self.antworten(von, anfrage.token, Ergebnis::PeerNichtGefunden, None);
            return;
        };

        let erwartet = verbindung.ich.since.map(|since| {
            commit(
                &von,
                &since.als_text(),
                &anfrage.nonce,
                &ich_key,
                &verbindung.ich.raum_passwort,
            )
        });
        if erwartet.as_ref() != Some(&anfrage.data) {
            tracing::warn!(peer = %von, "Raum-Commitment stimmt nicht");
            self.antworten(von, anfrage.token, Ergebnis::UngueltigerHash, None);
            return;
        }

        let sealed_auth_bestanden = match &anfrage.sealedauth {
            None => false,
            Some(auth) => match self.sealed_auth_pruefen(auth) {
                Ok(date) => {
                    tracing::debug!(peer = %von, date = %date, "Versiegelte Auth gueltig");
                    true
                }
                Err(e) => {
                    tracing::warn!(peer = %von, fehler = %e, "Versiegelte Auth abgelehnt");
                    self.antworten(von, anfrage.token, Ergebnis::UngueltigeSealedAuth, None);
                    return;
                }
            },
        };
        let herausforderer = Peer {
            sealed_auth_bestanden,
            ..herausforderer
        };
        if let Some(peer) = self.registry.get_mut(&von) {
            peer.sealed_auth_bestanden = sealed_auth_bestanden;
        }

        if let Some(bestehender) = self.registry.mit_handle(&anfrage.handle, &von).cloned() {
            let verlierer = konflikt::aufloesen(
                &Anspruch::from(&herausforderer),
                &Anspruch::from(&bestehender),
            );
            tracing::info!(
                handle = %anfrage.handle,
                herausforderer = %von,
                bestehender = %bestehender.public_key,
                verlierer = ?verlierer,
                "Handle-Kollision"
            );
            match verlierer {
                Verlierer::Herausforderer => {
                    self.antworten(
                        von,
                        anfrage.token,
                        Ergebnis::DoppelterHandle,
                        Some(anfrage.handle),
                    );
                    return;
                }
                Verlierer::Bestehender if bestehender.public_key == ich_key => {
                    self.handle_erneuern();
                }
                Verlierer::Bestehender => {
                    // Korrektur an den Dritten, der den Handle bisher hielt
                    self.antworten(
                        bestehender.public_key,
                        anfrage.token.clone(),
                        Ergebnis::DoppelterHandle,
                        bestehender.handle.clone(),
                    );
                }
            }
        }

        let war_akzeptiert = herausforderer
            .status
            .ist_akzeptiert(self.konfig.vertrauensmodus);
        let alter_handle = herausforderer.handle.clone();
        if let Some(peer) = self.registry.get_mut(&von) {
            peer.handle = Some(anfrage.handle.clone());
        }
        self.antworten(von, anfrage.token, Ergebnis::Ok, None);

        // Seine Antwort kam vor seiner Challenge
        if !war_akzeptiert && self.ist_akzeptiert(&von) {
            self.quorum_auswerten();
        }
        if war_akzeptiert && alter_handle.as_deref() != Some(anfrage.handle.as_str()) {
            if let Some(peer) = self.registry.get(&von).cloned() {
                tracing::info!(peer = %von, alt = ?alter_handle, neu = %anfrage.handle, "Peer hat Handle gewechselt");
                self.melden(EngineEvent::PeerHandleErneuert { peer, alter_handle });
            }
        }
    }

    fn sealed_auth_pruefen(&self, auth: &VersiegelteAuth) -> Result<Since, SealedAuthFehler> {
        let verbindung = self.verbindung.as_ref().ok_or(SealedAuthFehler::NichtLesbar)?;
        let geheimnis = verbindung
            .ich
            .sitzungs_geheimnis
            .as_deref()
            .ok_or(SealedAuthFehler::FalschesGeheimnis)?;
        let inhalt = auth.pruefen(
            &verbindung.relay,
            &verbindung.ich.identitaet.secret_key,
            geheimnis,
            self.uhr.jetzt(),
            self.konfig.sealed_auth_lebensdauer(),
        )?;
        Ok(inhalt.date)
    }

    /// Sendet eine Antwort und haelt unser Urteil fest. `ok` traegt immer
    /// das eigene Broadcast-Paar.
    ///
    /// Die Korrektur an einen Dritten traegt das Token des Herausforderers.
    /// Der Dritte verwirft sie, wirksam ist nur unser eigenes Urteil.
    fn antworten(
        &mut self,
        an: PublicKey,
        token: String,
        ergebnis: Ergebnis,
        handle: Option<String>,
    ) {
        let shared = (ergebnis == Ergebnis::Ok).then(|| self.schluessel.eigenes_paar().clone());
        let antwort = ChallengeAntwort {
            token,
            result: ergebnis,
            shared,
            handle,
        };
        self.status_aendern(&an, |s| s.unser_setzen(ergebnis));
        tracing::debug!(peer = %an, ergebnis = %ergebnis, "Challenge beantwortet");
        self.protokoll_senden(Nachricht::ChallengeAntwort(antwort), an);
    }

    /// Aendert den Status eines Peers und meldet Wechsel der Akzeptanz
    fn status_aendern(&mut self, key: &PublicKey, aendern: impl FnOnce(&mut Verbindungsstatus)) {
        let modus = self.konfig.vertrauensmodus;
        let Some(peer) = self.registry.get_mut(key) else {
            return;
        };
        let vorher = peer.status.ist_akzeptiert(modus);
        aendern(&mut peer.status);
        let nachher = peer.status.ist_akzeptiert(modus);
        let peer = peer.clone();

        match (vorher, nachher) {
            (false, true) => {
                tracing::info!(peer = %peer.public_key, handle = ?peer.handle, "Peer akzeptiert");
                self.melden(EngineEvent::PeerAkzeptiert(peer));
            }
            (true, false) => {
                tracing::info!(peer = %peer.public_key, "Peer nicht mehr akzeptiert");
                self.melden(EngineEvent::PeerVerlassen(peer));
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Handle
    // -----------------------------------------------------------------------

    /// Setzt einen neuen Handle und fordert alle Peers erneut heraus
    pub fn handle_aendern(&mut self, neu: &str) -> EngineResult<()> {
        let neu = neu.trim();
        if neu.is_empty() {
            return Err(EngineError::UngueltigerHandle(neu.to_string()));
        }
        let ich_key = self.eigener_schluessel().ok_or(EngineError::NichtVerbunden)?;
        if self.handle() == Some(neu) {
            return Ok(());
        }
        if self
            .registry
            .akzeptierte(self.konfig.vertrauensmodus)
            .any(|p| p.hat_handle(neu))
        {
            tracing::warn!(handle = %neu, "Handle bereits vergeben");
            self.melden(EngineEvent::Fehler(format!("Handle '{}' ist bereits vergeben", neu)));
            return Err(EngineError::HandleVergeben(neu.to_string()));
        }

        if let Some(verbindung) = self.verbindung.as_mut() {
            verbindung.ich.handle = neu.to_string();
        }
        if let Some(selbst) = self.registry.get_mut(&ich_key) {
            selbst.handle = Some(neu.to_string());
        }
        tracing::info!(handle = %neu, "Eigener Handle geaendert");
        self.melden(EngineEvent::EigenerHandleErneuert(neu.to_string()));

        let andere: Vec<PublicKey> = self.registry.andere(&ich_key).map(|p| p.public_key).collect();
        for key in andere {
            self.challenge_ausstellen(&key);
        }
        Ok(())
    }

    /// Waehlt einen zufaelligen Handle, den kein akzeptierter Peer traegt
    pub fn handle_erneuern(&mut self) {
        let laenge = self.konfig.handle_laenge.max(1);
        let modus = self.konfig.vertrauensmodus;
        let kandidat = loop {
            let kandidat = zufalls_id(laenge);
            if !self.registry.akzeptierte(modus).any(|p| p.hat_handle(&kandidat)) {
                break kandidat;
            }
        };
        tracing::info!(handle = %kandidat, "Handle wird erneuert");
        if let Err(e) = self.handle_aendern(&kandidat) {
            tracing::warn!(fehler = %e, "Handle-Erneuerung fehlgeschlagen");
        }
    }

    // -----------------------------------------------------------------------
    // Senden
    // -----------------------------------------------------------------------

    /// Unicast an die Identitaet eines Peers
    pub fn senden(&mut self, nachricht: &AnwendungsNachricht, an: &PublicKey) -> EngineResult<()> {
        self.umschlag_senden(&Nutzlast::from(nachricht.clone()), *an)
    }

    /// Ein Umschlag an das Broadcast-Paar des spaetesten akzeptierten Peers
    pub fn broadcast(&mut self, nachricht: &AnwendungsNachricht) -> EngineResult<()> {
        let an = self.broadcast_empfaenger().ok_or(EngineError::KeinBroadcastZiel)?;
        tracing::debug!(an = %an, typ = %nachricht.typ, "Broadcast");
        self.umschlag_senden(&Nutzlast::from(nachricht.clone()), an)
    }

    /// Einzelner Unicast an jeden akzeptierten Peer, liefert die Anzahl
    pub fn broadcast_direkt(&mut self, nachricht: &AnwendungsNachricht) -> EngineResult<usize> {
        let empfaenger: Vec<PublicKey> = self
            .registry
            .akzeptierte(self.konfig.vertrauensmodus)
            .map(|p| p.public_key)
            .collect();
        let nutzlast = Nutzlast::from(nachricht.clone());
        for an in &empfaenger {
            self.umschlag_senden(&nutzlast, *an)?;
        }
        Ok(empfaenger.len())
    }

    /// Fordert beim Relay eine aktuelle Mitgliederliste an
    pub fn peer_liste_anfordern(&mut self) -> EngineResult<()> {
        let relay = self
            .verbindung
            .as_ref()
            .map(|v| v.relay)
            .ok_or(EngineError::NichtVerbunden)?;
        self.umschlag_senden(
            &Nutzlast::from(Nachricht::PeerListe { peers: Vec::new() }),
            relay,
        )
    }

    fn broadcast_empfaenger(&self) -> Option<PublicKey> {
        let kandidaten = self
            .registry
            .akzeptierte(self.konfig.vertrauensmodus)
            .filter(|p| self.schluessel.von(&p.public_key).is_some());
        let ziel = kanal::broadcast_ziel(kandidaten)?;
        self.schluessel
            .von(&ziel.public_key)
            .map(|s| s.paar.public_key)
    }

    fn umschlag_senden(&mut self, nutzlast: &Nutzlast, an: PublicKey) -> EngineResult<()> {
        let verbindung = self.verbindung.as_ref().ok_or(EngineError::NichtVerbunden)?;
        let nonce = self.nonces.frische_nonce();
        let umschlag = kanal::versiegeln(nutzlast, nonce, &verbindung.ich.identitaet, an)?;
        verbindung.transport.senden(umschlag.to_json()?)?;
        Ok(())
    }

    /// Protokoll-Nachrichten: Fehler werden nur geloggt
    fn protokoll_senden(&mut self, nachricht: Nachricht, an: PublicKey) {
        let nutzlast = Nutzlast::from(nachricht);
        if let Err(e) = self.umschlag_senden(&nutzlast, an) {
            tracing::warn!(an = %an, typ = nutzlast.typ(), fehler = %e, "Senden fehlgeschlagen");
        }
    }

    fn melden(&self, ereignis: EngineEvent) {
        if self.ereignisse.send(ereignis).is_err() {
            tracing::trace!("Kein Empfaenger fuer Engine-Ereignisse");
        }
    }

    // -----------------------------------------------------------------------
    // Abfragen
    // -----------------------------------------------------------------------

    pub fn konfig(&self) -> &EngineKonfiguration {
        &self.konfig
    }

    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.registry.iter()
    }

    pub fn peer(&self, key: &PublicKey) -> Option<&Peer> {
        self.registry.get(key)
    }

    pub fn ist_akzeptiert(&self, key: &PublicKey) -> bool {
        self.registry.ist_akzeptiert(key, self.konfig.vertrauensmodus)
    }

    pub fn handle(&self) -> Option<&str> {
        self.verbindung.as_ref().map(|v| v.ich.handle.as_str())
    }

    pub fn since(&self) -> Option<Since> {
        self.verbindung.as_ref().and_then(|v| v.ich.since)
    }

    pub fn eigener_schluessel(&self) -> Option<PublicKey> {
        self.verbindung.as_ref().map(|v| v.ich.public_key())
    }

    /// Oeffentliche Haelfte des aktuellen eigenen Broadcast-Paars
    pub fn broadcast_schluessel(&self) -> PublicKey {
        self.schluessel.eigenes_paar().public_key
    }

    pub fn offene_verhandlungen(&self) -> usize {
        self.tokens.offene()
    }
}
