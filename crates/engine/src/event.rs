//! Ereignisse, die die Engine nach aussen meldet

use std::time::Duration;

use whisper_crypto::PublicKey;
use whisper_protocol::{AnwendungsNachricht, PeerEintrag};

use crate::registry::Peer;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    // --- Transport ---
    Verbunden,
    Getrennt { grund: Option<String> },
    Wiederverbinden { verzoegerung: Duration },

    // --- Mitgliedschaft ---
    PeerVerbunden(Peer),
    PeerGetrennt(Peer),
    PeerAkzeptiert(Peer),
    PeerVerlassen(Peer),
    PeerHandleErneuert {
        peer: Peer,
        alter_handle: Option<String>,
    },
    /// Antwort auf eine spaetere Mitgliederlisten-Anfrage
    PeerListe(Vec<PeerEintrag>),

    // --- Eigener Zustand ---
    EigenerHandleErneuert(String),
    /// Anzahl laufender Verhandlungen
    Verhandlungen(usize),
    Akzeptiert,
    Fehler(String),

    // --- Anwendung ---
    Nachricht {
        von: PublicKey,
        nachricht: AnwendungsNachricht,
    },
}
