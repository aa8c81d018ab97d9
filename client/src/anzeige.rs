//! Textdarstellung der Engine-Ereignisse fuer das Terminal

use whisper_crypto::PublicKey;
use whisper_engine::{EngineEvent, Peer};

/// Kurzform eines Schluessels (erste 8 Zeichen Base64)
pub fn kurz(key: &PublicKey) -> String {
    key.to_base64().chars().take(8).collect()
}

fn name(peer: &Peer) -> String {
    match &peer.handle {
        Some(handle) => format!("{handle} ({})", kurz(&peer.public_key)),
        None => kurz(&peer.public_key),
    }
}

/// `None` fuer Ereignisse, die nur ins Log gehoeren
pub fn ereignis_text(ereignis: &EngineEvent) -> Option<String> {
    let text = match ereignis {
        EngineEvent::Verbunden => "* Verbunden".to_string(),
        EngineEvent::Getrennt { grund: Some(grund) } => format!("* Getrennt: {grund}"),
        EngineEvent::Getrennt { grund: None } => "* Getrennt".to_string(),
        EngineEvent::Wiederverbinden { verzoegerung } => {
            format!("* Neuer Versuch in {} ms", verzoegerung.as_millis())
        }
        EngineEvent::PeerAkzeptiert(peer) => format!("+ {} ist im Raum", name(peer)),
        EngineEvent::PeerVerlassen(peer) => format!("- {} ist nicht mehr vertraut", name(peer)),
        EngineEvent::PeerGetrennt(peer) => format!("- {} hat den Raum verlassen", name(peer)),
        EngineEvent::PeerHandleErneuert { peer, alter_handle } => format!(
            "* {} heisst jetzt {}",
            alter_handle.as_deref().unwrap_or("?"),
            name(peer)
        ),
        EngineEvent::PeerListe(eintraege) => format!(
            "* Im Raum: {}",
            eintraege
                .iter()
                .map(|e| kurz(&e.public_key))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        EngineEvent::EigenerHandleErneuert(handle) => format!("* Du heisst jetzt {handle}"),
        EngineEvent::Akzeptiert => "* Im Raum aufgenommen".to_string(),
        EngineEvent::Fehler(meldung) => format!("! {meldung}"),
        EngineEvent::Nachricht { von, nachricht } => match nachricht.feld("data") {
            Some(serde_json::Value::String(text)) => format!("<{}> {text}", kurz(von)),
            _ => format!("<{}> [{}]", kurz(von), nachricht.typ),
        },
        EngineEvent::PeerVerbunden(_) | EngineEvent::Verhandlungen(_) => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use whisper_core::Since;
    use whisper_crypto::KeyPair;
    use whisper_protocol::AnwendungsNachricht;

    #[test]
    fn nachricht_mit_text() {
        let von = KeyPair::generieren().public_key;
        let text = ereignis_text(&EngineEvent::Nachricht {
            von,
            nachricht: AnwendungsNachricht::text("hallo"),
        })
        .unwrap();
        assert_eq!(text, format!("<{}> hallo", kurz(&von)));
    }

    #[test]
    fn peer_mit_und_ohne_handle() {
        let mut peer = Peer::neu(KeyPair::generieren().public_key, Since::neu(Utc::now()));
        let ohne = ereignis_text(&EngineEvent::PeerGetrennt(peer.clone())).unwrap();
        assert!(ohne.ends_with("hat den Raum verlassen"));
        assert!(!ohne.contains('('));

        peer.handle = Some("bob".into());
        let mit = ereignis_text(&EngineEvent::PeerAkzeptiert(peer)).unwrap();
        assert!(mit.starts_with("+ bob ("));
    }

    #[test]
    fn interne_ereignisse_bleiben_still() {
        assert_eq!(ereignis_text(&EngineEvent::Verhandlungen(2)), None);
        assert_eq!(
            ereignis_text(&EngineEvent::Getrennt {
                grund: Some("room.dispose".into())
            }),
            Some("* Getrennt: room.dispose".to_string())
        );
    }
}
