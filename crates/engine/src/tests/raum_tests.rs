//! Mehrere echte Engines hinter einem simulierten Stern-Relay

use whisper_protocol::AnwendungsNachricht;

use super::*;
use crate::event::EngineEvent;

fn handle_erneuerungen(ereignisse: &[EngineEvent]) -> Vec<String> {
    ereignisse
        .iter()
        .filter_map(|e| match e {
            EngineEvent::EigenerHandleErneuert(h) => Some(h.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_zwei_engines_akzeptieren_sich() {
    let mut raum = Raum::neu();
    let a = raum.beitreten("alice");
    let b = raum.beitreten("bob");
    raum.pumpen();

    let key_a = raum.teilnehmer[a].key;
    let key_b = raum.teilnehmer[b].key;
    assert!(raum.teilnehmer[a].engine.ist_akzeptiert(&key_b));
    assert!(raum.teilnehmer[b].engine.ist_akzeptiert(&key_a));
    assert_eq!(raum.teilnehmer[a].engine.offene_verhandlungen(), 0);
    assert_eq!(raum.teilnehmer[b].engine.offene_verhandlungen(), 0);

    assert!(raum.ereignisse(a).contains(&EngineEvent::Akzeptiert));
    assert!(raum.ereignisse(b).contains(&EngineEvent::Akzeptiert));
    assert!(raum.teilnehmer[a]
        .engine
        .peer(&key_b)
        .unwrap()
        .hat_handle("bob"));
}

#[test]
fn test_gleicher_handle_spaeterer_erneuert_genau_einmal() {
    let mut raum = Raum::neu();
    let a = raum.beitreten("alice");
    let b = raum.beitreten("alice");
    raum.pumpen();

    assert_eq!(raum.teilnehmer[a].engine.handle(), Some("alice"));
    assert!(handle_erneuerungen(&raum.ereignisse(a)).is_empty());

    let erneuert = handle_erneuerungen(&raum.ereignisse(b));
    assert_eq!(erneuert.len(), 1);
    assert_eq!(erneuert[0].len(), 5);
    assert!(erneuert[0].chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(raum.teilnehmer[b].engine.handle(), Some(erneuert[0].as_str()));

    // Danach vertragen sich beide
    let key_a = raum.teilnehmer[a].key;
    let key_b = raum.teilnehmer[b].key;
    assert!(raum.teilnehmer[a].engine.ist_akzeptiert(&key_b));
    assert!(raum.teilnehmer[b].engine.ist_akzeptiert(&key_a));
    assert!(raum.teilnehmer[a]
        .engine
        .peer(&key_b)
        .unwrap()
        .hat_handle(&erneuert[0]));
}

#[test]
fn test_broadcast_erreicht_alle() {
    let mut raum = Raum::neu();
    let a = raum.beitreten("alice");
    raum.pumpen();
    let b = raum.beitreten("bob");
    raum.pumpen();
    let c = raum.beitreten("carol");
    raum.pumpen();
    for i in [a, b, c] {
        raum.ereignisse(i);
    }

    let key_a = raum.teilnehmer[a].key;
    raum.teilnehmer[a]
        .engine
        .broadcast(&AnwendungsNachricht::text("hallo zusammen"))
        .unwrap();
    raum.pumpen();

    let erwartet = EngineEvent::Nachricht {
        von: key_a,
        nachricht: AnwendungsNachricht::text("hallo zusammen"),
    };
    assert_eq!(raum.ereignisse(b), vec![erwartet.clone()]);
    assert_eq!(raum.ereignisse(c), vec![erwartet]);
    assert!(raum.ereignisse(a).is_empty());
}

#[test]
fn test_abgang_im_raum() {
    let mut raum = Raum::neu();
    let a = raum.beitreten("alice");
    let b = raum.beitreten("bob");
    raum.pumpen();
    raum.ereignisse(a);

    let key_b = raum.teilnehmer[b].key;
    let abgang = raum.relay.an(
        raum.teilnehmer[a].key,
        Nachricht::PeerAbgang(whisper_protocol::PeerAustritt {
            public_key: key_b,
            since: Some(raum.teilnehmer[b].since),
        }),
    );
    raum.teilnehmer[a].engine.umschlag_empfangen(abgang);

    let ereignisse = raum.ereignisse(a);
    assert!(matches!(&ereignisse[0], EngineEvent::PeerVerlassen(p) if p.public_key == key_b));
    assert!(matches!(&ereignisse[1], EngineEvent::PeerGetrennt(p) if p.public_key == key_b));
    assert_eq!(raum.teilnehmer[a].engine.peers().count(), 1);
}
