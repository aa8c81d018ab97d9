//! Nutzlast-Typen (Inhalt eines entschluesselten Umschlags)
//!
//! Jede Nutzlast ist ein JSON-Objekt mit einem `type`-Feld. Die fuenf
//! Protokoll-Typen werden typsicher dekodiert, alles andere wird als
//! Anwendungs-Nachricht unveraendert durchgereicht.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use whisper_core::Since;
use whisper_crypto::{Commitment, KeyPair, Nonce, PublicKey, VersiegelteAuth};

use crate::error::{ProtokollFehler, ProtokollResult};

/// Typ-Namen, die das Protokoll selbst belegt
pub const RESERVIERTE_TYPEN: [&str; 5] = [
    "peer.list",
    "peer.join",
    "peer.leave",
    "challenge.query",
    "challenge.response",
];

// ---------------------------------------------------------------------------
// Ergebnis-Codes
// ---------------------------------------------------------------------------

/// Ergebnis eines Challenge-Austauschs (Wire-Namen sind historisch gemischt)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ergebnis {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "in-progress")]
    InArbeit,
    #[serde(rename = "invalid-hash")]
    UngueltigerHash,
    #[serde(rename = "duplicate.handle")]
    DoppelterHandle,
    #[serde(rename = "invalid.sealedauth")]
    UngueltigeSealedAuth,
    #[serde(rename = "peer-not-found")]
    PeerNichtGefunden,
}

impl Ergebnis {
    /// Zaehlt als Ablehnung im Quorum
    pub fn ist_ablehnung(&self) -> bool {
        matches!(
            self,
            Self::UngueltigerHash | Self::DoppelterHandle | Self::UngueltigeSealedAuth
        )
    }

    pub fn ist_terminal(&self) -> bool {
        !matches!(self, Self::InArbeit)
    }
}

impl std::fmt::Display for Ergebnis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::InArbeit => "in-progress",
            Self::UngueltigerHash => "invalid-hash",
            Self::DoppelterHandle => "duplicate.handle",
            Self::UngueltigeSealedAuth => "invalid.sealedauth",
            Self::PeerNichtGefunden => "peer-not-found",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Mitgliedschaft (nur vom Relay)
// ---------------------------------------------------------------------------

/// Ein Eintrag der Mitgliederliste
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerEintrag {
    pub public_key: PublicKey,
    pub since: Since,
}

/// Austritt eines Peers. `since` wird vom Relay mitgeschickt, aber nicht benoetigt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerAustritt {
    pub public_key: PublicKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<Since>,
}

// ---------------------------------------------------------------------------
// Challenge
// ---------------------------------------------------------------------------

/// Challenge eines Initiators an einen Responder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeAnfrage {
    /// Raum-Commitment
    pub data: Commitment,
    pub nonce: Nonce,
    pub handle: String,
    #[serde(
        default,
        deserialize_with = "optionale_sealed_auth",
        skip_serializing_if = "Option::is_none"
    )]
    pub sealedauth: Option<VersiegelteAuth>,
    pub token: String,
}

/// Antwort des Responders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeAntwort {
    pub token: String,
    pub result: Ergebnis,
    /// Broadcast-Paar des Responders (nur bei `ok`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<KeyPair>,
    /// Der abgelehnte Handle (nur bei `duplicate.handle`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

/// Aeltere Clients senden `""` statt eines fehlenden Tokens
fn optionale_sealed_auth<'de, D>(deserializer: D) -> Result<Option<VersiegelteAuth>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(v) => serde_json::from_value(v)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

// ---------------------------------------------------------------------------
// Protokoll-Nachrichten
// ---------------------------------------------------------------------------

/// Geschlossene Menge der Protokoll-Nachrichten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Nachricht {
    /// Vom Relay: komplette Mitgliederliste. Vom Client: Anfrage danach.
    #[serde(rename = "peer.list")]
    PeerListe {
        #[serde(default)]
        peers: Vec<PeerEintrag>,
    },
    #[serde(rename = "peer.join")]
    PeerBeitritt(PeerEintrag),
    #[serde(rename = "peer.leave")]
    PeerAbgang(PeerAustritt),
    #[serde(rename = "challenge.query")]
    ChallengeAnfrage(ChallengeAnfrage),
    #[serde(rename = "challenge.response")]
    ChallengeAntwort(ChallengeAntwort),
}

// ---------------------------------------------------------------------------
// Anwendungs-Nachrichten
// ---------------------------------------------------------------------------

/// Beliebige Nachricht der Anwendung (z.B. `{"type": "message", "data": "hi"}`)
#[derive(Debug, Clone, PartialEq)]
pub struct AnwendungsNachricht {
    pub typ: String,
    /// Alle Felder ausser `type`
    pub felder: Map<String, Value>,
}

impl AnwendungsNachricht {
    /// Erstellt eine Anwendungs-Nachricht. Reservierte Typen werden abgelehnt.
    pub fn neu(typ: impl Into<String>, felder: Map<String, Value>) -> ProtokollResult<Self> {
        let typ = typ.into();
        if RESERVIERTE_TYPEN.contains(&typ.as_str()) {
            return Err(ProtokollFehler::ReservierterTyp(typ));
        }
        Ok(Self { typ, felder })
    }

    /// Kurzform fuer Chat-Text: `{"type": "message", "data": text}`
    pub fn text(text: impl Into<String>) -> Self {
        let mut felder = Map::new();
        felder.insert("data".to_string(), Value::String(text.into()));
        Self {
            typ: "message".to_string(),
            felder,
        }
    }

    pub fn feld(&self, name: &str) -> Option<&Value> {
        self.felder.get(name)
    }

    fn als_wert(&self) -> Value {
        let mut objekt = self.felder.clone();
        objekt.insert("type".to_string(), Value::String(self.typ.clone()));
        Value::Object(objekt)
    }
}

// ---------------------------------------------------------------------------
// Nutzlast
// ---------------------------------------------------------------------------

/// Entschluesselter Inhalt eines Umschlags
#[derive(Debug, Clone, PartialEq)]
pub enum Nutzlast {
    Protokoll(Nachricht),
    Anwendung(AnwendungsNachricht),
}

impl Nutzlast {
    /// Dekodiert Klartext-Bytes anhand des `type`-Felds
    pub fn aus_bytes(bytes: &[u8]) -> ProtokollResult<Self> {
        let wert: Value = serde_json::from_slice(bytes)?;
        let Value::Object(mut objekt) = wert else {
            return Err(ProtokollFehler::KeinObjekt);
        };
        let typ = match objekt.get("type") {
            Some(Value::String(t)) => t.clone(),
            _ => return Err(ProtokollFehler::FehlenderTyp),
        };

        if RESERVIERTE_TYPEN.contains(&typ.as_str()) {
            let nachricht = serde_json::from_value(Value::Object(objekt))?;
            return Ok(Self::Protokoll(nachricht));
        }

        objekt.remove("type");
        Ok(Self::Anwendung(AnwendungsNachricht { typ, felder: objekt }))
    }

    pub fn zu_bytes(&self) -> ProtokollResult<Vec<u8>> {
        match self {
            Self::Protokoll(n) => Ok(serde_json::to_vec(n)?),
            Self::Anwendung(a) => Ok(serde_json::to_vec(&a.als_wert())?),
        }
    }

    /// Wire-Name des Typs (fuer Logs)
    pub fn typ(&self) -> &str {
        match self {
            Self::Protokoll(Nachricht::PeerListe { .. }) => "peer.list",
            Self::Protokoll(Nachricht::PeerBeitritt(_)) => "peer.join",
            Self::Protokoll(Nachricht::PeerAbgang(_)) => "peer.leave",
            Self::Protokoll(Nachricht::ChallengeAnfrage(_)) => "challenge.query",
            Self::Protokoll(Nachricht::ChallengeAntwort(_)) => "challenge.response",
            Self::Anwendung(a) => &a.typ,
        }
    }
}

impl From<Nachricht> for Nutzlast {
    fn from(n: Nachricht) -> Self {
        Self::Protokoll(n)
    }
}

impl From<AnwendungsNachricht> for Nutzlast {
    fn from(a: AnwendungsNachricht) -> Self {
        Self::Anwendung(a)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
