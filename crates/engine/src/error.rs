//! Fehlertypen fuer die Engine
//!
//! Nur Aufrufe von aussen (senden, broadcast, Handle aendern) liefern
//! Fehler zurueck. Fehler in der Protokollverarbeitung werden geloggt.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Nicht mit einem Raum verbunden")]
    NichtVerbunden,

    #[error("Handle '{0}' ist bereits von einem anderen Peer belegt")]
    HandleVergeben(String),

    #[error("Ungueltiger Handle: {0}")]
    UngueltigerHandle(String),

    #[error("Kein akzeptierter Peer mit geteiltem Schluessel fuer Broadcast")]
    KeinBroadcastZiel,

    #[error("Sitzung ist beendet")]
    SitzungBeendet,

    #[error("Transport-Fehler: {0}")]
    Transport(#[from] whisper_transport::TransportError),

    #[error("Krypto-Fehler: {0}")]
    Krypto(#[from] whisper_crypto::CryptoError),

    #[error("Protokoll-Fehler: {0}")]
    Protokoll(#[from] whisper_protocol::ProtokollFehler),
}

pub type EngineResult<T> = Result<T, EngineError>;
