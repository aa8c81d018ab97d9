use thiserror::Error;

/// Fehler beim Kodieren oder Dekodieren von Wire-Nachrichten
#[derive(Debug, Error)]
pub enum ProtokollFehler {
    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Nutzlast ohne 'type'-Feld")]
    FehlenderTyp,

    #[error("Nutzlast ist kein JSON-Objekt")]
    KeinObjekt,

    #[error("Typ '{0}' ist fuer das Protokoll reserviert")]
    ReservierterTyp(String),
}

pub type ProtokollResult<T> = Result<T, ProtokollFehler>;
