use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Socket ist geschlossen")]
    Geschlossen,

    #[error("Nachricht zu gross: {groesse} Bytes (Maximum: {maximum})")]
    ZuGross { groesse: usize, maximum: usize },
}

pub type TransportResult<T> = Result<T, TransportError>;
