//! whisper-protocol – Wire-Format-Definitionen
//!
//! Dieses Crate definiert den Umschlag, den das Relay weiterleitet, und alle
//! Nutzlast-Typen, die nach dem Entschluesseln darin stecken.

pub mod error;
pub mod nachricht;
pub mod umschlag;

pub use error::{ProtokollFehler, ProtokollResult};
pub use nachricht::{
    AnwendungsNachricht, ChallengeAnfrage, ChallengeAntwort, Ergebnis, Nachricht, Nutzlast,
    PeerAustritt, PeerEintrag, RESERVIERTE_TYPEN,
};
pub use umschlag::Umschlag;
