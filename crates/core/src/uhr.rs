//! Uhr-Abstraktion
//!
//! Die Protokoll-Logik ruft nie `Utc::now()` direkt auf, sondern fragt eine
//! `Uhr`. Produktiv ist das die Systemzeit, in Tests eine manuell
//! vorstellbare Uhr, um Token-Ablaeufe ohne Warten zu pruefen.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Liefert die aktuelle Zeit
pub trait Uhr: Send + Sync + 'static {
    fn jetzt(&self) -> DateTime<Utc>;
}

/// Systemuhr (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUhr;

impl Uhr for SystemUhr {
    fn jetzt(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manuell gestellte Uhr fuer Tests
///
/// Clone teilt den inneren Zustand.
#[derive(Debug, Clone)]
pub struct ManuelleUhr {
    zeit: Arc<Mutex<DateTime<Utc>>>,
}

impl ManuelleUhr {
    pub fn neu(start: DateTime<Utc>) -> Self {
        Self {
            zeit: Arc::new(Mutex::new(start)),
        }
    }

    /// Stellt die Uhr um `dauer` vor
    pub fn vorstellen(&self, dauer: Duration) {
        let mut zeit = self.zeit.lock();
        *zeit += dauer;
    }

    pub fn stellen(&self, neu: DateTime<Utc>) {
        *self.zeit.lock() = neu;
    }
}

impl Uhr for ManuelleUhr {
    fn jetzt(&self) -> DateTime<Utc> {
        *self.zeit.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manuelle_uhr_vorstellen() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let uhr = ManuelleUhr::neu(start);
        let kopie = uhr.clone();
        uhr.vorstellen(Duration::minutes(6));
        assert_eq!(kopie.jetzt(), start + Duration::minutes(6));
    }

    #[test]
    fn systemuhr_laeuft_vorwaerts() {
        let a = SystemUhr.jetzt();
        let b = SystemUhr.jetzt();
        assert!(b >= a);
    }
}
