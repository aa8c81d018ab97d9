//! Nonce-Erzeugung
//!
//! Nonces sind 24 zufaellige Bytes aus dem OS-RNG. Zusaetzlich merkt sich der
//! Pool die zuletzt ausgegebenen Nonces und zieht bei einer Wiederholung neu.
//! Das ist keine Sicherheitsgrenze, nur eine lokale Plausibilitaetspruefung.

use std::collections::{HashSet, VecDeque};

use rand::rngs::OsRng;
use rand::RngCore;

use crate::types::{Nonce, NONCE_LAENGE};

/// Standard-Groesse der Nonce-Historie
pub const STANDARD_HISTORIE: usize = 500;

/// Erzeugt frische Nonces und verwirft lokale Wiederholungen
#[derive(Debug)]
pub struct NoncePool {
    historie: VecDeque<Nonce>,
    bekannt: HashSet<Nonce>,
    kapazitaet: usize,
}

impl NoncePool {
    pub fn neu(kapazitaet: usize) -> Self {
        Self {
            historie: VecDeque::with_capacity(kapazitaet),
            bekannt: HashSet::with_capacity(kapazitaet),
            kapazitaet,
        }
    }

    /// Liefert eine Nonce, die unter den letzten `kapazitaet` nicht vorkam
    pub fn frische_nonce(&mut self) -> Nonce {
        loop {
            let mut bytes = [0u8; NONCE_LAENGE];
            OsRng.fill_bytes(&mut bytes);
            let nonce = Nonce::from_bytes(bytes);
            if self.merken(nonce) {
                return nonce;
            }
            tracing::warn!("Nonce-Wiederholung erkannt, ziehe neu");
        }
    }

    /// Nimmt eine Nonce in die Historie auf. `false` wenn bereits bekannt.
    fn merken(&mut self, nonce: Nonce) -> bool {
        if self.bekannt.contains(&nonce) {
            return false;
        }
        if self.kapazitaet == 0 {
            return true;
        }
        if self.historie.len() >= self.kapazitaet {
            if let Some(alt) = self.historie.pop_front() {
                self.bekannt.remove(&alt);
            }
        }
        self.historie.push_back(nonce);
        self.bekannt.insert(nonce);
        true
    }

    pub fn len(&self) -> usize {
        self.historie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.historie.is_empty()
    }
}

impl Default for NoncePool {
    fn default() -> Self {
        Self::neu(STANDARD_HISTORIE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonces_sind_verschieden() {
        let mut pool = NoncePool::default();
        let a = pool.frische_nonce();
        let b = pool.frische_nonce();
        assert_ne!(a, b);
    }

    #[test]
    fn historie_ist_begrenzt() {
        let mut pool = NoncePool::neu(3);
        for _ in 0..10 {
            pool.frische_nonce();
        }
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.bekannt.len(), 3);
    }

    #[test]
    fn wiederholung_wird_erkannt() {
        let mut pool = NoncePool::neu(4);
        let nonce = Nonce::from_bytes([5u8; NONCE_LAENGE]);
        assert!(pool.merken(nonce));
        assert!(!pool.merken(nonce));
    }

    #[test]
    fn verdraengte_nonce_ist_wieder_frei() {
        let mut pool = NoncePool::neu(1);
        let erste = Nonce::from_bytes([1u8; NONCE_LAENGE]);
        let zweite = Nonce::from_bytes([2u8; NONCE_LAENGE]);
        assert!(pool.merken(erste));
        assert!(pool.merken(zweite));
        assert!(pool.merken(erste));
    }
}
