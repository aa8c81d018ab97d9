//! Sitzung – besitzt die Engine in einem eigenen Task
//!
//! Transport-Ereignisse und Befehle der Anwendung werden mit `select!` in
//! einer Schleife verarbeitet. Die Anwendung spricht nur ueber den
//! `SitzungsHandle` mit der Engine.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use whisper_crypto::PublicKey;
use whisper_protocol::AnwendungsNachricht;
use whisper_transport::TransportEvent;

use crate::engine::WhisperEngine;
use crate::error::{EngineError, EngineResult};

/// Puffergroesse fuer Befehle
const BEFEHL_PUFFER: usize = 64;

enum Befehl {
    Senden {
        nachricht: AnwendungsNachricht,
        an: PublicKey,
        antwort: oneshot::Sender<EngineResult<()>>,
    },
    Broadcast {
        nachricht: AnwendungsNachricht,
        antwort: oneshot::Sender<EngineResult<()>>,
    },
    BroadcastDirekt {
        nachricht: AnwendungsNachricht,
        antwort: oneshot::Sender<EngineResult<usize>>,
    },
    HandleAendern {
        handle: String,
        antwort: oneshot::Sender<EngineResult<()>>,
    },
    PeerListeAnfordern {
        antwort: oneshot::Sender<EngineResult<()>>,
    },
    Schliessen,
}

/// Zugriff der Anwendung auf eine laufende Sitzung
#[derive(Clone)]
pub struct SitzungsHandle {
    befehle: mpsc::Sender<Befehl>,
}

impl SitzungsHandle {
    pub async fn senden(&self, nachricht: AnwendungsNachricht, an: PublicKey) -> EngineResult<()> {
        let (tx, rx) = oneshot::channel();
        self.befehl(Befehl::Senden {
            nachricht,
            an,
            antwort: tx,
        })
        .await?;
        rx.await.map_err(|_| EngineError::SitzungBeendet)?
    }

    pub async fn broadcast(&self, nachricht: AnwendungsNachricht) -> EngineResult<()> {
        let (tx, rx) = oneshot::channel();
        self.befehl(Befehl::Broadcast {
            nachricht,
            antwort: tx,
        })
        .await?;
        rx.await.map_err(|_| EngineError::SitzungBeendet)?
    }

    pub async fn broadcast_direkt(&self, nachricht: AnwendungsNachricht) -> EngineResult<usize> {
        let (tx, rx) = oneshot::channel();
        self.befehl(Befehl::BroadcastDirekt {
            nachricht,
            antwort: tx,
        })
        .await?;
        rx.await.map_err(|_| EngineError::SitzungBeendet)?
    }

    pub async fn handle_aendern(&self, handle: impl Into<String>) -> EngineResult<()> {
        let (tx, rx) = oneshot::channel();
        self.befehl(Befehl::HandleAendern {
            handle: handle.into(),
            antwort: tx,
        })
        .await?;
        rx.await.map_err(|_| EngineError::SitzungBeendet)?
    }

    pub async fn peer_liste_anfordern(&self) -> EngineResult<()> {
        let (tx, rx) = oneshot::channel();
        self.befehl(Befehl::PeerListeAnfordern { antwort: tx }).await?;
        rx.await.map_err(|_| EngineError::SitzungBeendet)?
    }

    /// Beendet die Sitzung. Weitere Aufrufe liefern `SitzungBeendet`.
    pub async fn schliessen(&self) {
        let _ = self.befehle.send(Befehl::Schliessen).await;
    }

    async fn befehl(&self, befehl: Befehl) -> EngineResult<()> {
        self.befehle
            .send(befehl)
            .await
            .map_err(|_| EngineError::SitzungBeendet)
    }
}

/// Startet die Sitzungsschleife fuer eine bereits verbundene Engine
pub fn sitzung_starten(
    mut engine: WhisperEngine,
    mut transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
) -> (SitzungsHandle, JoinHandle<()>) {
    let (befehle_tx, mut befehle_rx) = mpsc::channel(BEFEHL_PUFFER);

    let task = tokio::spawn(async move {
        tracing::debug!("Sitzung gestartet");
        loop {
            tokio::select! {
                ereignis = transport_rx.recv() => match ereignis {
                    Some(ereignis) => engine.transport_ereignis(ereignis),
                    None => {
                        tracing::debug!("Transport beendet");
                        engine.schliessen();
                        break;
                    }
                },
                befehl = befehle_rx.recv() => match befehl {
                    Some(Befehl::Schliessen) | None => {
                        engine.schliessen();
                        break;
                    }
                    Some(befehl) => ausfuehren(&mut engine, befehl),
                },
            }
        }
        tracing::debug!("Sitzung beendet");
    });

    (SitzungsHandle { befehle: befehle_tx }, task)
}

fn ausfuehren(engine: &mut WhisperEngine, befehl: Befehl) {
    // Verworfene Antwort-Empfaenger werden ignoriert
    match befehl {
        Befehl::Senden {
            nachricht,
            an,
            antwort,
        } => {
            let _ = antwort.send(engine.senden(&nachricht, &an));
        }
        Befehl::Broadcast { nachricht, antwort } => {
            let _ = antwort.send(engine.broadcast(&nachricht));
        }
        Befehl::BroadcastDirekt { nachricht, antwort } => {
            let _ = antwort.send(engine.broadcast_direkt(&nachricht));
        }
        Befehl::HandleAendern { handle, antwort } => {
            let _ = antwort.send(engine.handle_aendern(&handle));
        }
        Befehl::PeerListeAnfordern { antwort } => {
            let _ = antwort.send(engine.peer_liste_anfordern());
        }
        Befehl::Schliessen => engine.schliessen(),
    }
}
