//! WebSocket-Transport (tokio-tungstenite)
//!
//! `WsTransport::verbinden` startet einen tokio-Task, der die Verbindung
//! zum Relay aufbaut, haelt und bei abnormalem Ende neu aufbaut. Ausgehende
//! Nachrichten laufen ueber eine mpsc-Queue in diesen Task, eingehende
//! Nachrichten und Zustandswechsel kommen als `TransportEvent` zurueck.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, WebSocketConfig};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_with_config, WebSocketStream};

use crate::config::TransportKonfiguration;
use crate::error::{TransportError, TransportResult};
use crate::{Transport, TransportEvent};

/// Wie eine einzelne Verbindung geendet hat
#[derive(Debug, PartialEq, Eq)]
enum Verbindungsende {
    /// Kein neuer Versuch
    Normal(Option<String>),
    /// Neuer Versuch nach der konfigurierten Verzoegerung
    Abnormal(Option<String>),
}

// ---------------------------------------------------------------------------
// WsTransport
// ---------------------------------------------------------------------------

/// Handle auf den laufenden Verbindungs-Task
///
/// Wird das Handle fallengelassen, beendet sich der Task ebenfalls.
pub struct WsTransport {
    ausgang: mpsc::UnboundedSender<String>,
    verbunden: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    max_nachricht_bytes: usize,
}

impl WsTransport {
    /// Startet den Verbindungs-Task. Muss innerhalb einer tokio-Runtime laufen.
    pub fn verbinden(
        url: impl Into<String>,
        konfig: TransportKonfiguration,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (ausgang_tx, ausgang_rx) = mpsc::unbounded_channel();
        let (ereignis_tx, ereignis_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let verbunden = Arc::new(AtomicBool::new(false));
        let max_nachricht_bytes = konfig.max_nachricht_bytes;

        tokio::spawn(verbindungs_schleife(
            url.into(),
            konfig,
            ausgang_rx,
            ereignis_tx,
            shutdown_rx,
            Arc::clone(&verbunden),
        ));

        let transport = Self {
            ausgang: ausgang_tx,
            verbunden,
            shutdown_tx,
            max_nachricht_bytes,
        };
        (transport, ereignis_rx)
    }
}

impl Transport for WsTransport {
    fn senden(&self, daten: String) -> TransportResult<()> {
        if !self.ist_verbunden() {
            return Err(TransportError::Geschlossen);
        }
        if daten.len() > self.max_nachricht_bytes {
            return Err(TransportError::ZuGross {
                groesse: daten.len(),
                maximum: self.max_nachricht_bytes,
            });
        }
        self.ausgang
            .send(daten)
            .map_err(|_| TransportError::Geschlossen)
    }

    fn schliessen(&self) {
        tracing::debug!("Transport wird geschlossen");
        let _ = self.shutdown_tx.send(true);
    }

    fn ist_verbunden(&self) -> bool {
        self.verbunden.load(Ordering::SeqCst)
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

// ---------------------------------------------------------------------------
// Verbindungs-Task
// ---------------------------------------------------------------------------

fn ws_konfiguration(konfig: &TransportKonfiguration) -> WebSocketConfig {
    let mut ws = WebSocketConfig::default();
    ws.max_message_size = Some(konfig.max_nachricht_bytes);
    ws
}

async fn verbindungs_schleife(
    url: String,
    konfig: TransportKonfiguration,
    mut ausgang_rx: mpsc::UnboundedReceiver<String>,
    ereignisse: mpsc::UnboundedSender<TransportEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
    verbunden: Arc<AtomicBool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        tracing::debug!(url = %url, "Verbinde mit Relay");
        let ende =
            match connect_async_with_config(url.as_str(), Some(ws_konfiguration(&konfig)), false)
                .await
            {
                Ok((stream, _antwort)) => {
                    // Reste aus einer frueheren Verbindung verwerfen
                    while ausgang_rx.try_recv().is_ok() {}

                    verbunden.store(true, Ordering::SeqCst);
                    tracing::info!(url = %url, "Mit Relay verbunden");
                    let _ = ereignisse.send(TransportEvent::Verbunden);

                    let ende = verbindung_betreiben(
                        stream,
                        &mut ausgang_rx,
                        &ereignisse,
                        &mut shutdown_rx,
                    )
                    .await;
                    verbunden.store(false, Ordering::SeqCst);
                    ende
                }
                Err(e) => {
                    tracing::warn!(url = %url, fehler = %e, "Verbindung zum Relay fehlgeschlagen");
                    Verbindungsende::Abnormal(None)
                }
            };

        match ende {
            Verbindungsende::Normal(grund) => {
                tracing::info!(grund = ?grund, "Verbindung regulaer beendet");
                let _ = ereignisse.send(TransportEvent::Getrennt { grund });
                break;
            }
            Verbindungsende::Abnormal(grund) => {
                tracing::warn!(grund = ?grund, "Verbindung abgebrochen");
                let _ = ereignisse.send(TransportEvent::Getrennt { grund });

                let Some(verzoegerung) = konfig.wiederverbindung() else {
                    break;
                };
                if *shutdown_rx.borrow() {
                    break;
                }
                let _ = ereignisse.send(TransportEvent::Wiederverbinden { verzoegerung });
                tokio::select! {
                    _ = tokio::time::sleep(verzoegerung) => {}
                    _ = shutdown_rx.changed() => break,
                }
            }
        }
    }
    tracing::debug!(url = %url, "Verbindungs-Task beendet");
}

/// Betreibt eine offene Verbindung bis zu ihrem Ende
async fn verbindung_betreiben<S>(
    stream: WebSocketStream<S>,
    ausgang_rx: &mut mpsc::UnboundedReceiver<String>,
    ereignisse: &mpsc::UnboundedSender<TransportEvent>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> Verbindungsende
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut schreiber, mut leser) = stream.split();

    loop {
        tokio::select! {
            eingang = leser.next() => {
                match eingang {
                    Some(Ok(Message::Text(text))) => {
                        let _ = ereignisse.send(TransportEvent::Nachricht(text));
                    }
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => {
                            let _ = ereignisse.send(TransportEvent::Nachricht(text));
                        }
                        Err(_) => tracing::debug!("Binaer-Nachricht ohne UTF-8 verworfen"),
                    },
                    Some(Ok(Message::Close(frame))) => return schliess_grund(frame),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(fehler = %e, "WebSocket-Lesefehler");
                        return Verbindungsende::Abnormal(None);
                    }
                    None => return Verbindungsende::Abnormal(None),
                }
            }

            Some(text) = ausgang_rx.recv() => {
                if let Err(e) = schreiber.send(Message::Text(text)).await {
                    tracing::warn!(fehler = %e, "WebSocket-Senden fehlgeschlagen");
                    return Verbindungsende::Abnormal(None);
                }
            }

            _ = shutdown_rx.changed() => {
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: Cow::Borrowed(""),
                };
                let _ = schreiber.send(Message::Close(Some(frame))).await;
                return Verbindungsende::Normal(None);
            }
        }
    }
}

/// Code 1000 und ein Close ohne Status sind regulaer, alles andere nicht
fn schliess_grund(frame: Option<CloseFrame<'_>>) -> Verbindungsende {
    let Some(frame) = frame else {
        return Verbindungsende::Normal(None);
    };
    let grund = (!frame.reason.is_empty()).then(|| frame.reason.to_string());
    if frame.code == CloseCode::Normal {
        Verbindungsende::Normal(grund)
    } else {
        Verbindungsende::Abnormal(grund)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
