//! whisper-client – Terminal-Client fuer einen Whisper-Raum
//!
//! Liest Zeilen von stdin und sendet sie als Chat-Nachricht an alle
//! akzeptierten Peers. Engine-Ereignisse werden auf stdout ausgegeben.

pub mod anzeige;
pub mod config;
pub mod eingabe;

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use whisper_core::SystemUhr;
use whisper_engine::{sitzung_starten, SitzungsHandle, WhisperEngine};
use whisper_protocol::AnwendungsNachricht;
use whisper_transport::WsTransport;

use config::ClientConfig;
use eingabe::Eingabe;

pub struct Client {
    pub config: ClientConfig,
}

impl Client {
    pub fn neu(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Verbindet mit dem Relay und laeuft bis `/quit`, Ctrl-C oder Ende der Eingabe
    pub async fn starten(self) -> Result<()> {
        let relay = self.config.raum.relay_schluessel()?;
        let ich = self.config.raum.ich(self.config.engine.handle_laenge)?;
        println!("* Identitaet {} als {}", anzeige::kurz(&ich.public_key()), ich.handle);

        let (mut engine, mut ereignisse) =
            WhisperEngine::neu(self.config.engine.clone(), Arc::new(SystemUhr));
        let (transport, transport_rx) =
            WsTransport::verbinden(self.config.raum.relay_url.clone(), self.config.transport.clone());
        engine.verbinden(Box::new(transport), relay, ich);
        let (sitzung, task) = sitzung_starten(engine, transport_rx);

        let mut zeilen = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                ereignis = ereignisse.recv() => match ereignis {
                    Some(ereignis) => {
                        if let Some(text) = anzeige::ereignis_text(&ereignis) {
                            println!("{text}");
                        }
                    }
                    None => break,
                },
                zeile = zeilen.next_line() => match zeile? {
                    Some(zeile) => {
                        if !eingabe_ausfuehren(&sitzung, Eingabe::parsen(&zeile)).await {
                            sitzung.schliessen().await;
                            break;
                        }
                    }
                    None => {
                        sitzung.schliessen().await;
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl-C empfangen, Raum wird verlassen");
                    sitzung.schliessen().await;
                    break;
                }
            }
        }

        task.await?;
        tracing::info!("Client beendet");
        Ok(())
    }
}

/// Fuehrt eine Eingabe aus. `false` beendet den Client.
async fn eingabe_ausfuehren(sitzung: &SitzungsHandle, eingabe: Eingabe) -> bool {
    let ergebnis = match eingabe {
        Eingabe::Leer => Ok(()),
        Eingabe::Text(text) => sitzung.broadcast(AnwendungsNachricht::text(text)).await,
        Eingabe::Direkt(text) => sitzung
            .broadcast_direkt(AnwendungsNachricht::text(text))
            .await
            .map(|anzahl| println!("* An {anzahl} Peers gesendet")),
        Eingabe::Nick(handle) => sitzung.handle_aendern(handle).await,
        Eingabe::Peers => sitzung.peer_liste_anfordern().await,
        Eingabe::Beenden => return false,
        Eingabe::Unbekannt(zeile) => {
            println!("! Unbekannter Befehl: {zeile}");
            Ok(())
        }
    };
    if let Err(e) = ergebnis {
        println!("! {e}");
    }
    true
}
