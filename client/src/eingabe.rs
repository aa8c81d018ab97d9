//! Zeilenweise Eingabe des Terminals

/// Eine geparste Eingabezeile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eingabe {
    Leer,
    /// Chat-Text an alle (ueber den Broadcast-Schluessel)
    Text(String),
    /// `/direkt <text>` – an jeden akzeptierten Peer einzeln
    Direkt(String),
    /// `/nick <handle>`
    Nick(String),
    /// `/peers`
    Peers,
    /// `/quit`
    Beenden,
    Unbekannt(String),
}

impl Eingabe {
    pub fn parsen(zeile: &str) -> Self {
        let zeile = zeile.trim();
        if zeile.is_empty() {
            return Eingabe::Leer;
        }
        let Some(befehl) = zeile.strip_prefix('/') else {
            return Eingabe::Text(zeile.to_string());
        };

        let (name, rest) = match befehl.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (befehl, ""),
        };
        match (name, rest) {
            ("nick", handle) if !handle.is_empty() => Eingabe::Nick(handle.to_string()),
            ("direkt", text) if !text.is_empty() => Eingabe::Direkt(text.to_string()),
            ("peers", _) => Eingabe::Peers,
            ("quit", _) => Eingabe::Beenden,
            _ => Eingabe::Unbekannt(zeile.to_string()),
        }
    }
}
