//! Sources of shot data.
//!
//! A [ShotProvider] returns every shot a player has taken, across all seasons, as a raw
//! [ShotTable]. [Understat] is the only implementation; it reads the shot data embedded in
//! a player's page on the Understat site.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::table::ShotTable;

pub const UNDERSTAT_BASE_URL: &str = "https://understat.com";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ProviderError::InvalidPlayerId(s.into()));
        }
        Ok(Self(s.into()))
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("player ID '{0}' should consist of digits only")]
    InvalidPlayerId(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no shot data found for player {0}")]
    MissingShotData(PlayerId),

    #[error("undecodable shot data: {0}")]
    Undecodable(String),

    #[error("no shots recorded for player {0}")]
    NoShots(PlayerId),
}

#[allow(async_fn_in_trait)]
pub trait ShotProvider {
    /// Fetches every shot taken by `player_id`, across all seasons.
    async fn get_shot_events(&self, player_id: &PlayerId) -> Result<ShotTable, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct Understat {
    client: reqwest::Client,
    base_url: String,
}

impl Default for Understat {
    fn default() -> Self {
        Self::with_base_url(UNDERSTAT_BASE_URL)
    }
}

impl Understat {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn player_url(&self, player_id: &PlayerId) -> String {
        format!("{}/player/{player_id}", self.base_url.trim_end_matches('/'))
    }
}

impl ShotProvider for Understat {
    async fn get_shot_events(&self, player_id: &PlayerId) -> Result<ShotTable, ProviderError> {
        let url = self.player_url(player_id);
        debug!("fetching {url}");
        let page = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let table = parse_player_page(&page)?.ok_or(ProviderError::MissingShotData(player_id.clone()))?;
        if table.is_empty() {
            return Err(ProviderError::NoShots(player_id.clone()));
        }
        debug!("fetched {} shots for player {player_id}", table.len());
        Ok(table)
    }
}

/// Extracts the shot table embedded in a player page, or `None` if the page carries no shot
/// data. The data is a JSON array of shot objects, passed to `JSON.parse` as a string literal
/// with its characters `\xNN`-escaped.
pub fn parse_player_page(page: &str) -> Result<Option<ShotTable>, ProviderError> {
    let pattern = Regex::new(r"shotsData\s*=\s*JSON\.parse\('([^']*)'\)")
        .map_err(|err| ProviderError::Undecodable(err.to_string()))?;
    let Some(captures) = pattern.captures(page) else {
        return Ok(None);
    };
    let json = unescape_literal(&captures[1])?;
    let records: Vec<Map<String, Value>> =
        serde_json::from_str(&json).map_err(|err| ProviderError::Undecodable(err.to_string()))?;
    Ok(Some(ShotTable::from_json_records(&records)))
}

/// Resolves the escape sequences of a single-quoted JavaScript string literal.
fn unescape_literal(literal: &str) -> Result<String, ProviderError> {
    let mut bytes = Vec::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(char) = chars.next() {
        if char != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(char.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('x') => {
                let hex = chars.by_ref().take(2).collect::<String>();
                let bad_escape = || ProviderError::Undecodable(format!("bad escape '\\x{hex}'"));
                // from_str_radix alone would accept one digit or a leading sign
                if hex.len() != 2 || !hex.chars().all(|char| char.is_ascii_hexdigit()) {
                    return Err(bad_escape());
                }
                let byte = u8::from_str_radix(&hex, 16).map_err(|_| bad_escape())?;
                bytes.push(byte);
            }
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some(other @ ('\\' | '\'' | '"' | '/')) => bytes.push(other as u8),
            Some(other) => {
                return Err(ProviderError::Undecodable(format!("bad escape '\\{other}'")));
            }
            None => return Err(ProviderError::Undecodable("dangling escape".into())),
        }
    }
    String::from_utf8(bytes).map_err(|err| ProviderError::Undecodable(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn escape(json: &str) -> String {
        json.bytes()
            .map(|byte| {
                if byte.is_ascii_alphanumeric() {
                    (byte as char).to_string()
                } else {
                    format!("\\x{byte:02X}")
                }
            })
            .collect()
    }

    fn page_with(json: &str) -> String {
        format!(
            "<html><script>\n\tvar groupsData = JSON.parse('\\x7B\\x7D');\n\tvar shotsData \t= JSON.parse('{}');\n</script></html>",
            escape(json)
        )
    }

    #[test]
    fn player_id() {
        assert_eq!("8260", PlayerId::from_str(" 8260 ").unwrap().as_str());
        assert_eq!(
            "player ID 'kane' should consist of digits only",
            PlayerId::from_str("kane").unwrap_err().to_string()
        );
        assert!(PlayerId::from_str("").is_err());
    }

    #[test]
    fn player_url() {
        let understat = Understat::with_base_url("http://localhost:8080/");
        let player_id = PlayerId::from_str("647").unwrap();
        assert_eq!("http://localhost:8080/player/647", understat.player_url(&player_id));
        assert_eq!(
            "https://understat.com/player/647",
            Understat::default().player_url(&player_id)
        );
    }

    #[test]
    fn unescape() {
        assert_eq!("[{\"a\":1}]", unescape_literal(r"\x5B\x7B\x22a\x22\x3A1\x7D\x5D").unwrap());
        assert_eq!("it's", unescape_literal(r"it\'s").unwrap());
        assert_eq!("Müller", unescape_literal(r"M\xC3\xBCller").unwrap());
        assert!(unescape_literal(r"\xZZ").is_err());
        assert!(unescape_literal(r"\x4").is_err());
        assert!(unescape_literal(r"\x+F").is_err());
        assert_eq!("A1", unescape_literal(r"\x411").unwrap());
        assert!(unescape_literal("\\").is_err());
    }

    #[test]
    fn parse_page() {
        let json = r#"[
            {"id":"1","minute":"12","result":"Goal","X":"0.885","Y":"0.5","xG":"0.45","player":"Harry Kane","season":"2023"},
            {"id":"2","minute":"40","result":"MissedShot","X":"0.7","Y":"0.4","xG":"0.1","player":"Harry Kane","season":"2022"}
        ]"#;
        let table = parse_player_page(&page_with(json)).unwrap().unwrap();
        assert_eq!(2, table.len());
        assert_eq!(
            vec!["id", "minute", "result", "X", "Y", "xG", "player", "season"],
            table.headers()
        );
        assert_eq!(Some("Harry Kane"), table.first_value(Column::Player));
        let events = table.to_events().unwrap();
        assert_eq!(0.885, events[0].x);
        assert_eq!("2022", events[1].season);
    }

    #[test]
    fn parse_page_without_shots() {
        assert!(parse_player_page("<html></html>").unwrap().is_none());
    }

    #[test]
    fn parse_page_with_broken_json() {
        let err = parse_player_page(&page_with("[{\"id\":")).unwrap_err();
        assert!(matches!(err, ProviderError::Undecodable(_)));
    }
}
