// ⚙️ Run Configuration - everything comes from the environment
// The job takes no flags; credentials and the artist name are per-deployment.

use crate::sources::SourceKind;
use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "./data";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    /// Performing entity whose listings are aggregated
    pub artist: String,

    /// Fetch order; also the clustering input order
    pub sources: Vec<SourceKind>,

    /// Directory receiving events.json / upcoming.json / past.json / manifest.json
    pub output_dir: PathBuf,

    pub http_timeout_secs: u64,

    // Credentials: absent → that source contributes nothing
    pub bandsintown_app_id: Option<String>,
    pub songkick_api_key: Option<String>,
    pub songkick_artist_id: Option<String>,
    pub ticketmaster_api_key: Option<String>,
    pub manual_csv: Option<PathBuf>,
}

impl Config {
    /// Config with defaults and no credentials.
    pub fn new(artist: impl Into<String>) -> Self {
        Config {
            artist: artist.into(),
            sources: SourceKind::ALL.to_vec(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            bandsintown_app_id: None,
            songkick_api_key: None,
            songkick_artist_id: None,
            ticketmaster_api_key: None,
            manual_csv: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production).
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let artist = get("GIG_ARTIST").ok_or_else(|| anyhow!("GIG_ARTIST must be set"))?;
        let mut config = Config::new(artist);

        if let Some(order) = get("GIG_SOURCES") {
            config.sources = parse_source_order(&order)?;
        }
        if let Some(dir) = get("GIG_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(timeout) = get("GIG_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = timeout
                .parse()
                .map_err(|_| anyhow!("GIG_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{}'", timeout))?;
        }

        config.bandsintown_app_id = get("BANDSINTOWN_APP_ID");
        config.songkick_api_key = get("SONGKICK_API_KEY");
        config.songkick_artist_id = get("SONGKICK_ARTIST_ID");
        config.ticketmaster_api_key = get("TICKETMASTER_API_KEY");
        config.manual_csv = get("GIG_MANUAL_CSV").map(PathBuf::from);

        Ok(config)
    }
}

/// Parse a comma-separated source order. Duplicates are rejected because a
/// source listed twice would merge with itself.
pub fn parse_source_order(raw: &str) -> Result<Vec<SourceKind>> {
    let mut order = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let kind: SourceKind = name.parse()?;
        if order.contains(&kind) {
            return Err(anyhow!("Source '{}' listed more than once in GIG_SOURCES", name));
        }
        order.push(kind);
    }
    Ok(order)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GIG_ARTIST", "Example Band")])).unwrap();

        assert_eq!(config.artist, "Example Band");
        assert_eq!(config.sources, SourceKind::ALL.to_vec());
        assert_eq!(config.output_dir, PathBuf::from("./data"));
        assert_eq!(config.http_timeout_secs, 20);
        assert!(config.bandsintown_app_id.is_none());
        assert!(config.manual_csv.is_none());
    }

    #[test]
    fn test_missing_artist_is_an_error() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("GIG_ARTIST", "   ")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GIG_ARTIST", "Example Band"),
            ("GIG_SOURCES", "ticketmaster, manual"),
            ("GIG_OUTPUT_DIR", "/srv/site/data"),
            ("GIG_HTTP_TIMEOUT_SECS", "5"),
            ("BANDSINTOWN_APP_ID", "app"),
            ("SONGKICK_API_KEY", ""),
            ("GIG_MANUAL_CSV", "shows.csv"),
        ]))
        .unwrap();

        assert_eq!(config.sources, vec![SourceKind::Ticketmaster, SourceKind::Manual]);
        assert_eq!(config.output_dir, PathBuf::from("/srv/site/data"));
        assert_eq!(config.http_timeout_secs, 5);
        assert_eq!(config.bandsintown_app_id.as_deref(), Some("app"));
        assert!(config.songkick_api_key.is_none());
        assert_eq!(config.manual_csv, Some(PathBuf::from("shows.csv")));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(Config::from_lookup(lookup_from(&[
            ("GIG_ARTIST", "Example Band"),
            ("GIG_SOURCES", "bandsintown,myspace"),
        ]))
        .is_err());

        assert!(Config::from_lookup(lookup_from(&[
            ("GIG_ARTIST", "Example Band"),
            ("GIG_HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .is_err());

        assert!(parse_source_order("songkick,songkick").is_err());
    }
}
