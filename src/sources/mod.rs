// 🌐 Event Sources - one adapter per ticketing/listing API
//
// Every adapter maps its upstream payload into `Record`s. The core only sees
// the output of `fetch_or_empty`, which never fails: a broken source simply
// contributes nothing to this run.

pub mod bandsintown;
pub mod http;
pub mod manual;
pub mod songkick;
pub mod ticketmaster;

use crate::config::Config;
use crate::normalize::normalize;
use crate::record::Record;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

pub use bandsintown::BandsintownSource;
pub use manual::ManualSource;
pub use songkick::SongkickSource;
pub use ticketmaster::TicketmasterSource;

// ============================================================================
// SOURCE KIND
// ============================================================================

/// SourceKind - which upstream a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Bandsintown,
    Songkick,
    Ticketmaster,
    Manual,
}

impl SourceKind {
    /// Default fetch (and therefore clustering) order
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Bandsintown,
        SourceKind::Songkick,
        SourceKind::Ticketmaster,
        SourceKind::Manual,
    ];

    /// Human-readable name, also used as the ticket label
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Bandsintown => "Bandsintown",
            SourceKind::Songkick => "Songkick",
            SourceKind::Ticketmaster => "Ticketmaster",
            SourceKind::Manual => "Box Office",
        }
    }

    /// Identifier written into `Record::sources`
    pub fn code(&self) -> &'static str {
        match self {
            SourceKind::Bandsintown => "bandsintown",
            SourceKind::Songkick => "songkick",
            SourceKind::Ticketmaster => "ticketmaster",
            SourceKind::Manual => "manual",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.code() == wanted)
            .ok_or_else(|| anyhow::anyhow!("Unknown event source: {}", s.trim()))
    }
}

// ============================================================================
// EVENT SOURCE CAPABILITY
// ============================================================================

/// EventSource - produce the listings one upstream knows about.
///
/// New sources are added by implementing this trait; nothing in the
/// matcher, merger, or catalog builder changes.
pub trait EventSource: Send + Sync {
    /// Which upstream this adapter talks to
    fn kind(&self) -> SourceKind;

    /// Fetch and map listings. May fail (credentials, network, payload).
    fn fetch(&self) -> Result<Vec<Record>>;

    /// Fetch, degrading any failure to an empty contribution.
    fn fetch_or_empty(&self) -> Vec<Record> {
        match self.fetch() {
            Ok(records) => {
                info!(source = %self.kind(), count = records.len(), "fetched listings");
                records
            }
            Err(err) => {
                warn!(source = %self.kind(), error = %format!("{:#}", err), "source failed, contributing no listings");
                Vec::new()
            }
        }
    }
}

/// Build the adapter for a source kind from the run configuration.
///
/// Missing credentials are not an error here; the adapter reports them when
/// fetched, which degrades that source to zero listings.
pub fn build_source(kind: SourceKind, config: &Config) -> Result<Box<dyn EventSource>> {
    let source: Box<dyn EventSource> = match kind {
        SourceKind::Bandsintown => Box::new(BandsintownSource::new(
            &config.artist,
            config.bandsintown_app_id.clone(),
            config.http_timeout_secs,
        )?),
        SourceKind::Songkick => Box::new(SongkickSource::new(
            &config.artist,
            config.songkick_api_key.clone(),
            config.songkick_artist_id.clone(),
            config.http_timeout_secs,
        )?),
        SourceKind::Ticketmaster => Box::new(TicketmasterSource::new(
            &config.artist,
            config.ticketmaster_api_key.clone(),
            config.http_timeout_secs,
        )?),
        SourceKind::Manual => Box::new(ManualSource::new(&config.artist, config.manual_csv.clone())),
    };
    Ok(source)
}

/// Run every source concurrently. Returns one batch per source, in the order
/// the sources were given (NOT completion order), so clustering input is
/// fixed for a given configuration.
pub fn collect_records(sources: &[Box<dyn EventSource>]) -> Vec<Vec<Record>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| (source.kind(), scope.spawn(move || source.fetch_or_empty())))
            .collect();

        handles
            .into_iter()
            .map(|(kind, handle)| {
                handle.join().unwrap_or_else(|_| {
                    warn!(source = %kind, "source panicked, contributing no listings");
                    Vec::new()
                })
            })
            .collect()
    })
}

// ============================================================================
// MAPPING HELPERS (shared by adapters)
// ============================================================================

/// Split an upstream timestamp into ISO date and optional `HH:MM`.
///
/// Components are taken as written: an offset, if present, is ignored rather
/// than converted. RFC 3339 and naive `YYYY-MM-DDTHH:MM[:SS]` parse fully;
/// anything else is truncated, keeping the leading `YYYY-MM-DD` if it is a
/// real date and the `HH:MM` after it if one follows.
pub fn split_timestamp(raw: &str) -> Option<(String, Option<String>)> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        let local = dt.naive_local();
        return Some((
            local.format("%Y-%m-%d").to_string(),
            Some(local.format("%H:%M").to_string()),
        ));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some((
                dt.format("%Y-%m-%d").to_string(),
                Some(dt.format("%H:%M").to_string()),
            ));
        }
    }

    let date = NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()?;
    let time = raw
        .get(11..16)
        .filter(|_| matches!(raw.as_bytes().get(10), Some(b'T' | b't' | b' ')))
        .and_then(|hm| NaiveTime::parse_from_str(hm, "%H:%M").ok())
        .map(|t| t.format("%H:%M").to_string());

    Some((date.format("%Y-%m-%d").to_string(), time))
}

/// Normalize an upstream clock time (`19:30:00`, `19:30`) to `HH:MM`.
pub fn clock_time(raw: &str) -> Option<String> {
    let raw = raw.trim();
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .map(|t| t.format("%H:%M").to_string())
}

/// True when a lineup entry is the headlining artist itself.
pub fn is_headliner(name: &str, artist: &str) -> bool {
    normalize(name) == normalize(artist)
}

// ============================================================================
// TESTS
// ============================================================================
