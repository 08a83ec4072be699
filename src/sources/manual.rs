// Manual listings adapter
// Hand-maintained CSV for shows that no API lists (private bookings, festivals
// announced before the ticketing partner is live, ...).
//
// CSV format (header row required):
//   date,time,city,venue,title,supports,status,ticket_label,ticket_url
//   2024-07-01,19:30,London,The Garage,,Support Act;Second Act,on_sale,Box Office,https://...

use super::{clock_time, is_headliner, split_timestamp, EventSource, SourceKind};
use crate::record::{Record, Status};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize)]
struct ManualRow {
    date: String,
    #[serde(default)]
    time: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    venue: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    supports: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    ticket_label: String,
    #[serde(default)]
    ticket_url: String,
}

pub struct ManualSource {
    artist: String,
    path: Option<PathBuf>,
}

impl ManualSource {
    pub fn new(artist: &str, path: Option<PathBuf>) -> Self {
        ManualSource {
            artist: artist.to_string(),
            path,
        }
    }
}

impl EventSource for ManualSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Manual
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| anyhow!("GIG_MANUAL_CSV is not set"))?;
        load_manual_csv(path, &self.artist)
    }
}

/// Load hand-maintained listings. Malformed rows and rows with an
/// unparseable date are skipped; only a missing or unreadable file fails.
pub fn load_manual_csv(path: &Path, artist: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open manual listings: {}", path.display()))?;

    let mut records = Vec::new();

    for (line_num, result) in reader.deserialize::<ManualRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                warn!(source = "manual", line = line_num + 2, error = %err, "skipping malformed row");
                continue;
            }
        };

        let Some((date, stamp_time)) = split_timestamp(&row.date) else {
            warn!(source = "manual", line = line_num + 2, date = %row.date, "skipping row with unparseable date");
            continue;
        };

        let label = if row.ticket_label.is_empty() {
            SourceKind::Manual.name().to_string()
        } else {
            row.ticket_label
        };

        let mut record = Record::new(SourceKind::Manual.code(), date, row.city, row.venue)
            .with_title(row.title)
            .with_status(Status::from_code(&row.status))
            .with_ticket(label, row.ticket_url);

        if let Some(time) = clock_time(&row.time).or(stamp_time) {
            record = record.with_time(time);
        }

        for name in row.supports.split(';').map(str::trim) {
            if !is_headliner(name, artist) {
                record = record.with_support(name);
            }
        }

        records.push(record);
    }

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================
