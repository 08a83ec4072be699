// 💾 Output - write the catalog as three JSON documents plus a manifest
//
//   events.json    every canonical event, ascending by date
//   upcoming.json  date >= today, ascending
//   past.json      date < today, descending
//   manifest.json  run id, timestamps, per-file event count / size / sha256
//
// Any failure here is fatal for the run.

use crate::catalog::Catalog;
use crate::record::CanonicalEvent;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub const EVENTS_FILE: &str = "events.json";
pub const UPCOMING_FILE: &str = "upcoming.json";
pub const PAST_FILE: &str = "past.json";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub name: String,
    pub events: usize,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputManifest {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub today: String,
    pub files: Vec<ArtifactEntry>,
}

/// Write all artifacts into `dir` (created if missing) and return the manifest.
pub fn write_catalog(dir: &Path, catalog: &Catalog, run_id: Uuid) -> Result<OutputManifest> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let files = vec![
        write_events(dir, EVENTS_FILE, &catalog.all)?,
        write_events(dir, UPCOMING_FILE, &catalog.upcoming)?,
        write_events(dir, PAST_FILE, &catalog.past)?,
    ];

    let manifest = OutputManifest {
        run_id,
        generated_at: Utc::now(),
        today: catalog.today.clone(),
        files,
    };

    let manifest_path = dir.join(MANIFEST_FILE);
    let body = serde_json::to_vec_pretty(&manifest).context("Failed to serialize manifest")?;
    fs::write(&manifest_path, body)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    Ok(manifest)
}

fn write_events(dir: &Path, name: &str, events: &[CanonicalEvent]) -> Result<ArtifactEntry> {
    let path = dir.join(name);
    let mut body =
        serde_json::to_vec_pretty(events).with_context(|| format!("Failed to serialize {}", name))?;
    body.push(b'\n');

    fs::write(&path, &body).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(ArtifactEntry {
        name: name.to_string(),
        events: events.len(),
        bytes: body.len() as u64,
        sha256: format!("{:x}", Sha256::digest(&body)),
    })
}

/// Read back one artifact (used by tests and by downstream tooling).
pub fn read_events(path: &Path) -> Result<Vec<CanonicalEvent>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

// ============================================================================
// TESTS
// ============================================================================
