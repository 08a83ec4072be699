// Gig Catalog - Core Library
// Aggregates an artist's listings from several ticketing sources, reconciles
// duplicates into canonical events and publishes them as static JSON.

pub mod record;     // Record / CanonicalEvent data model
pub mod normalize;  // Comparison keys and slugs
pub mod matcher;    // Same-event decision (exact date + fuzzy city/venue)
pub mod merge;      // Combine two listings of one event
pub mod catalog;    // Clustering, ids, ordering, upcoming/past split
pub mod sources;    // Upstream adapters
pub mod config;     // Environment configuration
pub mod output;     // JSON artifacts + manifest
pub mod pipeline;   // One full refresh

// Re-export commonly used types
pub use record::{CanonicalEvent, Record, Status, Ticket};
pub use normalize::{normalize, slug};
pub use matcher::{levenshtein, same_event, EventMatcher, FieldMatch, MatchOutcome};
pub use merge::{merge, merge_status};
pub use catalog::{build_catalog, event_id, partition, today_iso, Catalog, CatalogBuilder};
pub use sources::{
    build_source, collect_records, EventSource, SourceKind,
    BandsintownSource, ManualSource, SongkickSource, TicketmasterSource,
};
pub use config::Config;
pub use output::{write_catalog, ArtifactEntry, OutputManifest};
pub use pipeline::{Pipeline, RunSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
