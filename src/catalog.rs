// 📚 Catalog Builder - cluster, merge, identify, sort, partition
//
// Clustering is greedy and order-dependent: each record joins the FIRST open
// cluster whose head matches it, or opens a new cluster. Clusters are never
// split or re-assigned afterwards. Because matching is not transitive, a
// different input order can produce a different partition; the input order
// is the configured source order, so a given run is deterministic.

use crate::matcher::EventMatcher;
use crate::merge::merge;
use crate::normalize::slug;
use crate::record::{CanonicalEvent, Record};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// CATALOG
// ============================================================================

/// Full catalog plus its upcoming/past partitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Every canonical event, ascending by date
    pub all: Vec<CanonicalEvent>,

    /// `date >= today`, ascending
    pub upcoming: Vec<CanonicalEvent>,

    /// `date < today`, descending
    pub past: Vec<CanonicalEvent>,

    /// The ISO date used as the partition boundary
    pub today: String,
}

impl Catalog {
    pub fn summary(&self) -> String {
        format!(
            "{} events ({} upcoming, {} past) as of {}",
            self.all.len(),
            self.upcoming.len(),
            self.past.len(),
            self.today
        )
    }
}

// ============================================================================
// CATALOG BUILDER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    pub matcher: EventMatcher,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        CatalogBuilder {
            matcher: EventMatcher::new(),
        }
    }

    pub fn with_matcher(matcher: EventMatcher) -> Self {
        CatalogBuilder { matcher }
    }

    /// Greedy first-match clustering. Returns one merged head per cluster,
    /// in cluster-creation order.
    pub fn cluster(&self, records: &[Record]) -> Vec<Record> {
        records.iter().fold(Vec::new(), |mut clusters: Vec<Record>, incoming| {
            let slot = clusters
                .iter()
                .position(|head| self.matcher.same_event(head, incoming));

            match slot {
                Some(index) => {
                    debug!(
                        date = %incoming.date,
                        venue = %incoming.venue,
                        sources = ?incoming.sources,
                        cluster = index,
                        reason = %self.matcher.explain(&clusters[index], incoming).reason(),
                        "absorbing listing into existing cluster"
                    );
                    clusters[index] = merge(&clusters[index], incoming);
                }
                None => clusters.push(incoming.clone()),
            }

            clusters
        })
    }

    /// Cluster, assign identifiers, sort ascending by date.
    ///
    /// The sort is stable, so events sharing a date keep cluster order.
    pub fn build(&self, records: &[Record]) -> Vec<CanonicalEvent> {
        let mut events: Vec<CanonicalEvent> = self
            .cluster(records)
            .into_iter()
            .map(|mut event| {
                event.id = event_id(&event);
                event
            })
            .collect();

        events.sort_by(|a, b| a.date.cmp(&b.date));
        events
    }
}

/// `date-city-venue` with city and venue reduced to hyphenated comparison keys.
pub fn event_id(record: &Record) -> String {
    format!("{}-{}-{}", record.date, slug(&record.city), slug(&record.venue))
}

/// Build the canonical, date-sorted event list with the default matcher.
pub fn build_catalog(records: &[Record]) -> Vec<CanonicalEvent> {
    CatalogBuilder::new().build(records)
}

/// Split date-sorted events at `today` (inclusive on the upcoming side).
/// Past events come back most recent first.
pub fn partition(events: Vec<CanonicalEvent>, today: &str) -> Catalog {
    let (upcoming, mut past): (Vec<_>, Vec<_>) = events
        .iter()
        .cloned()
        .partition(|event| event.is_upcoming(today));
    past.reverse();

    Catalog {
        all: events,
        upcoming,
        past,
        today: today.to_string(),
    }
}

/// Current UTC calendar date as `YYYY-MM-DD`.
///
/// UTC, not the host's local date: near midnight an event dated "today" in
/// the host timezone may already be classified past (or vice versa).
pub fn today_iso() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

// ============================================================================
// TESTS
// ============================================================================
