// 🔄 Pipeline - one full catalog refresh
//
// collect (concurrent, per source) → cluster/merge → partition → write
//
// Source failures never reach this level; only output failures do.

use crate::catalog::{build_catalog, partition, today_iso, Catalog};
use crate::config::Config;
use crate::output::{write_catalog, OutputManifest};
use crate::record::Record;
use crate::sources::{build_source, collect_records, EventSource};
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

// ============================================================================
// RUN SUMMARY
// ============================================================================

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,

    /// Records received from all sources, before clustering
    pub records_in: usize,

    /// (source code, records contributed), in fetch order
    pub per_source: Vec<(String, usize)>,

    pub catalog: Catalog,
    pub manifest: OutputManifest,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.catalog.all.len()
    }

    pub fn upcoming(&self) -> usize {
        self.catalog.upcoming.len()
    }

    pub fn past(&self) -> usize {
        self.catalog.past.len()
    }

    pub fn summary(&self) -> String {
        let sources: Vec<String> = self
            .per_source
            .iter()
            .map(|(code, count)| format!("{}={}", code, count))
            .collect();
        format!(
            "{} listings [{}] → {}",
            self.records_in,
            sources.join(", "),
            self.catalog.summary()
        )
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    sources: Vec<Box<dyn EventSource>>,
    output_dir: PathBuf,
    today: String,
}

impl Pipeline {
    pub fn new(sources: Vec<Box<dyn EventSource>>, output_dir: impl Into<PathBuf>) -> Self {
        Pipeline {
            sources,
            output_dir: output_dir.into(),
            today: today_iso(),
        }
    }

    /// Build every configured adapter, in configured order.
    pub fn from_config(config: &Config) -> Result<Self> {
        let sources = config
            .sources
            .iter()
            .map(|kind| build_source(*kind, config))
            .collect::<Result<Vec<_>>>()?;

        Ok(Pipeline::new(sources, config.output_dir.clone()))
    }

    /// Builder pattern: pin the partition date
    pub fn with_today(mut self, today: impl Into<String>) -> Self {
        self.today = today.into();
        self
    }

    pub fn today(&self) -> &str {
        &self.today
    }

    /// Fetch from all sources and build the partitioned catalog without
    /// writing anything.
    pub fn assemble(&self) -> (Vec<(String, usize)>, Catalog) {
        let batches = collect_records(&self.sources);

        let per_source: Vec<(String, usize)> = self
            .sources
            .iter()
            .zip(&batches)
            .map(|(source, batch)| (source.kind().code().to_string(), batch.len()))
            .collect();

        let records: Vec<Record> = batches.into_iter().flatten().collect();
        let events = build_catalog(&records);
        (per_source, partition(events, &self.today))
    }

    /// Full refresh: assemble, then write all artifacts.
    pub fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, sources = self.sources.len(), today = %self.today, "starting catalog refresh");

        let (per_source, catalog) = self.assemble();
        let records_in: usize = per_source.iter().map(|(_, count)| count).sum();

        let manifest = write_catalog(&self.output_dir, &catalog, run_id)?;
        info!(
            run_id = %run_id,
            records_in,
            events = catalog.all.len(),
            upcoming = catalog.upcoming.len(),
            past = catalog.past.len(),
            output = %self.output_dir.display(),
            "catalog written"
        );

        Ok(RunSummary {
            run_id,
            records_in,
            per_source,
            catalog,
            manifest,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceKind;
    use tempfile::tempdir;

    struct StaticSource {
        kind: SourceKind,
        records: Vec<Record>,
    }

    impl EventSource for StaticSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        fn fetch(&self) -> Result<Vec<Record>> {
            Ok(self.records.clone())
        }
    }

    #[test]
    fn test_from_config_builds_sources_in_order() {
        let mut config = Config::new("Example Band");
        config.sources = vec![SourceKind::Manual, SourceKind::Songkick];

        let pipeline = Pipeline::from_config(&config).unwrap();
        let kinds: Vec<SourceKind> = pipeline.sources.iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec![SourceKind::Manual, SourceKind::Songkick]);
        assert_eq!(pipeline.today().len(), 10);
    }

    #[test]
    fn test_run_counts_per_source() {
        let dir = tempdir().unwrap();
        let sources: Vec<Box<dyn EventSource>> = vec![
            Box::new(StaticSource {
                kind: SourceKind::Bandsintown,
                records: vec![
                    Record::new("bandsintown", "2024-07-01", "London", "The Garage"),
                    Record::new("bandsintown", "2024-05-01", "Leeds", "Brudenell"),
                ],
            }),
            Box::new(StaticSource {
                kind: SourceKind::Songkick,
                records: vec![Record::new("songkick", "2024-07-01", "London", "The Garage")],
            }),
        ];

        let summary = Pipeline::new(sources, dir.path())
            .with_today("2024-06-15")
            .run()
            .unwrap();

        assert_eq!(summary.records_in, 3);
        assert_eq!(
            summary.per_source,
            vec![("bandsintown".to_string(), 2), ("songkick".to_string(), 1)]
        );
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.upcoming(), 1);
        assert_eq!(summary.past(), 1);
        assert_eq!(summary.manifest.today, "2024-06-15");
        assert!(summary.summary().contains("bandsintown=2"));
    }
}
