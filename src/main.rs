// Gig catalog refresh job
// Takes no arguments: everything comes from the environment (see config.rs).
//
//   GIG_ARTIST="Example Band" BANDSINTOWN_APP_ID=... gig-catalog
//
// Exit code 0 on success (even if every source came back empty),
// 1 if configuration is invalid or the output could not be written.

use anyhow::Result;
use gig_catalog::{Config, Pipeline, RunSummary};
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    match run() {
        Ok(summary) => print_summary(&summary),
        Err(err) => {
            tracing::error!(error = %format!("{:#}", err), "catalog refresh failed");
            eprintln!("❌ Catalog refresh failed: {:#}", err);
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<RunSummary> {
    let config = Config::from_env()?;

    println!("🎸 Gig Catalog v{} - {}", gig_catalog::VERSION, config.artist);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let pipeline = Pipeline::from_config(&config)?;
    println!("\n🌐 Fetching from {} sources...", config.sources.len());

    pipeline.run()
}

fn print_summary(summary: &RunSummary) {
    for (source, count) in &summary.per_source {
        println!("✓ {:<14} {} listings", source, count);
    }

    println!("\n📚 Catalog (today = {})", summary.catalog.today);
    println!("✓ {} events", summary.total());
    println!("✓ {} upcoming", summary.upcoming());
    println!("✓ {} past", summary.past());

    println!("\n💾 Written:");
    for file in &summary.manifest.files {
        println!("✓ {:<14} {:>4} events  {:>7} bytes", file.name, file.events, file.bytes);
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Refresh complete (run {})", summary.run_id);
}
