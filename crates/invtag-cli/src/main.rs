//! invtag: backfill inventory tags via /api/inventory.
//!
//! Lists inventory records, infers canonical tags for each one and patches
//! records whose tags differ. `--dry-run` previews without writing.
//!
//! Exit status is 0 for any run that got past the listing (per-record failures
//! included) and 1 when the listing fails or the configuration is invalid.

mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use invtag_client::{ClientConfig, HttpRecordStore};
use invtag_core::defaults::{BASE_URL, LIST_LIMIT, REQUEST_TIMEOUT_SECS, SYNC_CONCURRENCY};
use invtag_core::TaggingProfile;
use invtag_sync::{SyncDriver, SyncOptions};

#[derive(Parser, Debug)]
#[command(name = "invtag")]
#[command(author, version, about = "Backfill inventory tags via /api/inventory")]
struct Cli {
    /// Base URL of the inventory service
    #[arg(long, env = "INVTAG_BASE_URL", default_value = BASE_URL)]
    base_url: String,

    /// Max inventory items to scan
    #[arg(long, default_value_t = LIST_LIMIT)]
    limit: usize,

    /// Preview changes without writing
    #[arg(long)]
    dry_run: bool,

    /// Only update items with no existing tags
    #[arg(long)]
    only_missing: bool,

    /// Items processed in parallel (1 = sequential)
    #[arg(long, default_value_t = SYNC_CONCURRENCY)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "INVTAG_TIMEOUT_SECS", default_value_t = REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Stop starting new items after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// TOML file with stop words, synonyms and rules
    #[arg(long, env = "INVTAG_VOCABULARY")]
    vocabulary: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn sync_options(&self) -> SyncOptions {
        let options = SyncOptions::default()
            .with_limit(self.limit)
            .with_dry_run(self.dry_run)
            .with_only_missing(self.only_missing)
            .with_concurrency(self.concurrency);

        match self.deadline_secs {
            Some(secs) => options.with_deadline(Duration::from_secs(secs)),
            None => options,
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .with_timeout_secs(self.timeout_secs)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env must be loaded before clap reads env fallbacks
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = logging::init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let profile = match &cli.vocabulary {
        Some(path) => TaggingProfile::from_file(path)
            .with_context(|| format!("Failed to load vocabulary from {}", path.display()))?,
        None => TaggingProfile::default(),
    };
    let inferencer = Arc::new(profile.into_inferencer());

    let store = Arc::new(HttpRecordStore::new(cli.client_config())?);
    let driver = SyncDriver::new(store, inferencer);
    let options = cli.sync_options();

    info!(
        base_url = %cli.base_url,
        limit = options.limit,
        dry_run = options.dry_run,
        only_missing = options.only_missing,
        "Starting tag backfill"
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight updates");
            interrupt.cancel();
        }
    });

    let report = driver.run_with_cancel(&options, cancel).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::render_text(&report));
    }

    Ok(())
}
