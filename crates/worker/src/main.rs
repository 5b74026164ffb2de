use anyhow::Result;
use clap::Parser;
use feed_core::config::SyncSettings;
use tracing::{error, info, warn};

mod client;
mod jobs;

use crate::client::QiitaClient;

/// Fetch Qiita:Team items and store the rendered Atom feed.
#[derive(Debug, Parser)]
#[command(name = "worker")]
struct Args {
    /// Number of items to request; overrides $FEED_ITEM_NUM.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    per_page: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let args = Args::parse();
    let settings = SyncSettings::from_env()?;
    let per_page = args.per_page.or(settings.per_page);

    let client = QiitaClient::new(&settings.base_url, &settings.access_token)?;
    let store = db::open(&settings.storage_url).await?;

    info!(team = settings.channel.team(), "sync starting");
    let result = jobs::sync::run(&client, store.as_ref(), &settings.channel, per_page).await;

    if let Err(err) = store.close().await {
        warn!(error = %err, "failed to close store");
    }

    match result {
        Ok(entries) => {
            info!(entries, "sync finished");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "sync failed");
            Err(err.into())
        }
    }
}
