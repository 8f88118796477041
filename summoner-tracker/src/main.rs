#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

use core::time::Duration;

use clap::Parser;
use common::RiotClient;
use summoner_tracker::config::Config;
use summoner_tracker::storage::{MemoryStore, ProfileStore};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    common::init_tracing();
    common::init_metrics()?;

    let config = Config::parse();
    let client = RiotClient::with_max_attempts(config.api_key.clone(), config.max_fetch_attempts);
    let store = MemoryStore::default();

    if config.live {
        match summoner_tracker::fetch_live_game(&client, &config.platform, &config.summoner).await?
        {
            Some(game) => println!("{}", serde_json::to_string_pretty(&game)?),
            None => info!(summoner = config.summoner, "not currently in a game"),
        }
        return Ok(());
    }

    if let Some(match_id) = &config.match_id {
        let stored = store
            .match_record(&config.summoner, match_id)
            .map(|r| r.detail);
        let detail = summoner_tracker::enrich_match_detail(
            &client,
            &config,
            &config.platform,
            match_id,
            stored,
        )
        .await?;
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    loop {
        match summoner_tracker::update_summoner_profile(
            &client,
            &store,
            &config,
            &config.platform,
            &config.summoner,
        )
        .await
        {
            Ok(profile) => {
                info!(
                    summoner = profile.identity.name,
                    matches = profile.aggregate.matches,
                    failures = profile.failures.len(),
                    "profile updated"
                );
                println!("{}", serde_json::to_string_pretty(&profile)?);
            }
            Err(e) => error!(error = %e, "profile update failed"),
        }
        let Some(secs) = config.watch_secs else {
            break;
        };
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
    Ok(())
}
