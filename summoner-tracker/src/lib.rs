pub mod aggregate;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod ranks;
pub mod storage;
pub mod summary;
pub mod types;

use common::{FetchError, Region, RiotClient, champion_catalog, fetch_current_patch};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::EnrichError;
use crate::storage::ProfileStore;
use crate::types::{
    CurrentGameDto, LiveGameView, MatchDto, MatchRecord, NormalizedMatch, PlayerIdentity,
    ProfileView, RankedOverview, SummonerDto,
};

/// One full profile update: resolve the player, discover new match IDs, fetch
/// a page of missing details concurrently, fold them into the rolling
/// aggregate and persist everything. Re-running after a partial failure picks
/// up exactly the matches that are still missing.
#[instrument(skip(client, store, config))]
pub async fn update_summoner_profile<S: ProfileStore>(
    client: &RiotClient,
    store: &S,
    config: &Config,
    platform: &str,
    summoner_name: &str,
) -> Result<ProfileView, EnrichError> {
    let summoner: SummonerDto = client
        .summoner_by_name(platform, summoner_name)
        .await
        .map_err(|e| match e {
            FetchError::NotFound(_) => EnrichError::PlayerNotFound(summoner_name.to_string()),
            other => other.into(),
        })?;
    let identity = PlayerIdentity {
        platform: platform.to_string(),
        name: summoner.name.clone(),
        puuid: summoner.puuid.clone(),
        summoner_id: summoner.id.clone(),
    };

    // An unranked player 404s here; that is a profile state, not a failure.
    let entries = match client.league_entries(platform, &summoner.id).await {
        Ok(entries) => entries,
        Err(FetchError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    let ranked = RankedOverview::from_entries(entries);

    let region = Region::from_platform(platform)
        .ok_or_else(|| EnrichError::UnknownPlatform(platform.to_string()))?;
    let match_ids = client
        .match_ids(region, &summoner.puuid, 0, config.matchlist_count)
        .await?;
    store.record_match_ids(&summoner.name, &match_ids);

    let pending = store.ids_needing_detail(&summoner.name, config.page_size);
    info!(pending = pending.len(), "fetching missing match details");

    let outcome =
        pipeline::fetch_matches(client, config, &summoner.name, &summoner.puuid, &pending).await;

    let mut aggregate = store.load_or_create_aggregate(&summoner.name);
    aggregate = aggregate::fold_batch(aggregate, &outcome.enriched);
    store.save_aggregate(aggregate.clone());

    let mut records: Vec<MatchRecord> = outcome
        .enriched
        .iter()
        .map(|m| MatchRecord {
            match_id: m.normalized.match_id.clone(),
            summoner: summoner.name.clone(),
            detail: m.raw.clone(),
            summary: serde_json::to_value(m).unwrap_or(Value::Null),
        })
        .collect();
    records.extend(outcome.untracked);
    store.save_match_details(records);

    let matches = store.matches_for(&summoner.name);
    Ok(ProfileView {
        identity,
        ranked,
        aggregate,
        matches,
        failures: outcome.failures,
    })
}

/// Full detail view for a single match, with every participant's ranked tier
/// resolved. Uses the stored raw blob when one is passed in; otherwise the
/// match is fetched fresh.
pub async fn enrich_match_detail(
    client: &RiotClient,
    config: &Config,
    platform: &str,
    match_id: &str,
    stored: Option<Value>,
) -> Result<NormalizedMatch, EnrichError> {
    let raw = match stored {
        Some(raw) => raw,
        None => {
            let region = pipeline::region_for_match_id(match_id)?;
            client.match_detail(region, match_id).await?
        }
    };
    let matched: MatchDto =
        serde_json::from_value(raw).map_err(|source| EnrichError::Payload {
            match_id: match_id.to_string(),
            source,
        })?;
    let mut normalized = pipeline::normalize(matched);
    ranks::attach_ranks(client, config, platform, &mut normalized).await;
    Ok(normalized)
}

/// The summoner's game in progress, split into teams with champion names
/// resolved from the current patch's catalog. `None` when the player is not
/// in a game.
pub async fn fetch_live_game(
    client: &RiotClient,
    platform: &str,
    summoner_name: &str,
) -> Result<Option<LiveGameView>, EnrichError> {
    let summoner: SummonerDto = client
        .summoner_by_name(platform, summoner_name)
        .await
        .map_err(|e| match e {
            FetchError::NotFound(_) => EnrichError::PlayerNotFound(summoner_name.to_string()),
            other => other.into(),
        })?;

    let game: CurrentGameDto = match client.active_game(platform, &summoner.id).await {
        Ok(game) => game,
        Err(FetchError::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    // Champion names are cosmetic here; a stale or missing catalog leaves the
    // numeric IDs in place instead of failing the lookup.
    let catalog = match fetch_current_patch(client.http()).await {
        Ok(patch) => champion_catalog(client.http(), &patch)
            .await
            .unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "failed to resolve current patch");
            Default::default()
        }
    };

    let (blue, red) = game
        .participants
        .into_iter()
        .map(|mut p| {
            p.champion_name = catalog.get(&p.champion_id.to_string()).cloned();
            p
        })
        .partition(|p| p.team_id == 100);

    Ok(Some(LiveGameView {
        game_id: game.game_id,
        game_mode: game.game_mode,
        blue,
        red,
    }))
}
