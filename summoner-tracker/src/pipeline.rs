use chrono::{DateTime, NaiveDate};
use common::{Region, RiotClient, is_trackable_queue, queue_label};
use futures::StreamExt;
use metrics::counter;
use serde_json::Value;
use tracing::warn;

use crate::config::Config;
use crate::error::EnrichError;
use crate::types::{
    BatchOutcome, EnrichedMatch, MatchDto, MatchFailure, MatchRecord, NormalizedMatch,
};
use crate::summary::derive_player_summary;

/// Match IDs embed their platform as the prefix before the underscore
/// (EUW1_6234..), which is what routes the detail fetch to a macro-region.
pub fn region_for_match_id(match_id: &str) -> Result<Region, EnrichError> {
    let platform = match_id.split('_').next().unwrap_or_default();
    Region::from_platform(platform)
        .ok_or_else(|| EnrichError::UnknownPlatform(platform.to_string()))
}

/// H:MM:SS with an unpadded hour, e.g. "0:28:30".
pub(crate) fn format_duration(secs: i64) -> String {
    format!("{}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}

fn date_from_millis(millis: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(millis)
        .map(|ts| ts.date_naive())
        .unwrap_or_default()
}

/// Reduces a full game version ("14.5.565.2345") to the two-part patch the
/// asset CDN keys on ("14.5.1").
pub(crate) fn asset_patch(game_version: &str) -> String {
    let mut parts = game_version.splitn(3, '.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => format!("{major}.{minor}.1"),
        _ => game_version.to_string(),
    }
}

/// Flattens a raw match payload into the display-ready form.
pub fn normalize(matched: MatchDto) -> NormalizedMatch {
    let info = matched.info;
    let mode_label = if info.game_mode == "CLASSIC" {
        queue_label(info.queue_id).to_string()
    } else {
        info.game_mode.clone()
    };
    // Positional lane pairings only exist for full 5v5 matched games.
    let matchups = if info.game_type != "CUSTOM_GAME" && info.participants.len() >= 10 {
        (0..5).map(|i| (i, i + 5)).collect()
    } else {
        Vec::new()
    };
    NormalizedMatch {
        match_id: matched.metadata.match_id,
        queue_id: info.queue_id,
        game_mode: info.game_mode,
        mode_label,
        game_type: info.game_type,
        game_creation_ms: info.game_creation,
        duration_secs: info.game_duration,
        duration: format_duration(info.game_duration),
        date: date_from_millis(info.game_creation),
        patch: asset_patch(&info.game_version),
        participant_puuids: matched.metadata.participants,
        participants: info.participants,
        teams: info.teams,
        matchups,
    }
}

enum FetchedMatch {
    Enriched(EnrichedMatch),
    Untracked(MatchRecord),
}

async fn fetch_one(
    client: &RiotClient,
    summoner: &str,
    puuid: &str,
    match_id: &str,
) -> Result<FetchedMatch, EnrichError> {
    let region = region_for_match_id(match_id)?;
    let raw: Value = client.match_detail(region, match_id).await?;
    let matched: MatchDto =
        serde_json::from_value(raw.clone()).map_err(|source| EnrichError::Payload {
            match_id: match_id.to_string(),
            source,
        })?;

    // Customs and tutorials are stored raw so they are never re-fetched, but
    // they carry no summary and never reach the aggregate.
    if !is_trackable_queue(matched.info.queue_id) {
        let mut record = MatchRecord::placeholder(match_id, summoner);
        record.detail = raw;
        return Ok(FetchedMatch::Untracked(record));
    }

    let normalized = normalize(matched);
    let summary = derive_player_summary(&normalized, puuid)?;
    Ok(FetchedMatch::Enriched(EnrichedMatch {
        normalized,
        summary,
        raw,
    }))
}

/// Fetches a page of match details concurrently with a bounded number of
/// in-flight requests. One failed match never poisons the batch; it lands in
/// `failures` and everything else proceeds.
pub async fn fetch_matches(
    client: &RiotClient,
    config: &Config,
    summoner: &str,
    puuid: &str,
    match_ids: &[String],
) -> BatchOutcome {
    let results: Vec<(String, Result<FetchedMatch, EnrichError>)> =
        futures::stream::iter(match_ids)
            .map(|match_id| async move {
                (
                    match_id.clone(),
                    fetch_one(client, summoner, puuid, match_id).await,
                )
            })
            .buffer_unordered(config.concurrency)
            .collect()
            .await;

    let mut outcome = BatchOutcome::default();
    for (match_id, result) in results {
        match result {
            Ok(FetchedMatch::Enriched(enriched)) => {
                counter!("summoner_tracker.fetch_match.success").increment(1);
                outcome.enriched.push(enriched);
            }
            Ok(FetchedMatch::Untracked(record)) => {
                counter!("summoner_tracker.fetch_match.success").increment(1);
                outcome.untracked.push(record);
            }
            Err(error) => {
                counter!("summoner_tracker.fetch_match.failure").increment(1);
                warn!(match_id, error = %error, "failed to enrich match");
                outcome.failures.push(MatchFailure { match_id, error });
            }
        }
    }
    outcome
}
