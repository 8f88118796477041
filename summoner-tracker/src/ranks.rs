use common::{FetchError, RiotClient};
use futures::StreamExt;
use tracing::warn;

use crate::config::Config;
use crate::types::{LeagueEntryDto, NormalizedMatch};

/// Apex tiers have no division, so the formatted rank is the bare tier.
const APEX_TIERS: [&str; 3] = ["MASTER", "GRANDMASTER", "CHALLENGER"];

/// Flex queue matches are ranked against the flex ladder; everything else is
/// displayed against solo queue.
fn ranked_queue_for(queue_id: u32) -> &'static str {
    if queue_id == 440 {
        "RANKED_FLEX_SR"
    } else {
        "RANKED_SOLO_5x5"
    }
}

fn format_tier(entry: Option<&LeagueEntryDto>) -> String {
    match entry {
        None => "Unranked".to_string(),
        Some(entry) if APEX_TIERS.contains(&entry.tier.as_str()) => entry.tier.clone(),
        Some(entry) => match &entry.rank {
            Some(rank) => format!("{} {rank}", entry.tier),
            None => entry.tier.clone(),
        },
    }
}

/// Resolves and attaches the formatted ranked tier of every participant, one
/// league lookup per participant with bounded concurrency. A participant whose
/// lookup fails outright is left untiered rather than failing the match view.
pub async fn attach_ranks(
    client: &RiotClient,
    config: &Config,
    platform: &str,
    matched: &mut NormalizedMatch,
) {
    let queue = ranked_queue_for(matched.queue_id);
    let summoner_ids: Vec<String> = matched
        .participants
        .iter()
        .map(|p| p.summoner_id.clone())
        .collect();

    // buffered (not unordered) keeps results aligned with participant slots
    let tiers: Vec<Option<String>> = futures::stream::iter(summoner_ids)
        .map(|summoner_id| async move {
            match client
                .league_entries::<Vec<LeagueEntryDto>>(platform, &summoner_id)
                .await
            {
                Ok(entries) => Some(format_tier(
                    entries.iter().find(|e| e.queue_type == queue),
                )),
                Err(FetchError::NotFound(_)) => Some("Unranked".to_string()),
                Err(error) => {
                    warn!(summoner_id, error = %error, "failed to resolve rank");
                    None
                }
            }
        })
        .buffered(config.concurrency)
        .collect()
        .await;

    for (participant, tier) in matched.participants.iter_mut().zip(tiers) {
        participant.tier = tier;
    }
}
