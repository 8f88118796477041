use itertools::Itertools;

use crate::summary::kda;
use crate::types::{
    ChampionAggregate, EnrichedMatch, NormalizedMatch, PlayerAggregate, PlayerSummary, round2,
};

/// Folds one derived match summary into the rolling aggregate. Pure over
/// copies; the caller persists the final state once per batch.
///
/// Only CLASSIC-mode matches with a resolvable role are folded: ARAM, URF
/// and friends are stored but never counted, and an empty role marks an
/// early remake or AFK leave, which is excluded on purpose.
pub fn fold(
    mut aggregate: PlayerAggregate,
    summary: &PlayerSummary,
    matched: &NormalizedMatch,
) -> PlayerAggregate {
    if matched.game_mode != "CLASSIC" {
        return aggregate;
    }
    let Some(role) = aggregate.roles.for_position_mut(&summary.role) else {
        return aggregate;
    };

    role.count += 1;
    if summary.win {
        role.wins += 1;
    } else {
        role.losses += 1;
    }
    role.win_rate = (f64::from(role.wins) / f64::from(role.count) * 100.0).round() as u32;

    aggregate.matches += 1;
    aggregate.minutes += (matched.duration_secs as f64 / 60.0).round() as u32;

    let (minutes, matches) = (aggregate.minutes, aggregate.matches);
    aggregate.stats.kills.add(summary.kills, minutes, matches);
    aggregate.stats.deaths.add(summary.deaths, minutes, matches);
    aggregate.stats.assists.add(summary.assists, minutes, matches);
    aggregate.stats.minions.add(summary.cs, minutes, matches);
    aggregate.stats.vision.add(summary.vision_score, minutes, matches);
    aggregate.kda = kda(
        aggregate.stats.kills.total,
        aggregate.stats.deaths.total,
        aggregate.stats.assists.total,
    );

    fold_champion(&mut aggregate, summary);
    aggregate
}

fn fold_champion(aggregate: &mut PlayerAggregate, summary: &PlayerSummary) {
    let matches = aggregate.matches;
    if let Some(champion) = aggregate.champion_mut(&summary.champion_name) {
        champion.games += 1;
        champion.kills += summary.kills;
        champion.deaths += summary.deaths;
        champion.assists += summary.assists;
        champion.kda = kda(champion.kills, champion.deaths, champion.assists);
        if summary.win {
            champion.wins += 1;
        } else {
            champion.losses += 1;
        }
        champion.win_rate = round2(f64::from(champion.wins) / f64::from(champion.games) * 100.0);
        champion.play_rate = round2(f64::from(champion.games) / f64::from(matches));
        champion.minions += summary.cs;
        champion.vision += summary.vision_score;
        champion.gold += u64::from(summary.gold_earned);
        champion.damage += u64::from(summary.damage_dealt);
        // most recent fold wins
        champion.last_played = summary.date;
    } else {
        aggregate.champions.push(ChampionAggregate {
            name: summary.champion_name.clone(),
            games: 1,
            kills: summary.kills,
            deaths: summary.deaths,
            assists: summary.assists,
            kda: kda(summary.kills, summary.deaths, summary.assists),
            wins: u32::from(summary.win),
            losses: u32::from(!summary.win),
            win_rate: if summary.win { 100.0 } else { 0.0 },
            play_rate: 1.0 / f64::from(matches),
            minions: summary.cs,
            vision: summary.vision_score,
            gold: u64::from(summary.gold_earned),
            damage: u64::from(summary.damage_dealt),
            last_played: summary.date,
        });
    }
}

/// Champion ranking order: (games, win rate, kda) descending. The name
/// tie-break keeps the order deterministic when all three keys match.
pub fn sort_champions(aggregate: &mut PlayerAggregate) {
    aggregate.champions.sort_by(|a, b| {
        b.games
            .cmp(&a.games)
            .then_with(|| b.win_rate.total_cmp(&a.win_rate))
            .then_with(|| b.kda.total_cmp(&a.kda))
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Folds a whole fetch batch and re-sorts the champion ranking once at the
/// end (any champion's sort key may have changed).
///
/// The batch is folded in game-creation order rather than gather order, so
/// `last_played` reflects chronology no matter how the concurrent fetches
/// completed.
pub fn fold_batch(mut aggregate: PlayerAggregate, batch: &[EnrichedMatch]) -> PlayerAggregate {
    for matched in batch
        .iter()
        .sorted_by_key(|m| m.normalized.game_creation_ms)
    {
        aggregate = fold(aggregate, &matched.summary, &matched.normalized);
    }
    sort_champions(&mut aggregate);
    aggregate
}
