use crate::error::EnrichError;
use crate::types::{
    KillParticipation, NormalizedMatch, PlayerSummary, round1, round2,
};

/// KDA with the zero-death rule: a deathless game scores kills + assists
/// instead of dividing by zero. The aggregate fold applies the same rule.
pub(crate) fn kda(kills: u32, deaths: u32, assists: u32) -> f64 {
    if deaths == 0 {
        f64::from(kills + assists)
    } else {
        round2(f64::from(kills + assists) / f64::from(deaths))
    }
}

/// Extracts the requesting player's participant record and computes the
/// derived per-match fields.
pub fn derive_player_summary(
    matched: &NormalizedMatch,
    puuid: &str,
) -> Result<PlayerSummary, EnrichError> {
    let index = matched
        .participant_puuids
        .iter()
        .position(|p| p == puuid)
        .ok_or_else(|| EnrichError::PlayerNotInMatch {
            match_id: matched.match_id.clone(),
        })?;
    let player = matched
        .participants
        .get(index)
        .ok_or_else(|| EnrichError::PlayerNotInMatch {
            match_id: matched.match_id.clone(),
        })?;

    // Monster creeps count towards creep score.
    let cs = player.total_minions_killed + player.neutral_minions_killed;
    let cs_per_min = if matched.duration_secs == 0 {
        0.0
    } else {
        round1(f64::from(cs) / (matched.duration_secs as f64 / 60.0))
    };

    // URF and remakes have no challenge stats; the display layer expects the
    // "ERROR" sentinel there, not a zero.
    let kill_participation = match player
        .challenges
        .as_ref()
        .and_then(|c| c.kill_participation)
    {
        Some(fraction) => KillParticipation::Percent(round1(fraction * 100.0)),
        None => KillParticipation::Unavailable,
    };

    let rune_primary = player
        .perks
        .styles
        .first()
        .and_then(|style| style.selections.first())
        .map(|selection| common::keystone_name(selection.perk))
        .unwrap_or("Unknown")
        .to_string();
    let rune_secondary = player
        .perks
        .styles
        .get(1)
        .map(|style| common::rune_style_name(style.style))
        .unwrap_or("Unknown")
        .to_string();

    Ok(PlayerSummary {
        champion_name: player.champion_name.clone(),
        role: player.team_position.clone(),
        win: player.win,
        kills: player.kills,
        deaths: player.deaths,
        assists: player.assists,
        kda: kda(player.kills, player.deaths, player.assists),
        cs,
        cs_per_min,
        vision_score: player.vision_score,
        gold_earned: player.gold_earned,
        damage_dealt: player.total_damage_dealt_to_champions,
        gold_short: round1(f64::from(player.gold_earned) / 1000.0),
        damage_short: round1(f64::from(player.total_damage_dealt_to_champions) / 1000.0),
        kill_participation,
        summoner_spells: [
            common::summoner_spell_name(player.summoner1_id).to_string(),
            common::summoner_spell_name(player.summoner2_id).to_string(),
        ],
        rune_primary,
        rune_secondary,
        items: [
            player.item0,
            player.item1,
            player.item2,
            player.item6,
            player.item3,
            player.item4,
            player.item5,
        ],
        date: matched.date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ChallengesDto, ParticipantDto, PerkSelectionDto, PerkStyleDto, PerksDto,
    };
    use chrono::NaiveDate;

    fn player() -> ParticipantDto {
        ParticipantDto {
            puuid: "player-puuid".to_string(),
            champion_name: "Ahri".to_string(),
            team_position: "MIDDLE".to_string(),
            win: true,
            kills: 4,
            deaths: 2,
            assists: 6,
            total_minions_killed: 180,
            neutral_minions_killed: 12,
            vision_score: 21,
            gold_earned: 10_482,
            total_damage_dealt_to_champions: 18_230,
            item0: 6655,
            item1: 3020,
            item2: 4645,
            item3: 3165,
            item4: 3089,
            item5: 0,
            item6: 3363,
            summoner1_id: 4,
            summoner2_id: 14,
            perks: PerksDto {
                styles: vec![
                    PerkStyleDto {
                        style: 8100,
                        selections: vec![PerkSelectionDto { perk: 8112 }],
                    },
                    PerkStyleDto {
                        style: 8200,
                        selections: vec![],
                    },
                ],
            },
            challenges: Some(ChallengesDto {
                kill_participation: Some(0.583),
            }),
            ..ParticipantDto::default()
        }
    }

    fn sample_match(participant: ParticipantDto) -> NormalizedMatch {
        NormalizedMatch {
            match_id: "EUW1_100".to_string(),
            queue_id: 420,
            game_mode: "CLASSIC".to_string(),
            mode_label: "Ranked Solo".to_string(),
            game_type: "MATCHED_GAME".to_string(),
            game_creation_ms: 1_637_712_000_000,
            duration_secs: 1_920,
            duration: "0:32:00".to_string(),
            date: NaiveDate::from_ymd_opt(2021, 11, 24).unwrap(),
            patch: "11.23.1".to_string(),
            participant_puuids: vec!["player-puuid".to_string()],
            participants: vec![participant],
            teams: vec![],
            matchups: vec![],
        }
    }

    #[test]
    fn derives_per_match_fields() {
        let summary = derive_player_summary(&sample_match(player()), "player-puuid").unwrap();
        assert_eq!(summary.champion_name, "Ahri");
        assert_eq!(summary.kda, 5.0);
        assert_eq!(summary.cs, 192);
        assert_eq!(summary.cs_per_min, 6.0);
        assert_eq!(summary.gold_short, 10.5);
        assert_eq!(summary.damage_short, 18.2);
        assert_eq!(
            summary.kill_participation,
            KillParticipation::Percent(58.3)
        );
        assert_eq!(summary.summoner_spells, ["Flash", "Ignite"]);
        assert_eq!(summary.rune_primary, "Electrocute");
        assert_eq!(summary.rune_secondary, "Sorcery");
    }

    #[test]
    fn deathless_game_scores_kills_plus_assists() {
        let mut participant = player();
        participant.kills = 5;
        participant.deaths = 0;
        participant.assists = 7;
        let summary = derive_player_summary(&sample_match(participant), "player-puuid").unwrap();
        assert_eq!(summary.kda, 12.0);
    }

    #[test]
    fn trinket_slots_into_display_order() {
        let summary = derive_player_summary(&sample_match(player()), "player-puuid").unwrap();
        assert_eq!(summary.items, [6655, 3020, 4645, 3363, 3165, 3089, 0]);
    }

    #[test]
    fn missing_challenges_produce_error_sentinel() {
        let mut participant = player();
        participant.challenges = None;
        let summary = derive_player_summary(&sample_match(participant), "player-puuid").unwrap();
        assert_eq!(summary.kill_participation, KillParticipation::Unavailable);

        let mut participant = player();
        participant.challenges = Some(ChallengesDto {
            kill_participation: None,
        });
        let summary = derive_player_summary(&sample_match(participant), "player-puuid").unwrap();
        assert_eq!(summary.kill_participation, KillParticipation::Unavailable);
    }

    #[test]
    fn unknown_player_is_an_invariant_violation() {
        let err = derive_player_summary(&sample_match(player()), "other-puuid").unwrap_err();
        assert!(matches!(err, EnrichError::PlayerNotInMatch { .. }));
    }
}
