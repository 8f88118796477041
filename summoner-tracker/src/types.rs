use chrono::NaiveDate;
use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::EnrichError;

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---- Riot API payloads ----

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    pub id: String,
    pub puuid: String,
    pub name: String,
    #[serde(default)]
    pub profile_icon_id: i64,
    #[serde(default)]
    pub summoner_level: i64,
}

/// Resolved player identity. Re-resolved on every lookup; never cached across
/// requests.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerIdentity {
    pub platform: String,
    pub name: String,
    pub puuid: String,
    pub summoner_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntryDto {
    pub queue_type: String,
    pub tier: String,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub league_points: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueRecord {
    pub tier: String,
    pub rank: Option<String>,
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
    pub total_games: u32,
    pub win_rate: u32,
}

impl Default for QueueRecord {
    fn default() -> Self {
        Self {
            tier: "Unranked".to_string(),
            rank: None,
            league_points: 0,
            wins: 0,
            losses: 0,
            total_games: 0,
            win_rate: 0,
        }
    }
}

impl From<LeagueEntryDto> for QueueRecord {
    fn from(entry: LeagueEntryDto) -> Self {
        let total_games = entry.wins + entry.losses;
        let win_rate = if total_games == 0 {
            0
        } else {
            (f64::from(entry.wins) / f64::from(total_games) * 100.0).round() as u32
        };
        Self {
            tier: entry.tier,
            rank: entry.rank,
            league_points: entry.league_points,
            wins: entry.wins,
            losses: entry.losses,
            total_games,
            win_rate,
        }
    }
}

/// Solo and flex queue records, both defaulting to "Unranked".
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedOverview {
    pub solo: QueueRecord,
    pub flex: QueueRecord,
}

impl RankedOverview {
    pub fn from_entries(entries: Vec<LeagueEntryDto>) -> Self {
        let mut overview = Self::default();
        for entry in entries {
            match entry.queue_type.as_str() {
                "RANKED_SOLO_5x5" => overview.solo = entry.into(),
                "RANKED_FLEX_SR" => overview.flex = entry.into(),
                _ => {}
            }
        }
        overview
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchDto {
    pub metadata: MatchMetadataDto,
    pub info: MatchInfoDto,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadataDto {
    pub match_id: String,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfoDto {
    pub game_creation: i64,
    pub game_duration: i64,
    pub game_mode: String,
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub game_version: String,
    pub queue_id: u32,
    pub participants: Vec<ParticipantDto>,
    #[serde(default)]
    pub teams: Vec<TeamDto>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantDto {
    pub puuid: String,
    pub summoner_id: String,
    pub summoner_name: String,
    pub champion_name: String,
    pub champion_id: i64,
    pub team_id: u32,
    pub team_position: String,
    pub win: bool,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub total_minions_killed: u32,
    pub neutral_minions_killed: u32,
    pub vision_score: u32,
    pub gold_earned: u32,
    pub total_damage_dealt_to_champions: u32,
    pub item0: u32,
    pub item1: u32,
    pub item2: u32,
    pub item3: u32,
    pub item4: u32,
    pub item5: u32,
    pub item6: u32,
    pub summoner1_id: u32,
    pub summoner2_id: u32,
    pub perks: PerksDto,
    pub challenges: Option<ChallengesDto>,
    /// Formatted ranked tier, attached by the rank resolver on the full-match
    /// path only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PerksDto {
    #[serde(default)]
    pub styles: Vec<PerkStyleDto>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PerkStyleDto {
    #[serde(default)]
    pub style: u32,
    #[serde(default)]
    pub selections: Vec<PerkSelectionDto>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PerkSelectionDto {
    pub perk: u32,
}

/// Challenge stats are absent in some modes (URF, remakes), so every field is
/// optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChallengesDto {
    pub kill_participation: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDto {
    pub team_id: u32,
    pub win: bool,
}

// ---- Normalized / derived views ----

/// Match detail after normalization: display-ready duration, calendar date,
/// human mode label and positional matchups.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NormalizedMatch {
    pub match_id: String,
    pub queue_id: u32,
    pub game_mode: String,
    pub mode_label: String,
    pub game_type: String,
    pub game_creation_ms: i64,
    pub duration_secs: i64,
    pub duration: String,
    pub date: NaiveDate,
    pub patch: String,
    pub participant_puuids: Vec<String>,
    pub participants: Vec<ParticipantDto>,
    pub teams: Vec<TeamDto>,
    /// Index pairs (blue slot, red slot) for 5v5 team modes; positional, not
    /// role-based.
    pub matchups: Vec<(usize, usize)>,
}

/// Kill participation is either a percentage or the literal "ERROR" sentinel
/// the display layer expects when the challenge stat is not computable for
/// the game mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KillParticipation {
    Percent(f64),
    Unavailable,
}

impl Serialize for KillParticipation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Percent(value) => serializer.serialize_f64(*value),
            Self::Unavailable => serializer.serialize_str("ERROR"),
        }
    }
}

impl<'de> Deserialize<'de> for KillParticipation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(Self::Percent(n.as_f64().unwrap_or(0.0))),
            _ => Ok(Self::Unavailable),
        }
    }
}

/// Per-match summary of the requesting player's participant record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSummary {
    pub champion_name: String,
    pub role: String,
    pub win: bool,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub kda: f64,
    pub cs: u32,
    pub cs_per_min: f64,
    pub vision_score: u32,
    pub gold_earned: u32,
    pub damage_dealt: u32,
    pub gold_short: f64,
    pub damage_short: f64,
    pub kill_participation: KillParticipation,
    pub summoner_spells: [String; 2],
    pub rune_primary: String,
    pub rune_secondary: String,
    /// Display order: the trinket (slot 6) sits after the first item row.
    pub items: [u32; 7],
    pub date: NaiveDate,
}

// ---- Rolling aggregate ----

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct StatLine {
    pub total: u32,
    pub per_min: f64,
    pub per_match: f64,
}

impl StatLine {
    /// Adds a raw per-match value and recomputes the derived averages from
    /// totals. Recomputing (rather than incrementally averaging) keeps the
    /// derived fields drift-free.
    pub fn add(&mut self, raw: u32, minutes: u32, matches: u32) {
        self.total += raw;
        self.per_min = if minutes == 0 {
            0.0
        } else {
            round2(f64::from(self.total) / f64::from(minutes))
        };
        self.per_match = if matches == 0 {
            0.0
        } else {
            round2(f64::from(self.total) / f64::from(matches))
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AggregateStats {
    pub kills: StatLine,
    pub deaths: StatLine,
    pub assists: StatLine,
    pub minions: StatLine,
    pub vision: StatLine,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct RoleStats {
    pub count: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RoleBreakdown {
    pub top: RoleStats,
    pub jungle: RoleStats,
    pub middle: RoleStats,
    pub bottom: RoleStats,
    pub utility: RoleStats,
}

impl RoleBreakdown {
    pub fn for_position_mut(&mut self, position: &str) -> Option<&mut RoleStats> {
        match position {
            "TOP" => Some(&mut self.top),
            "JUNGLE" => Some(&mut self.jungle),
            "MIDDLE" => Some(&mut self.middle),
            "BOTTOM" => Some(&mut self.bottom),
            "UTILITY" => Some(&mut self.utility),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChampionAggregate {
    pub name: String,
    pub games: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub kda: f64,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub play_rate: f64,
    pub minions: u32,
    pub vision: u32,
    pub gold: u64,
    pub damage: u64,
    pub last_played: NaiveDate,
}

/// Rolling per-player aggregate. Owned by the persistence collaborator; the
/// pipeline folds into an in-memory copy and hands it back once per batch.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerAggregate {
    pub summoner: String,
    pub matches: u32,
    pub minutes: u32,
    pub kda: f64,
    pub stats: AggregateStats,
    pub roles: RoleBreakdown,
    /// Kept in ranking order: (games, win rate, kda) descending, champion
    /// name as the deterministic tie-break.
    pub champions: Vec<ChampionAggregate>,
}

impl PlayerAggregate {
    pub fn new(summoner: impl Into<String>) -> Self {
        Self {
            summoner: summoner.into(),
            matches: 0,
            minutes: 0,
            kda: 0.0,
            stats: AggregateStats::default(),
            roles: RoleBreakdown::default(),
            champions: Vec::new(),
        }
    }

    pub fn champion_mut(&mut self, name: &str) -> Option<&mut ChampionAggregate> {
        self.champions.iter_mut().find(|c| c.name == name)
    }
}

// ---- Persistence records ----

/// One row per (match, tracked player). Created empty when the match ID is
/// first discovered; populated exactly once; never mutated again.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchRecord {
    pub match_id: String,
    pub summoner: String,
    #[serde(default)]
    pub detail: Value,
    #[serde(default)]
    pub summary: Value,
}

impl MatchRecord {
    pub fn placeholder(match_id: impl Into<String>, summoner: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            summoner: summoner.into(),
            detail: Value::Object(Default::default()),
            summary: Value::Object(Default::default()),
        }
    }

    /// A non-empty raw detail blob is the "already processed" marker.
    pub fn is_populated(&self) -> bool {
        match &self.detail {
            Value::Object(map) => !map.is_empty(),
            Value::Null => false,
            _ => true,
        }
    }
}

// ---- Batch results ----

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedMatch {
    pub normalized: NormalizedMatch,
    pub summary: PlayerSummary,
    #[serde(skip)]
    pub raw: Value,
}

fn serialize_display<S: Serializer>(error: &EnrichError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

#[derive(Debug, Serialize)]
pub struct MatchFailure {
    pub match_id: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: EnrichError,
}

/// Partial-failure-tolerant result of one concurrent fetch batch.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub enriched: Vec<EnrichedMatch>,
    /// Non-trackable queues (customs, tutorials): stored raw, never shown.
    pub untracked: Vec<MatchRecord>,
    pub failures: Vec<MatchFailure>,
}

/// Everything a profile lookup hands back to the rendering layer.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub identity: PlayerIdentity,
    pub ranked: RankedOverview,
    pub aggregate: PlayerAggregate,
    pub matches: Vec<MatchRecord>,
    pub failures: Vec<MatchFailure>,
}

// ---- Spectator ----

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameDto {
    pub game_id: i64,
    #[serde(default)]
    pub game_mode: String,
    #[serde(default)]
    pub game_length: i64,
    pub participants: Vec<CurrentGameParticipantDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameParticipantDto {
    pub champion_id: i64,
    pub team_id: u32,
    #[serde(default)]
    pub summoner_name: String,
    #[serde(default)]
    pub summoner_id: String,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub champion_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LiveGameView {
    pub game_id: i64,
    pub game_mode: String,
    pub blue: Vec<CurrentGameParticipantDto>,
    pub red: Vec<CurrentGameParticipantDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_sentinel_serializes_as_string() {
        let value = serde_json::to_value(KillParticipation::Unavailable).unwrap();
        assert_eq!(value, Value::String("ERROR".to_string()));
        let value = serde_json::to_value(KillParticipation::Percent(58.3)).unwrap();
        assert_eq!(value, serde_json::json!(58.3));
    }

    #[test]
    fn ranked_overview_defaults_to_unranked() {
        let overview = RankedOverview::from_entries(vec![]);
        assert_eq!(overview.solo.tier, "Unranked");
        assert_eq!(overview.flex.tier, "Unranked");
    }

    #[test]
    fn ranked_overview_computes_win_rate() {
        let overview = RankedOverview::from_entries(vec![LeagueEntryDto {
            queue_type: "RANKED_SOLO_5x5".to_string(),
            tier: "GOLD".to_string(),
            rank: Some("II".to_string()),
            league_points: 41,
            wins: 37,
            losses: 25,
        }]);
        assert_eq!(overview.solo.total_games, 62);
        assert_eq!(overview.solo.win_rate, 60);
        assert_eq!(overview.flex.tier, "Unranked");
    }

    #[test]
    fn placeholder_record_is_not_populated() {
        let record = MatchRecord::placeholder("EUW1_1", "player");
        assert!(!record.is_populated());
        let populated = MatchRecord {
            detail: serde_json::json!({"info": {}}),
            ..record
        };
        assert!(populated.is_populated());
    }

    #[test]
    fn participant_dto_reads_riot_field_names() {
        let raw = serde_json::json!({
            "puuid": "abc",
            "championName": "Ahri",
            "teamPosition": "MIDDLE",
            "totalMinionsKilled": 180,
            "neutralMinionsKilled": 12,
            "summoner1Id": 4,
            "summoner2Id": 14,
            "totalDamageDealtToChampions": 21000
        });
        let participant: ParticipantDto = serde_json::from_value(raw).unwrap();
        assert_eq!(participant.champion_name, "Ahri");
        assert_eq!(participant.team_position, "MIDDLE");
        assert_eq!(participant.total_minions_killed, 180);
        assert_eq!(participant.summoner1_id, 4);
        assert_eq!(participant.total_damage_dealt_to_champions, 21000);
        assert!(participant.challenges.is_none());
    }
}
