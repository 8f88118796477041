use std::collections::HashMap;

use cached::TimedCache;
use cached::proc_macro::cached;
use serde::Deserialize;

/// Queue IDs that never enter the enriched match list: custom games (0) and
/// the tutorial queues (2000, 2010, 2020). They are stored raw but skipped
/// everywhere else.
pub fn is_trackable_queue(queue_id: u32) -> bool {
    !matches!(queue_id, 0 | 2000 | 2010 | 2020)
}

/// Human label for the CLASSIC-mode queues; everything else is lumped into
/// "Special" (non-CLASSIC modes use the raw game mode string instead).
pub fn queue_label(queue_id: u32) -> &'static str {
    match queue_id {
        400 => "Normal Draft",
        420 => "Ranked Solo",
        430 => "Normal Blind",
        440 => "Ranked Flex",
        _ => "Special",
    }
}

pub fn summoner_spell_name(spell_id: u32) -> &'static str {
    match spell_id {
        1 => "Cleanse",
        3 => "Exhaust",
        4 => "Flash",
        6 => "Ghost",
        7 => "Heal",
        11 => "Smite",
        12 => "Teleport",
        13 => "Clarity",
        14 => "Ignite",
        21 => "Barrier",
        32 => "Mark",
        _ => "Unknown",
    }
}

/// Keystone perk of the primary rune tree.
pub fn keystone_name(perk_id: u32) -> &'static str {
    match perk_id {
        8005 => "Press the Attack",
        8008 => "Lethal Tempo",
        8010 => "Conqueror",
        8021 => "Fleet Footwork",
        8112 => "Electrocute",
        8124 => "Predator",
        8128 => "Dark Harvest",
        9923 => "Hail of Blades",
        8214 => "Summon Aery",
        8229 => "Arcane Comet",
        8230 => "Phase Rush",
        8351 => "Glacial Augment",
        8360 => "Unsealed Spellbook",
        8369 => "First Strike",
        8437 => "Grasp of the Undying",
        8439 => "Aftershock",
        8465 => "Guardian",
        _ => "Unknown",
    }
}

/// Secondary rune tree (style) name.
pub fn rune_style_name(style_id: u32) -> &'static str {
    match style_id {
        8000 => "Precision",
        8100 => "Domination",
        8200 => "Sorcery",
        8300 => "Inspiration",
        8400 => "Resolve",
        _ => "Unknown",
    }
}

#[derive(Debug, Deserialize)]
struct RealmDto {
    dd: String,
}

#[derive(Debug, Deserialize)]
struct ChampionListDto {
    data: HashMap<String, ChampionEntryDto>,
}

#[derive(Debug, Deserialize)]
struct ChampionEntryDto {
    id: String,
    key: String,
}

/// Current data-dragon patch, e.g. "14.3.1".
pub async fn fetch_current_patch(http: &reqwest::Client) -> reqwest::Result<String> {
    let realm: RealmDto = crate::retry_with_backoff(3, || async {
        http.get("https://ddragon.leagueoflegends.com/realms/na.json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    })
    .await?;
    Ok(realm.dd)
}

/// Champion numeric key -> champion name, fetched once per patch and held for
/// the lifetime of that cached copy. Needed for payloads that only carry
/// champion IDs (the spectator endpoint).
#[cached(
    ty = "TimedCache<String, HashMap<String, String>>",
    create = "{ TimedCache::with_lifespan(24 * 60 * 60) }",
    result = true,
    convert = r#"{ patch.to_string() }"#,
    sync_writes = "default"
)]
pub async fn champion_catalog(
    http: &reqwest::Client,
    patch: &str,
) -> reqwest::Result<HashMap<String, String>> {
    let url = format!("https://ddragon.leagueoflegends.com/cdn/{patch}/data/en_US/champion.json");
    let list: ChampionListDto = crate::retry_with_backoff(3, || async {
        http.get(&url).send().await?.error_for_status()?.json().await
    })
    .await?;
    Ok(list.data.into_values().map(|c| (c.key, c.id)).collect())
}
