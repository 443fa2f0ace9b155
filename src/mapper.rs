//! Raw PokeAPI `pokemon` records and their conversion into [`Entity`].

use serde::Deserialize;

use crate::entity::{Entity, Stats, DEFAULT_STAT};

const ARTWORK_POINTER: &str = "/other/official-artwork/front_default";
const DEFAULT_SPRITE_POINTER: &str = "/front_default";

#[derive(Clone, Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawStatSlot {
    #[serde(default)]
    pub base_stat: Option<u32>,
    pub stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawTypeSlot {
    #[serde(rename = "type")]
    pub type_info: NamedResource,
}

/// Subset of `GET /pokemon/{id}` the catalog depends on.
#[derive(Clone, Debug, Deserialize)]
pub struct RawCreature {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub stats: Vec<RawStatSlot>,
    #[serde(default)]
    pub types: Vec<RawTypeSlot>,
    #[serde(default)]
    pub sprites: serde_json::Value,
}

pub fn map_creature(raw: RawCreature) -> Entity {
    let stat = |name: &str| -> u32 {
        raw.stats
            .iter()
            .find(|slot| slot.stat.name == name)
            .and_then(|slot| slot.base_stat)
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_STAT)
    };

    let stats = Stats {
        hp: stat("hp"),
        attack: stat("attack"),
        defense: stat("defense"),
        speed: stat("speed"),
        special_attack: stat("special-attack"),
        special_defense: stat("special-defense"),
    };

    let sprite = pointer_string(&raw.sprites, ARTWORK_POINTER)
        .or_else(|| pointer_string(&raw.sprites, DEFAULT_SPRITE_POINTER));

    let types = raw
        .types
        .iter()
        .map(|slot| slot.type_info.name.clone())
        .collect();

    Entity::new(raw.id, capitalize(&raw.name), types, stats).with_sprite(sprite)
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
