use serde::{Deserialize, Serialize};

/// Fallback for any base stat missing from the source record.
pub const DEFAULT_STAT: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub special_attack: u32,
    pub special_defense: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            hp: DEFAULT_STAT,
            attack: DEFAULT_STAT,
            defense: DEFAULT_STAT,
            speed: DEFAULT_STAT,
            special_attack: DEFAULT_STAT,
            special_defense: DEFAULT_STAT,
        }
    }
}

impl Stats {
    /// Weighted aggregate used to decide which battle slot gets replaced.
    pub fn power_score(&self) -> u32 {
        let score = self.hp as f64 * 0.6
            + self.attack as f64 * 1.1
            + self.defense as f64 * 0.7
            + self.speed as f64 * 0.8;
        round_half_up(score) as u32
    }

    pub fn summary_line(&self) -> String {
        format!(
            "HP {} \u{2022} ATK {} \u{2022} DEF {} \u{2022} SPD {}",
            self.hp, self.attack, self.defense, self.speed
        )
    }
}

/// One catalog entry. Built once by the mapper and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub sprite: Option<String>,
    pub stats: Stats,
    pub power: u32,
}

impl Entity {
    pub fn new(id: u32, name: impl Into<String>, types: Vec<String>, stats: Stats) -> Self {
        Self {
            id,
            name: name.into(),
            types,
            sprite: None,
            power: stats.power_score(),
            stats,
        }
    }

    pub fn with_sprite(mut self, sprite: Option<String>) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn has_type(&self, type_tag: &str) -> bool {
        self.types.iter().any(|t| t == type_tag)
    }

    pub fn type_line(&self) -> String {
        self.types.join(" / ")
    }
}

/// Rounds halves toward positive infinity, so `2.5 -> 3` and `-2.5 -> -2`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
