//! Arcade-style damage roll. Not the real battle formula.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::{round_half_up, Stats};

pub const BASE_FLOOR: f64 = 8.0;
pub const MIN_DAMAGE: u32 = 5;
pub const MULTIPLIER_MIN: f64 = 0.8;
pub const MULTIPLIER_SPAN: f64 = 0.4;
pub const CRIT_CHANCE: f64 = 0.16;
pub const CRIT_FACTOR: f64 = 1.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub amount: u32,
    pub crit: bool,
}

/// Source of per-attack damage for the battle loop.
pub trait DamageRoll {
    fn roll(&mut self, attacker: &Stats, defender: &Stats) -> Hit;
}

/// Production roller: uniform multiplier in [0.8, 1.2] and a 16% crit chance.
pub struct RandomDamage<R> {
    rng: R,
}

impl<R: Rng> RandomDamage<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> DamageRoll for RandomDamage<R> {
    fn roll(&mut self, attacker: &Stats, defender: &Stats) -> Hit {
        let multiplier = MULTIPLIER_MIN + self.rng.gen::<f64>() * MULTIPLIER_SPAN;
        let crit = self.rng.gen::<f64>() < CRIT_CHANCE;
        compute_damage(attacker, defender, multiplier, crit)
    }
}

pub fn base_damage(attacker: &Stats, defender: &Stats) -> f64 {
    let attack = attacker.attack as f64 * 0.7 + attacker.special_attack as f64 * 0.5;
    let defense = defender.defense as f64 * 0.6 + defender.special_defense as f64 * 0.4;
    (attack - defense * 0.45).max(BASE_FLOOR)
}

/// Deterministic part of the roll once the multiplier and crit are known.
pub fn compute_damage(attacker: &Stats, defender: &Stats, multiplier: f64, crit: bool) -> Hit {
    let mut damage = round_half_up(base_damage(attacker, defender) * multiplier);
    if crit {
        damage = round_half_up(damage * CRIT_FACTOR);
    }
    Hit {
        amount: (damage.max(0.0) as u32).max(MIN_DAMAGE),
        crit,
    }
}
