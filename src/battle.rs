//! Turn-based battle between two catalog entities.
//!
//! Control flow is fixed by the two entities; only damage amounts and
//! crits come from the injected [`DamageRoll`].

use serde::{Deserialize, Serialize};

use crate::damage::DamageRoll;
use crate::entity::Entity;
use crate::error::BattleError;

pub const MAX_ROUNDS: u32 = 30;
/// Working hit points are base HP times this, so fights last several rounds.
pub const HP_SCALE: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    System,
    Hit,
    CriticalHit,
    Knockout,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub text: String,
}

impl LogEntry {
    fn new(kind: LogKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: u32,
    pub name: String,
    pub hp_left: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub winner: Combatant,
    pub loser: Combatant,
    pub rounds: u32,
    pub tie_break: bool,
    pub log: Vec<LogEntry>,
}

impl BattleResult {
    pub fn banner(&self) -> String {
        format!(
            "{} WINS IN {} ROUNDS!",
            self.winner.name.to_uppercase(),
            self.rounds
        )
    }
}

struct Side<'a> {
    entity: &'a Entity,
    hp: u32,
}

/// Runs one battle. `a` wins every speed tie, both for the opening turn
/// and for an equal-HP finish.
pub fn simulate<D: DamageRoll>(
    a: &Entity,
    b: &Entity,
    roller: &mut D,
) -> Result<BattleResult, BattleError> {
    if a.id == b.id {
        return Err(BattleError::SameEntity(a.name.clone()));
    }

    let mut sides = [
        Side {
            entity: a,
            hp: a.stats.hp.saturating_mul(HP_SCALE),
        },
        Side {
            entity: b,
            hp: b.stats.hp.saturating_mul(HP_SCALE),
        },
    ];
    let mut log = vec![LogEntry::new(
        LogKind::System,
        format!("Battle started: {} vs {}", a.name, b.name),
    )];

    let mut attacker = if a.stats.speed >= b.stats.speed { 0 } else { 1 };
    let mut rounds = 0;

    while rounds < MAX_ROUNDS && sides.iter().all(|side| side.hp > 0) {
        rounds += 1;
        let defender = 1 - attacker;
        let hit = roller.roll(&sides[attacker].entity.stats, &sides[defender].entity.stats);
        sides[defender].hp = sides[defender].hp.saturating_sub(hit.amount);

        let text = format!(
            "{} hits {} for {} damage (HP {})",
            sides[attacker].entity.name,
            sides[defender].entity.name,
            hit.amount,
            sides[defender].hp
        );
        log.push(if hit.crit {
            LogEntry::new(LogKind::CriticalHit, format!("Critical! {text}"))
        } else {
            LogEntry::new(LogKind::Hit, text)
        });

        if sides[defender].hp == 0 {
            break;
        }
        attacker = defender;
    }

    let tie_break = sides[0].hp == sides[1].hp;
    let winner = if tie_break {
        log.push(LogEntry::new(
            LogKind::System,
            "Tie resolved: higher speed wins.",
        ));
        if a.stats.speed >= b.stats.speed {
            0
        } else {
            1
        }
    } else if sides[0].hp > sides[1].hp {
        0
    } else {
        1
    };
    let loser = 1 - winner;

    log.push(LogEntry::new(
        LogKind::Knockout,
        format!(
            "{} knocks out {}!",
            sides[winner].entity.name, sides[loser].entity.name
        ),
    ));

    Ok(BattleResult {
        winner: combatant(&sides[winner]),
        loser: combatant(&sides[loser]),
        rounds,
        tie_break,
        log,
    })
}

fn combatant(side: &Side<'_>) -> Combatant {
    Combatant {
        id: side.entity.id,
        name: side.entity.name.clone(),
        hp_left: side.hp,
    }
}
