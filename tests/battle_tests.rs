//! End-to-end battles over mapped records.

use pokebattle::battle::{simulate, LogKind, MAX_ROUNDS};
use pokebattle::damage::{DamageRoll, Hit, RandomDamage};
use pokebattle::entity::Stats;
use pokebattle::mapper::{map_creature, RawCreature};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

struct FixedDamage(u32);

impl DamageRoll for FixedDamage {
    fn roll(&mut self, _attacker: &Stats, _defender: &Stats) -> Hit {
        Hit {
            amount: self.0,
            crit: false,
        }
    }
}

fn record(id: u32, name: &str, hp: u32, speed: u32) -> RawCreature {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "stats": [
            { "base_stat": hp, "stat": { "name": "hp" } },
            { "base_stat": speed, "stat": { "name": "speed" } }
        ],
        "types": [{ "slot": 1, "type": { "name": "normal" } }],
        "sprites": { "front_default": null }
    }))
    .expect("valid record")
}

#[test]
fn fixed_forty_damage_scenario() {
    let a = map_creature(record(1, "alpha", 100, 50));
    let b = map_creature(record(2, "beta", 100, 30));

    let result = simulate(&a, &b, &mut FixedDamage(40)).expect("distinct entities");

    assert_eq!(result.rounds, 9);
    assert_eq!(result.winner.name, "Alpha");
    assert_eq!(result.winner.hp_left, 40);
    assert_eq!(result.loser.name, "Beta");
    assert_eq!(result.loser.hp_left, 0);
    assert_eq!(result.log.len(), 11);
    assert_eq!(result.log[0].text, "Battle started: Alpha vs Beta");
    assert_eq!(result.log[1].text, "Alpha hits Beta for 40 damage (HP 160)");
    assert_eq!(result.log[2].text, "Beta hits Alpha for 40 damage (HP 160)");
    assert_eq!(result.log[9].text, "Alpha hits Beta for 40 damage (HP 0)");
    assert_eq!(result.log[10].text, "Alpha knocks out Beta!");
    assert_eq!(result.banner(), "ALPHA WINS IN 9 ROUNDS!");
}

#[test]
fn seeded_battles_between_mapped_records_are_well_formed() {
    let roster: Vec<_> = [
        record(10, "caterpie", 45, 45),
        record(95, "onix", 35, 70),
        record(143, "snorlax", 160, 30),
        record(150, "mewtwo", 106, 130),
    ]
    .into_iter()
    .map(map_creature)
    .collect();

    for seed in 0..20 {
        let mut roller = RandomDamage::new(StdRng::seed_from_u64(seed));
        for a in &roster {
            for b in &roster {
                if a.id == b.id {
                    continue;
                }
                let result = simulate(a, b, &mut roller).expect("distinct entities");
                assert!(result.rounds >= 1 && result.rounds <= MAX_ROUNDS);
                assert!(result.winner.hp_left >= result.loser.hp_left);
                assert_eq!(result.log.first().map(|e| e.kind), Some(LogKind::System));
                assert_eq!(result.log.last().map(|e| e.kind), Some(LogKind::Knockout));
                let tie_logged = result
                    .log
                    .iter()
                    .any(|e| e.text == "Tie resolved: higher speed wins.");
                assert_eq!(tie_logged, result.tie_break);
            }
        }
    }
}

#[test]
fn oversized_hp_record_saturates_instead_of_overflowing() {
    let giant = map_creature(record(1, "giant", 3_000_000_000, 10));
    let beta = map_creature(record(2, "beta", 100, 30));

    let result = simulate(&giant, &beta, &mut FixedDamage(40)).expect("distinct entities");
    assert_eq!(result.winner.name, "Giant");
    assert_eq!(result.rounds, 10);
    assert_eq!(result.winner.hp_left, u32::MAX - 5 * 40);

    let mut roller = RandomDamage::new(StdRng::seed_from_u64(3));
    let result = simulate(&beta, &giant, &mut roller).expect("distinct entities");
    assert_eq!(result.winner.id, 1);
}
