use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::entity::Entity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Left,
    Right,
}

impl Slot {
    pub fn label(self) -> &'static str {
        match self {
            Slot::Left => "L",
            Slot::Right => "R",
        }
    }
}

/// What a `select` call did to the slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotChange {
    Cleared(Slot),
    Filled(Slot),
    Replaced(Slot),
}

/// Two battle slots holding catalog ids. An id never sits in both.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub left: Option<u32>,
    pub right: Option<u32>,
}

impl Selection {
    pub fn select(&mut self, entity: &Entity, catalog: &Catalog) -> SlotChange {
        let id = entity.id;
        if self.left == Some(id) {
            self.left = None;
            return SlotChange::Cleared(Slot::Left);
        }
        if self.right == Some(id) {
            self.right = None;
            return SlotChange::Cleared(Slot::Right);
        }
        if self.left.is_none() {
            self.left = Some(id);
            return SlotChange::Filled(Slot::Left);
        }
        if self.right.is_none() {
            self.right = Some(id);
            return SlotChange::Filled(Slot::Right);
        }

        // Both full: the weaker occupant makes room, left on ties.
        let left_power = self.power_in(Slot::Left, catalog);
        let right_power = self.power_in(Slot::Right, catalog);
        if left_power <= right_power {
            self.left = Some(id);
            SlotChange::Replaced(Slot::Left)
        } else {
            self.right = Some(id);
            SlotChange::Replaced(Slot::Right)
        }
    }

    pub fn clear(&mut self) {
        self.left = None;
        self.right = None;
    }

    /// Empties any slot whose entity is no longer in `catalog`.
    pub fn retain(&mut self, catalog: &Catalog) -> bool {
        let before = self.clone();
        self.left = self.left.filter(|id| catalog.contains(*id));
        self.right = self.right.filter(|id| catalog.contains(*id));
        *self != before
    }

    pub fn get(&self, slot: Slot) -> Option<u32> {
        match slot {
            Slot::Left => self.left,
            Slot::Right => self.right,
        }
    }

    pub fn slot_of(&self, id: u32) -> Option<Slot> {
        if self.left == Some(id) {
            Some(Slot::Left)
        } else if self.right == Some(id) {
            Some(Slot::Right)
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn pair(&self) -> Option<(u32, u32)> {
        Some((self.left?, self.right?))
    }

    // An occupant missing from the catalog scores 0 so it is replaced first.
    fn power_in(&self, slot: Slot, catalog: &Catalog) -> u32 {
        self.get(slot)
            .and_then(|id| catalog.get(id))
            .map(|entity| entity.power)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Stats;

    fn entity(id: u32, hp: u32) -> Entity {
        Entity::new(
            id,
            format!("Mon{id}"),
            vec!["normal".into()],
            Stats {
                hp,
                ..Stats::default()
            },
        )
    }

    fn catalog() -> Catalog {
        Catalog::from_entities(vec![
            entity(1, 50),
            entity(2, 100),
            entity(3, 80),
            entity(4, 50),
        ])
    }

    fn pick(selection: &mut Selection, catalog: &Catalog, id: u32) -> SlotChange {
        let entity = catalog.get(id).cloned().expect("entity in catalog");
        selection.select(&entity, catalog)
    }

    #[test]
    fn fills_left_then_right() {
        let catalog = catalog();
        let mut selection = Selection::default();
        assert_eq!(pick(&mut selection, &catalog, 1), SlotChange::Filled(Slot::Left));
        assert_eq!(pick(&mut selection, &catalog, 2), SlotChange::Filled(Slot::Right));
        assert_eq!(selection.pair(), Some((1, 2)));
        assert!(selection.is_ready());
    }

    #[test]
    fn selecting_twice_toggles_back_to_empty() {
        let catalog = catalog();
        let mut selection = Selection::default();
        pick(&mut selection, &catalog, 3);
        assert_eq!(pick(&mut selection, &catalog, 3), SlotChange::Cleared(Slot::Left));
        assert!(selection.is_empty());
    }

    #[test]
    fn deselecting_right_leaves_left() {
        let catalog = catalog();
        let mut selection = Selection::default();
        pick(&mut selection, &catalog, 1);
        pick(&mut selection, &catalog, 2);
        assert_eq!(pick(&mut selection, &catalog, 2), SlotChange::Cleared(Slot::Right));
        assert_eq!(selection.left, Some(1));
        assert_eq!(selection.right, None);
    }

    #[test]
    fn empty_left_is_refilled_before_right() {
        let catalog = catalog();
        let mut selection = Selection::default();
        pick(&mut selection, &catalog, 1);
        pick(&mut selection, &catalog, 2);
        pick(&mut selection, &catalog, 1);
        assert_eq!(pick(&mut selection, &catalog, 3), SlotChange::Filled(Slot::Left));
        assert_eq!(selection.pair(), Some((3, 2)));
    }

    #[test]
    fn third_pick_replaces_weaker_slot() {
        let catalog = catalog();
        let mut selection = Selection::default();
        pick(&mut selection, &catalog, 2);
        pick(&mut selection, &catalog, 1);
        // left (id 2) outscores right (id 1)
        assert_eq!(pick(&mut selection, &catalog, 3), SlotChange::Replaced(Slot::Right));
        assert_eq!(selection.pair(), Some((2, 3)));
    }

    #[test]
    fn equal_scores_replace_left() {
        let catalog = catalog();
        let mut selection = Selection::default();
        pick(&mut selection, &catalog, 1);
        pick(&mut selection, &catalog, 4);
        assert_eq!(pick(&mut selection, &catalog, 2), SlotChange::Replaced(Slot::Left));
        assert_eq!(selection.pair(), Some((2, 4)));
    }

    #[test]
    fn replacement_changes_exactly_one_slot() {
        let catalog = catalog();
        for (first, second, third) in [(1, 2, 3), (2, 1, 3), (3, 4, 2), (4, 1, 3)] {
            let mut selection = Selection::default();
            pick(&mut selection, &catalog, first);
            pick(&mut selection, &catalog, second);
            let before = selection.clone();
            pick(&mut selection, &catalog, third);
            let changed = [
                before.left != selection.left,
                before.right != selection.right,
            ];
            assert_eq!(changed.iter().filter(|c| **c).count(), 1);
            assert_ne!(selection.left, selection.right);
        }
    }

    #[test]
    fn clear_empties_both() {
        let catalog = catalog();
        let mut selection = Selection::default();
        pick(&mut selection, &catalog, 1);
        pick(&mut selection, &catalog, 2);
        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn retain_drops_ids_missing_after_reload() {
        let catalog = catalog();
        let mut selection = Selection::default();
        pick(&mut selection, &catalog, 1);
        pick(&mut selection, &catalog, 3);

        let smaller = Catalog::from_entities(vec![entity(1, 50), entity(2, 100)]);
        assert!(selection.retain(&smaller));
        assert_eq!(selection.left, Some(1));
        assert_eq!(selection.right, None);
        assert!(!selection.retain(&smaller));
    }
}
