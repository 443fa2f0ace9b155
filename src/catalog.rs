use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Loaded entities plus the ids currently passing the search/type filter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entities: Vec<Entity>,
    filtered: Vec<u32>,
}

impl Catalog {
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let mut catalog = Self::default();
        catalog.load(entities);
        catalog
    }

    /// Replaces the full list. The filtered view is reset to everything.
    pub fn load(&mut self, mut entities: Vec<Entity>) {
        entities.sort_by_key(|entity| entity.id);
        self.filtered = entities.iter().map(|entity| entity.id).collect();
        self.entities = entities;
    }

    pub fn filter(&self, query: &str, type_tag: Option<&str>) -> Vec<&Entity> {
        let query = query.trim().to_lowercase();
        self.entities
            .iter()
            .filter(|entity| matches(entity, &query, type_tag))
            .collect()
    }

    /// Recomputes the stored filtered view and returns its length.
    pub fn apply_filter(&mut self, query: &str, type_tag: Option<&str>) -> usize {
        self.filtered = self
            .filter(query, type_tag)
            .into_iter()
            .map(|entity| entity.id)
            .collect();
        self.filtered.len()
    }

    pub fn distinct_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .entities
            .iter()
            .flat_map(|entity| entity.types.iter().cloned())
            .collect();
        types.sort();
        types.dedup();
        types
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |entity| entity.id)
            .ok()
            .and_then(|idx| self.entities.get(idx))
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn filtered_ids(&self) -> &[u32] {
        &self.filtered
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.filtered.iter().filter_map(|id| self.get(*id))
    }

    pub fn filtered_at(&self, index: usize) -> Option<&Entity> {
        self.filtered.get(index).and_then(|id| self.get(*id))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn matches(entity: &Entity, query: &str, type_tag: Option<&str>) -> bool {
    let matches_name = query.is_empty() || entity.name.to_lowercase().contains(query);
    let matches_type = type_tag.map_or(true, |tag| entity.has_type(tag));
    matches_name && matches_type
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Stats;

    fn entity(id: u32, name: &str, types: &[&str]) -> Entity {
        Entity::new(
            id,
            name,
            types.iter().map(|t| t.to_string()).collect(),
            Stats::default(),
        )
    }

    fn sample() -> Catalog {
        Catalog::from_entities(vec![
            entity(4, "Charmander", &["fire"]),
            entity(1, "Bulbasaur", &["grass", "poison"]),
            entity(7, "Squirtle", &["water"]),
            entity(6, "Charizard", &["fire", "flying"]),
        ])
    }

    fn ids(list: &[&Entity]) -> Vec<u32> {
        list.iter().map(|entity| entity.id).collect()
    }

    #[test]
    fn load_sorts_by_id_and_resets_view() {
        let mut catalog = sample();
        catalog.apply_filter("char", None);
        assert_eq!(catalog.filtered_ids(), &[4, 6]);

        catalog.load(vec![entity(9, "Blastoise", &["water"]), entity(8, "Wartortle", &["water"])]);
        assert_eq!(catalog.filtered_ids(), &[8, 9]);
        assert_eq!(catalog.entities()[0].id, 8);
    }

    #[test]
    fn empty_query_without_type_returns_everything_in_order() {
        let catalog = sample();
        assert_eq!(ids(&catalog.filter("", None)), vec![1, 4, 6, 7]);
        assert_eq!(ids(&catalog.filter("   ", None)), vec![1, 4, 6, 7]);
    }

    #[test]
    fn query_is_case_insensitive_substring() {
        let catalog = sample();
        assert_eq!(ids(&catalog.filter("CHAR", None)), vec![4, 6]);
        assert_eq!(ids(&catalog.filter("saur", None)), vec![1]);
        assert!(catalog.filter("mew", None).is_empty());
    }

    #[test]
    fn type_filter_is_exact_and_combines_with_query() {
        let catalog = sample();
        assert_eq!(ids(&catalog.filter("", Some("fire"))), vec![4, 6]);
        assert_eq!(ids(&catalog.filter("zard", Some("fire"))), vec![6]);
        assert!(catalog.filter("", Some("Fire")).is_empty());
        assert!(catalog.filter("squirtle", Some("fire")).is_empty());
    }

    #[test]
    fn filter_is_idempotent_subsequence() {
        let catalog = sample();
        let first = ids(&catalog.filter("a", Some("fire")));
        let second = ids(&catalog.filter("a", Some("fire")));
        assert_eq!(first, second);

        let all: Vec<u32> = catalog.entities().iter().map(|e| e.id).collect();
        let mut cursor = all.iter();
        for id in &first {
            assert!(cursor.any(|candidate| candidate == id));
        }
    }

    #[test]
    fn distinct_types_sorted_without_duplicates() {
        assert_eq!(
            sample().distinct_types(),
            vec!["fire", "flying", "grass", "poison", "water"]
        );
        assert!(Catalog::default().distinct_types().is_empty());
    }

    #[test]
    fn filtered_at_follows_view() {
        let mut catalog = sample();
        catalog.apply_filter("", Some("water"));
        assert_eq!(catalog.filtered_at(0).map(|e| e.id), Some(7));
        assert!(catalog.filtered_at(1).is_none());
    }
}
