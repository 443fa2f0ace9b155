use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::battle::BattleResult;
use crate::catalog::Catalog;
use crate::config::DEFAULT_BATCH_SIZE;
use crate::entity::Entity;
use crate::selection::{Selection, Slot};
use crate::sprite::SpriteImage;

pub const LOAD_ERROR_MESSAGE: &str =
    "Error loading data from PokeAPI. Check your connection and reload.";
pub const NEED_TWO_MESSAGE: &str = "SELECT TWO POKÉMON FIRST.";
pub const DEFAULT_SEED: u64 = 0x5EED_BA77;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusArea {
    Grid,
    Log,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub focus: FocusArea,

    pub catalog: DataResource<Catalog>,
    pub load_generation: u64,
    pub batch_size: u32,

    pub search: SearchState,
    pub type_list: Vec<String>,
    pub type_filter: Option<String>,
    pub cursor: usize,

    pub selection: Selection,
    /// Slot artwork by entity id. Kept across reloads.
    pub sprites: HashMap<u32, DataResource<SpriteImage>>,
    pub battle: Option<BattleResult>,
    pub log_scroll: usize,
    pub rng_seed: u64,

    pub message: Option<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_SEED)
    }
}

impl AppState {
    pub fn new(batch_size: u32, rng_seed: u64) -> Self {
        Self {
            terminal_size: (80, 24),
            focus: FocusArea::Grid,
            catalog: DataResource::Empty,
            load_generation: 0,
            batch_size,
            search: SearchState::default(),
            type_list: Vec::new(),
            type_filter: None,
            cursor: 0,
            selection: Selection::default(),
            sprites: HashMap::new(),
            battle: None,
            log_scroll: 0,
            rng_seed,
            message: None,
            tick: 0,
        }
    }

    /// Header indicator: `N Loaded` counts the filtered view.
    pub fn count_label(&self) -> String {
        match &self.catalog {
            DataResource::Loaded(catalog) => format!("{} Loaded", catalog.filtered_ids().len()),
            DataResource::Loading => "Loading...".to_string(),
            DataResource::Failed(_) => "Error".to_string(),
            DataResource::Empty => String::new(),
        }
    }

    pub fn loaded_catalog(&self) -> Option<&Catalog> {
        self.catalog.data()
    }

    pub fn filtered_len(&self) -> usize {
        self.loaded_catalog()
            .map(|catalog| catalog.filtered_ids().len())
            .unwrap_or(0)
    }

    pub fn entity_under_cursor(&self) -> Option<&Entity> {
        self.loaded_catalog()?.filtered_at(self.cursor)
    }

    pub fn slot_entity(&self, slot: Slot) -> Option<&Entity> {
        let id = self.selection.get(slot)?;
        self.loaded_catalog()?.get(id)
    }

    pub fn set_cursor(&mut self, index: usize) -> bool {
        let len = self.filtered_len();
        let bounded = if len == 0 { 0 } else { index.min(len - 1) };
        if bounded != self.cursor {
            self.cursor = bounded;
            return true;
        }
        false
    }

    /// Recomputes the filtered view from the current query and type filter.
    pub fn rebuild_filtered(&mut self) {
        let query = self.search.query.clone();
        let type_filter = self.type_filter.clone();
        if let DataResource::Loaded(catalog) = &mut self.catalog {
            catalog.apply_filter(&query, type_filter.as_deref());
        }
        let len = self.filtered_len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    pub fn clear_battle(&mut self) {
        self.battle = None;
        self.log_scroll = 0;
    }

    pub fn focus_toggle(&mut self) {
        self.focus = match self.focus {
            FocusArea::Grid => FocusArea::Log,
            FocusArea::Log => FocusArea::Grid,
        };
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let catalog = self.loaded_catalog();
        vec![
            DebugSection::new("Catalog")
                .entry("status", ron_string(&self.count_label()))
                .entry("total", ron_string(&catalog.map(Catalog::len).unwrap_or(0)))
                .entry("filtered", ron_string(&self.filtered_len()))
                .entry("generation", ron_string(&self.load_generation))
                .entry("batch_size", ron_string(&self.batch_size))
                .entry("cursor", ron_string(&self.cursor)),
            DebugSection::new("Filters")
                .entry("search", ron_string(&self.search.query))
                .entry("search_active", ron_string(&self.search.active))
                .entry("type", ron_string(&self.type_filter))
                .entry("focus", ron_string(&self.focus)),
            DebugSection::new("Battle")
                .entry("left", ron_string(&self.selection.left))
                .entry("right", ron_string(&self.selection.right))
                .entry(
                    "sprites_loaded",
                    ron_string(&self.sprites.values().filter(|s| s.is_loaded()).count()),
                )
                .entry(
                    "result",
                    ron_string(&self.battle.as_ref().map(BattleResult::banner)),
                )
                .entry("log_scroll", ron_string(&self.log_scroll))
                .entry("rng_seed", ron_string(&self.rng_seed))
                .entry("message", ron_string(&self.message)),
        ]
    }
}
