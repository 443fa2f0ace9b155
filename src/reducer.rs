use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::battle::simulate;
use crate::catalog::Catalog;
use crate::config::step_batch_size;
use crate::damage::RandomDamage;
use crate::effect::Effect;
use crate::selection::Slot;
use crate::state::{AppState, LOAD_ERROR_MESSAGE, NEED_TWO_MESSAGE};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init | Action::CatalogLoad => start_load(state),

        Action::CatalogDidLoad {
            generation,
            entities,
        } => {
            if generation != state.load_generation {
                tracing::warn!(
                    generation,
                    current = state.load_generation,
                    "discarding stale catalog"
                );
                return DispatchResult::unchanged();
            }
            let catalog = Catalog::from_entities(entities);
            tracing::info!(generation, count = catalog.len(), "catalog loaded");
            state.type_list = catalog.distinct_types();
            if let Some(tag) = &state.type_filter {
                if !state.type_list.contains(tag) {
                    state.type_filter = None;
                }
            }
            if state.selection.retain(&catalog) {
                tracing::debug!("selection pruned after reload");
            }
            state.catalog = DataResource::Loaded(catalog);
            state.message = None;
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::CatalogDidError { generation, error } => {
            if generation != state.load_generation {
                tracing::warn!(
                    generation,
                    current = state.load_generation,
                    "discarding stale catalog error"
                );
                return DispatchResult::unchanged();
            }
            tracing::warn!(generation, %error, "catalog load failed");
            state.catalog = DataResource::Failed(error);
            state.type_list.clear();
            state.cursor = 0;
            state.message = Some(LOAD_ERROR_MESSAGE.to_string());
            DispatchResult::changed()
        }

        Action::BatchSizeNext => change_batch_size(state, 1),
        Action::BatchSizePrev => change_batch_size(state, -1),

        Action::SearchStart => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::SearchSubmit => {
            state.search.active = false;
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::TypeFilterNext => cycle_filter(state, 1),
        Action::TypeFilterPrev => cycle_filter(state, -1),

        Action::TypeFilterClear => {
            if state.type_filter.is_none() {
                return DispatchResult::unchanged();
            }
            state.type_filter = None;
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::CursorMove(delta) => {
            let index = clamp_index(state.cursor, state.filtered_len(), delta);
            if !state.set_cursor(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::CursorPage(delta) => {
            let page = list_page_size(state) as i16;
            let index = clamp_index(state.cursor, state.filtered_len(), delta * page);
            if !state.set_cursor(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::CursorSet(index) => {
            if !state.set_cursor(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SelectCurrent => match state.entity_under_cursor().map(|entity| entity.id) {
            Some(id) => select_id(state, id),
            None => DispatchResult::unchanged(),
        },

        Action::SelectId(id) => select_id(state, id),

        Action::SelectionClear => {
            if state.selection.is_empty() && state.battle.is_none() && state.message.is_none() {
                return DispatchResult::unchanged();
            }
            state.selection.clear();
            state.clear_battle();
            state.message = None;
            DispatchResult::changed()
        }

        Action::SpriteDidLoad { id, sprite } => {
            state.sprites.insert(id, DataResource::Loaded(sprite));
            DispatchResult::changed()
        }

        Action::SpriteDidError { id, error } => {
            tracing::warn!(id, %error, "sprite load failed");
            state.sprites.insert(id, DataResource::Failed(error));
            DispatchResult::changed()
        }

        Action::BattleStart => start_battle(state),

        Action::LogScroll(delta) => {
            let len = state
                .battle
                .as_ref()
                .map(|result| result.log.len())
                .unwrap_or(0);
            let next = clamp_index(state.log_scroll.min(len.saturating_sub(1)), len, delta);
            if next == state.log_scroll {
                return DispatchResult::unchanged();
            }
            state.log_scroll = next;
            DispatchResult::changed()
        }

        Action::FocusToggle => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.focus_toggle();
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Tick => {
            state.tick = state.tick.wrapping_add(1);
            if state.catalog.is_loading() {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn start_load(state: &mut AppState) -> DispatchResult<Effect> {
    state.load_generation += 1;
    state.catalog = DataResource::Loading;
    state.cursor = 0;
    state.clear_battle();
    state.message = None;
    tracing::info!(
        generation = state.load_generation,
        limit = state.batch_size,
        "catalog load started"
    );
    DispatchResult::changed_with(Effect::LoadCatalog {
        generation: state.load_generation,
        limit: state.batch_size,
    })
}

fn change_batch_size(state: &mut AppState, direction: i8) -> DispatchResult<Effect> {
    let next = step_batch_size(state.batch_size, direction);
    if next == state.batch_size {
        return DispatchResult::unchanged();
    }
    state.batch_size = next;
    start_load(state)
}

fn cycle_filter(state: &mut AppState, step: i16) -> DispatchResult<Effect> {
    if state.type_list.is_empty() {
        return DispatchResult::unchanged();
    }

    // Index 0 is "all types", so the cycle has one more stop than the list.
    let stops = state.type_list.len() as i16 + 1;
    let current = state
        .type_filter
        .as_ref()
        .and_then(|name| state.type_list.iter().position(|t| t == name))
        .map(|idx| idx as i16 + 1)
        .unwrap_or(0);
    let next = (current + step).rem_euclid(stops);

    state.type_filter = if next == 0 {
        None
    } else {
        Some(state.type_list[(next - 1) as usize].clone())
    };
    state.rebuild_filtered();
    DispatchResult::changed()
}

fn select_id(state: &mut AppState, id: u32) -> DispatchResult<Effect> {
    let DataResource::Loaded(catalog) = &state.catalog else {
        return DispatchResult::unchanged();
    };
    let Some(entity) = catalog.get(id) else {
        return DispatchResult::unchanged();
    };
    let change = state.selection.select(entity, catalog);
    tracing::debug!(id, ?change, "selection changed");
    if state.message.as_deref() == Some(NEED_TWO_MESSAGE) {
        state.message = None;
    }
    DispatchResult::changed_with_many(request_sprites(state))
}

/// One fetch per slotted entity whose artwork was never requested.
fn request_sprites(state: &mut AppState) -> Vec<Effect> {
    let pending: Vec<(u32, String)> = [Slot::Left, Slot::Right]
        .into_iter()
        .filter_map(|slot| state.slot_entity(slot))
        .filter(|entity| !state.sprites.contains_key(&entity.id))
        .filter_map(|entity| Some((entity.id, entity.sprite.clone()?)))
        .collect();

    pending
        .into_iter()
        .map(|(id, url)| {
            state.sprites.insert(id, DataResource::Loading);
            Effect::LoadSprite { id, url }
        })
        .collect()
}

fn start_battle(state: &mut AppState) -> DispatchResult<Effect> {
    let (Some(left), Some(right)) = (
        state.slot_entity(Slot::Left).cloned(),
        state.slot_entity(Slot::Right).cloned(),
    ) else {
        state.message = Some(NEED_TWO_MESSAGE.to_string());
        return DispatchResult::changed();
    };

    let mut roller = RandomDamage::new(StdRng::seed_from_u64(state.rng_seed));
    match simulate(&left, &right, &mut roller) {
        Ok(result) => {
            state.rng_seed = roller.into_inner().gen();
            tracing::debug!(
                winner = %result.winner.name,
                rounds = result.rounds,
                "battle finished"
            );
            state.log_scroll = result.log.len().saturating_sub(1);
            state.battle = Some(result);
            state.message = None;
        }
        Err(err) => {
            state.message = Some(err.to_string());
        }
    }
    DispatchResult::changed()
}

fn clamp_index(current: usize, len: usize, delta: i16) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + delta as i64;
    next.clamp(0, len as i64 - 1) as usize
}

fn list_page_size(state: &AppState) -> usize {
    state.terminal_size.1.saturating_sub(8).max(1) as usize
}
