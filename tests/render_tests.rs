//! Full-screen renders through RenderHarness.

use pokebattle::{
    action::Action,
    entity::{Entity, Stats},
    reducer::reducer,
    sprite::SpriteImage,
    state::{AppState, NEED_TWO_MESSAGE},
    ui::BattleUi,
};
use tui_dispatch::testing::*;
use tui_dispatch::DataResource;

fn loaded_state() -> AppState {
    let mut state = AppState::new(50, 11);
    reducer(&mut state, Action::Init);
    reducer(
        &mut state,
        Action::CatalogDidLoad {
            generation: 1,
            entities: vec![
                Entity::new(
                    1,
                    "Bulbasaur",
                    vec!["grass".into(), "poison".into()],
                    Stats::default(),
                ),
                Entity::new(4, "Charmander", vec!["fire".into()], Stats::default()),
            ],
        },
    );
    state
}

fn render(state: &AppState) -> String {
    let mut render = RenderHarness::new(140, 30);
    let mut ui = BattleUi::new();
    render.render_to_string_plain(|frame| ui.render(frame, frame.area(), state))
}

#[test]
fn test_render_loading() {
    let state = AppState {
        catalog: DataResource::Loading,
        ..Default::default()
    };
    let output = render(&state);
    assert!(output.contains("Loading..."));
    assert!(output.contains("SELECT FROM GRID"));
}

#[test]
fn test_render_error() {
    let mut state = AppState::default();
    reducer(&mut state, Action::Init);
    reducer(
        &mut state,
        Action::CatalogDidError {
            generation: 1,
            error: "offline".into(),
        },
    );
    let output = render(&state);
    assert!(output.contains("Error"));
    assert!(output.contains("Error loading data from PokeAPI"));
}

#[test]
fn test_render_catalog_and_slots() {
    let mut state = loaded_state();
    reducer(&mut state, Action::SelectId(4));
    let output = render(&state);

    assert!(output.contains("2 Loaded"));
    assert!(output.contains("#001 Bulbasaur"));
    assert!(output.contains("L #004 Charmander"));
    assert!(output.contains("HP 50 • ATK 50 • DEF 50 • SPD 50"));
    assert!(output.contains("NO IMAGE"));
    assert!(output.contains("SELECT FROM GRID"));
    assert!(output.contains("No Pokémon Selected"));
}

#[test]
fn test_render_battle_result() {
    let mut state = loaded_state();
    reducer(&mut state, Action::SelectId(1));
    reducer(&mut state, Action::SelectId(4));
    reducer(&mut state, Action::BattleStart);
    let banner = state
        .battle
        .as_ref()
        .map(|result| result.banner())
        .unwrap_or_default();

    let output = render(&state);
    assert!(output.contains(&banner));
    assert!(output.contains("knocks out"));
}

#[test]
fn test_render_needs_two_message() {
    let mut state = loaded_state();
    reducer(&mut state, Action::BattleStart);
    let output = render(&state);
    assert!(output.contains("SELECT TWO POKÉMON FIRST."));
}

#[test]
fn test_render_load_error_survives_other_messages() {
    let mut state = AppState::default();
    reducer(&mut state, Action::Init);
    reducer(
        &mut state,
        Action::CatalogDidError {
            generation: 1,
            error: "offline".into(),
        },
    );
    assert!(render(&state).contains("Error loading data from PokeAPI"));

    reducer(&mut state, Action::BattleStart);
    let output = render(&state);
    assert!(output.contains("Error loading data from PokeAPI"));
    assert!(output.contains(NEED_TWO_MESSAGE));

    reducer(&mut state, Action::SelectionClear);
    assert_eq!(state.message, None);
    let output = render(&state);
    assert!(output.contains("Error loading data from PokeAPI"));
    assert!(output.contains("Error"));
}

#[test]
fn test_render_slot_sprite_states() {
    let mut state = loaded_state();
    reducer(&mut state, Action::SelectId(1));
    reducer(&mut state, Action::SelectId(4));
    state.sprites.insert(
        1,
        DataResource::Loaded(SpriteImage {
            payload: "iVBORw0KGgo=".into(),
            width: 96,
            height: 96,
        }),
    );
    state.sprites.insert(4, DataResource::Loading);

    let output = render(&state);
    assert!(output.contains("[loading sprite]"));
    assert!(!output.contains("NO IMAGE"));
    assert!(!output.contains("SELECT FROM GRID"));

    reducer(
        &mut state,
        Action::SpriteDidError {
            id: 4,
            error: "404".into(),
        },
    );
    let output = render(&state);
    assert!(output.contains("NO IMAGE"));
    assert!(!output.contains("[loading sprite]"));
}
