use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::sprite::SpriteImage;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    CatalogLoad,
    CatalogDidLoad { generation: u64, entities: Vec<Entity> },
    CatalogDidError { generation: u64, error: String },
    BatchSizeNext,
    BatchSizePrev,

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    TypeFilterNext,
    TypeFilterPrev,
    TypeFilterClear,

    CursorMove(i16),
    CursorPage(i16),
    CursorSet(usize),
    SelectCurrent,
    SelectId(u32),
    SelectionClear,

    SpriteDidLoad { id: u32, sprite: SpriteImage },
    SpriteDidError { id: u32, error: String },

    BattleStart,
    LogScroll(i16),

    FocusToggle,
    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
