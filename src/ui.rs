use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{Component, DataResource, EventKind, EventOutcome};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::battle::{LogEntry, LogKind};
use crate::entity::Entity;
use crate::selection::Slot;
use crate::sprite;
use crate::sprite_backend;
use crate::state::{AppState, FocusArea, LOAD_ERROR_MESSAGE};

const BG_BASE: Color = Color::Rgb(12, 18, 28);
const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const ACCENT_RED: Color = Color::Rgb(249, 115, 115);

const SLOT_PLACEHOLDER: &str = "SELECT FROM GRID";
const EMPTY_SLOT_NAME: &str = "No Pokémon Selected";
const NO_IMAGE: &str = "NO IMAGE";
const SPRITE_LOADING: &str = "[loading sprite]";
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub struct BattleUi {
    grid: SelectList,
    status_bar: StatusBar,
    /// Rows of the last rendered card list, for mouse hits.
    grid_area: Rect,
    grid_offset: usize,
}

impl Default for BattleUi {
    fn default() -> Self {
        Self::new()
    }
}

impl BattleUi {
    pub fn new() -> Self {
        Self {
            grid: SelectList::new(),
            status_bar: StatusBar::new(),
            grid_area: Rect::default(),
            grid_offset: 0,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        render_header(frame, layout[0], state);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(48), Constraint::Percentage(52)])
            .split(layout[1]);
        self.render_grid(frame, body[0], state);
        render_arena(frame, body[1], state);

        render_footer(frame, layout[2], state, &mut self.status_bar);
    }

    pub fn handle_event(&mut self, event: &EventKind, state: &AppState) -> EventOutcome<Action> {
        match event {
            EventKind::Resize(width, height) => {
                EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
            }
            EventKind::Key(key) => self.handle_key(*key, event, state),
            EventKind::Mouse(mouse) => self.handle_click(*mouse, state),
            EventKind::Scroll { delta, .. } => {
                if *delta == 0 {
                    return EventOutcome::ignored();
                }
                match state.focus {
                    FocusArea::Grid => EventOutcome::action(Action::CursorMove((*delta * 3) as i16)),
                    FocusArea::Log => {
                        EventOutcome::action(Action::LogScroll((*delta).signum() as i16))
                    }
                }
            }
            _ => EventOutcome::ignored(),
        }
    }

    /// A left click on a card moves the cursor there and selects it.
    fn handle_click(&self, mouse: MouseEvent, state: &AppState) -> EventOutcome<Action> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return EventOutcome::ignored();
        }
        if !self.grid_area.contains(Position::new(mouse.column, mouse.row)) {
            return EventOutcome::ignored();
        }
        let index = self.grid_offset + (mouse.row - self.grid_area.y) as usize;
        match state.loaded_catalog().and_then(|catalog| catalog.filtered_at(index)) {
            Some(entity) => {
                EventOutcome::actions([Action::CursorSet(index), Action::SelectId(entity.id)])
            }
            None => EventOutcome::ignored(),
        }
    }

    fn handle_key(
        &mut self,
        key: KeyEvent,
        event: &EventKind,
        state: &AppState,
    ) -> EventOutcome<Action> {
        if key.kind == KeyEventKind::Release {
            return EventOutcome::ignored();
        }
        if state.search.active {
            return handle_search_key(key);
        }

        let global = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Tab => Some(Action::FocusToggle),
            KeyCode::Char('/') => Some(Action::SearchStart),
            KeyCode::Char('[') => Some(Action::TypeFilterPrev),
            KeyCode::Char(']') => Some(Action::TypeFilterNext),
            KeyCode::Char('c') => Some(Action::TypeFilterClear),
            KeyCode::Char('-') => Some(Action::BatchSizePrev),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::BatchSizeNext),
            KeyCode::Char('b') => Some(Action::BattleStart),
            KeyCode::Char('x') => Some(Action::SelectionClear),
            KeyCode::Char('r') => Some(Action::CatalogLoad),
            KeyCode::Esc if !state.search.query.is_empty() => Some(Action::SearchCancel),
            _ => None,
        };
        if let Some(action) = global {
            return EventOutcome::action(action);
        }

        match state.focus {
            FocusArea::Grid => self.handle_grid_key(key, event, state),
            FocusArea::Log => handle_log_key(key),
        }
    }

    fn handle_grid_key(
        &mut self,
        key: KeyEvent,
        event: &EventKind,
        state: &AppState,
    ) -> EventOutcome<Action> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => EventOutcome::action(Action::SelectCurrent),
            KeyCode::PageDown => EventOutcome::action(Action::CursorPage(1)),
            KeyCode::PageUp => EventOutcome::action(Action::CursorPage(-1)),
            _ => {
                let items = grid_items(state);
                if items.is_empty() {
                    return EventOutcome::ignored();
                }
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.cursor.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: grid_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::CursorSet,
                    render_item: &|item| item.clone(),
                };
                EventOutcome::from_actions(self.grid.handle_event(event, props))
            }
        }
    }

    fn render_grid(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("CATALOG")
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(focus_border(state, FocusArea::Grid));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.grid_area = Rect::default();

        let notice = match &state.catalog {
            DataResource::Loaded(_) => None,
            DataResource::Loading => Some(("Loading...", TEXT_DIM)),
            DataResource::Failed(_) => Some((LOAD_ERROR_MESSAGE, ACCENT_RED)),
            DataResource::Empty => Some(("", TEXT_DIM)),
        };
        if let Some((text, color)) = notice {
            let paragraph = Paragraph::new(text)
                .style(Style::default().fg(color))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, inner);
            return;
        }

        let items = grid_items(state);
        if items.is_empty() {
            let paragraph = Paragraph::new("No matches.").style(Style::default().fg(TEXT_DIM));
            frame.render_widget(paragraph, inner);
            return;
        }
        let selected = state.cursor.min(items.len().saturating_sub(1));
        let props = SelectListProps {
            items: &items,
            count: items.len(),
            selected,
            is_focused: state.focus == FocusArea::Grid,
            style: grid_style(),
            behavior: SelectListBehavior {
                show_scrollbar: true,
                wrap_navigation: false,
            },
            on_select: Action::CursorSet,
            render_item: &|item| item.clone(),
        };
        self.grid.render(frame, inner, props);

        // Mirrors the list's own scrolling so clicks map to the drawn rows.
        self.grid_offset = follow_cursor(
            self.grid_offset,
            selected,
            items.len(),
            inner.height as usize,
        );
        self.grid_area = Rect {
            x: inner.x.saturating_add(1),
            width: inner.width.saturating_sub(2),
            ..inner
        };
    }
}

fn follow_cursor(offset: usize, cursor: usize, count: usize, height: usize) -> usize {
    if height == 0 {
        return offset;
    }
    let offset = if cursor < offset {
        cursor
    } else if cursor >= offset + height {
        cursor + 1 - height
    } else {
        offset
    };
    offset.min(count.saturating_sub(height))
}

fn handle_search_key(key: KeyEvent) -> EventOutcome<Action> {
    match key.code {
        KeyCode::Esc => EventOutcome::action(Action::SearchCancel),
        KeyCode::Enter => EventOutcome::action(Action::SearchSubmit),
        KeyCode::Backspace => EventOutcome::action(Action::SearchBackspace),
        KeyCode::Char(ch) => EventOutcome::action(Action::SearchInput(ch)),
        _ => EventOutcome::ignored(),
    }
}

fn handle_log_key(key: KeyEvent) -> EventOutcome<Action> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => EventOutcome::action(Action::LogScroll(-1)),
        KeyCode::Down | KeyCode::Char('j') => EventOutcome::action(Action::LogScroll(1)),
        KeyCode::PageUp => EventOutcome::action(Action::LogScroll(-10)),
        KeyCode::PageDown => EventOutcome::action(Action::LogScroll(10)),
        _ => EventOutcome::ignored(),
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let search = if state.search.active {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let filter = state
        .type_filter
        .as_deref()
        .map(|name| name.to_ascii_uppercase())
        .unwrap_or_else(|| "ALL".to_string());
    let count_style = if state.catalog.is_failed() {
        Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(ACCENT_TEAL)
    };
    let mut spans = vec![
        Span::raw("Search: "),
        Span::styled(search, Style::default().fg(ACCENT_TEAL)),
        Span::raw("  |  Type: "),
        Span::styled(filter, Style::default().fg(ACCENT_GOLD)),
        Span::raw("  |  Batch: "),
        Span::styled(state.batch_size.to_string(), Style::default().fg(ACCENT_GOLD)),
        Span::raw("  |  "),
        Span::styled(state.count_label(), count_style),
    ];
    if state.catalog.is_loading() {
        let frame_idx = (state.tick as usize) % SPINNER.len();
        spans.push(Span::styled(
            format!(" {}", SPINNER[frame_idx]),
            Style::default().fg(ACCENT_TEAL),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM))
        .title(Span::styled(
            "POKÉBATTLE",
            Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
        ));
    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .style(Style::default().fg(TEXT_MAIN));
    frame.render_widget(paragraph, area);
}

fn render_arena(frame: &mut Frame, area: Rect, state: &AppState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(4)])
        .split(area);
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[0]);

    render_slot(frame, slots[0], Slot::Left, state);
    render_slot(frame, slots[1], Slot::Right, state);
    render_battle(frame, layout[1], state);
}

fn render_slot(frame: &mut Frame, area: Rect, slot: Slot, state: &AppState) {
    let entity = state.slot_entity(slot);
    let title = match slot {
        Slot::Left => "LEFT",
        Slot::Right => "RIGHT",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(if entity.is_some() {
            ACCENT_GOLD
        } else {
            TEXT_DIM
        }));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);
    render_slot_sprite(frame, layout[0], slot, entity, state);

    let text = match entity {
        Some(entity) => Text::from(vec![
            Line::from(Span::styled(
                entity.name.clone(),
                Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                entity.type_line(),
                Style::default().fg(ACCENT_GOLD),
            )),
            Line::from(entity.stats.summary_line()),
        ]),
        None => Text::from(Line::from(Span::styled(
            EMPTY_SLOT_NAME,
            Style::default().fg(TEXT_DIM),
        ))),
    };
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, layout[1]);
}

fn render_slot_sprite(
    frame: &mut Frame,
    area: Rect,
    slot: Slot,
    entity: Option<&Entity>,
    state: &AppState,
) {
    let image_id = sprite_image_id(slot);
    let placeholder = match entity.map(|entity| state.sprites.get(&entity.id)) {
        None => SLOT_PLACEHOLDER,
        Some(Some(DataResource::Loaded(image))) if area.width > 0 && area.height > 0 => {
            let (cols, rows) = sprite::fit_cells(image, area.width, area.height);
            let x = area.x.saturating_add(area.width.saturating_sub(cols) / 2);
            let y = area.y.saturating_add(area.height.saturating_sub(rows) / 2);
            let sequence = sprite::kitty_sequence(image, cols, rows, image_id);
            sprite_backend::place_sprite(image_id, x, y, sequence);
            return;
        }
        Some(Some(DataResource::Loading)) => SPRITE_LOADING,
        Some(_) => NO_IMAGE,
    };

    sprite_backend::remove_sprite(image_id);
    let row = Rect {
        y: area.y.saturating_add(area.height / 2),
        height: area.height.min(1),
        ..area
    };
    frame.render_widget(
        Paragraph::new(placeholder)
            .alignment(Alignment::Center)
            .style(Style::default().fg(TEXT_DIM)),
        row,
    );
}

/// Kitty image id per slot; zero is reserved by the protocol.
fn sprite_image_id(slot: Slot) -> u32 {
    match slot {
        Slot::Left => 1,
        Slot::Right => 2,
    }
}

fn render_battle(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("BATTLE")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(focus_border(state, FocusArea::Log));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let banner = match (&state.battle, &state.message) {
        (_, Some(message)) if message != LOAD_ERROR_MESSAGE => {
            Span::styled(message.clone(), Style::default().fg(ACCENT_RED))
        }
        (Some(result), _) => Span::styled(
            result.banner(),
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ),
        _ => Span::styled("Press b to battle.", Style::default().fg(TEXT_DIM)),
    };
    frame.render_widget(
        Paragraph::new(Line::from(banner)).alignment(Alignment::Center),
        layout[0],
    );

    let Some(result) = &state.battle else {
        return;
    };
    let lines: Vec<Line> = result.log.iter().map(log_line).collect();
    let offset = log_offset(state.log_scroll, layout[1].height as usize);
    let paragraph = Paragraph::new(lines).scroll((offset as u16, 0));
    frame.render_widget(paragraph, layout[1]);
}

fn log_line(entry: &LogEntry) -> Line<'static> {
    let style = match entry.kind {
        LogKind::System => Style::default().fg(TEXT_DIM),
        LogKind::Hit => Style::default().fg(TEXT_MAIN),
        LogKind::CriticalHit => Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        LogKind::Knockout => Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
    };
    Line::from(Span::styled(entry.text.clone(), style))
}

/// First visible log row so that entry `scroll` sits on the bottom row.
fn log_offset(scroll: usize, height: usize) -> usize {
    if height == 0 {
        return scroll;
    }
    (scroll + 1).saturating_sub(height)
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = if state.catalog.is_loading() {
        "Loading catalog...".to_string()
    } else {
        state.message.clone().unwrap_or_default()
    };
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.active {
        let left = vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Cancel"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
        return (left, Vec::new());
    }

    let left = match state.focus {
        FocusArea::Grid => vec![
            StatusBarHint::new("Up/Down", "Move"),
            StatusBarHint::new("Enter", "Pick"),
            StatusBarHint::new("b", "Battle"),
            StatusBarHint::new("x", "Clear"),
        ],
        FocusArea::Log => vec![
            StatusBarHint::new("Up/Down", "Scroll"),
            StatusBarHint::new("b", "Battle"),
        ],
    };
    let center = vec![
        StatusBarHint::new("Tab", "Focus"),
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("[ ]", "Type"),
        StatusBarHint::new("- +", "Batch"),
        StatusBarHint::new("r", "Reload"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

fn grid_items(state: &AppState) -> Vec<Line<'static>> {
    let Some(catalog) = state.loaded_catalog() else {
        return Vec::new();
    };
    catalog
        .filtered()
        .map(|entity| card_line(entity, state.selection.slot_of(entity.id)))
        .collect()
}

pub fn card_line(entity: &Entity, slot: Option<Slot>) -> Line<'static> {
    let marker = match slot {
        Some(slot) => Span::styled(
            slot.label().to_string(),
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ),
        None => Span::raw(" "),
    };
    let stats = &entity.stats;
    Line::from(vec![
        marker,
        Span::styled(format!(" #{:03} ", entity.id), Style::default().fg(TEXT_DIM)),
        Span::styled(format!("{:<12}", entity.name), Style::default().fg(TEXT_MAIN)),
        Span::styled(
            format!("{:<16}", entity.types.join("/")),
            Style::default().fg(ACCENT_TEAL),
        ),
        Span::raw(format!(
            "HP {:>3} ATK {:>3} DEF {:>3} SPD {:>3}  ",
            stats.hp, stats.attack, stats.defense, stats.speed
        )),
        Span::styled(
            format!("PWR {}", entity.power),
            Style::default().fg(ACCENT_GOLD),
        ),
    ])
}

fn grid_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn focus_border(state: &AppState, area: FocusArea) -> Style {
    if state.focus == area {
        Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    }
}
