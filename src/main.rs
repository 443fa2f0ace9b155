use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext,
    TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokebattle::action::Action;
use pokebattle::api;
use pokebattle::config::{parse_batch_size, RuntimeConfig, API_BASE, DEFAULT_BATCH_SIZE};
use pokebattle::effect::Effect;
use pokebattle::reducer::reducer;
use pokebattle::sprite_backend::{self, SpriteBackend};
use pokebattle::state::AppState;
use pokebattle::ui::BattleUi;

#[derive(Parser, Debug)]
#[command(name = "pokebattle")]
#[command(about = "PokeAPI catalog with a two-slot battle simulator")]
struct Args {
    #[command(flatten)]
    debug: DebugCliArgs,
    /// Number of creatures to load (20, 50, 100 or 151)
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
    limit: u32,
    #[arg(long, default_value = API_BASE)]
    api_base: String,
    /// Battle RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    no_cache: bool,
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = RuntimeConfig {
        api_base: args.api_base.clone(),
        use_cache: !args.no_cache,
        log_file: args.log_file.clone(),
    };
    if let Some(path) = config.log_file.as_deref() {
        init_tracing(path)?;
    }

    let debug = DebugSession::new(args.debug);
    let limit = args.limit;
    let seed = args.seed.unwrap_or_else(rand::random);
    let state = debug
        .load_state_or_else_async(|| async move {
            Ok::<AppState, io::Error>(AppState::new(limit, seed))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = SpriteBackend::new(stdout, sprite_backend::sprite_registry());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, config).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

// The terminal owns stdout, so events only go somewhere when a file is given.
fn init_tracing(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|err| io::Error::other(format!("tracing init failed: {err}")))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    config: RuntimeConfig,
) -> io::Result<DebugRunOutput<AppState>> {
    let config = Arc::new(config);
    let ui = Rc::new(RefCell::new(BattleUi::new()));
    let ui_events = Rc::clone(&ui);
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(120), || Action::Tick);
            },
            move |frame, area, state, _render_ctx: RenderContext| {
                ui.borrow_mut().render(frame, area, state);
            },
            move |event, state| -> EventOutcome<Action> {
                ui_events.borrow_mut().handle_event(event, state)
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, config.clone()),
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, config: Arc<RuntimeConfig>) {
    match effect {
        Effect::LoadCatalog { generation, limit } => {
            // One key for every load: a newer load replaces the running task.
            ctx.tasks().spawn(TaskKey::new("catalog"), async move {
                match api::fetch_catalog(&config, limit).await {
                    Ok(entities) => Action::CatalogDidLoad {
                        generation,
                        entities,
                    },
                    Err(error) => Action::CatalogDidError {
                        generation,
                        error: error.to_string(),
                    },
                }
            });
        }
        Effect::LoadSprite { id, url } => {
            let key = format!("sprite_{id}");
            let use_cache = config.use_cache;
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_sprite(&url, use_cache).await {
                    Ok(sprite) => Action::SpriteDidLoad { id, sprite },
                    Err(error) => Action::SpriteDidError {
                        id,
                        error: error.to_string(),
                    },
                }
            });
        }
    }
}
