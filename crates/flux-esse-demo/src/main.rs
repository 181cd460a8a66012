use flux_esse::{create_context_with, use_context, Actions, Cleanup, Env, FluxContext, ScopeId};
use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    Terminal,
};
use std::io;
use std::time::Duration;

mod config;
mod keyboard;
mod logger;
mod todo;
mod views;

use config::DemoConfig;
use todo::TodoStore;

/// Context for the todo store, seeded from the config on every mount
fn todo_context(config: &DemoConfig) -> FluxContext<TodoStore> {
    let initial = config.initial_todos.clone();
    let context = create_context_with(TodoStore::default(), move |actions: &Actions<TodoStore>| {
        if !initial.is_empty() {
            actions.dispatch("seed", initial.clone());
        }
        Some(Box::new(|| log::info!("Todo provider deactivated")) as Cleanup)
    });
    context.set_display_name(config.context_name.as_str());
    context
}

fn main() -> anyhow::Result<()> {
    let log_file = logger::init()?;
    logger::install_panic_hook();

    log::info!("Starting flux-esse-demo (log file {})", log_file.display());

    let config = DemoConfig::load();
    let context = todo_context(&config);
    let app = context.provider().mount(&Env::root())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app.env(), context.id(), &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    drop(app);
    if let Err(err) = &result {
        log::error!("Exiting with error: {:#}", err);
    }

    log::info!("Exiting flux-esse-demo");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    env: &Env,
    scope: ScopeId,
    config: &DemoConfig,
) -> anyhow::Result<()> {
    let todos = use_context::<TodoStore>(env, scope)?;
    let tick_rate = Duration::from_millis(config.tick_rate_ms);

    loop {
        // Render
        terminal.draw(|frame| views::render(env, scope, &config.title, frame))?;

        // Check if we should quit
        if !todos.store().running {
            break;
        }

        // Handle events
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press {
                    keyboard::handle_key(key, todos.actions());
                }
            }
        }
    }

    Ok(())
}
