//! lpool - Terminal Liquidity Pool Manager
//!
//! A terminal client for the Stellar testnet: generate a keypair, fund it via
//! Friendbot, create an XLM/custom-asset liquidity pool and withdraw from it.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::info;

use lpool::application::{App, LedgerJob, Level};
use lpool::infrastructure::{
    init_logging, load_settings, Dispatcher, HttpLedgerClient, Settings, DEFAULT_CONFIG_FILE,
};
use lpool::presentation::{render_ui, InputHandler};

const TICK: Duration = Duration::from_millis(100);

/// Entry point for the liquidity pool manager.
///
/// Loads configuration, starts logging, sets up the terminal interface and
/// runs the event loop until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup fails or if there are issues
/// with the terminal interface during runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_error) = match load_settings(Path::new(DEFAULT_CONFIG_FILE)) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let log_error = init_logging(&settings.log_file).err();
    info!(rpc = %settings.rpc_url, faucet = %settings.faucet_url, "starting lpool");

    let client = Arc::new(HttpLedgerClient::new(
        settings.rpc_url.clone(),
        settings.faucet_url.clone(),
    ));
    let dispatcher: Dispatcher<LedgerJob> = Dispatcher::new(client);

    let mut app = App::new(settings);
    for error in [config_error, log_error].into_iter().flatten() {
        app.notify(Level::Error, error, None);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &dispatcher);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Each tick applies finished ledger jobs, redraws, and waits up to one tick
/// for a key press. Jobs produced by key presses go to the dispatcher.
fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dispatcher: &Dispatcher<LedgerJob>,
) -> io::Result<()> {
    loop {
        for outcome in dispatcher.drain() {
            app.complete(outcome);
        }
        app.on_tick(Instant::now());
        terminal.draw(|f| render_ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                    _ => {
                        if let Some(job) = InputHandler::handle_key_event(app, key.code, key.modifiers) {
                            dispatcher.dispatch(job);
                        }
                    }
                }
            }
        }
    }
}
