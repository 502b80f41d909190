use std::{
    env,
    io::{self, Write},
    panic,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::{
        DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
        EnableFocusChange,
    },
    execute,
    style::ResetColor,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};
use tracing::{info, warn};
use tuirealm::{
    PollStrategy,
    terminal::{CrosstermTerminalAdapter, TerminalBridge},
};

use tasklist::{
    app::App,
    logging::{init_logging, print_log_location},
    realm::{RootId, apply_message, init_application, should_quit},
    settings::{DATA_DIR_ENV, Settings, THEME_ENV},
    storage::FileStorage,
    store::TaskStore,
    theme::Theme,
};

#[derive(Parser, Debug)]
#[command(
    name = "tasklist",
    about = "Terminal task list with filtering, search and drag reordering",
    version = env!("TASKLIST_BUILD_VERSION"),
    author
)]
struct Cli {
    /// Directory holding the task storage slots.
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Color preset: default, light, high-contrast or mono.
    #[arg(long, value_name = "PRESET")]
    theme: Option<String>,
}

static TERMINAL_RESTORED: AtomicBool = AtomicBool::new(false);

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match init_logging() {
        Ok(path) => Some(path),
        Err(err) => {
            eprintln!("warning: failed to initialize logging: {err}");
            None
        }
    };
    install_panic_hook(log_path.clone());

    let result = run_app(cli);
    if let Some(path) = log_path.as_ref() {
        print_log_location(path);
    }
    result
}

fn run_app(cli: Cli) -> Result<()> {
    let settings = Settings::load();
    if let Some(path) = Settings::config_path()
        && !path.exists()
        && let Err(err) = settings.save()
    {
        warn!("failed to write default settings: {err:#}");
    }

    let env_theme = env::var(THEME_ENV).ok();
    let preset = settings.resolve_theme(cli.theme.as_deref(), env_theme.as_deref());
    let theme = Theme::from_preset(preset);

    let env_data_dir = env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    let data_dir = settings.resolve_data_dir(cli.data_dir, env_data_dir)?;
    let storage = FileStorage::open(&data_dir)?;
    info!(root = %storage.root().display(), "opened task storage");
    let (store, report) = TaskStore::load(Box::new(storage))?;

    let mut app = App::new(settings, theme, store);
    app.show_load_report(&report);
    let app = Arc::new(Mutex::new(app));

    let _guard = TerminalGuard;
    let mut terminal = setup_terminal()?;
    let mut realm = init_application(Arc::clone(&app))?;

    let mut redraw = true;
    while !should_quit(&app)? {
        if redraw {
            terminal
                .draw(|frame| realm.view(&RootId::Root, frame, frame.area()))
                .context("failed to render frame")?;
            redraw = false;
        }

        let messages = realm
            .tick(PollStrategy::Once)
            .context("failed to process terminal events")?;

        if !messages.is_empty() {
            redraw = true;
        }

        for message in messages {
            apply_message(&app, message)?;
        }
    }

    let _ = terminal.disable_mouse_capture();
    let _ = execute!(io::stdout(), DisableFocusChange, DisableBracketedPaste);
    let _ = terminal.disable_raw_mode();
    let _ = terminal.leave_alternate_screen();
    let _ = terminal.clear_screen();
    TERMINAL_RESTORED.store(true, Ordering::SeqCst);

    Ok(())
}

fn setup_terminal() -> Result<TerminalBridge<CrosstermTerminalAdapter>> {
    TERMINAL_RESTORED.store(false, Ordering::SeqCst);

    let mut terminal =
        TerminalBridge::new_crossterm().context("failed to initialize terminal bridge")?;

    terminal
        .enable_raw_mode()
        .context("failed to enable raw mode")?;
    terminal
        .enter_alternate_screen()
        .context("failed to enter alternate screen")?;
    terminal
        .enable_mouse_capture()
        .context("failed to enable mouse capture")?;
    execute!(io::stdout(), EnableFocusChange, EnableBracketedPaste)
        .context("failed to enable focus and paste reporting")?;

    Ok(terminal)
}

fn install_panic_hook(log_path: Option<PathBuf>) {
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        if let Some(path) = log_path.as_ref() {
            eprintln!();
            eprintln!("Log file: {}", path.display());
            eprintln!();
        }
        previous_hook(panic_info);
    }));
}

fn restore_terminal() -> Result<()> {
    if TERMINAL_RESTORED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let _ = disable_raw_mode();

    let mut stderr = io::stderr();
    let _ = execute!(
        stderr,
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange,
        DisableBracketedPaste,
        Show,
        ResetColor
    );
    let _ = stderr.write_all(
        b"\x1b[?1049l\x1b[?1000l\x1b[?1002l\x1b[?1003l\x1b[?1004l\x1b[?1006l\x1b[?1015l\x1b[?2004l\x1b[?7h\x1b[?25h\x1b[0m\x1b[2J\x1b[H",
    );
    let _ = stderr.flush();

    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}
