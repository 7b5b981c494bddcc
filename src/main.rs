use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use cubik::{
    app::{session_summary, Control},
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, Settings},
    export::export_to_path,
    format::Precision,
    logging,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    scramble::{Event, RandomMoveScrambler},
    store::SqliteStore,
    ui, App,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};
use tracing::{info, warn};

/// speedcubing timer with scrambles, sessions and rolling averages
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal speedcubing timer: hold space to arm, release to start, press to stop. Keeps sessions of solves with WCA-style rolling averages, graphs and AO5 predictions."
)]
pub struct Cli {
    /// event to scramble for (333, 222, 444, 555, 666, 777, pyram, skewb, minx, sq1, clock, ...)
    #[clap(short = 'e', long, value_parser = parse_event)]
    event: Option<Event>,

    /// milliseconds space must be held before the timer arms (0 starts on release)
    #[clap(long, allow_negative_numbers = true)]
    hold: Option<i64>,

    /// number of timing phases; each extra phase adds a split
    #[clap(short = 'p', long, allow_negative_numbers = true)]
    phases: Option<i64>,

    /// readout precision
    #[clap(long, value_enum)]
    precision: Option<PrecisionArg>,

    /// switch to the named session, creating it when missing
    #[clap(short = 's', long)]
    session: Option<String>,

    /// session database path
    #[clap(long)]
    db: Option<PathBuf>,

    /// settings file path
    #[clap(long)]
    config: Option<PathBuf>,

    /// debug logging
    #[clap(short = 'v', long)]
    verbose: bool,

    /// print the current session's statistics and exit
    #[clap(long)]
    summary: bool,

    /// write the current session's solves as CSV and exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum PrecisionArg {
    #[value(name = "3dp")]
    ThreeDp,
    #[value(name = "2dp")]
    TwoDp,
    #[value(name = "1dp")]
    OneDp,
    Seconds,
    NoLive,
}

impl PrecisionArg {
    fn as_precision(&self) -> Precision {
        match self {
            PrecisionArg::ThreeDp => Precision::ThreeDp,
            PrecisionArg::TwoDp => Precision::TwoDp,
            PrecisionArg::OneDp => Precision::OneDp,
            PrecisionArg::Seconds => Precision::Seconds,
            PrecisionArg::NoLive => Precision::NoLive,
        }
    }
}

fn parse_event(s: &str) -> Result<Event, String> {
    s.parse::<Event>().map_err(|e| e.to_string())
}

impl Cli {
    /// Fold command line overrides into the stored settings. Returns whether
    /// anything changed.
    fn apply_to(&self, settings: &mut Settings) -> bool {
        let before = settings.clone();
        if let Some(event) = self.event {
            settings.event = event;
        }
        if let Some(hold) = self.hold {
            settings.hold_to_start_ms = hold;
        }
        if let Some(phases) = self.phases {
            settings.phases = phases;
        }
        if let Some(precision) = self.precision {
            settings.precision = precision.as_precision();
        }
        *settings != before
    }

    fn headless(&self) -> bool {
        self.summary || self.export.is_some()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.headless() {
        logging::init_stderr(cli.verbose);
    } else {
        if !stdin().is_tty() {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
        }
        if let Some(path) = AppDirs::log_path() {
            logging::init_file(&path, cli.verbose)?;
        }
    }

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let mut settings = config_store.load();
    if cli.apply_to(&mut settings) {
        config_store.save(&settings)?;
    }

    let store = match &cli.db {
        Some(path) => SqliteStore::open(path)?,
        None => SqliteStore::open_default()?,
    };

    if cli.headless() {
        let mut app = App::new(
            settings,
            Box::new(config_store),
            Box::new(store),
            Box::new(RandomMoveScrambler::new()),
            false,
        );
        if let Some(name) = &cli.session {
            app.select_session_by_name(name)?;
        }
        if cli.summary {
            print!("{}", session_summary(app.session(), &app.settings));
        }
        if let Some(path) = &cli.export {
            let rows = export_to_path(app.session(), path)?;
            println!("exported {} solves to {}", rows, path.display());
        }
        return Ok(());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    } else {
        warn!("terminal does not report key releases, falling back to press-to-start");
    }
    info!(enhanced, "terminal ready");

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        settings,
        Box::new(config_store),
        Box::new(store),
        Box::new(RandomMoveScrambler::new()),
        enhanced,
    );
    let result = match &cli.session {
        Some(name) => app
            .select_session_by_name(name)
            .map_err(Box::<dyn Error>::from),
        None => Ok(()),
    }
    .and_then(|_| start_tui(&mut terminal, &mut app));
    app.shutdown();

    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    terminal.draw(|f| ui::draw(app, Instant::now(), f))?;

    loop {
        let event = runner.step_within(app.next_wake(Instant::now()));
        let now = Instant::now();
        match event {
            AppEvent::Key(key) => {
                if app.handle_key(key, now) == Control::Quit {
                    break;
                }
            }
            AppEvent::Mouse(mouse) => app.handle_mouse(&mouse, now),
            AppEvent::Tick => app.on_tick(now),
            AppEvent::Resize => {}
        }
        terminal.draw(|f| ui::draw(app, Instant::now(), f))?;
    }

    Ok(())
}
