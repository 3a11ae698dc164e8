//! define - terminal dictionary
//!
//! # Usage
//!
//! ```bash
//! # Look a word up and print it
//! define cat
//!
//! # Examples and related words, at most five meanings
//! define -v --m5 cat
//!
//! # Interactive session
//! define -i
//!
//! # Verbose logging (stderr, or define.log in interactive mode)
//! RUST_LOG=debug define cat
//! ```

use std::fs::{self, File};
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use define_core::{
    format_entries, CacheLimit, ConfigOverrides, DefineConfig, Dictionary, FreeDictionaryResolver,
};
use define_tui::screen::{print_block, TerminalSurface};
use define_tui::SessionController;

/// define - look up English words from the terminal
#[derive(Parser, Debug)]
#[command(name = "define")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Word to look up
    #[arg(required_unless_present = "interactive")]
    word: Option<String>,

    /// Show examples and related word groups
    #[arg(short, long)]
    verbose: bool,

    /// Show only the first five meanings of each entry
    #[arg(long = "m5")]
    first_five: bool,

    /// Do not read cached results
    #[arg(long)]
    no_cache: bool,

    /// Do not write results to the cache
    #[arg(long)]
    no_write: bool,

    /// Run the interactive session
    #[arg(short, long)]
    interactive: bool,

    /// Cache directory
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Maximum cached words (a number, or "unbounded")
    #[arg(long, value_name = "N")]
    cache_limit: Option<CacheLimit>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            verbose: self.verbose.then_some(true),
            first_five: self.first_five.then_some(true),
            bypass_cache: self.no_cache.then_some(true),
            no_write: self.no_write.then_some(true),
            cache_dir: self.cache_dir.clone(),
            cache_limit: self.cache_limit,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "define failed");
            eprintln!("define: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    init_logging(&config, cli.interactive)?;
    info!(cache_dir = %config.cache.dir.display(), limit = %config.cache.limit, "Configuration loaded");

    let resolver = FreeDictionaryResolver::new(
        config.resolver.base_url.clone(),
        config.resolver.timeout_secs,
    )?;
    let dictionary = Dictionary::new(resolver, config.cache.build()).with_bypass(config.cache.bypass);

    match &cli.word {
        Some(word) if !cli.interactive => lookup_once(dictionary, &config, word),
        _ => {
            run_session(dictionary, &config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(cli: &Cli) -> Result<DefineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = DefineConfig::load_from_path(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.apply_env(|name| std::env::var(name).ok())?;
            config
        }
        None => DefineConfig::load()?,
    };
    config.apply_overrides(&cli.overrides());
    config.validate()?;
    Ok(config)
}

/// Log to stderr, or to a file while the session owns the screen
fn init_logging(config: &DefineConfig, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if interactive {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .init();
    }
    Ok(())
}

fn lookup_once(
    mut dictionary: Dictionary<FreeDictionaryResolver>,
    config: &DefineConfig,
    word: &str,
) -> Result<ExitCode> {
    let found = match dictionary.lookup(word) {
        Ok(found) => found,
        Err(e) if e.is_not_found() => {
            eprintln!("define: no definition found for {word:?}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).with_context(|| format!("looking up {word:?}")),
    };

    let text = format_entries(&found.entries, &config.display);
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    print_block(&mut stdout.lock(), &text, color)?;
    Ok(ExitCode::SUCCESS)
}

fn run_session(dictionary: Dictionary<FreeDictionaryResolver>, config: &DefineConfig) -> Result<()> {
    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("the interactive session requires a terminal (TTY)");
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    let result = TerminalSurface::new(terminal)
        .map_err(anyhow::Error::from)
        .and_then(|surface| {
            let mut session = SessionController::new(surface, dictionary, config)?;
            let outcome = session.run();
            Ok((session.into_surface(), outcome))
        });

    let (mut surface, outcome) = match result {
        Ok((surface, outcome)) => (Some(surface), outcome.map_err(anyhow::Error::from)),
        Err(e) => (None, Err(e)),
    };

    // Restore terminal; every step runs even if an earlier one fails
    let mut restore = RestoreErrors::default();
    restore.record(match surface.as_mut() {
        Some(surface) => execute!(surface.terminal_mut().backend_mut(), LeaveAlternateScreen),
        None => execute!(io::stdout(), LeaveAlternateScreen),
    });
    restore.record(disable_raw_mode());
    if let Some(surface) = surface.as_mut() {
        restore.record(surface.terminal_mut().show_cursor());
    }
    let restored = restore.finish();
    if let Err(e) = &restored {
        error!(error = %e, "Failed to restore terminal");
    }

    outcome?;
    restored.context("restoring terminal")?;
    Ok(())
}

/// Keeps the first failure of a sequence of cleanup steps
#[derive(Debug, Default)]
struct RestoreErrors {
    first: Option<io::Error>,
}

impl RestoreErrors {
    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            self.first.get_or_insert(e);
        }
    }

    fn finish(self) -> io::Result<()> {
        self.first.map_or(Ok(()), Err)
    }
}
