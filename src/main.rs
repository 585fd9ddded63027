//! Cloud Messaging CLI - push notification demo.
//!
//! This is the main binary entry point. See the `cloud_messaging` library
//! for the core functionality.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cloud_messaging::{
    env::Environment,
    platform::TapAction,
    transport::{self, FeedHandle, FeedSource},
    tui, App, Collaborators, Config,
};
use mimalloc::MiMalloc;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Global allocator configured per M-MIMALLOC-APPS guideline.
/// mimalloc provides better multi-threaded performance than the system allocator.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Global flag for signal-triggered shutdown (as Arc for signal-hook compatibility)
static SHUTDOWN_FLAG: std::sync::LazyLock<Arc<AtomicBool>> =
    std::sync::LazyLock::new(|| Arc::new(AtomicBool::new(false)));

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn register_signal_handlers() -> Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::flag;
    flag::register(SIGINT, Arc::clone(&SHUTDOWN_FLAG))?;
    flag::register(SIGTERM, Arc::clone(&SHUTDOWN_FLAG))?;
    flag::register(SIGHUP, Arc::clone(&SHUTDOWN_FLAG))?;
    Ok(())
}

/// Builds the app, runs the startup steps and starts the feed, if any.
fn prepare(feed: Option<&str>) -> Result<(App, Option<FeedHandle>)> {
    let config = Config::load()?;
    let app = App::new(&config, Collaborators::from_config(&config));
    app.start();

    let handle = feed
        .map(|arg| transport::spawn_feed(FeedSource::from_arg(arg), app.delivery()))
        .transpose()?;
    Ok((app, handle))
}

/// Logs how the feed ended, if it has.
fn finish_feed(handle: Option<FeedHandle>) {
    let Some(handle) = handle else { return };
    if !handle.is_finished() {
        log::info!("[Feed] Still running at exit, abandoning");
        return;
    }
    if let Err(e) = handle.join() {
        log::warn!("[Feed] {:#}", e);
    }
}

/// Runs without the demo screen.
///
/// Useful for:
/// - Integration testing
/// - Piping a feed in from another process
fn run_headless(feed: Option<&str>) -> Result<()> {
    println!("Starting Cloud Messaging v{} in headless mode...", VERSION);
    register_signal_handlers()?;

    let (mut app, handle) = prepare(feed)?;
    log::info!("Cloud Messaging v{} started in headless mode", VERSION);

    app.run_headless(handle.as_ref(), &SHUTDOWN_FLAG)?;

    println!("Shutting down...");
    finish_feed(handle);
    Ok(())
}

/// Runs the demo screen.
fn run_with_tui(feed: Option<&str>, tap: TapAction) -> Result<()> {
    if feed.is_some_and(|arg| FeedSource::from_arg(arg).is_stdin()) {
        anyhow::bail!("Reading the feed from stdin requires --headless");
    }
    register_signal_handlers()?;

    // Everything that can fail happens before raw mode so errors are visible
    let (app, handle) = prepare(feed)?;

    let _terminal_guard = tui::TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(std::io::stdout());
    let terminal = Terminal::new(backend)?;

    log::info!("Cloud Messaging v{} started with demo screen", VERSION);

    let mut runner = app.into_runner(terminal, Arc::clone(&SHUTDOWN_FLAG));
    runner.open_from_tap(&tap);
    runner.run()?;

    finish_feed(handle);
    Ok(())
}

// CLI
#[derive(Parser)]
#[command(name = "cloud-messaging")]
#[command(version = VERSION)]
#[command(about = "Push notification demo: registration token and last message")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the demo
    Start {
        /// Run without the demo screen, logging every change
        #[arg(long)]
        headless: bool,
        /// JSON-lines feed of inbound events ("-" for stdin)
        #[arg(long, value_name = "PATH")]
        feed: Option<String>,
        /// Open the screen as if a notification with this title was tapped
        #[arg(long, value_name = "TITLE")]
        open_title: Option<String>,
        /// Open the screen as if a notification with this body was tapped
        #[arg(long, value_name = "BODY")]
        open_body: Option<String>,
    },
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    // Set up file logging so the TUI doesn't interfere with log output
    // Use CLOUD_MESSAGING_LOG_FILE or <config dir>/cloud-messaging.log
    let log_path = if let Ok(path) = std::env::var("CLOUD_MESSAGING_LOG_FILE") {
        std::path::PathBuf::from(path)
    } else {
        Config::config_dir()?.join("cloud-messaging.log")
    };
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("Failed to create log file at {}", log_path.display()))?;
    let environment = Environment::current();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(environment.default_log_filter()),
    )
    .target(env_logger::Target::Pipe(Box::new(log_file)))
    .format_timestamp_secs()
    .init();
    log::debug!("Environment: {}", environment);

    // Set up panic hook to log panics and ensure terminal cleanup
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        log::error!("PANIC: {:?}", panic_info);
        tui::restore_terminal();
        default_hook(panic_info);
    }));

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            headless,
            feed,
            open_title,
            open_body,
        } => {
            if headless {
                run_headless(feed.as_deref())?;
            } else {
                let tap = TapAction {
                    title: open_title,
                    body: open_body,
                };
                run_with_tui(feed.as_deref(), tap)?;
            }
        }
        Commands::Config { write } => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            if write {
                let path = config.save()?;
                println!("Saved to {}", path.display());
            }
        }
    }

    Ok(())
}
