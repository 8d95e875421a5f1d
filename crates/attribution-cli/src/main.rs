//! Attribution console - pair students with training placements from a terminal.
//!
//! Connects to the attribution server, loads the sections and referents of
//! the attribution page and reads commands from stdin. Type `help` at the
//! prompt for the command list.

mod commands;
mod view;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use attribution_core::{
    ApiClient, CascadeController, Config, Gateway, Notice, SavedSelection, SelectionStore,
};

use commands::{Command, HELP};

// ============================================================================
// Constants
// ============================================================================

/// Log file name prefix in the state directory (rotated daily)
const LOG_FILE_PREFIX: &str = "attribution.log";

const PROMPT: &str = "attribution> ";

type Controller = CascadeController<ApiClient>;

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug).
/// Logs go to a daily file in `state_dir` since stdout carries the console;
/// the returned guard flushes it and must live until exit.
fn init_tracing(state_dir: &Path, log_stderr: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if log_stderr {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(state_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: attribution [--log-stderr]\n\n{}", HELP);
        return Ok(());
    }
    let log_stderr = args.iter().any(|a| a == "--log-stderr");

    let mut config = Config::load().context("Failed to load configuration")?;
    config.apply_env(|key| std::env::var(key).ok());
    let state_dir = config.state_dir()?;
    std::fs::create_dir_all(&state_dir)
        .with_context(|| format!("Failed to create state directory {}", state_dir.display()))?;

    let _guard = init_tracing(&state_dir, log_stderr);
    info!(base_url = config.base_url(), "Attribution console starting");

    let mut client = ApiClient::new(config.base_url(), config.request_timeout())?;
    let screen = client
        .fetch_screen()
        .await
        .with_context(|| {
            format!("Failed to load the attribution page from {}", config.base_url())
        })?;
    if let Some(token) = config.csrf_token.clone().or_else(|| screen.csrf_token.clone()) {
        client.set_csrf_token(token);
    }

    let saved = SavedSelection::load(state_dir.clone()).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable saved selection");
        SavedSelection::new(state_dir.clone())
    });
    let store = SelectionStore::from_screen(screen);
    let mut controller =
        CascadeController::new(Arc::new(client), store).with_saved_selection(saved);

    controller.resume();
    controller.settle().await;
    print_notices(&mut controller);
    print!("{}", view::status(controller.store()));

    let result = run_console(&mut controller).await;

    // A pairing sent just before quitting still gets its answer logged
    controller.drain().await;
    info!("Attribution console shutting down");
    result
}

async fn run_console(controller: &mut Controller) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let command = match Command::parse(&line?) {
            Ok(Some(Command::Quit)) => return Ok(()),
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match execute(controller, command).await {
            Ok(text) => {
                print_notices(controller);
                print!("{}", text);
            }
            Err(e) => {
                print_notices(controller);
                println!("Error: {:#}", e);
            }
        }
    }
}

/// Run one command, settle the controller and return the text to show
async fn execute(controller: &mut Controller, command: Command) -> Result<String> {
    let text = match command {
        Command::Sections => view::sections(controller.store()),
        Command::Section(id) => {
            controller.select_section(id)?;
            controller.settle().await;
            view::periods(controller.store())
        }
        Command::Periods => view::periods(controller.store()),
        Command::Period(id) => {
            controller.select_period(id)?;
            controller.settle().await;
            view::status(controller.store())
        }
        Command::Students(filter) => {
            if let Some(class) = filter {
                controller.filter_students(&class);
            }
            view::students(controller.store())
        }
        Command::Corps(filter) => {
            if let Some(domain) = filter {
                controller.filter_corporations(&domain);
            }
            view::availabilities(controller.store())
        }
        Command::Student(id) => {
            controller.select_student(id)?;
            controller.settle().await;
            view::status(controller.store())
        }
        Command::Corp(id) => {
            controller.select_availability(id)?;
            controller.settle().await;
            view::status(controller.store())
        }
        Command::Contacts => view::contacts(controller.store()),
        Command::Contact(id) => {
            controller.select_contact(id)?;
            view::contacts(controller.store())
        }
        Command::Referents => view::referents(controller.store()),
        Command::Referent(id) => {
            controller.select_referent(id)?;
            view::referents(controller.store())
        }
        Command::Pair => {
            controller.validate_pairing()?;
            controller.settle().await;
            view::status(controller.store())
        }
        Command::Trainings => view::trainings(controller.store()),
        Command::Delete(id) => {
            controller.delete_training(id)?;
            controller.settle().await;
            view::trainings(controller.store())
        }
        Command::Export { path, non_attributed } => {
            let bytes = controller.export(non_attributed).await?;
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            format!("Saved {} bytes to {}\n", bytes.len(), path.display())
        }
        Command::Status => view::status(controller.store()),
        Command::Help => format!("{}\n", HELP),
        Command::Quit => String::new(),
    };
    Ok(text)
}

fn print_notices(controller: &mut Controller) {
    for notice in controller.take_notices() {
        match notice {
            Notice::Rejected(message) => println!("Refused: {}", message),
            Notice::Error(message) => println!("Error: {}", message),
        }
    }
}
