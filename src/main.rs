use clap::Parser;
use colored::*;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use plainspeak::cli::{self, Args, Command};
use plainspeak::config::Settings;
use plainspeak::modal::ModalController;
use plainspeak::terminal::TerminalSurface;
use plainspeak::{CliError, HttpBackend, Session};

type TerminalSession = Session<HttpBackend, TerminalSurface>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(&args);

    let settings = Settings::load(args.config.as_deref())
        .and_then(|s| s.with_url_override(args.url.as_deref()))
        .map_err(CliError::from)?;
    debug!(base_url = %settings.base_url, "settings loaded");

    let surface = Arc::new(TerminalSurface::new());
    let on_terminal = io::stdin().is_terminal();

    if settings.show_intro && !args.no_intro && on_terminal {
        let mut modal = ModalController::new(Arc::clone(&surface));
        modal.open();
        surface.wait_for_dismiss();
        modal.close();
    }

    let backend = HttpBackend::new(settings.base_url.clone());
    let mut session = Session::new(backend, Arc::clone(&surface), settings.progress.to_config());

    let failed = if args.interactive {
        run_interactive(&mut session, &surface).await?;
        false
    } else if args.research {
        session.research(args.topic.clone()).await.is_failed()
    } else {
        let text = cli::input_text(args.text.clone(), || read_stdin(on_terminal))?;
        surface.load_input(&text);
        session.submit().await.is_failed()
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Whole of stdin. On a terminal the user is told how to finish.
fn read_stdin(on_terminal: bool) -> io::Result<String> {
    if on_terminal {
        eprintln!(
            "{}",
            "Please enter your text (press Ctrl+D when finished):".bright_yellow()
        );
    }
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

async fn run_interactive(
    session: &mut TerminalSession,
    surface: &TerminalSurface,
) -> Result<(), CliError> {
    eprintln!(
        "{}",
        "Type text to simplify, `:research [topic]` for research mode, `:quit` to leave."
            .bright_blue()
    );

    loop {
        eprint!("{} ", ">".bright_magenta());
        io::stderr().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Blank => continue,
            Command::Research(topic) => {
                session.research(topic).await;
            }
            Command::Submit(text) => {
                surface.load_input(&text);
                session.submit().await;
            }
        }
    }
    Ok(())
}
