use clap::Parser;
use std::io;
use std::path::PathBuf;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "plainspeak")]
#[command(version)]
#[command(about = "Simplify text through a plainspeak service, or research a topic")]
pub struct Args {
    /// Text to simplify (read from stdin when omitted)
    pub text: Option<String>,

    /// Research mode: build a briefing on a topic instead of simplifying text
    #[arg(long)]
    pub research: bool,

    /// Topic for research mode (prompted for when omitted)
    #[arg(long, requires = "research")]
    pub topic: Option<String>,

    /// Base URL of the service (overrides the settings file and PLAINSPEAK_URL)
    #[arg(long)]
    pub url: Option<String>,

    /// TOML settings file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Read commands line by line: text to simplify, `:research [topic]`, `:quit`
    #[arg(long, short, conflicts_with_all = ["text", "research"])]
    pub interactive: bool,

    /// Skip the intro panel
    #[arg(long)]
    pub no_intro: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "plainspeak=debug,info",
            _ => "plainspeak=trace,debug",
        }
    }
}

/// Text to simplify: the positional argument, or whatever `read` returns
/// (stdin in the binary). Blank text is rejected before any request is made.
pub fn input_text(
    arg: Option<String>,
    read: impl FnOnce() -> io::Result<String>,
) -> Result<String, CliError> {
    let text = match arg {
        Some(t) => t,
        None => read()?,
    };
    if text.trim().is_empty() {
        return Err(CliError::EmptyInput);
    }
    Ok(text)
}

/// One line typed in interactive mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Submit(String),
    Research(Option<String>),
    Quit,
    Blank,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Blank;
        }
        if line == ":quit" || line == ":q" {
            return Command::Quit;
        }
        if let Some(rest) = line.strip_prefix(":research") {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                let topic = rest.trim();
                return Command::Research((!topic.is_empty()).then(|| topic.to_string()));
            }
        }
        Command::Submit(line.to_string())
    }
}
