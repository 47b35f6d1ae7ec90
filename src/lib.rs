//! # plainspeak
//!
//! Terminal client for a text-simplification service.
//!
//! - [`session::Session`] sends the input text to `POST /process` and writes
//!   the summary (and any key-term definitions) back, or runs research mode
//!   against `POST /research`.
//! - [`progress::ProgressOverlay`] animates an indeterminate progress bar
//!   while a request is outstanding.
//! - [`modal::ModalController`] shows the intro panel on start-up.
//!
//! All three draw through the [`surface::Surface`] trait, so they run the same
//! against [`terminal::TerminalSurface`] and [`surface::RecordingSurface`].

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod modal;
pub mod payload;
pub mod progress;
pub mod session;
pub mod surface;
pub mod terminal;

pub use backend::{Backend, HttpBackend};
pub use error::{CliError, ConfigError, RequestError};
pub use session::{Outcome, Session};
pub use surface::{Element, Surface};
