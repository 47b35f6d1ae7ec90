//! Submit and research triggers.
//!
//! A [`Session`] reads from and writes to the surface, drives the progress
//! overlay around `/process` calls, and turns every failure into an
//! `Error: ...` message in the input field. Both triggers take `&mut self`, so
//! a second submission cannot start while one is outstanding.

use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::RequestError;
use crate::payload::ProcessResponse;
use crate::progress::{ProgressConfig, ProgressOverlay};
use crate::surface::{Element, Surface};

pub const RESEARCH_PROMPT: &str = "Enter a research topic:";
pub const RESEARCH_PLACEHOLDER: &str = "⏳ Researching... Please wait.";
pub const DEFINITIONS_HEADING: &str = "Key Terms:";

/// How a trigger ended. The error itself has already been rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rendered,
    Failed(RequestError),
    /// Research prompt was dismissed or left empty.
    Cancelled,
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

pub struct Session<B: Backend, S: Surface> {
    backend: B,
    surface: Arc<S>,
    progress: ProgressOverlay<S>,
    definitions_mounted: bool,
}

impl<B: Backend, S: Surface> Session<B, S> {
    /// Build a session and mount the research trigger.
    pub fn new(backend: B, surface: Arc<S>, progress: ProgressConfig) -> Self {
        surface.mount(Element::ResearchTab);
        Self {
            progress: ProgressOverlay::new(Arc::clone(&surface), progress),
            backend,
            surface,
            definitions_mounted: false,
        }
    }

    pub fn progress(&self) -> &ProgressOverlay<S> {
        &self.progress
    }

    /// Send the input field to `/process` and write the reply back into it.
    pub async fn submit(&mut self) -> Outcome {
        let text = self.surface.text(Element::InputField);
        info!(chars = text.chars().count(), "submitting text");

        self.progress.start().await;
        let outcome = match self.backend.process(&text).await {
            Ok(resp) => {
                self.render_process(&resp);
                Outcome::Rendered
            }
            Err(e) => self.render_error(e),
        };
        self.progress.stop().await;
        outcome
    }

    /// Research mode. Asks for a topic when `topic` is `None`.
    pub async fn research(&mut self, topic: Option<String>) -> Outcome {
        let topic = match topic {
            Some(t) => t,
            None => match self.surface.prompt(RESEARCH_PROMPT) {
                Some(t) => t,
                None => return Outcome::Cancelled,
            },
        };
        let topic = topic.trim();
        if topic.is_empty() {
            return Outcome::Cancelled;
        }

        info!(topic, "researching topic");
        self.surface.set_text(Element::InputField, RESEARCH_PLACEHOLDER);

        match self.backend.research(topic).await {
            Ok(resp) => {
                self.surface.set_text(Element::InputField, &resp.render());
                Outcome::Rendered
            }
            Err(e) => self.render_error(e),
        }
    }

    fn render_process(&mut self, resp: &ProcessResponse) {
        self.surface
            .set_text(Element::InputField, resp.display_text());

        match resp.definition_items() {
            Some(items) => {
                if !self.definitions_mounted {
                    self.surface.mount(Element::DefinitionsBox);
                    self.definitions_mounted = true;
                }
                self.surface
                    .set_list(Element::DefinitionsBox, DEFINITIONS_HEADING, &items);
            }
            None if self.definitions_mounted => {
                self.surface.set_text(Element::DefinitionsBox, "");
            }
            None => {}
        }
    }

    fn render_error(&self, e: RequestError) -> Outcome {
        warn!(error = %e, "request failed");
        self.surface
            .set_text(Element::InputField, &format!("Error: {e}"));
        Outcome::Failed(e)
    }
}
