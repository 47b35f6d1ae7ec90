//! Intro modal shown before the first request.

use std::sync::Arc;

use tracing::debug;

use crate::surface::{Element, Surface};

/// Shows the intro modal once on start-up and hides it on dismiss.
pub struct ModalController<S: Surface> {
    surface: Arc<S>,
    open: bool,
}

impl<S: Surface> ModalController<S> {
    pub fn new(surface: Arc<S>) -> Self {
        Self {
            surface,
            open: false,
        }
    }

    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.surface.show(Element::ModalOverlay);
        self.open = true;
        debug!(element = %Element::ModalOverlay, "modal opened");
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.surface.hide(Element::ModalOverlay);
        self.open = false;
        debug!(element = %Element::ModalOverlay, "modal closed");
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
