//! Display capability set the controllers depend on.
//!
//! The controllers never touch a terminal directly. They drive a [`Surface`],
//! which is satisfied by [`crate::terminal::TerminalSurface`] in the binary and
//! by [`RecordingSurface`] in tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

/// The elements a surface must know about, keyed by their page ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    ModalOverlay,
    LoadingOverlay,
    ProgressBar,
    SummarizerForm,
    InputField,
    /// Created on first use by the session.
    DefinitionsBox,
    /// Mounted by the session at construction.
    ResearchTab,
}

impl Element {
    pub fn id(&self) -> &'static str {
        match self {
            Element::ModalOverlay => "modal-overlay",
            Element::LoadingOverlay => "loading-overlay",
            Element::ProgressBar => "progress-bar",
            Element::SummarizerForm => "summarizer-form",
            Element::InputField => "raw_in",
            Element::DefinitionsBox => "definitions-box",
            Element::ResearchTab => "research-tab",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// What a controller may do to the display.
///
/// Methods take `&self` because the progress ticker runs on its own task and
/// shares the surface with the session. Implementations use interior
/// mutability.
pub trait Surface: Send + Sync + 'static {
    fn show(&self, element: Element);
    fn hide(&self, element: Element);
    fn set_text(&self, element: Element, text: &str);
    /// Width of a bar element, as a percentage in `[0, 100]`.
    fn set_width(&self, element: Element, percent: f64);
    /// Replace the element's content with a heading and list items.
    fn set_list(&self, element: Element, heading: &str, items: &[String]);
    fn text(&self, element: Element) -> String;
    /// Create a dynamic element (definitions box, research trigger).
    fn mount(&self, element: Element);
    /// Ask the user a question synchronously. `None` when they cancel.
    fn prompt(&self, message: &str) -> Option<String>;
}

/// One call made against a [`RecordingSurface`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Show(Element),
    Hide(Element),
    SetText(Element, String),
    SetWidth(Element, f64),
    SetList(Element, String, Vec<String>),
    Mount(Element),
    Prompt(String),
}

#[derive(Debug, Default)]
struct Recorded {
    events: Vec<SurfaceEvent>,
    visible: HashSet<Element>,
    mounted: HashSet<Element>,
    texts: HashMap<Element, String>,
    lists: HashMap<Element, (String, Vec<String>)>,
    widths: HashMap<Element, f64>,
    answers: VecDeque<Option<String>>,
}

/// In-memory surface that remembers every call.
///
/// Prompts are answered from a queue filled with [`RecordingSurface::answer`];
/// an empty queue answers `None`.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    inner: Mutex<Recorded>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill the input field, as if the user had typed into it.
    pub fn with_input(text: &str) -> Self {
        let surface = Self::default();
        surface
            .lock()
            .texts
            .insert(Element::InputField, text.to_string());
        surface
    }

    /// Queue the answer for the next [`Surface::prompt`].
    pub fn answer(&self, reply: Option<&str>) {
        self.lock().answers.push_back(reply.map(str::to_string));
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.lock().events.clone()
    }

    pub fn is_visible(&self, element: Element) -> bool {
        self.lock().visible.contains(&element)
    }

    pub fn is_mounted(&self, element: Element) -> bool {
        self.lock().mounted.contains(&element)
    }

    pub fn list(&self, element: Element) -> Option<(String, Vec<String>)> {
        self.lock().lists.get(&element).cloned()
    }

    pub fn width(&self, element: Element) -> f64 {
        self.lock().widths.get(&element).copied().unwrap_or(0.0)
    }

    /// Every width ever set on `element`, oldest first.
    pub fn width_history(&self, element: Element) -> Vec<f64> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::SetWidth(el, w) if *el == element => Some(*w),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        // A panicking test thread must not hide the state from the others.
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Surface for RecordingSurface {
    fn show(&self, element: Element) {
        let mut r = self.lock();
        r.visible.insert(element);
        r.events.push(SurfaceEvent::Show(element));
    }

    fn hide(&self, element: Element) {
        let mut r = self.lock();
        r.visible.remove(&element);
        r.events.push(SurfaceEvent::Hide(element));
    }

    fn set_text(&self, element: Element, text: &str) {
        let mut r = self.lock();
        r.texts.insert(element, text.to_string());
        if text.is_empty() {
            r.lists.remove(&element);
        }
        r.events.push(SurfaceEvent::SetText(element, text.to_string()));
    }

    fn set_width(&self, element: Element, percent: f64) {
        let mut r = self.lock();
        r.widths.insert(element, percent);
        r.events.push(SurfaceEvent::SetWidth(element, percent));
    }

    fn set_list(&self, element: Element, heading: &str, items: &[String]) {
        let mut r = self.lock();
        r.lists
            .insert(element, (heading.to_string(), items.to_vec()));
        r.events.push(SurfaceEvent::SetList(
            element,
            heading.to_string(),
            items.to_vec(),
        ));
    }

    fn text(&self, element: Element) -> String {
        self.lock().texts.get(&element).cloned().unwrap_or_default()
    }

    fn mount(&self, element: Element) {
        let mut r = self.lock();
        r.mounted.insert(element);
        r.events.push(SurfaceEvent::Mount(element));
    }

    fn prompt(&self, message: &str) -> Option<String> {
        let mut r = self.lock();
        r.events.push(SurfaceEvent::Prompt(message.to_string()));
        r.answers.pop_front().flatten()
    }
}
