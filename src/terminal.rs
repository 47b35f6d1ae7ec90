//! [`Surface`] adapter for an ANSI terminal.
//!
//! Results (the input field and definitions list) go to stdout; the modal,
//! the progress bar and prompts go to stderr so piped output stays clean.

use colored::*;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use tracing::{debug, trace};

use crate::surface::{Element, Surface};

const BAR_WIDTH: usize = 30;

const INTRO: &[&str] = &[
    "plainspeak",
    "",
    "Paste or type text and it comes back simplified,",
    "with key terms explained underneath.",
    "",
    "Research mode builds a short briefing on a topic:",
    "definition, overview, history, derivation, deep dive.",
];

#[derive(Debug, Default)]
struct TerminalState {
    input: String,
    loading: bool,
    bar_drawn: bool,
}

#[derive(Debug, Default)]
pub struct TerminalSurface {
    state: Mutex<TerminalState>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `text` into the input field without echoing it.
    pub fn load_input(&self, text: &str) {
        self.lock().input = text.to_string();
    }

    /// Block until the user presses Enter (or stdin closes).
    pub fn wait_for_dismiss(&self) {
        eprint!("{}", "  Press Enter to continue.".bright_blue());
        let _ = io::stderr().flush();
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TerminalState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn clear_bar(state: &mut TerminalState) {
        if state.bar_drawn {
            eprint!("\r\x1b[2K");
            let _ = io::stderr().flush();
            state.bar_drawn = false;
        }
    }
}

/// `[#########.....................]  30%`
pub fn render_bar(percent: f64) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        percent
    )
}

fn boxed(lines: &[&str]) -> Vec<String> {
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(format!("+{}+", "-".repeat(inner)));
    for line in lines {
        let pad = inner - 1 - line.chars().count();
        out.push(format!("| {}{}|", line, " ".repeat(pad)));
    }
    out.push(format!("+{}+", "-".repeat(inner)));
    out
}

impl Surface for TerminalSurface {
    fn show(&self, element: Element) {
        match element {
            Element::ModalOverlay => {
                eprintln!();
                for line in boxed(INTRO) {
                    eprintln!("  {}", line.bright_cyan());
                }
            }
            Element::LoadingOverlay => self.lock().loading = true,
            other => trace!(element = %other, "show ignored by terminal"),
        }
    }

    fn hide(&self, element: Element) {
        match element {
            Element::ModalOverlay => eprintln!(),
            Element::LoadingOverlay => {
                let mut state = self.lock();
                state.loading = false;
                Self::clear_bar(&mut state);
            }
            other => trace!(element = %other, "hide ignored by terminal"),
        }
    }

    fn set_text(&self, element: Element, text: &str) {
        match element {
            Element::InputField => {
                let mut state = self.lock();
                Self::clear_bar(&mut state);
                state.input = text.to_string();
                if text.starts_with("Error: ") {
                    println!("{}", text.bright_red());
                } else {
                    println!("{text}");
                }
            }
            Element::DefinitionsBox if text.is_empty() => {}
            Element::DefinitionsBox => println!("{text}"),
            other => trace!(element = %other, "text ignored by terminal"),
        }
    }

    fn set_width(&self, element: Element, percent: f64) {
        if element != Element::ProgressBar {
            return;
        }
        let mut state = self.lock();
        if !state.loading {
            return;
        }
        eprint!("\r  {}", render_bar(percent).bright_green());
        let _ = io::stderr().flush();
        state.bar_drawn = true;
    }

    fn set_list(&self, element: Element, heading: &str, items: &[String]) {
        let mut state = self.lock();
        Self::clear_bar(&mut state);
        trace!(element = %element, items = items.len(), "rendering list");
        println!();
        println!("{}", heading.bold());
        for item in items {
            match item.split_once(": ") {
                Some((term, rest)) => println!("  - {}: {}", term.bold(), rest),
                None => println!("  - {item}"),
            }
        }
    }

    fn text(&self, element: Element) -> String {
        match element {
            Element::InputField => self.lock().input.clone(),
            _ => String::new(),
        }
    }

    fn mount(&self, element: Element) {
        debug!(element = %element, "mounted");
    }

    fn prompt(&self, message: &str) -> Option<String> {
        eprint!("{} ", message.bright_yellow());
        let _ = io::stderr().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_empty() {
        assert_eq!(render_bar(0.0), format!("[{}]   0%", ".".repeat(30)));
    }

    #[test]
    fn bar_full() {
        assert_eq!(render_bar(100.0), format!("[{}] 100%", "#".repeat(30)));
    }

    #[test]
    fn bar_half() {
        let bar = render_bar(50.0);
        assert!(bar.starts_with(&format!("[{}.", "#".repeat(15))));
        assert!(bar.ends_with(" 50%"));
    }

    #[test]
    fn bar_clamps_out_of_range() {
        assert_eq!(render_bar(140.0), render_bar(100.0));
        assert_eq!(render_bar(-3.0), render_bar(0.0));
    }

    #[test]
    fn boxed_lines_share_width() {
        let lines = boxed(&["a", "longer line"]);
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{lines:?}");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn load_input_is_readable() {
        let s = TerminalSurface::new();
        s.load_input("some text");
        assert_eq!(s.text(Element::InputField), "some text");
        assert_eq!(s.text(Element::ProgressBar), "");
    }

    #[test]
    fn width_ignored_while_hidden() {
        let s = TerminalSurface::new();
        s.set_width(Element::ProgressBar, 40.0);
        assert!(!s.lock().bar_drawn);
    }
}
