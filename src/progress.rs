//! Progress overlay controller.
//!
//! While a request is outstanding the overlay shows a fabricated percentage:
//! a recurring tick adds a random step until a cap below 100% is reached.
//! Completion snaps the bar to 100%, waits a short settle delay, then hides
//! the overlay and resets the bar for the next run.
//!
//! The tick runs on its own tokio task. The controller owns the task handle,
//! and cancels and awaits any previous ticker before spawning a new one, so at
//! most one ticker is ever alive.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::surface::{Element, Surface};

/// Timing and step parameters for [`ProgressOverlay`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressConfig {
    /// Interval between ticks.
    pub tick: Duration,
    /// Progress never passes this value while ticking.
    pub cap: f64,
    /// Smallest random increment per tick.
    pub step_min: f64,
    /// Largest random increment per tick.
    pub step_max: f64,
    /// Time the bar stays at 100% before the overlay hides.
    pub settle: Duration,
}

impl Default for ProgressConfig {
    /// - tick: 200 ms
    /// - cap: 90%
    /// - step: 2..=7
    /// - settle: 400 ms
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(200),
            cap: 90.0,
            step_min: 2.0,
            step_max: 7.0,
            settle: Duration::from_millis(400),
        }
    }
}

impl ProgressConfig {
    /// Replace unusable values with the defaults: a zero tick, a cap outside
    /// `(0, 100]`, or steps that are non-finite, non-positive or inverted.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let steps_ok = self.step_min.is_finite()
            && self.step_max.is_finite()
            && self.step_min > 0.0
            && self.step_min <= self.step_max;
        let cap_ok = self.cap.is_finite() && self.cap > 0.0 && self.cap <= 100.0;
        Self {
            tick: if self.tick.is_zero() { d.tick } else { self.tick },
            cap: if cap_ok { self.cap } else { d.cap },
            step_min: if steps_ok { self.step_min } else { d.step_min },
            step_max: if steps_ok { self.step_max } else { d.step_max },
            settle: self.settle,
        }
    }
}

/// Next displayed value after one tick.
///
/// Never decreases, never passes `cap`, and stays put once `cap` is reached.
pub fn advance(current: f64, step: f64, cap: f64) -> f64 {
    if current >= cap {
        return current;
    }
    (current + step.max(0.0)).min(cap)
}

/// Counts itself in `live` from spawn until the ticker future is dropped.
struct LiveTicker(Arc<AtomicUsize>);

impl LiveTicker {
    fn enter(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(live))
    }
}

impl Drop for LiveTicker {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct ProgressOverlay<S: Surface> {
    surface: Arc<S>,
    config: ProgressConfig,
    progress: Arc<Mutex<f64>>,
    ticker: Option<JoinHandle<()>>,
    live: Arc<AtomicUsize>,
    visible: bool,
}

impl<S: Surface> ProgressOverlay<S> {
    /// Unusable config values fall back to the defaults, see
    /// [`ProgressConfig::sanitized`].
    pub fn new(surface: Arc<S>, config: ProgressConfig) -> Self {
        let sanitized = config.clone().sanitized();
        if sanitized != config {
            warn!(?config, "progress config out of range, using defaults for bad fields");
        }
        Self {
            surface,
            config: sanitized,
            progress: Arc::new(Mutex::new(0.0)),
            ticker: None,
            live: Arc::new(AtomicUsize::new(0)),
            visible: false,
        }
    }

    /// Show the overlay at 0% and start ticking towards the cap.
    ///
    /// Calling `start` while already running restarts from 0% with a single
    /// ticker.
    pub async fn start(&mut self) {
        self.cancel_ticker().await;

        store(&self.progress, 0.0);
        self.surface.show(Element::LoadingOverlay);
        self.surface.set_width(Element::ProgressBar, 0.0);
        self.visible = true;

        let surface = Arc::clone(&self.surface);
        let progress = Arc::clone(&self.progress);
        let live = LiveTicker::enter(&self.live);
        let config = self.config.clone();
        self.ticker = Some(tokio::spawn(async move {
            let _live = live;
            tick_until_cap(surface, progress, config).await;
        }));
        debug!(tick_ms = self.config.tick.as_millis() as u64, "progress overlay started");
    }

    /// Snap to 100%, wait for the settle delay, then hide and reset to 0%.
    pub async fn stop(&mut self) {
        self.cancel_ticker().await;

        store(&self.progress, 100.0);
        self.surface.set_width(Element::ProgressBar, 100.0);

        tokio::time::sleep(self.config.settle).await;

        self.surface.hide(Element::LoadingOverlay);
        self.visible = false;
        store(&self.progress, 0.0);
        self.surface.set_width(Element::ProgressBar, 0.0);
        debug!("progress overlay stopped");
    }

    /// Currently displayed percentage.
    pub fn progress(&self) -> f64 {
        *lock(&self.progress)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// True while a ticker task exists and has not finished.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Number of ticker tasks currently alive. Never more than one.
    pub fn active_tickers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    async fn cancel_ticker(&mut self) {
        let Some(handle) = self.ticker.take() else {
            return;
        };
        handle.abort();
        match handle.await {
            Ok(()) => debug!("progress ticker had already reached the cap"),
            Err(e) if e.is_cancelled() => debug!("progress ticker cancelled"),
            Err(e) => warn!(error = %e, "progress ticker panicked"),
        }
    }
}

impl<S: Surface> Drop for ProgressOverlay<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

async fn tick_until_cap<S: Surface>(
    surface: Arc<S>,
    progress: Arc<Mutex<f64>>,
    config: ProgressConfig,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + config.tick, config.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let step = rand::thread_rng().gen_range(config.step_min..=config.step_max);
        let next = {
            let mut current = lock(&progress);
            *current = advance(*current, step, config.cap);
            *current
        };
        surface.set_width(Element::ProgressBar, next);

        if next >= config.cap {
            debug!(cap = config.cap, "progress reached cap");
            return;
        }
    }
}

fn lock(progress: &Mutex<f64>) -> MutexGuard<'_, f64> {
    progress.lock().unwrap_or_else(|p| p.into_inner())
}

fn store(progress: &Mutex<f64>, value: f64) {
    *lock(progress) = value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RecordingSurface, SurfaceEvent};

    fn overlay() -> (Arc<RecordingSurface>, ProgressOverlay<RecordingSurface>) {
        let surface = Arc::new(RecordingSurface::new());
        let overlay = ProgressOverlay::new(Arc::clone(&surface), ProgressConfig::default());
        (surface, overlay)
    }

    fn position(events: &[SurfaceEvent], wanted: &SurfaceEvent) -> usize {
        events
            .iter()
            .rposition(|e| e == wanted)
            .unwrap_or_else(|| panic!("missing event {wanted:?}"))
    }

    #[test]
    fn advance_adds_step() {
        assert_eq!(advance(10.0, 5.0, 90.0), 15.0);
    }

    #[test]
    fn advance_clamps_to_cap() {
        assert_eq!(advance(88.0, 7.0, 90.0), 90.0);
    }

    #[test]
    fn advance_holds_at_cap() {
        assert_eq!(advance(90.0, 3.0, 90.0), 90.0);
    }

    #[test]
    fn advance_ignores_negative_step() {
        assert_eq!(advance(40.0, -5.0, 90.0), 40.0);
    }

    #[test]
    fn default_config_values() {
        let c = ProgressConfig::default();
        assert_eq!(c.tick, Duration::from_millis(200));
        assert_eq!(c.cap, 90.0);
        assert_eq!(c.step_min, 2.0);
        assert_eq!(c.step_max, 7.0);
        assert_eq!(c.settle, Duration::from_millis(400));
    }

    #[test]
    fn sanitized_keeps_valid_config() {
        let c = ProgressConfig {
            tick: Duration::from_millis(50),
            cap: 75.0,
            step_min: 1.0,
            step_max: 1.0,
            settle: Duration::ZERO,
        };
        assert_eq!(c.clone().sanitized(), c);
    }

    #[test]
    fn sanitized_replaces_infinite_step() {
        let c = ProgressConfig {
            step_max: f64::INFINITY,
            ..ProgressConfig::default()
        }
        .sanitized();
        assert_eq!((c.step_min, c.step_max), (2.0, 7.0));
    }

    #[test]
    fn sanitized_replaces_inverted_steps_bad_cap_and_zero_tick() {
        let c = ProgressConfig {
            tick: Duration::ZERO,
            cap: f64::NAN,
            step_min: 9.0,
            step_max: 3.0,
            settle: Duration::from_millis(10),
        }
        .sanitized();
        assert_eq!(c.tick, Duration::from_millis(200));
        assert_eq!(c.cap, 90.0);
        assert_eq!((c.step_min, c.step_max), (2.0, 7.0));
        assert_eq!(c.settle, Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn infinite_step_still_ticks() {
        let surface = Arc::new(RecordingSurface::new());
        let config = ProgressConfig {
            step_max: f64::INFINITY,
            ..ProgressConfig::default()
        };
        let mut overlay = ProgressOverlay::new(Arc::clone(&surface), config);
        overlay.start().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(overlay.progress() > 0.0);
        assert!(overlay.progress() <= 90.0);
        overlay.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_counted_before_first_poll() {
        let (_surface, mut overlay) = overlay();
        overlay.start().await;
        // No yield since spawn, so the task has not run yet.
        assert_eq!(overlay.active_tickers(), 1);
        overlay.stop().await;
        assert_eq!(overlay.active_tickers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn start_shows_overlay_at_zero() {
        let (surface, mut overlay) = overlay();
        overlay.start().await;
        assert!(overlay.is_visible());
        assert!(surface.is_visible(Element::LoadingOverlay));
        assert_eq!(surface.width_history(Element::ProgressBar), vec![0.0]);
        assert_eq!(overlay.progress(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_climb_monotonically_to_cap() {
        let (surface, mut overlay) = overlay();
        overlay.start().await;
        tokio::time::sleep(Duration::from_secs(20)).await;

        let widths = surface.width_history(Element::ProgressBar);
        assert!(widths.len() > 1);
        assert!(widths.windows(2).all(|w| w[0] <= w[1]), "{widths:?}");
        assert!(widths.iter().all(|w| *w <= 90.0));
        assert_eq!(overlay.progress(), 90.0);
        assert!(!overlay.is_ticking());
        assert_eq!(overlay.active_tickers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn each_tick_moves_within_step_bounds() {
        let (surface, mut overlay) = overlay();
        overlay.start().await;
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        let widths = surface.width_history(Element::ProgressBar);
        for pair in widths.windows(2) {
            let delta = pair[1] - pair[0];
            assert!(delta >= 2.0 - 1e-9 || pair[1] == 90.0, "{pair:?}");
            assert!(delta <= 7.0 + 1e-9, "{pair:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_reaches_full_before_hiding_then_resets() {
        let (surface, mut overlay) = overlay();
        overlay.start().await;
        tokio::time::sleep(Duration::from_millis(700)).await;
        overlay.stop().await;

        let events = surface.events();
        let full = position(&events, &SurfaceEvent::SetWidth(Element::ProgressBar, 100.0));
        let hide = position(&events, &SurfaceEvent::Hide(Element::LoadingOverlay));
        let reset = position(&events, &SurfaceEvent::SetWidth(Element::ProgressBar, 0.0));
        assert!(full < hide);
        assert!(hide < reset);
        assert_eq!(reset, events.len() - 1);
        assert_eq!(overlay.progress(), 0.0);
        assert!(!overlay.is_visible());
        assert!(!surface.is_visible(Element::LoadingOverlay));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_waits_for_settle_delay() {
        let (_surface, mut overlay) = overlay();
        overlay.start().await;
        let before = Instant::now();
        overlay.stop().await;
        assert!(before.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn no_ticks_after_stop() {
        let (surface, mut overlay) = overlay();
        overlay.start().await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        overlay.stop().await;
        let seen = surface.events().len();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(surface.events().len(), seen);
        assert_eq!(overlay.active_tickers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_one_ticker() {
        let (_surface, mut overlay) = overlay();
        overlay.start().await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        overlay.start().await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(overlay.active_tickers() <= 1);
        assert!(overlay.is_ticking());
        overlay.stop().await;
        assert_eq!(overlay.active_tickers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resets_progress() {
        let (_surface, mut overlay) = overlay();
        overlay.start().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(overlay.progress() > 0.0);
        overlay.start().await;
        assert_eq!(overlay.progress(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_start_still_settles_hidden() {
        let (surface, mut overlay) = overlay();
        overlay.stop().await;
        assert!(!surface.is_visible(Element::LoadingOverlay));
        assert_eq!(overlay.progress(), 0.0);
    }
}
