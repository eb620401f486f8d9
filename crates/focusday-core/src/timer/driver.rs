//! Countdown driver.
//!
//! [`TimerController`] owns a [`TimerEngine`] and at most one ticker task
//! that calls [`TimerEngine::tick`] once per period. The ticker handle is
//! always cancelled before a new one is stored, and every ticker carries the
//! generation it was spawned for: a ticker whose generation is no longer
//! current exits without touching the engine. Together these keep
//! `stop(); start(); start()` from ever producing two decrements in one
//! period.
//!
//! The tick body runs under the engine lock with no await points, so a
//! transition completes before the next tick can begin.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::durations::DurationConfig;
use super::engine::{TimerEngine, TimerSettings, TimerState};
use super::mode::TimerMode;
use crate::cue::{play_completion, CueService};
use crate::events::Event;

const EVENT_CAPACITY: usize = 64;

/// Wiring for a [`TimerController`].
#[derive(Clone)]
pub struct DriverOptions {
    pub durations: DurationConfig,
    pub settings: TimerSettings,
    pub cue: Arc<dyn CueService>,
    /// Also fire the haptic cue on completion.
    pub haptic: bool,
    /// Length of one tick. One second outside of tests.
    pub period: Duration,
}

impl DriverOptions {
    pub fn new(durations: DurationConfig, settings: TimerSettings, cue: Arc<dyn CueService>) -> Self {
        Self {
            durations,
            settings,
            cue,
            haptic: true,
            period: Duration::from_secs(1),
        }
    }
}

struct Shared {
    engine: TimerEngine,
    /// Bumped whenever the running ticker is invalidated.
    generation: u64,
}

/// Everything a ticker task needs, cloned out of the controller.
#[derive(Clone)]
struct TickerContext {
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<Event>,
    state_tx: Arc<watch::Sender<TimerState>>,
    cue: Arc<dyn CueService>,
    haptic: bool,
    period: Duration,
}

/// Single owner of a timer's state and its ticker.
///
/// Dropping the controller cancels the ticker.
pub struct TimerController {
    ctx: TickerContext,
    ticker: Option<JoinHandle<()>>,
    runtime: Handle,
}

impl TimerController {
    /// Create a stopped controller in Work mode.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn new(options: DriverOptions) -> Self {
        let engine = TimerEngine::new(options.durations, options.settings);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (state_tx, _) = watch::channel(engine.state());
        Self {
            ctx: TickerContext {
                shared: Arc::new(Mutex::new(Shared {
                    engine,
                    generation: 0,
                })),
                events,
                state_tx: Arc::new(state_tx),
                cue: options.cue,
                haptic: options.haptic,
                period: options.period,
            },
            ticker: None,
            runtime: Handle::current(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        lock(&self.ctx.shared).engine.state()
    }

    pub fn durations(&self) -> DurationConfig {
        lock(&self.ctx.shared).engine.durations()
    }

    pub fn snapshot(&self) -> Event {
        lock(&self.ctx.shared).engine.snapshot()
    }

    /// Discrete events: starts, stops, resets, completions, stopwatch ticks.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.ctx.events.subscribe()
    }

    /// The register after every change, including plain countdown ticks.
    pub fn watch(&self) -> watch::Receiver<TimerState> {
        self.ctx.state_tx.subscribe()
    }

    /// Whether a ticker task is currently alive.
    pub fn has_ticker(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        let (event, generation) = {
            let mut shared = lock(&self.ctx.shared);
            let event = shared.engine.start();
            if event.is_none() && self.has_ticker() {
                return None;
            }
            shared.generation += 1;
            (event, shared.generation)
        };
        self.replace_ticker(generation);
        self.publish(event)
    }

    pub fn stop(&mut self) -> Option<Event> {
        let event = self.halt(|engine| engine.stop());
        self.publish(event)
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.state().is_running {
            self.stop()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Event {
        let event = self.halt(|engine| Some(engine.reset()));
        let event = self.publish(event);
        // halt always yields the reset event
        event.unwrap_or_else(|| self.snapshot())
    }

    pub fn select_mode(&mut self, mode: TimerMode) -> Option<Event> {
        let event = {
            let mut shared = lock(&self.ctx.shared);
            if shared.engine.mode() == mode {
                return None;
            }
            let event = shared.engine.select_mode(mode);
            shared.generation += 1;
            event
        };
        self.cancel_ticker();
        self.publish(event)
    }

    /// Save edited durations; see [`TimerEngine::apply_durations`].
    pub fn apply_durations(&mut self, durations: DurationConfig) -> Event {
        let event = lock(&self.ctx.shared).engine.apply_durations(durations);
        self.publish(Some(event.clone()));
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply `f`, invalidate the ticker generation, and cancel the ticker.
    fn halt<F>(&mut self, f: F) -> Option<Event>
    where
        F: FnOnce(&mut TimerEngine) -> Option<Event>,
    {
        let event = {
            let mut shared = lock(&self.ctx.shared);
            let event = f(&mut shared.engine);
            shared.generation += 1;
            event
        };
        self.cancel_ticker();
        event
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            debug!("ticker cancelled");
        }
    }

    fn replace_ticker(&mut self, generation: u64) {
        self.cancel_ticker();
        let ctx = self.ctx.clone();
        self.ticker = Some(self.runtime.spawn(run_ticker(ctx, generation)));
        debug!(generation, "ticker scheduled");
    }

    fn publish(&self, event: Option<Event>) -> Option<Event> {
        self.ctx.state_tx.send_replace(self.state());
        if let Some(ref event) = event {
            broadcast_event(&self.ctx.events, event.clone());
        }
        event
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        lock(&self.ctx.shared).generation += 1;
        self.cancel_ticker();
    }
}

async fn run_ticker(ctx: TickerContext, generation: u64) {
    let mut interval = interval_at(Instant::now() + ctx.period, ctx.period);
    // Missed ticks are not replayed after a stall.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let (event, state) = {
            let mut shared = lock(&ctx.shared);
            if shared.generation != generation {
                debug!(generation, "stale ticker exiting");
                return;
            }
            let event = shared.engine.tick();
            (event, shared.engine.state())
        };
        ctx.state_tx.send_replace(state);

        if let Some(event) = event {
            if let Event::ModeCompleted { from, to, .. } = &event {
                info!(%from, %to, "playing completion cue");
                let cue = Arc::clone(&ctx.cue);
                let haptic = ctx.haptic;
                tokio::task::spawn_blocking(move || play_completion(cue.as_ref(), haptic));
            }
            broadcast_event(&ctx.events, event);
        }

        if !state.is_running {
            debug!(generation, "timer stopped itself, ticker exiting");
            return;
        }
    }
}

fn broadcast_event(events: &broadcast::Sender<Event>, event: Event) {
    if events.send(event).is_err() {
        debug!("no event subscribers");
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
