//! Event plumbing for the drill front end.
//!
//! Terminal input is read on a background thread and merged with a steady
//! tick, so the session clock keeps moving while the player is thinking.
//! Every step also reports how much wall time passed since the previous one;
//! that is what the session clock gets fed.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    /// Nothing arrived within one tick
    Tick,
}

pub trait AppEventSource {
    /// Next event, or None when `timeout` passes first or the source is gone
    fn next_event(&self, timeout: Duration) -> Option<AppEvent>;
}

/// Events pushed down a channel. Tests drive the app this way.
impl AppEventSource for Receiver<AppEvent> {
    fn next_event(&self, timeout: Duration) -> Option<AppEvent> {
        match self.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Keyboard, mouse and resize events from the real terminal
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(ev) => ev,
                Err(e) => {
                    tracing::error!("terminal event stream closed: {e}");
                    break;
                }
            };
            if let Some(ev) = translate(ev) {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl AppEventSource for CrosstermEventSource {
    fn next_event(&self, timeout: Duration) -> Option<AppEvent> {
        self.rx.next_event(timeout)
    }
}

/// Terminal events the drill reacts to. Key releases are dropped so a
/// keystroke never lands in the answer field twice.
fn translate(ev: CtEvent) -> Option<AppEvent> {
    match ev {
        CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(AppEvent::Key(key)),
        CtEvent::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        CtEvent::Resize(_, _) => Some(AppEvent::Resize),
        _ => None,
    }
}

/// One turn of the main loop
#[derive(Debug)]
pub struct Step {
    pub event: AppEvent,
    /// Wall time since the previous step
    pub elapsed: Duration,
}

pub struct Runner<E: AppEventSource> {
    source: E,
    tick: Duration,
    last: Instant,
}

impl<E: AppEventSource> Runner<E> {
    pub fn new(source: E, tick: Duration) -> Self {
        Self {
            source,
            tick,
            last: Instant::now(),
        }
    }

    /// Waits at most one tick. Keys arriving faster than the tick still carry
    /// their elapsed time, so typing never starves the clock.
    pub fn step(&mut self) -> Step {
        let event = self.source.next_event(self.tick).unwrap_or(AppEvent::Tick);
        let now = Instant::now();
        let elapsed = now - self.last;
        self.last = now;
        Step { event, elapsed }
    }
}
