use std::sync::mpsc::{self, SendError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};
use log::debug;
use thiserror::Error;

/// Which cache a change notification asks to reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Prayers,
    News,
    Events,
    Contacts,
    Detail,
}

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Redraw beat.
    Tick,
    /// Recompute the next prayer against the current clock.
    Recompute,
    Refresh(Channel),
}

/// Single queue the UI loop drains. Keys, ticks, the recompute timer and
/// store notifications all feed into it.
pub struct EventHandler {
    tx: Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms.max(16));
        let input = tx.clone();
        thread::spawn(move || {
            if let Err(e) = read_input(&input, tick_rate) {
                debug!("Input reader stopped: {}", e);
            }
        });
        Self { tx, rx }
    }

    /// A producer handle for timers and change callbacks.
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

#[derive(Debug, Error)]
enum InputStop {
    #[error("terminal read failed: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("UI loop closed")]
    Closed,
}

impl From<SendError<Event>> for InputStop {
    fn from(_: SendError<Event>) -> Self {
        InputStop::Closed
    }
}

/// Forwards key presses and emits a `Tick` every `tick_rate` until the
/// receiver goes away or the terminal errors.
fn read_input(tx: &Sender<Event>, tick_rate: Duration) -> Result<(), InputStop> {
    let mut next_tick = Instant::now() + tick_rate;
    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        if event::poll(wait)? {
            if let CEvent::Key(key) = event::read()? {
                tx.send(Event::Key(key))?;
            }
        }
        if Instant::now() >= next_tick {
            tx.send(Event::Tick)?;
            next_tick = Instant::now() + tick_rate;
        }
    }
}
