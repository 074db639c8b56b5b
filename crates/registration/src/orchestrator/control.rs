use chrono::{DateTime, Local, NaiveTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Value published on the control channel. `generation` bumps on every reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub state: RunState,
    pub generation: u64,
}

/// Read side of the control channel, pinned to the generation it was created in
pub struct RunSignal {
    rx: watch::Receiver<ControlState>,
    generation: u64,
}

impl RunSignal {
    pub fn new(rx: watch::Receiver<ControlState>) -> Self {
        let generation = rx.borrow().generation;
        Self { rx, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> RunState {
        self.rx.borrow().state
    }

    /// A reset happened since this signal was created
    pub fn is_reset(&self) -> bool {
        self.rx.borrow().generation != self.generation
    }

    /// Sleep until `duration` elapses or `interrupt` holds for the control state.
    /// Returns true when the full duration was slept without interruption.
    pub async fn sleep_unless<F>(&mut self, duration: Duration, interrupt: F) -> bool
    where
        F: Fn(&ControlState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + duration;
        loop {
            if interrupt(&self.rx.borrow_and_update()) {
                return false;
            }
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    return !interrupt(&self.rx.borrow());
                }
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        // Sender gone, nothing can interrupt any more
                        tokio::time::sleep_until(deadline).await;
                        return true;
                    }
                }
            }
        }
    }

    /// Sleep that ends early on pause, stop or reset
    pub async fn sleep_while_running(&mut self, duration: Duration) -> bool {
        let generation = self.generation;
        self.sleep_unless(duration, |c| c.state != RunState::Running || c.generation != generation)
            .await
    }

    /// Sleep that ends early only on reset
    pub async fn sleep_unless_reset(&mut self, duration: Duration) -> bool {
        let generation = self.generation;
        self.sleep_unless(duration, |c| c.generation != generation).await
    }
}

/// Wall-clock source, swappable in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Local time of day used for the operating-hours window
    fn local_time(&self) -> NaiveTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_time(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Clock whose local time is set by hand
#[derive(Debug)]
pub struct ManualClock {
    time: Mutex<NaiveTime>,
}

impl ManualClock {
    pub fn new(time: NaiveTime) -> Self {
        Self { time: Mutex::new(time) }
    }

    pub fn at(hour: u32, minute: u32) -> Self {
        Self::new(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
    }

    pub fn set(&self, time: NaiveTime) {
        if let Ok(mut t) = self.time.lock() {
            *t = time;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_time(&self) -> NaiveTime {
        self.time.lock().map(|t| *t).unwrap_or(NaiveTime::MIN)
    }
}
