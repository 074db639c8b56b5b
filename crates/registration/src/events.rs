use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One entry of the activity log
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEvent {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub level: EventLevel,
    pub message: String,
    pub site_id: Option<String>,
}

/// Bounded activity log, oldest entries dropped first. Every event is mirrored to tracing.
#[derive(Debug)]
pub struct EventLog {
    events: Mutex<VecDeque<ActivityEvent>>,
    capacity: usize,
    next_id: AtomicU64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn emit(&self, level: EventLevel, message: impl Into<String>, site_id: Option<&str>) {
        let message = message.into();
        match level {
            EventLevel::Error => error!(site_id, "{}", message),
            EventLevel::Warning => warn!(site_id, "{}", message),
            EventLevel::Info | EventLevel::Success => info!(site_id, "{}", message),
        }

        let event = ActivityEvent {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            timestamp: Utc::now(),
            level,
            message,
            site_id: site_id.map(str::to_string),
        };

        if let Ok(mut events) = self.events.lock() {
            if events.len() == self.capacity {
                events.pop_front();
            }
            events.push_back(event);
        }
    }

    pub fn info(&self, message: impl Into<String>, site_id: Option<&str>) {
        self.emit(EventLevel::Info, message, site_id);
    }

    pub fn success(&self, message: impl Into<String>, site_id: Option<&str>) {
        self.emit(EventLevel::Success, message, site_id);
    }

    pub fn warning(&self, message: impl Into<String>, site_id: Option<&str>) {
        self.emit(EventLevel::Warning, message, site_id);
    }

    pub fn error(&self, message: impl Into<String>, site_id: Option<&str>) {
        self.emit(EventLevel::Error, message, site_id);
    }

    /// Events oldest to newest
    pub fn snapshot(&self) -> Vec<ActivityEvent> {
        self.events
            .lock()
            .map(|events| events.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}
