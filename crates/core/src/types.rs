use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a target site within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

impl SiteStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SiteStatus::Success | SiteStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SiteStatus::Pending => "pending",
            SiteStatus::Processing => "processing",
            SiteStatus::Success => "success",
            SiteStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registration target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: SiteStatus,
    pub last_attempt: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl Site {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            status: SiteStatus::Pending,
            last_attempt: None,
            error_message: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SiteStatus::Pending
    }

    /// Pending -> Processing. Returns false if the site was not pending.
    pub fn begin_processing(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != SiteStatus::Pending {
            return false;
        }
        self.status = SiteStatus::Processing;
        self.last_attempt = Some(now);
        true
    }

    /// Processing -> Success
    pub fn mark_success(&mut self) {
        debug_assert_eq!(self.status, SiteStatus::Processing);
        self.status = SiteStatus::Success;
        self.error_message = None;
    }

    /// Processing -> Failed. An empty message is replaced by the fallback text.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        debug_assert_eq!(self.status, SiteStatus::Processing);
        let message = message.into();
        self.status = SiteStatus::Failed;
        self.error_message = Some(if message.trim().is_empty() {
            "Registration failed after all retry attempts".to_string()
        } else {
            message
        });
    }

    pub fn reset(&mut self) {
        self.status = SiteStatus::Pending;
        self.last_attempt = None;
        self.error_message = None;
    }
}

/// A phone identity used for SMS verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub id: String,
    pub number: String,
    pub is_active: bool,
    pub sms_received: u32,
    pub last_used: Option<DateTime<Utc>>,
}

impl PhoneNumber {
    pub fn new(id: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            is_active: true,
            sms_received: 0,
            last_used: None,
        }
    }
}

/// Build the initial site list from (name, url) pairs, ids assigned in order
pub fn sites_from_entries<I, N, U>(entries: I) -> Vec<Site>
where
    I: IntoIterator<Item = (N, U)>,
    N: Into<String>,
    U: Into<String>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (name, url))| Site::new((i + 1).to_string(), name, url))
        .collect()
}
