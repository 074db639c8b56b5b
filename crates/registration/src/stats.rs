use serde::Serialize;

use autoreg_core::{RegistrationConfig, Site, SiteStatus};

/// Summary derived from the site list; always recomputed, never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationStats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub current_hourly_rate: u32,
    pub estimated_time_remaining: String,
}

impl RegistrationStats {
    pub fn compute(sites: &[Site], config: &RegistrationConfig) -> Self {
        let count = |status: SiteStatus| sites.iter().filter(|s| s.status == status).count();
        let pending = count(SiteStatus::Pending);

        Self {
            total: sites.len(),
            completed: count(SiteStatus::Success),
            failed: count(SiteStatus::Failed),
            pending,
            current_hourly_rate: config.speed,
            estimated_time_remaining: format_minutes(remaining_minutes(pending, config.speed)),
        }
    }

    /// "done/total" where done counts terminal sites
    pub fn progress(&self) -> String {
        format!("{}/{}", self.completed + self.failed, self.total)
    }

    pub fn success_rate(&self) -> f64 {
        let finished = self.completed + self.failed;
        if finished == 0 {
            0.0
        } else {
            (self.completed as f64 / finished as f64) * 100.0
        }
    }
}

/// ceil(pending / speed * 60)
pub fn remaining_minutes(pending: usize, speed: u32) -> u64 {
    if pending == 0 || speed == 0 {
        return 0;
    }
    let speed = speed as u64;
    (pending as u64 * 60).div_ceil(speed)
}

/// "2h 5m", or "45m" under an hour
pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let minutes = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoreg_core::sites_from_entries;
    use chrono::Utc;

    fn sites(n: usize) -> Vec<Site> {
        sites_from_entries(
            (0..n).map(|i| (format!("Site {}", i), format!("https://s{}.example.com", i))),
        )
    }

    #[test]
    fn test_remaining_minutes() {
        assert_eq!(remaining_minutes(0, 30), 0);
        assert_eq!(remaining_minutes(1, 30), 2);
        assert_eq!(remaining_minutes(1, 100), 1); // 0.6 rounds up
        assert_eq!(remaining_minutes(7, 60), 7);
        assert_eq!(remaining_minutes(100, 30), 200);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(60), "1h 0m");
        assert_eq!(format_minutes(200), "3h 20m");
    }

    #[test]
    fn test_compute_counts() {
        let mut list = sites(6);
        let now = Utc::now();
        list[0].begin_processing(now);
        list[0].mark_success();
        list[1].begin_processing(now);
        list[1].mark_failed("nope");
        list[2].begin_processing(now);
        list[2].mark_success();

        let config = RegistrationConfig { speed: 30, ..Default::default() };
        let stats = RegistrationStats::compute(&list, &config);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.total, stats.completed + stats.failed + stats.pending);
        assert_eq!(stats.current_hourly_rate, 30);
        assert_eq!(stats.estimated_time_remaining, "6m");
        assert_eq!(stats.progress(), "3/6");
        assert!((stats.success_rate() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_site_list() {
        let stats = RegistrationStats::compute(&[], &RegistrationConfig::default());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.estimated_time_remaining, "0m");
        assert_eq!(stats.success_rate(), 0.0);
    }
}
