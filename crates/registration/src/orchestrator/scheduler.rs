//! Paced, operating-hours-aware loop that works through pending sites one at a time.
//!
//! The scheduler is a cheap cloneable handle. [`Scheduler::start`] spawns the loop
//! on the current tokio runtime; pause, stop and reset are observed at tick
//! boundaries and at every suspension point through a `watch` channel.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use autoreg_core::{EngineConfig, PhoneNumber, RegistrationConfig, Site, SiteStatus};

use crate::core::AttemptState;
use crate::events::{ActivityEvent, EventLog};
use crate::orchestrator::control::{Clock, ControlState, RunSignal, RunState, SystemClock};
use crate::orchestrator::executor::AttemptExecutor;
use crate::orchestrator::retry::{RetryController, RetryPolicy};
use crate::phone_pool::PhoneNumberPool;
use crate::stats::RegistrationStats;
use crate::RegistrationError;

#[derive(Default)]
struct Driver {
    alive: bool,
    handle: Option<JoinHandle<()>>,
}

struct Inner {
    executor: AttemptExecutor,
    sites: RwLock<Vec<Site>>,
    phones: RwLock<PhoneNumberPool>,
    config: RwLock<RegistrationConfig>,
    hours_poll: Duration,
    events: EventLog,
    control: watch::Sender<ControlState>,
    current_index: AtomicUsize,
    driver: Mutex<Driver>,
    clock: Arc<dyn Clock>,
}

/// Builder for [`Scheduler`]
pub struct SchedulerBuilder {
    executor: AttemptExecutor,
    config: RegistrationConfig,
    engine: EngineConfig,
    sites: Vec<Site>,
    phones: PhoneNumberPool,
    clock: Arc<dyn Clock>,
}

impl SchedulerBuilder {
    pub fn sites(mut self, sites: Vec<Site>) -> Self {
        self.sites = sites;
        self
    }

    pub fn phones(mut self, phones: PhoneNumberPool) -> Self {
        self.phones = phones;
        self
    }

    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Scheduler {
        let (control, _) = watch::channel(ControlState {
            state: RunState::Idle,
            generation: 0,
        });
        Scheduler {
            inner: Arc::new(Inner {
                executor: self.executor,
                sites: RwLock::new(self.sites),
                phones: RwLock::new(self.phones),
                config: RwLock::new(self.config),
                hours_poll: self.engine.hours_poll(),
                events: EventLog::new(self.engine.event_buffer),
                control,
                current_index: AtomicUsize::new(0),
                driver: Mutex::new(Driver::default()),
                clock: self.clock,
            }),
        }
    }
}

/// Handle to the registration scheduler
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn builder(executor: AttemptExecutor, config: RegistrationConfig) -> SchedulerBuilder {
        SchedulerBuilder {
            executor,
            config,
            engine: EngineConfig::default(),
            sites: Vec::new(),
            phones: PhoneNumberPool::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn state(&self) -> RunState {
        self.inner.control.borrow().state
    }

    /// Start a run, or resume a paused one.
    ///
    /// Fails without changing state when the config is invalid or no phone number is active.
    pub async fn start(&self) -> Result<(), RegistrationError> {
        let config = self.inner.config.read().await.clone();
        if let Err(e) = config.validate() {
            self.inner.events.error(format!("Cannot start registration: {}", e), None);
            return Err(e.into());
        }
        if !self.inner.phones.read().await.has_active() {
            self.inner
                .events
                .error("Cannot start registration: No active phone numbers", None);
            return Err(RegistrationError::NoActivePhoneNumbers);
        }

        let mut driver = self.inner.lock_driver();
        let previous = self.state();
        match previous {
            RunState::Running => return Ok(()),
            RunState::Paused => self.inner.events.info("Registration resumed", None),
            RunState::Idle | RunState::Stopped => {
                self.inner.current_index.store(0, Ordering::Relaxed);
                self.inner.events.info("Starting registration process", None);
                self.inner.events.info(
                    format!(
                        "Registration speed set to {} per hour ({}s intervals)",
                        config.speed,
                        config.pacing_interval().as_secs_f64().round()
                    ),
                    None,
                );
            }
        }

        self.inner.control.send_modify(|c| c.state = RunState::Running);
        if !driver.alive {
            driver.alive = true;
            let inner = self.inner.clone();
            driver.handle = Some(tokio::spawn(run_loop(inner)));
        }
        Ok(())
    }

    pub async fn resume(&self) -> Result<(), RegistrationError> {
        self.start().await
    }

    /// Running -> Paused, effective at the next tick boundary
    pub fn pause(&self) -> bool {
        let _driver = self.inner.lock_driver();
        let paused = self.inner.control.send_if_modified(|c| {
            if c.state == RunState::Running {
                c.state = RunState::Paused;
                true
            } else {
                false
            }
        });
        if paused {
            self.inner.events.warning("Registration paused by user", None);
        }
        paused
    }

    /// Any state -> Stopped, effective at the next tick boundary
    pub fn stop(&self) {
        let _driver = self.inner.lock_driver();
        self.inner.control.send_modify(|c| c.state = RunState::Stopped);
        self.inner.events.warning("Registration stopped by user", None);
    }

    /// Any state -> Idle; every site returns to Pending and the activity log is cleared
    pub async fn reset(&self) {
        let mut sites = self.inner.sites.write().await;
        {
            let _driver = self.inner.lock_driver();
            self.inner.control.send_modify(|c| {
                c.state = RunState::Idle;
                c.generation += 1;
            });
        }
        sites.iter_mut().for_each(Site::reset);
        drop(sites);

        self.inner.current_index.store(0, Ordering::Relaxed);
        self.inner.events.clear();
        self.inner.events.info("Registration data reset", None);
    }

    /// Wait until the loop task has exited
    pub async fn join(&self) {
        loop {
            let handle = self.inner.lock_driver().handle.take();
            match handle {
                Some(handle) => {
                    if let Err(e) = handle.await {
                        warn!(error = %e, "scheduler loop task failed");
                        self.inner.lock_driver().alive = false;
                    }
                }
                None => break,
            }
        }
    }

    /// Number of sites picked since the run started
    pub fn current_index(&self) -> usize {
        self.inner.current_index.load(Ordering::Relaxed)
    }

    pub async fn sites(&self) -> Vec<Site> {
        self.inner.sites.read().await.clone()
    }

    /// Replace the site list.
    ///
    /// Refused while a run is active or paused, and while a stopped loop is still
    /// finishing its current site.
    pub async fn load_sites(&self, sites: Vec<Site>) -> Result<(), RegistrationError> {
        let mut current = self.inner.sites.write().await;
        {
            let driver = self.inner.lock_driver();
            if driver.alive || matches!(self.state(), RunState::Running | RunState::Paused) {
                return Err(RegistrationError::RunInProgress);
            }
        }
        let count = sites.len();
        *current = sites;
        drop(current);
        self.inner.events.info(format!("Loaded {} sites", count), None);
        Ok(())
    }

    pub async fn phones(&self) -> Vec<PhoneNumber> {
        self.inner.phones.read().await.numbers().to_vec()
    }

    pub async fn add_phone(&self, number: &str) -> Result<PhoneNumber, RegistrationError> {
        let phone = self.inner.phones.write().await.add(number)?.clone();
        self.inner.events.info(format!("Added phone number: {}", phone.number), None);
        Ok(phone)
    }

    pub async fn remove_phone(&self, id: &str) -> Result<PhoneNumber, RegistrationError> {
        let phone = self.inner.phones.write().await.remove(id)?;
        self.inner.events.info(format!("Removed phone number: {}", phone.number), None);
        Ok(phone)
    }

    pub async fn toggle_phone(&self, id: &str) -> Result<bool, RegistrationError> {
        self.inner.phones.write().await.toggle_active(id)
    }

    pub async fn reset_phone_count(&self, id: &str) -> Result<(), RegistrationError> {
        self.inner.phones.write().await.reset_count(id)
    }

    pub async fn config(&self) -> RegistrationConfig {
        self.inner.config.read().await.clone()
    }

    /// Swap in a new config; the loop picks it up at its next pacing decision
    pub async fn update_config(&self, config: RegistrationConfig) -> Result<(), RegistrationError> {
        config.validate()?;
        *self.inner.config.write().await = config;
        Ok(())
    }

    pub async fn stats(&self) -> RegistrationStats {
        let config = self.inner.config.read().await.clone();
        let sites = self.inner.sites.read().await;
        RegistrationStats::compute(&sites, &config)
    }

    pub fn events(&self) -> Vec<ActivityEvent> {
        self.inner.events.snapshot()
    }
}

impl Inner {
    fn lock_driver(&self) -> MutexGuard<'_, Driver> {
        self.driver.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Decide under the driver lock whether the loop exits, so a concurrent
    /// `start` either sees a live loop or spawns a fresh one.
    fn halt_unless_running(&self) -> bool {
        let mut driver = self.lock_driver();
        if self.control.borrow().state == RunState::Running {
            return false;
        }
        driver.alive = false;
        true
    }

    /// All sites done: Running -> Stopped and exit
    fn complete_run(&self) {
        let mut driver = self.lock_driver();
        let completed = self.control.send_if_modified(|c| {
            if c.state == RunState::Running {
                c.state = RunState::Stopped;
                true
            } else {
                false
            }
        });
        driver.alive = false;
        if completed {
            self.events.success("All registrations completed!", None);
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.control.borrow().generation == generation
    }
}

enum Tick {
    /// No pending site left
    Complete,
    /// A site was processed; pending sites remaining afterwards
    Processed { remaining: usize },
    /// Reset raced with the tick
    Discarded,
}

async fn run_loop(inner: Arc<Inner>) {
    let mut signal = RunSignal::new(inner.control.subscribe());
    let mut out_of_hours = false;
    info!("scheduler loop started");

    loop {
        if inner.halt_unless_running() {
            break;
        }
        if signal.is_reset() {
            // Fresh generation started by reset + start, keep the same task
            signal = RunSignal::new(inner.control.subscribe());
        }

        let config = inner.config.read().await.clone();
        if !config.is_within_operating_hours(inner.clock.local_time()) {
            if !out_of_hours {
                out_of_hours = true;
                inner.events.warning("Outside operating hours - waiting...", None);
            }
            signal.sleep_while_running(inner.hours_poll).await;
            continue;
        }
        if std::mem::take(&mut out_of_hours) {
            inner.events.info("Within operating hours - resuming", None);
        }

        match tick(&inner, &config, &mut signal).await {
            Tick::Complete => {
                inner.complete_run();
                break;
            }
            Tick::Discarded => continue,
            Tick::Processed { remaining } => {
                if remaining == 0 {
                    continue;
                }
                let interval = config.pacing_interval();
                inner.events.info(
                    format!(
                        "Waiting {} seconds before next registration...",
                        interval.as_secs_f64().round()
                    ),
                    None,
                );
                signal.sleep_while_running(interval).await;
            }
        }
    }

    info!("scheduler loop exited");
}

async fn tick(inner: &Inner, config: &RegistrationConfig, signal: &mut RunSignal) -> Tick {
    let generation = signal.generation();
    let site = {
        let mut sites = inner.sites.write().await;
        if !inner.is_current(generation) {
            return Tick::Discarded;
        }
        let Some(site) = sites.iter_mut().find(|s| s.is_pending()) else {
            return Tick::Complete;
        };
        site.begin_processing(inner.clock.now());
        site.clone()
    };
    inner.current_index.fetch_add(1, Ordering::Relaxed);
    inner
        .events
        .info(format!("Processing registration for {}", site.name), Some(&site.id));

    let report = RetryController::new(&inner.executor, RetryPolicy::from(config), &inner.events)
        .run(&site, &inner.phones, signal)
        .await;
    debug!(summary = %report.summary(), "retry sequence finished");

    // Verification traffic happened even if the run was reset meanwhile
    {
        let mut phones = inner.phones.write().await;
        let now = inner.clock.now();
        for phone_id in report.sms_usage() {
            if let Err(e) = phones.record_usage(phone_id, now) {
                warn!(phone_id, error = %e, "could not record phone usage");
            }
        }
    }

    let mut sites = inner.sites.write().await;
    if report.is_abandoned() || !inner.is_current(generation) {
        debug!(site_id = %site.id, "discarding result of a reset run");
        return Tick::Discarded;
    }
    let Some(entry) = sites
        .iter_mut()
        .find(|s| s.id == site.id && s.status == SiteStatus::Processing)
    else {
        warn!(site_id = %site.id, "processed site no longer in the list");
        return Tick::Discarded;
    };

    match &report.state {
        AttemptState::Success => {
            entry.mark_success();
            inner
                .events
                .success(format!("Registration completed for {}", site.name), Some(&site.id));
        }
        AttemptState::Failed { error } => {
            entry.mark_failed(error.clone());
            inner.events.error(
                format!(
                    "Registration failed for {} after {} attempt(s): {}",
                    site.name,
                    report.attempts.len(),
                    error
                ),
                Some(&site.id),
            );
        }
        _ => return Tick::Discarded,
    }

    let remaining = sites.iter().filter(|s| s.is_pending()).count();
    Tick::Processed { remaining }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::SiteHandlerRegistry;
    use crate::orchestrator::control::ManualClock;
    use crate::outcomes::{FixedOutcomes, ScriptedOutcomes};
    use crate::core::OutcomeProvider;
    use autoreg_core::{sites_from_entries, PhoneSelection};

    fn executor(outcomes: Arc<dyn OutcomeProvider>) -> AttemptExecutor {
        AttemptExecutor::new(Arc::new(SiteHandlerRegistry::with_builtin_handlers(
            outcomes,
            Duration::ZERO,
        )))
    }

    fn sample_sites() -> Vec<Site> {
        sites_from_entries(vec![
            ("Sekaimon", "https://www.sekaimon.com/register"),
            ("Qoo10", "https://qoo10.jp/seller"),
            ("Shop", "https://shop.example.com/signup"),
        ])
    }

    fn config() -> RegistrationConfig {
        RegistrationConfig {
            speed: 60,
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            max_retries: 3,
            delay_between_attempts: 5,
        }
    }

    fn build_scheduler(
        outcomes: Arc<dyn OutcomeProvider>,
        active_phone: bool,
        clock: Arc<ManualClock>,
    ) -> Scheduler {
        Scheduler::builder(executor(outcomes), config())
            .sites(sample_sites())
            .phones(PhoneNumberPool::from_entries(
                PhoneSelection::Random,
                vec![("090-1111-2222", active_phone)],
            ))
            .clock(clock)
            .build()
    }

    fn assert_totals(stats: &RegistrationStats) {
        assert_eq!(stats.total, stats.completed + stats.failed + stats.pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_to_completion() {
        let clock = Arc::new(ManualClock::at(10, 0));
        let scheduler = build_scheduler(Arc::new(FixedOutcomes(true)), true, clock);

        scheduler.start().await.unwrap();
        assert_eq!(scheduler.state(), RunState::Running);
        scheduler.join().await;

        assert_eq!(scheduler.state(), RunState::Stopped);
        let sites = scheduler.sites().await;
        assert!(sites.iter().all(|s| s.status == SiteStatus::Success));
        assert!(sites.iter().all(|s| s.error_message.is_none() && s.last_attempt.is_some()));
        assert_eq!(scheduler.current_index(), 3);

        // Sekaimon + Qoo10 expect SMS; the signup URL takes the email flow
        let phones = scheduler.phones().await;
        assert_eq!(phones[0].sms_received, 2);
        assert!(phones[0].last_used.is_some());

        let stats = scheduler.stats().await;
        assert_eq!(stats.completed, 3);
        assert_totals(&stats);
        assert!(scheduler
            .events()
            .iter()
            .any(|e| e.message == "All registrations completed!"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_paced() {
        let clock = Arc::new(ManualClock::at(10, 0));
        let scheduler = build_scheduler(Arc::new(FixedOutcomes(true)), true, clock);

        let started = tokio::time::Instant::now();
        scheduler.start().await.unwrap();
        scheduler.join().await;

        // speed 60 => 60s between ticks; no wait after the last site
        assert_eq!(started.elapsed(), Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_carry_messages() {
        let clock = Arc::new(ManualClock::at(10, 0));
        let outcomes = Arc::new(ScriptedOutcomes::new(vec![], false));
        let scheduler = build_scheduler(outcomes.clone(), true, clock);

        scheduler.start().await.unwrap();
        scheduler.join().await;

        let sites = scheduler.sites().await;
        assert!(sites.iter().all(|s| s.status == SiteStatus::Failed));
        assert!(sites
            .iter()
            .all(|s| s.error_message.as_deref().is_some_and(|m| !m.is_empty())));
        assert_eq!(sites[0].error_message.as_deref(), Some("Registration failed on Sekaimon"));
        // exactly max_retries attempts per site
        assert_eq!(outcomes.draws().len(), 9);

        // every failed Sekaimon/Qoo10 attempt still consumed SMS capacity
        assert_eq!(scheduler.phones().await[0].sms_received, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_without_active_phone() {
        let clock = Arc::new(ManualClock::at(10, 0));
        let scheduler = build_scheduler(Arc::new(FixedOutcomes(true)), false, clock);

        assert_eq!(scheduler.start().await, Err(RegistrationError::NoActivePhoneNumbers));
        assert_eq!(scheduler.state(), RunState::Idle);
        assert!(scheduler.sites().await.iter().all(Site::is_pending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_rejects_invalid_config() {
        let clock = Arc::new(ManualClock::at(10, 0));
        let scheduler = build_scheduler(Arc::new(FixedOutcomes(true)), true, clock);
        assert!(scheduler
            .update_config(RegistrationConfig { speed: 500, ..config() })
            .await
            .is_err());

        let bad = Scheduler::builder(
            executor(Arc::new(FixedOutcomes(true))),
            RegistrationConfig { max_retries: 0, ..config() },
        )
        .phones(PhoneNumberPool::from_entries(PhoneSelection::Random, vec![("090", true)]))
        .build();
        assert!(matches!(bad.start().await, Err(RegistrationError::InvalidConfig(_))));
        assert_eq!(bad.state(), RunState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_hours_waits_without_attempting() {
        let clock = Arc::new(ManualClock::at(20, 0));
        let outcomes = Arc::new(FixedOutcomes(true));
        let scheduler = build_scheduler(outcomes, true, clock.clone());

        scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(150)).await;

        assert_eq!(scheduler.state(), RunState::Running);
        assert!(scheduler.sites().await.iter().all(Site::is_pending));
        let waits = scheduler
            .events()
            .iter()
            .filter(|e| e.message == "Outside operating hours - waiting...")
            .count();
        assert_eq!(waits, 1);
        assert_eq!(scheduler.current_index(), 0);

        // Back inside the window: the next poll picks work up again
        clock.set(chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        scheduler.join().await;
        assert!(scheduler
            .sites()
            .await
            .iter()
            .all(|s| s.status == SiteStatus::Success));
        assert!(scheduler
            .events()
            .iter()
            .any(|e| e.message == "Within operating hours - resuming"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_takes_effect_at_tick_boundary() {
        let clock = Arc::new(ManualClock::at(10, 0));
        let scheduler = build_scheduler(Arc::new(FixedOutcomes(true)), true, clock);

        scheduler.start().await.unwrap();
        // first tick finishes instantly, loop is now in its 60s pacing wait
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(scheduler.pause());
        scheduler.join().await;

        assert_eq!(scheduler.state(), RunState::Paused);
        let stats = scheduler.stats().await;
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
        assert_totals(&stats);

        scheduler.resume().await.unwrap();
        scheduler.join().await;
        assert_eq!(scheduler.stats().await.completed, 3);
        assert_eq!(scheduler.current_index(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_then_reset() {
        let clock = Arc::new(ManualClock::at(10, 0));
        let scheduler = build_scheduler(Arc::new(FixedOutcomes(false)), true, clock);

        scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(12)).await;
        scheduler.stop();
        scheduler.join().await;
        assert_eq!(scheduler.state(), RunState::Stopped);

        let stats = scheduler.stats().await;
        assert_eq!(stats.failed, 1);
        assert_totals(&stats);

        scheduler.reset().await;
        assert_eq!(scheduler.state(), RunState::Idle);
        assert_eq!(scheduler.current_index(), 0);
        let sites = scheduler.sites().await;
        assert!(sites
            .iter()
            .all(|s| s.is_pending() && s.last_attempt.is_none() && s.error_message.is_none()));
        let events = scheduler.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "Registration data reset");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_mid_sequence_discards_result() {
        let clock = Arc::new(ManualClock::at(10, 0));
        let scheduler = build_scheduler(Arc::new(FixedOutcomes(false)), true, clock);

        scheduler.start().await.unwrap();
        // first site is inside its 5s retry delay
        tokio::time::sleep(Duration::from_secs(2)).await;
        scheduler.reset().await;
        scheduler.join().await;

        assert_eq!(scheduler.state(), RunState::Idle);
        assert!(scheduler.sites().await.iter().all(Site::is_pending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_sites_refused_while_running() {
        let clock = Arc::new(ManualClock::at(20, 0));
        let scheduler = build_scheduler(Arc::new(FixedOutcomes(true)), true, clock);
        scheduler.start().await.unwrap();

        assert_eq!(
            scheduler.load_sites(Vec::new()).await,
            Err(RegistrationError::RunInProgress)
        );
        scheduler.stop();
        scheduler.join().await;
        assert!(scheduler.load_sites(Vec::new()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_sites_waits_for_stopped_loop_to_finish() {
        let clock = Arc::new(ManualClock::at(10, 0));
        let outcomes = Arc::new(FixedOutcomes(false));
        let scheduler = Scheduler::builder(executor(outcomes), config())
            .sites(sites_from_entries(vec![("Sekaimon", "https://www.sekaimon.com/register")]))
            .phones(PhoneNumberPool::from_entries(PhoneSelection::Random, vec![("090", true)]))
            .clock(clock)
            .build();

        scheduler.start().await.unwrap();
        // inside the 5s retry delay of the only site
        tokio::time::sleep(Duration::from_secs(2)).await;
        scheduler.stop();

        let fresh = sites_from_entries(vec![("Fresh", "https://fresh.example.com/signup")]);
        assert_eq!(
            scheduler.load_sites(fresh.clone()).await,
            Err(RegistrationError::RunInProgress)
        );

        scheduler.join().await;
        let sites = scheduler.sites().await;
        assert_eq!(sites[0].name, "Sekaimon");
        assert_eq!(sites[0].status, SiteStatus::Failed);

        scheduler.load_sites(fresh).await.unwrap();
        let sites = scheduler.sites().await;
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].name, "Fresh");
        assert!(sites[0].is_pending() && sites[0].error_message.is_none());

        // the loop can be started again over the new list
        scheduler.update_config(RegistrationConfig { max_retries: 1, ..config() }).await.unwrap();
        scheduler.start().await.unwrap();
        scheduler.join().await;
        assert_eq!(scheduler.sites().await[0].status, SiteStatus::Failed);
        assert_eq!(scheduler.state(), RunState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_site_list_completes_immediately() {
        let scheduler = Scheduler::builder(executor(Arc::new(FixedOutcomes(true))), config())
            .phones(PhoneNumberPool::from_entries(PhoneSelection::Random, vec![("090", true)]))
            .clock(Arc::new(ManualClock::at(12, 0)))
            .build();

        scheduler.start().await.unwrap();
        scheduler.join().await;
        assert_eq!(scheduler.state(), RunState::Stopped);
        assert_eq!(scheduler.stats().await.total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phone_management_through_scheduler() {
        let clock = Arc::new(ManualClock::at(10, 0));
        let scheduler = build_scheduler(Arc::new(FixedOutcomes(true)), false, clock);

        let phone = scheduler.add_phone("080-9999-0000").await.unwrap();
        assert!(phone.is_active);
        assert!(!scheduler.toggle_phone(&phone.id).await.unwrap());
        assert!(scheduler.toggle_phone(&phone.id).await.unwrap());
        scheduler.reset_phone_count(&phone.id).await.unwrap();

        scheduler.start().await.unwrap();
        scheduler.join().await;
        assert_eq!(scheduler.stats().await.completed, 3);

        let removed = scheduler.remove_phone(&phone.id).await.unwrap();
        assert_eq!(removed.sms_received, 2);
        assert_eq!(scheduler.phones().await.len(), 1);
    }
}
