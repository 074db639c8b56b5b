pub mod resolve;
pub mod run;
pub mod stats;

use std::sync::Arc;

use autoreg_core::AppConfig;
use autoreg_registration::{
    AttemptExecutor, PhoneNumberPool, RandomOutcomes, RegistrationStats, Scheduler,
    SiteHandlerRegistry,
};

pub fn build_registry(config: &AppConfig) -> SiteHandlerRegistry {
    let latency = config.engine.handler_latency();
    SiteHandlerRegistry::with_builtin_handlers(Arc::new(RandomOutcomes), latency)
}

pub fn build_scheduler(config: &AppConfig) -> Scheduler {
    let executor = AttemptExecutor::new(Arc::new(build_registry(config)));
    let phones = PhoneNumberPool::from_entries(
        config.engine.phone_selection,
        config.phones.iter().map(|p| (p.number.as_str(), p.active)),
    );

    Scheduler::builder(executor, config.registration.clone())
        .engine(config.engine.clone())
        .sites(config.initial_sites())
        .phones(phones)
        .build()
}

pub fn print_summary(title: &str, stats: &RegistrationStats) {
    println!("\n╔══════════════════════════════════════════════╗");
    println!("║      {:<40}║", title);
    println!("╠══════════════════════════════════════════════╣");
    println!("║ Total Sites:          {:>20}    ║", stats.total);
    println!("║ Completed:            {:>20}    ║", stats.completed);
    println!("║ Failed:               {:>20}    ║", stats.failed);
    println!("║ Pending:              {:>20}    ║", stats.pending);
    println!("║ Progress:             {:>20}    ║", stats.progress());
    println!("║ Hourly Rate:          {:>20}    ║", stats.current_hourly_rate);
    println!("║ Time Remaining:       {:>20}    ║", stats.estimated_time_remaining);
    println!("║ Success Rate:         {:>19.1}%   ║", stats.success_rate());
    println!("╚══════════════════════════════════════════════╝\n");
}
