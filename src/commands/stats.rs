use autoreg_core::AppConfig;
use autoreg_registration::RegistrationStats;

use super::print_summary;

pub fn run(config: &AppConfig) {
    let sites = config.initial_sites();
    let stats = RegistrationStats::compute(&sites, &config.registration);

    println!("Sites configured:  {}", stats.total);
    println!(
        "Active phones:     {}/{}",
        config.phones.iter().filter(|p| p.active).count(),
        config.phones.len()
    );
    println!(
        "Operating hours:   {} - {}",
        config.registration.start_time, config.registration.end_time
    );
    if let Err(e) = config.registration.validate() {
        println!("Config:            INVALID - {}", e);
    }

    print_summary("Registration Stats", &stats);
}
