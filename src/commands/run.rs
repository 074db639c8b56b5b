use anyhow::Result;
use autoreg_core::AppConfig;
use tracing::{info, warn};

use super::{build_scheduler, print_summary};

/// Run the scheduler over the configured sites; Ctrl-C stops after the current site
pub async fn run(config: AppConfig, json: bool) -> Result<()> {
    let scheduler = build_scheduler(&config);
    info!(
        sites = config.sites.len(),
        phones = config.phones.len(),
        speed = config.registration.speed,
        "starting registration run"
    );

    scheduler.start().await?;

    let stopper = scheduler.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current site");
            stopper.stop();
        }
    });

    scheduler.join().await;

    let stats = scheduler.stats().await;
    if json {
        let report = serde_json::json!({
            "state": scheduler.state(),
            "stats": stats,
            "sites": scheduler.sites().await,
            "phones": scheduler.phones().await,
            "events": scheduler.events(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for site in scheduler.sites().await {
            match &site.error_message {
                Some(err) => println!("  [{}] {} - {}", site.status.as_str(), site.name, err),
                None => println!("  [{}] {}", site.status.as_str(), site.name),
            }
        }
        print_summary("Registration Summary", &stats);
    }

    Ok(())
}
