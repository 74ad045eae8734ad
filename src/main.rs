//! mcstatus: server status API with an interactive admin console.
//! Used by: binary entrypoint.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use mcstatus::config::{Settings, DEFAULT_CONFIG_FILE};
use mcstatus::console::{self, AdminCommand};
use mcstatus::host::{NoProbe, StaticHost};
use mcstatus::service::StatusService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_owned());
    let settings = Settings::load(&config_path)?;
    init_tracing(settings.debug);

    console::print_banner();
    tracing::info!(config = %config_path, "starting mcstatus");

    let host = StaticHost::standalone(&settings);
    let mut service = StatusService::new(settings, Arc::new(host), Arc::new(NoProbe));
    service.enable().await;
    if let Some(addr) = service.api_addr() {
        let settings = service.settings();
        console::print_startup(addr, settings.https.enabled, settings.security.enable_auth);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => break,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "cannot read admin console input");
                break;
            }
        };
        let command = match AdminCommand::parse(&line) {
            None => continue,
            Some(Err(word)) => {
                console::log_unknown_command(&word);
                continue;
            }
            Some(Ok(command)) => command,
        };

        match command {
            AdminCommand::Status => {
                console::print_status(service.api_addr(), service.settings().update_interval)
            }
            AdminCommand::Reload => match Settings::load(&config_path) {
                Ok(settings) => {
                    let interval = settings.update_interval;
                    service.reload(settings);
                    console::log_reloaded(interval);
                }
                Err(e) => {
                    tracing::error!(error = %e, "reload failed; keeping current configuration");
                    console::log_reload_failed(&e.to_string());
                }
            },
            AdminCommand::Start => match service.start_api().await {
                Ok(()) => console::log_api_started(service.api_addr()),
                Err(e) => console::log_api_failed(&e.to_string()),
            },
            AdminCommand::Stop => {
                service.stop_api().await;
                console::log_api_stopped();
            }
            AdminCommand::Help => console::print_help(),
            AdminCommand::Quit => break,
        }
    }

    service.disable().await;
    Ok(())
}

/// `RUST_LOG` wins; otherwise `debug: true` in the config turns on verbose output.
fn init_tracing(debug: bool) {
    let fallback = if debug {
        "mcstatus=debug,tower_http=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
