// ==========================================================
//  nodescout  — mining node discovery for a local /24
// ==========================================================

use nodescout::net::interface;
use nodescout::table::{render_partial, render_results};
use nodescout::{
    FleetScout, JsonFileStore, KeyValueStore, RefreshOutcome, ScanConfig, ScanRequest,
    ScanResponse, ScoutError,
};
use std::sync::Arc;

enum Command {
    Scan(Option<String>),
    Refresh,
    SaveIp(String),
    Show,
}

fn print_usage() {
    println!("Usage: nodescout [OPTIONS] <COMMAND>");
    println!("Commands:");
    println!("  scan [IP]          scan the /24 of IP (default: saved IP, then local IP)");
    println!("  refresh            re-probe the nodes found by the last scan");
    println!("  save-ip <IP>       remember the IP whose /24 gets scanned");
    println!("  show               print the stored results");
    println!("Options:");
    println!("  -t, --timeout <MS> per-host timeout for scans (default: 1000)");
    println!("  -p, --port <PORT>  node HTTP port (default: 80)");
    println!("  --store <PATH>     storage file (default: per-user data dir)");
    println!("  -v, --log-level <LEVEL>  trace|debug|info|warn|error (default: warn)");
    println!("  --list             list all available network interfaces");
    println!("  -h, --help         show this help message");
}

fn setup_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Warn,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), ScoutError> {
    let raw_args: Vec<String> = std::env::args().collect();
    let mut args = raw_args.iter().skip(1);

    let mut config = ScanConfig::default();
    let mut store_path = None;
    let mut log_level = "warn".to_string();
    let mut positional = Vec::new();

    // Parse command line arguments
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--timeout" | "-t" => {
                if let Some(ms) = args.next().and_then(|s| s.parse().ok()) {
                    config = config.with_scan_timeout(ms);
                }
            }
            "--port" | "-p" => {
                if let Some(port) = args.next().and_then(|s| s.parse().ok()) {
                    config = config.with_port(port);
                }
            }
            "--store" => store_path = args.next().cloned(),
            "--log-level" | "-v" => {
                if let Some(level) = args.next() {
                    log_level = level.clone();
                }
            }
            "--list" => {
                interface::list_network_interfaces()?;
                return Ok(());
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            _ => positional.push(arg.clone()),
        }
    }

    setup_logging(&log_level);

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("scan") => Command::Scan(positional.next()),
        Some("refresh") => Command::Refresh,
        Some("save-ip") => match positional.next() {
            Some(ip) => Command::SaveIp(ip),
            None => {
                print_usage();
                return Err(ScoutError::Other("save-ip needs an IP address".to_string()));
            }
        },
        Some("show") => Command::Show,
        _ => {
            print_usage();
            return Err(ScoutError::Other("No command specified".to_string()));
        }
    };

    let store = match store_path {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::default_location()?,
    };
    log::info!("Using storage file {}", store.path().display());
    let storage: Arc<dyn KeyValueStore> = Arc::new(store);
    let scout = FleetScout::new(storage, config)?;

    match command {
        Command::SaveIp(ip) => {
            scout.save_base_ip(&ip)?;
            println!("Current IP: {}", ip.trim());
        }
        Command::Show => {
            let (records, aggregate) = scout.snapshot().await;
            if records.is_empty() {
                println!("No stored data. Run `nodescout scan` to search for nodes.");
            } else {
                println!("{}", render_results(&records, &aggregate));
            }
        }
        Command::Refresh => match scout.refresh().await {
            RefreshOutcome::NothingStored => {
                println!("No stored data. Run `nodescout scan` to search for nodes.");
            }
            RefreshOutcome::AllFailed => {
                println!("Failed to refresh data. Please try scanning again.");
            }
            RefreshOutcome::Refreshed(response) => {
                report_storage(&response);
                let (records, aggregate) = scout.snapshot().await;
                println!("{}", render_results(&records, &aggregate));
            }
        },
        Command::Scan(ip) => {
            let ip = match ip {
                Some(ip) => ip,
                None => match scout.saved_base_ip()? {
                    Some(ip) => ip,
                    None => interface::local_ipv4()?
                        .map(|ip| ip.to_string())
                        .ok_or(ScoutError::NoSavedAddress)?,
                },
            };
            let base_address = interface::base_address(&ip)?;
            println!("Scanning {}1-255 ...", base_address);

            let mut partials = scout.subscribe();
            let printer = tokio::spawn(async move {
                while let Some(partial) = partials.recv().await {
                    println!("{}", render_partial(&partial.record));
                }
            });

            let response = scout.scan(ScanRequest { base_address }).await?;
            let (records, aggregate) = scout.snapshot().await;

            // Closing the subscriber lets the printer drain and finish
            drop(scout);
            printer.await.ok();

            report_storage(&response);
            if response.results.is_empty() {
                println!("No nodes found.");
            } else {
                println!();
                println!("{}", render_results(&records, &aggregate));
            }
        }
    }

    Ok(())
}

fn report_storage(response: &ScanResponse) {
    if let Some(ref e) = response.persistence_error {
        eprintln!("Warning: results could not be saved: {}", e);
    }
}
