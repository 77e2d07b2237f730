use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use structopt::StructOpt;

use netalarm::config::Config;
use netalarm::engine::{run_live, run_replay, Inspector};
use netalarm::input::PcapPacketSource;
use netalarm::report::IncidentReporter;

/// Lightweight network traffic inspector
///
/// Replays an access log when a file is given, otherwise captures live
/// traffic from the configured interface until interrupted.
#[derive(StructOpt, Debug)]
#[structopt(name = "netalarm", about = "Network traffic inspector")]
struct Cli {
    /// Access log file to replay; omit to capture live traffic
    #[structopt(parse(from_os_str))]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::from_args();

    // Load configuration
    let config_path = PathBuf::from("netalarm.toml");
    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        log::info!("No netalarm.toml found, using defaults");
        Config::default()
    };

    let reporter = IncidentReporter::new();
    let mut inspector = Inspector::new(reporter)?;

    match cli.log_file {
        Some(path) => {
            log::info!("Replaying access log {:?}", path);
            let file = File::open(&path)?;
            run_replay(BufReader::new(file), &mut inspector)?;
        }
        None => {
            // External cancellation: Ctrl+C closes the capture source
            let stop = Arc::new(AtomicBool::new(false));
            let flag = stop.clone();
            ctrlc::set_handler(move || {
                log::info!("Received shutdown signal, closing capture source...");
                flag.store(true, Ordering::SeqCst);
            })?;

            let mut source = PcapPacketSource::open(&config.capture, stop)?;
            run_live(&mut source, &mut inspector)?;
        }
    }

    Ok(())
}
