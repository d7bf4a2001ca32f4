use clap::Parser;
use log::{error, info};
use privacy_sentinel::config::{self, Config};
use privacy_sentinel::controller::{Mode, PrivacyController};
use privacy_sentinel::inventory::CameraInventory;
use privacy_sentinel::mask::HttpMaskApplier;
use privacy_sentinel::monitor::MonitorLoop;
use privacy_sentinel::notify::{Notifier, NullNotifier, SmtpNotifier};
use privacy_sentinel::schedule::WeeklySchedule;
use privacy_sentinel::signal::{SignalSource, SimulatedSignalSource};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(
    name = "privacy-sentinel",
    version,
    about = "Toggle camera privacy masks from alarm panel signals"
)]
struct Cli {
    /// Path to the camera inventory JSON file
    #[arg(long, value_name = "FILE", env = "CAMERAS_FILE")]
    inventory: Option<PathBuf>,

    /// Read panel signals from the simulated pin-state file instead of GPIO
    #[arg(long)]
    simulate: bool,

    /// Derive masking from the business-hours schedule instead of panel signals
    #[arg(long)]
    schedule: bool,
}

fn init_logger() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();

    // Optional file destination; default stays on stderr
    if let Ok(path) = std::env::var("LOGFILE_PATH") {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Cannot open log file {path}: {e}"),
        }
    }

    builder.init();
}

#[tokio::main]
async fn main() {
    config::load_dotenv();
    let cli = Cli::parse();
    init_logger();

    info!("Starting privacy-sentinel");

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    if let Some(path) = cli.inventory.clone() {
        config.inventory_path = path;
    }
    if cli.schedule {
        config.schedule.enabled = true;
    }
    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    let inventory = match CameraInventory::load(&config.inventory_path) {
        Ok(inventory) => inventory,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let mode = if config.schedule.enabled {
        Mode::ScheduleDriven
    } else {
        Mode::SignalDriven
    };

    info!("Configuration loaded:");
    info!("  Inventory: {}", config.inventory_path.display());
    info!(
        "  Cameras: {} ({} interior)",
        inventory.len(),
        inventory.interior().count()
    );
    info!("  Mode: {mode:?}");
    info!(
        "  Notifications: {}",
        if config.email.enabled {
            "email"
        } else {
            "disabled"
        }
    );
    info!("  Language: {}", config.language);

    let schedule = WeeklySchedule::from_config(&config.schedule.hours);

    let applier = match HttpMaskApplier::new(config.camera.clone()) {
        Ok(applier) => applier,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let notifier: Box<dyn Notifier> = if config.email.enabled {
        match SmtpNotifier::new(&config.email) {
            Ok(notifier) => Box::new(notifier),
            Err(e) => {
                error!("Broken mail configuration: {e}");
                std::process::exit(1);
            }
        }
    } else {
        Box::new(NullNotifier)
    };

    let controller = PrivacyController::new(mode, inventory, schedule, Box::new(applier), notifier);

    if let Err(e) = run_with_source(&cli, &config, controller).await {
        error!("Monitor loop failed: {e}");
        std::process::exit(1);
    }

    info!("privacy-sentinel stopped");
}

#[cfg(feature = "hardware")]
async fn run_with_source(
    cli: &Cli,
    config: &Config,
    controller: PrivacyController,
) -> privacy_sentinel::Result<()> {
    if cli.simulate {
        return run_monitor(simulated_source(config), controller, config).await;
    }

    let source = privacy_sentinel::signal::GpioSignalSource::new(
        config.signal.armed_pin,
        config.signal.alarm_pin,
    )?;
    run_monitor(source, controller, config).await
}

#[cfg(not(feature = "hardware"))]
async fn run_with_source(
    cli: &Cli,
    config: &Config,
    controller: PrivacyController,
) -> privacy_sentinel::Result<()> {
    if !cli.simulate {
        info!("Built without hardware support, using the simulated signal source");
    }
    run_monitor(simulated_source(config), controller, config).await
}

fn simulated_source(config: &Config) -> SimulatedSignalSource {
    SimulatedSignalSource::new(
        config.signal.pin_state_file.clone(),
        config.signal.armed_pin,
        config.signal.alarm_pin,
    )
}

/// Run the monitor loop until it fails or the process is interrupted.
/// Dropping the loop on the way out releases the signal source and its
/// pins; in-flight camera calls are abandoned.
async fn run_monitor<S: SignalSource>(
    source: S,
    controller: PrivacyController,
    config: &Config,
) -> privacy_sentinel::Result<()> {
    let mut monitor = MonitorLoop::new(
        source,
        controller,
        Duration::from_secs(config.signal.poll_interval_secs),
        Duration::from_secs(config.schedule.refresh_interval_secs),
    )?;

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
            Ok(())
        }
        result = monitor.run() => result,
    }
}
