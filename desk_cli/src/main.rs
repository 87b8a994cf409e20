use clap::{Parser, Subcommand};
use desk_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deskwatch")]
#[command(about = "Sit/stand posture nudge controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to $XDG_CONFIG_HOME/deskwatch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the controller against a sensor file (default)
    Run {
        /// Distance sensor attribute to poll
        #[arg(long)]
        sensor: Option<PathBuf>,

        /// File receiving indicator color codes (log only when omitted)
        #[arg(long)]
        indicator: Option<PathBuf>,

        /// Stop after this many cycles instead of running forever
        #[arg(long)]
        cycles: Option<usize>,
    },

    /// Replay readings through the controller on a virtual clock
    Simulate {
        /// Comma-separated readings; '-' marks a failed read
        #[arg(long, value_delimiter = ',', required_unless_present = "file")]
        readings: Vec<String>,

        /// File with one reading per line
        #[arg(long, conflicts_with = "readings")]
        file: Option<PathBuf>,

        /// Emit one JSON object per cycle
        #[arg(long)]
        json: bool,

        /// Wait one interval after transitions too
        #[arg(long)]
        uniform_cadence: bool,

        /// Override the sitting grace period (seconds)
        #[arg(long)]
        grace_secs: Option<u64>,

        /// Override the standing goal (seconds)
        #[arg(long)]
        goal_secs: Option<u64>,

        /// Override the standing distance cutoff
        #[arg(long)]
        cutoff: Option<u32>,
    },

    /// Print the effective configuration
    Config {
        /// Write it to the config path as well
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        desk_core::logging::init_with_level("debug");
    } else {
        desk_core::logging::init();
    }

    let saving = matches!(cli.command, Some(Commands::Config { save: true }));
    let config = match &cli.config {
        // A config path that is about to be written may not exist yet
        Some(path) if saving && !path.exists() => Config::default(),
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Some(Commands::Run {
            sensor,
            indicator,
            cycles,
        }) => cmd_run(config, sensor, indicator, cycles),
        Some(Commands::Simulate {
            readings,
            file,
            json,
            uniform_cadence,
            grace_secs,
            goal_secs,
            cutoff,
        }) => {
            let mut config = config;
            if uniform_cadence {
                config.cadence.resample_on_transition = false;
            }
            if let Some(secs) = grace_secs {
                config.thresholds.grace_period_secs = secs;
            }
            if let Some(secs) = goal_secs {
                config.thresholds.standing_goal_secs = secs;
            }
            if let Some(distance) = cutoff {
                config.thresholds.standing_cutoff = distance;
            }
            cmd_simulate(config, readings, file, json)
        }
        Some(Commands::Config { save }) => cmd_config(&config, cli.config, save),
        None => cmd_run(config, None, None, None),
    }
}

fn cmd_run(
    config: Config,
    sensor: Option<PathBuf>,
    indicator: Option<PathBuf>,
    cycles: Option<usize>,
) -> Result<()> {
    let mut monitor = match bring_up(&config, sensor, indicator) {
        Ok(monitor) => monitor,
        Err(e) => {
            tracing::error!("Initialization failed: {}", e);
            return Err(e);
        }
    };

    match cycles {
        Some(n) => {
            monitor.run_cycles(n);
            println!("Stopped after {} cycles", n);
            Ok(())
        }
        None => monitor.run(),
    }
}

type DeviceMonitor = Monitor<SystemClock, FileSensor, Box<dyn Indicator>>;

fn bring_up(
    config: &Config,
    sensor: Option<PathBuf>,
    indicator: Option<PathBuf>,
) -> Result<DeviceMonitor> {
    let sensor_path = sensor
        .or_else(|| config.sensor.path.clone())
        .ok_or_else(|| Error::DeviceInit("No distance sensor configured".into()))?;
    let sensor = FileSensor::open(sensor_path)?;

    let indicator: Box<dyn Indicator> = match indicator.or_else(|| config.indicator.path.clone()) {
        Some(path) => Box::new(FileIndicator::open(path)?),
        None => Box::new(LogIndicator::new()),
    };

    Monitor::new(config, SystemClock::new(), sensor, indicator)
}

fn cmd_simulate(
    config: Config,
    readings: Vec<String>,
    file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let tokens: Vec<String> = match file {
        Some(path) => std::fs::read_to_string(&path)?
            .lines()
            .map(str::to_string)
            .filter(|line| !line.trim().is_empty())
            .collect(),
        None => readings,
    };
    let script = parse_script(&tokens)?;
    let cycles = script.len();

    let mut monitor = Monitor::new(
        &config,
        ManualClock::new(0),
        ScriptedSensor::new(script),
        RecordingIndicator::new(),
    )?;

    for _ in 0..cycles {
        let report = monitor.run_cycle();
        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", format_report(&report));
        }
    }

    if !json {
        let state = monitor.state();
        println!(
            "final: posture={} notified={} standing_met={} indicator={}",
            state.posture,
            state.notified,
            state.standing_met,
            monitor
                .indicator()
                .last()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".into())
        );
    }

    Ok(())
}

fn parse_script(tokens: &[String]) -> Result<Vec<Option<u32>>> {
    tokens
        .iter()
        .map(|token| match token.trim() {
            "-" => Ok(None),
            value => value
                .parse::<u32>()
                .map(Some)
                .map_err(|e| Error::Other(format!("Invalid reading {:?}: {}", value, e))),
        })
        .collect()
}

fn format_report(report: &CycleReport) -> String {
    let reading = match report.reading {
        Reading::Measured(distance) => distance.to_string(),
        Reading::Held => "held".into(),
        Reading::Fallback => "fallback".into(),
    };

    let action = match &report.decision.action {
        Action::Transition { from, to, .. } => format!("transition {}->{}", from, to),
        Action::Sitting { elapsed_secs } => format!("sitting {}s", elapsed_secs),
        Action::SittingWarning { elapsed_secs } => format!("sitting {}s notified", elapsed_secs),
        Action::Standing { elapsed_secs } => format!("standing {}s", elapsed_secs),
        Action::StandingGoalMet { elapsed_secs } => format!("standing {}s met", elapsed_secs),
        Action::Steady => "steady".into(),
    };

    let indicator = report
        .decision
        .indicator
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".into());

    format!(
        "t={:>5} reading={:<8} {:<8} {} indicator={}",
        report.at_secs, reading, report.posture, action, indicator
    )
}

fn cmd_config(config: &Config, path: Option<PathBuf>, save: bool) -> Result<()> {
    print!("{}", config.to_toml()?);

    let errors = config.validate();
    if !errors.is_empty() {
        eprintln!("Configuration problems:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Config("Invalid configuration".into()));
    }

    if save {
        let path = match path {
            Some(path) => path,
            None => Config::default_config_path()?,
        };
        config.save_to(&path)?;
        println!("✓ Saved config to {}", path.display());
    }

    Ok(())
}
