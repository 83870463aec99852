//! Siren Runner
//!
//! Plays one siren driver action on a virtual clock. Frames are sent after
//! their declared delays, a simulated siren answers get requests, and timers
//! armed by the driver fire on time. The result is a timeline of frames,
//! reports, events and timers.
//!
//! ```text
//! siren --run-for 70 start-custom-beep 10 60 3 2
//! siren --clusters 0x25,0x70,0x98 speak "delayedAlarm 4, 2, 10, 5"
//! ```

mod cli;
mod error;
mod sim;

pub use cli::{Action, Cli};
pub use error::RunnerError;
pub use sim::{Relative, SimHost, SimulatedSiren, Simulation, TimelineEntry};

use siren_driver::{
    speak_command_help, DriverState, JsonFileStore, SirenDriver, SirenSettings, StateStore,
};
use siren_protocol::{from_hex, NodeCapabilities};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Outcome of a run.
#[derive(Debug)]
pub struct RunOutput {
    /// Start of the virtual clock.
    pub start_ms: i64,
    /// Everything that happened.
    pub timeline: Vec<TimelineEntry>,
    /// Driver state at the end of the run.
    pub final_state: DriverState,
}

impl RunOutput {
    /// Human readable timeline, one line per entry.
    pub fn lines(&self) -> Vec<String> {
        self.timeline
            .iter()
            .map(|entry| {
                Relative {
                    start_ms: self.start_ms,
                    entry,
                }
                .to_string()
            })
            .collect()
    }

    /// Timeline as JSON lines.
    pub fn json_lines(&self) -> Result<Vec<String>, RunnerError> {
        self.timeline
            .iter()
            .map(|entry| serde_json::to_string(entry).map_err(RunnerError::from))
            .collect()
    }
}

/// Install the tracing subscriber. `--log-level` wins over `RUST_LOG`,
/// which wins over the `warn` default.
pub fn init_logging(log_level: Option<&str>) -> Result<(), RunnerError> {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level).map_err(|e| RunnerError::Logging(e.to_string()))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| RunnerError::Logging(e.to_string()))
}

/// Virtual start time from `--start`, or the wall clock.
pub fn start_time_ms(start: Option<&str>) -> Result<i64, RunnerError> {
    match start {
        Some(text) => chrono::DateTime::parse_from_rfc3339(text)
            .map(|t| t.timestamp_millis())
            .map_err(|e| RunnerError::StartTime(text.to_string(), e)),
        None => Ok(chrono::Utc::now().timestamp_millis()),
    }
}

/// Build the driver described by the command line.
pub fn build_driver(cli: &Cli) -> Result<SirenDriver, RunnerError> {
    let settings = match &cli.settings {
        Some(path) => SirenSettings::load(path)?,
        None => SirenSettings::default(),
    };

    let capabilities = cli
        .clusters
        .as_deref()
        .map(NodeCapabilities::from_clusters)
        .unwrap_or_default()
        .with_secure_inclusion(cli.secure);

    let mut driver = SirenDriver::new(cli.name.clone(), settings, &capabilities);
    if let Some(path) = &cli.state {
        if let Some(state) = JsonFileStore::new(path).load()? {
            info!("restored state from {}", path.display());
            driver = driver.with_state(state);
        }
    }
    Ok(driver)
}

/// Run the command line's action on a virtual clock starting at `start_ms`.
pub fn run(cli: &Cli, start_ms: i64) -> Result<RunOutput, RunnerError> {
    let driver = build_driver(cli)?;
    let mut sim = Simulation::new(driver, start_ms);

    match &cli.action {
        Action::Report { hex } => {
            let frame = from_hex(hex)?;
            sim.inject(&frame);
        }
        action => sim.apply(|driver, host| action.apply(driver, host)),
    }

    sim.run_until(start_ms + (cli.run_for as i64) * 1000);
    let (driver, timeline) = sim.finish();

    if let Some(path) = &cli.state {
        JsonFileStore::new(path).save(driver.state())?;
    }

    Ok(RunOutput {
        start_ms,
        timeline,
        final_state: driver.state().clone(),
    })
}

/// Entry point used by the binary.
pub fn main_with(cli: Cli) -> Result<(), RunnerError> {
    init_logging(cli.log_level.as_deref())?;

    if matches!(cli.action, Action::SpeakHelp) {
        print!("{}", speak_command_help());
        return Ok(());
    }

    let start_ms = start_time_ms(cli.start.as_deref())?;
    let output = run(&cli, start_ms)?;

    let lines = if cli.json { output.json_lines()? } else { output.lines() };
    for line in lines {
        println!("{}", line);
    }
    if !cli.json {
        println!("final status: {}", output.final_state.status);
    }
    Ok(())
}
