mod sim;

use std::process::ExitCode;

use clap::Parser;
use embassy_time::{block_for, Duration, Instant};
use oamc_core::utils::{
    controllers::{MotorOutput, RangeSensor, StatusLed},
    ControlError, ControlSnapshot, SystemController,
};
use sim::{ConsoleDisplay, LoggingPwm, SerialLedDriver, SonarHandle};
use tracing::{error, info, warn};

/// Polling period of the main loop; the controller paces itself on top.
const POLL: Duration = Duration::from_millis(1);

#[derive(Parser, Debug)]
#[clap(version = "1.0")]
struct Opts {
    /// Obstacle distances in cm, played in order (0 = nothing in range)
    #[clap(long, value_delimiter = ',', default_values_t = vec![30u16, 70, 20, 0])]
    distances: Vec<u16>,
    /// How long each distance is held, in ms
    #[clap(long, default_value_t = 1_000)]
    hold_ms: u64,
}

fn now_ms() -> u32 {
    // wraps like a 32-bit millisecond tick counter
    Instant::now().as_millis() as u32
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opts = Opts::parse();

    let sonar = SonarHandle::default();
    let (trig, echo, delay, clock) = sonar.pins();

    let mut ctrl = SystemController::new(
        RangeSensor::new(trig, echo, delay, clock),
        MotorOutput::new(LoggingPwm::new("in1"), LoggingPwm::new("in2")),
        StatusLed::new(SerialLedDriver),
        ConsoleDisplay::default(),
        None,
        None,
    );

    if let Err(e) = ctrl.begin(now_ms()) {
        error!(?e, "controller start failed");
        return ExitCode::FAILURE;
    }

    let mut last: Option<ControlSnapshot> = None;
    for &cm in &opts.distances {
        info!(cm, "obstacle moved");
        sonar.set_distance(cm);
        let until = Instant::now() + Duration::from_millis(opts.hold_ms);

        while Instant::now() < until {
            match ctrl.tick(now_ms()) {
                Ok(Some(snap)) => {
                    if last.is_none_or(|l| l.speed != snap.speed || l.state != snap.state) {
                        match serde_json::to_string(&snap) {
                            Ok(json) => info!("{}", json),
                            Err(e) => warn!(?e, "snapshot encoding failed"),
                        }
                    }
                    last = Some(snap);
                }
                Ok(None) => {}
                Err(ControlError::Sensor(e)) => error!(?e, "sensor fault"),
                Err(ControlError::Motor(e)) => error!(?e, "motor fault"),
            }
            block_for(POLL);
        }
    }

    info!("scenario finished");
    ExitCode::SUCCESS
}
