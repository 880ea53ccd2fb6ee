//! Module Exports
//!
//! This file exports the controller components and ties them into one
//! control loop.
//!
//! - `ultrasonic`: rate-limited HC-SR04 ranging.
//! - `motor`: signed speed to two-line PWM motor output.
//! - `maneuver`: distance to speed, with the timed avoidance maneuver.
//! - `leds`: RGB speed indicator.
//! - `display`: 128×64 status screen.

pub mod display;
pub mod leds;
pub mod maneuver;
pub mod motor;
pub mod ultrasonic;

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    pwm::SetDutyCycle,
};
use serde::{Deserialize, Serialize};

pub use display::{OledStatus, StatusView};
pub use leds::StatusLed;
pub use maneuver::{ManeuverController, ManeuverState};
pub use motor::MotorOutput;
pub use ultrasonic::{MicrosClock, RangeSensor, SensorError};

use crate::utils::config::{LoopTiming, ManeuverConfig};

/// Source of distance samples, in centimetres, `0` meaning no reading.
pub trait Ranging {
    type Error;

    fn begin(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn acquire(
        &mut self,
        now_ms: u32,
    ) -> Result<u16, Self::Error>;
}

/// Consumer of signed speed commands in percent.
pub trait Drive {
    type Error: core::fmt::Debug;

    fn set_speed(
        &mut self,
        percent: i16,
    ) -> Result<(), Self::Error>;

    /// Stop the motor after a fault.
    fn brake(&mut self) -> Result<(), Self::Error> {
        self.set_speed(0)
    }
}

/// Indicator fed with the unsigned speed magnitude once per tick.
pub trait SpeedIndicator {
    type Error: core::fmt::Debug;

    fn begin(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_error(
        &mut self,
        active: bool,
        now_ms: u32,
    );

    fn update(
        &mut self,
        percent: u8,
        now_ms: u32,
    ) -> Result<(), Self::Error>;
}

/// Display fed with the full tick output.
pub trait StatusDisplay {
    type Error: core::fmt::Debug;

    /// Start-up frame, kept until the first tick.
    fn begin(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn update(
        &mut self,
        distance_cm: u16,
        speed: i8,
        error: bool,
    ) -> Result<(), Self::Error>;
}

impl<Trig, Echo, Delay, Clock, E> Ranging for RangeSensor<Trig, Echo, Delay, Clock>
where
    Trig: OutputPin<Error = E>,
    Echo: InputPin<Error = E>,
    Delay: DelayNs,
    Clock: MicrosClock,
    E: core::fmt::Debug,
{
    type Error = SensorError<E>;

    fn begin(&mut self) -> Result<(), Self::Error> {
        RangeSensor::begin(self)
    }

    fn acquire(
        &mut self,
        now_ms: u32,
    ) -> Result<u16, Self::Error> {
        RangeSensor::acquire(self, now_ms)
    }
}

impl<A, B, E> Drive for MotorOutput<A, B>
where
    A: SetDutyCycle<Error = E>,
    B: SetDutyCycle<Error = E>,
    E: core::fmt::Debug,
{
    type Error = E;

    fn set_speed(
        &mut self,
        percent: i16,
    ) -> Result<(), Self::Error> {
        MotorOutput::set_speed(self, percent)
    }

    fn brake(&mut self) -> Result<(), Self::Error> {
        MotorOutput::brake(self)
    }
}

/// Errors that stop a control tick.
#[derive(Debug, PartialEq, Eq)]
pub enum ControlError<SE, ME> {
    Sensor(SE),
    Motor(ME),
}

/// Output of one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSnapshot {
    pub distance_cm: u16,
    pub speed: i8,
    pub error: bool,
    pub state: ManeuverState,
}

/// The control loop: sensor → maneuver → motor → indicators, once per tick.
pub struct SystemController<S, M, L, D> {
    sensor: S,
    maneuver: ManeuverController,
    motor: M,
    led: L,
    display: D,
    timing: LoopTiming,
    last_tick_ms: u32,
    error: bool,
    fault: bool,
}

impl<S, M, L, D> SystemController<S, M, L, D>
where
    S: Ranging,
    M: Drive,
    L: SpeedIndicator,
    D: StatusDisplay,
{
    pub fn new(
        sensor: S,
        motor: M,
        led: L,
        display: D,
        maneuver: Option<ManeuverConfig>,
        timing: Option<LoopTiming>,
    ) -> Self {
        SystemController {
            sensor,
            maneuver: ManeuverController::new(maneuver.unwrap_or_default()),
            motor,
            led,
            display,
            timing: timing.unwrap_or_default(),
            last_tick_ms: 0,
            error: false,
            fault: false,
        }
    }

    pub fn state(&self) -> ManeuverState {
        self.maneuver.state()
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Diagnostics hook: flag a fault to the indicators from the next tick on.
    ///
    /// A timeout still reads as a clear path; only pin errors raise the
    /// indicators' fault view by themselves, until the next clean tick.
    pub fn set_error(
        &mut self,
        active: bool,
    ) {
        self.error = active;
    }

    /// Start the sinks, apply the start-up command and start pacing.
    ///
    /// The LED shows the start-up speed right away; the display keeps its
    /// splash until the first tick.
    pub fn begin(
        &mut self,
        now_ms: u32,
    ) -> Result<(), ControlError<S::Error, M::Error>> {
        self.sensor.begin().map_err(ControlError::Sensor)?;
        if let Err(e) = self.led.begin() {
            tracing::warn!(?e, "status LED start failed");
        }
        if let Err(e) = self.display.begin() {
            tracing::warn!(?e, "status display start failed");
        }

        let speed = self.timing.startup_speed;
        self.motor
            .set_speed(i16::from(speed))
            .map_err(ControlError::Motor)?;
        self.render_led(speed, now_ms);
        self.last_tick_ms = now_ms;
        tracing::info!(speed, "controller started");
        Ok(())
    }

    /// Run one control tick if the pacing interval has elapsed.
    ///
    /// Returns `Ok(None)` for a skipped call. On a sensor or motor error the
    /// motor is braked and the indicators show the fault before the error is
    /// returned.
    pub fn tick(
        &mut self,
        now_ms: u32,
    ) -> Result<Option<ControlSnapshot>, ControlError<S::Error, M::Error>> {
        if now_ms.wrapping_sub(self.last_tick_ms) < self.timing.update_interval_ms {
            return Ok(None);
        }
        self.last_tick_ms = now_ms;

        let distance_cm = match self.sensor.acquire(now_ms) {
            Ok(cm) => cm,
            Err(e) => {
                self.halt(0, now_ms);
                return Err(ControlError::Sensor(e));
            }
        };
        let speed = self.maneuver.tick(distance_cm, now_ms);
        if let Err(e) = self.motor.set_speed(i16::from(speed)) {
            self.halt(distance_cm, now_ms);
            return Err(ControlError::Motor(e));
        }
        self.fault = false;
        self.render(distance_cm, speed, now_ms);

        let snapshot = ControlSnapshot {
            distance_cm,
            speed,
            error: self.error_flag(),
            state: self.maneuver.state(),
        };
        tracing::trace!(?snapshot, "tick");
        Ok(Some(snapshot))
    }

    fn error_flag(&self) -> bool {
        self.error || self.fault
    }

    fn halt(
        &mut self,
        distance_cm: u16,
        now_ms: u32,
    ) {
        self.fault = true;
        if let Err(e) = self.motor.brake() {
            tracing::warn!(?e, "motor brake failed");
        }
        self.render(distance_cm, 0, now_ms);
    }

    fn render_led(
        &mut self,
        speed: i8,
        now_ms: u32,
    ) {
        self.led.set_error(self.error_flag(), now_ms);
        if let Err(e) = self.led.update(speed.unsigned_abs(), now_ms) {
            tracing::warn!(?e, "status LED update failed");
        }
    }

    fn render(
        &mut self,
        distance_cm: u16,
        speed: i8,
        now_ms: u32,
    ) {
        self.render_led(speed, now_ms);
        if let Err(e) = self.display.update(distance_cm, speed, self.error_flag()) {
            tracing::warn!(?e, "status display update failed");
        }
    }
}
