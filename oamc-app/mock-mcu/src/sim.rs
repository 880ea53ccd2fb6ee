//! Simulated peripherals for running the controller on a host.
//!
//! The ultrasonic sensor is modelled on a shared microsecond clock that
//! advances through `SimDelay` and by a fixed cost per echo read, so echo
//! widths do not depend on host scheduling.

use std::{cell::RefCell, convert::Infallible, rc::Rc};

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType as PinErrorType, InputPin, OutputPin},
    pwm::{ErrorType as PwmErrorType, SetDutyCycle},
};
use oamc_core::utils::{
    config::ECHO_US_PER_CM,
    controllers::{MicrosClock, StatusDisplay, StatusView},
};
use smart_leds_trait::{SmartLedsWrite, RGB8};
use tracing::{debug, info};

/// Time between the trigger's falling edge and the echo's rising edge.
const ECHO_LATENCY_US: u64 = 450;
/// Time taken by one read of the echo line.
const READ_COST_US: u64 = 1;

#[derive(Default)]
struct Sonar {
    clock_us: u64,
    trig_high: bool,
    echo: Option<(u64, u64)>,
    distance_cm: u16,
}

/// Handle used to place the simulated obstacle.
#[derive(Clone, Default)]
pub struct SonarHandle(Rc<RefCell<Sonar>>);

impl SonarHandle {
    /// Put an obstacle at `cm`; `0` means nothing in range.
    pub fn set_distance(
        &self,
        cm: u16,
    ) {
        self.with(|s| s.distance_cm = cm);
    }

    fn with<R>(
        &self,
        f: impl FnOnce(&mut Sonar) -> R,
    ) -> R {
        f(&mut self.0.borrow_mut())
    }

    pub fn pins(&self) -> (SimTrigger, SimEcho, SimDelay, SimClock) {
        (
            SimTrigger(self.clone()),
            SimEcho(self.clone()),
            SimDelay(self.clone()),
            SimClock(self.clone()),
        )
    }
}

pub struct SimTrigger(SonarHandle);
pub struct SimEcho(SonarHandle);
pub struct SimDelay(SonarHandle);
pub struct SimClock(SonarHandle);

impl PinErrorType for SimTrigger {
    type Error = Infallible;
}

impl OutputPin for SimTrigger {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.with(|s| {
            if s.trig_high {
                // falling edge fires the burst
                s.echo = match s.distance_cm {
                    0 => None,
                    cm => {
                        let start = s.clock_us + ECHO_LATENCY_US;
                        let width = u64::from(cm) * u64::from(ECHO_US_PER_CM) + 29;
                        Some((start, start + width))
                    }
                };
            }
            s.trig_high = false;
        });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.with(|s| s.trig_high = true);
        Ok(())
    }
}

impl PinErrorType for SimEcho {
    type Error = Infallible;
}

impl InputPin for SimEcho {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.with(|s| {
            let high = matches!(s.echo, Some((start, end)) if (start..end).contains(&s.clock_us));
            s.clock_us += READ_COST_US;
            high
        }))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|h| !h)
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(
        &mut self,
        ns: u32,
    ) {
        let us = u64::from(ns).div_ceil(1_000);
        self.0.with(|s| s.clock_us += us);
    }
}

impl MicrosClock for SimClock {
    fn now_us(&mut self) -> u32 {
        // wraps like a 32-bit hardware counter
        self.0.with(|s| s.clock_us as u32)
    }
}

/// Motor driver input that logs the duty it is given.
pub struct LoggingPwm {
    name: &'static str,
}

impl LoggingPwm {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl PwmErrorType for LoggingPwm {
    type Error = Infallible;
}

impl SetDutyCycle for LoggingPwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(
        &mut self,
        duty: u16,
    ) -> Result<(), Self::Error> {
        debug!(line = self.name, duty, "motor PWM");
        Ok(())
    }
}

/// LED driver that logs to console.
pub struct SerialLedDriver;

impl SmartLedsWrite for SerialLedDriver {
    type Error = Infallible;
    type Color = RGB8;

    fn write<T, I>(
        &mut self,
        iterator: T,
    ) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        for c in iterator {
            let c: RGB8 = c.into();
            debug!(r = c.r, g = c.g, b = c.b, "LED");
        }
        Ok(())
    }
}

/// Text status screen printed whenever its contents change.
#[derive(Default)]
pub struct ConsoleDisplay {
    last: Option<StatusView>,
}

impl StatusDisplay for ConsoleDisplay {
    type Error = Infallible;

    fn update(
        &mut self,
        distance_cm: u16,
        speed: i8,
        error: bool,
    ) -> Result<(), Self::Error> {
        let view = StatusView::compose(distance_cm, speed, error);
        if self.last.as_ref() != Some(&view) {
            let [l0, l1, l2] = &view.lines;
            info!("[display] {} | {} | {}", l0, l1, l2);
            self.last = Some(view);
        }
        Ok(())
    }
}
