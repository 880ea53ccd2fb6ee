//! HC-SR04 style ultrasonic ranging.
//!
//! The sensor is triggered by a short pulse on the trigger line and answers
//! with an echo pulse whose width is the acoustic round-trip time. Physical
//! triggers are rate-limited; calls arriving inside the settling window get
//! the cached reading back.
//!
//! A reading of `0` is a sentinel: no echo, timeout, or a width outside the
//! sensor's physical range. The controller treats it as "path clear".

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::utils::config::{SensorTiming, ECHO_US_PER_CM, MAX_VALID_CM, MIN_VALID_CM};

/// Errors raised by the sensor's I/O lines.
#[derive(Debug, PartialEq, Eq)]
pub enum SensorError<E: core::fmt::Debug> {
    Trigger(E),
    Echo(E),
}

/// Free-running microsecond counter, wrapping at `u32::MAX`.
///
/// Echo edges are timestamped against it, so pin reads and loop overhead are
/// part of the measured width.
pub trait MicrosClock {
    fn now_us(&mut self) -> u32;
}

/// Convert an echo width to centimetres, `0` if outside the valid window.
pub fn echo_to_cm(width_us: u32) -> u16 {
    let cm = width_us / ECHO_US_PER_CM;
    if cm < u32::from(MIN_VALID_CM) || cm > u32::from(MAX_VALID_CM) {
        0
    } else {
        cm as u16
    }
}

/// Rate-limited range sensor over a trigger output, an echo input, a
/// microsecond delay and a microsecond clock.
pub struct RangeSensor<Trig, Echo, Delay, Clock> {
    trig: Trig,
    echo: Echo,
    delay: Delay,
    clock: Clock,
    timing: SensorTiming,
    last_trigger_ms: Option<u32>,
    last_distance: u16,
}

impl<Trig, Echo, Delay, Clock, E> RangeSensor<Trig, Echo, Delay, Clock>
where
    Trig: OutputPin<Error = E>,
    Echo: InputPin<Error = E>,
    Delay: DelayNs,
    Clock: MicrosClock,
    E: core::fmt::Debug,
{
    pub fn new(
        trig: Trig,
        echo: Echo,
        delay: Delay,
        clock: Clock,
    ) -> Self {
        Self::with_timing(trig, echo, delay, clock, SensorTiming::DEFAULT)
    }

    pub fn with_timing(
        trig: Trig,
        echo: Echo,
        delay: Delay,
        clock: Clock,
        timing: SensorTiming,
    ) -> Self {
        Self {
            trig,
            echo,
            delay,
            clock,
            timing,
            last_trigger_ms: None,
            last_distance: 0,
        }
    }

    /// Park the trigger line low.
    pub fn begin(&mut self) -> Result<(), SensorError<E>> {
        self.trig.set_low().map_err(SensorError::Trigger)
    }

    /// Last reading handed out, without touching the hardware.
    pub fn last_distance(&self) -> u16 {
        self.last_distance
    }

    /// Return a distance sample in centimetres.
    ///
    /// Triggers the sensor only if at least `min_interval_ms` elapsed since
    /// the previous trigger; otherwise returns the cached sample. Blocks for
    /// at most the echo timeout.
    pub fn acquire(
        &mut self,
        now_ms: u32,
    ) -> Result<u16, SensorError<E>> {
        if let Some(last) = self.last_trigger_ms {
            if now_ms.wrapping_sub(last) < self.timing.min_interval_ms {
                return Ok(self.last_distance);
            }
        }
        self.last_trigger_ms = Some(now_ms);

        self.fire()?;

        let distance = match self.measure_echo()? {
            Some(width_us) => {
                let cm = echo_to_cm(width_us);
                if cm == 0 {
                    tracing::debug!(width_us, "echo outside sensor range");
                }
                cm
            }
            None => {
                tracing::debug!("echo timeout");
                0
            }
        };

        self.last_distance = distance;
        Ok(distance)
    }

    /// LOW, settle, HIGH for the pulse width, LOW.
    fn fire(&mut self) -> Result<(), SensorError<E>> {
        self.trig.set_low().map_err(SensorError::Trigger)?;
        self.delay.delay_us(self.timing.settle_us);
        self.trig.set_high().map_err(SensorError::Trigger)?;
        self.delay.delay_us(self.timing.trigger_pulse_us);
        self.trig.set_low().map_err(SensorError::Trigger)
    }

    /// Width of the next high pulse on the echo line, `None` on timeout.
    ///
    /// The width is the clock distance between the two edges; the budget runs
    /// from the first poll.
    fn measure_echo(&mut self) -> Result<Option<u32>, SensorError<E>> {
        let step = self.timing.poll_step_us.max(1);
        let budget = self.timing.echo_timeout_us;
        let start = self.clock.now_us();

        while !self.echo.is_high().map_err(SensorError::Echo)? {
            if self.clock.now_us().wrapping_sub(start) >= budget {
                return Ok(None);
            }
            self.delay.delay_us(step);
        }
        let rise = self.clock.now_us();

        while self.echo.is_high().map_err(SensorError::Echo)? {
            if self.clock.now_us().wrapping_sub(start) >= budget {
                return Ok(None);
            }
            self.delay.delay_us(step);
        }
        let fall = self.clock.now_us();

        Ok(Some(fall.wrapping_sub(rise)))
    }
}
