//! RGB status LED for the Obstacle-Avoidance controller.
//!
//! Renders the unsigned speed magnitude as a red → yellow → green gradient on
//! a single pixel driven through `SmartLedsWrite`. The shown level eases
//! toward the commanded level one percent at a time. Error mode replaces the
//! gradient with a slow blue blink.

use smart_leds_trait::{SmartLedsWrite, RGB8};

use super::SpeedIndicator;

/// Time between two 1 % steps of the shown level.
const STEP_INTERVAL_MS: u32 = 20;
/// Half period of the 50 % → 0 % attention blink.
const BLINK_HALF_PERIOD_MS: u32 = 125;
/// Half period of the error blink.
const ERROR_BLINK_MS: u32 = 500;
const MAX_BRIGHTNESS: u8 = 255;
const DIM_BRIGHTNESS: u8 = 60;
/// Gradient midpoint (yellow).
const COLOR_TRANSITION_THRESHOLD: u8 = 50;

/// Gradient colour for a level in `[0, 100]`.
pub fn gradient(level: u8) -> RGB8 {
    let level = level.min(100);
    let max = f32::from(MAX_BRIGHTNESS);
    let half = f32::from(COLOR_TRANSITION_THRESHOLD);
    if level <= COLOR_TRANSITION_THRESHOLD {
        let t = f32::from(level) / half;
        RGB8::new(MAX_BRIGHTNESS, (max * t) as u8, 0)
    } else {
        let t = f32::from(level - COLOR_TRANSITION_THRESHOLD) / half;
        RGB8::new((max * (1.0 - t)) as u8, MAX_BRIGHTNESS, 0)
    }
}

fn scale(
    color: RGB8,
    brightness: u8,
) -> RGB8 {
    let s = |c: u8| (u16::from(c) * u16::from(brightness) / u16::from(MAX_BRIGHTNESS)) as u8;
    RGB8::new(s(color.r), s(color.g), s(color.b))
}

/// Speed indicator over a single addressable LED.
pub struct StatusLed<Driver> {
    driver: Driver,
    current: u8,
    target: u8,
    last_command: u8,
    blinking_to_zero: bool,
    blink_on: bool,
    error_active: bool,
    error_blink_on: bool,
    last_step_ms: u32,
    last_blink_ms: u32,
    last_error_blink_ms: u32,
}

impl<Driver, E> StatusLed<Driver>
where
    Driver: SmartLedsWrite<Color = RGB8, Error = E>,
{
    /// Create a new `StatusLed` over the given driver, dark and at level 0.
    pub fn new(driver: Driver) -> Self {
        Self {
            driver,
            current: 0,
            target: 0,
            last_command: 0,
            blinking_to_zero: false,
            blink_on: false,
            error_active: false,
            error_blink_on: false,
            last_step_ms: 0,
            last_blink_ms: 0,
            last_error_blink_ms: 0,
        }
    }

    /// Switch the LED off.
    pub fn begin(&mut self) -> Result<(), E> {
        self.write(RGB8::new(0, 0, 0))
    }

    /// Level currently shown, which lags the commanded one.
    pub fn level(&self) -> u8 {
        self.current
    }

    fn write(
        &mut self,
        color: RGB8,
    ) -> Result<(), E> {
        self.driver.write(core::iter::once(color))
    }

    fn render_error(
        &mut self,
        now_ms: u32,
    ) -> Result<(), E> {
        if now_ms.wrapping_sub(self.last_error_blink_ms) >= ERROR_BLINK_MS {
            self.last_error_blink_ms = now_ms;
            self.error_blink_on = !self.error_blink_on;
        }
        let b = if self.error_blink_on { MAX_BRIGHTNESS } else { 0 };
        self.write(RGB8::new(0, 0, b))
    }
}

impl<Driver, E> SpeedIndicator for StatusLed<Driver>
where
    Driver: SmartLedsWrite<Color = RGB8, Error = E>,
    E: core::fmt::Debug,
{
    type Error = E;

    fn begin(&mut self) -> Result<(), E> {
        StatusLed::begin(self)
    }

    fn set_error(
        &mut self,
        active: bool,
        now_ms: u32,
    ) {
        if active && !self.error_active {
            self.last_error_blink_ms = now_ms;
            self.error_blink_on = false;
        }
        self.error_active = active;
    }

    fn update(
        &mut self,
        percent: u8,
        now_ms: u32,
    ) -> Result<(), E> {
        if self.error_active {
            return self.render_error(now_ms);
        }

        let commanded = percent.min(100);
        if commanded != self.target {
            self.blinking_to_zero = self.last_command == 50 && commanded == 0;
            self.target = commanded;
            self.last_command = commanded;
        }

        if now_ms.wrapping_sub(self.last_step_ms) >= STEP_INTERVAL_MS {
            self.last_step_ms = now_ms;
            if self.current < self.target {
                self.current += 1;
            } else if self.current > self.target {
                self.current -= 1;
            }
        }

        let mut color = gradient(self.current);

        if self.blinking_to_zero && self.current > 0 {
            if now_ms.wrapping_sub(self.last_blink_ms) >= BLINK_HALF_PERIOD_MS {
                self.last_blink_ms = now_ms;
                self.blink_on = !self.blink_on;
            }
            let brightness = if self.blink_on { MAX_BRIGHTNESS } else { DIM_BRIGHTNESS };
            color = scale(color, brightness);
        }

        self.write(color)
    }
}
