//! DC motor output for a two-input bridge driver (L293D and friends).
//!
//! Forward drives line A with the duty and holds line B low; reverse mirrors
//! that. Zero holds both lines low. Repeated commands are not re-written.

use embedded_hal::pwm::SetDutyCycle;

use crate::utils::{config::MOTOR_DEADBAND_PCT, math::mapping::magnitude_to_duty};

/// Clamp to `[-100, 100]` and apply the deadband.
pub fn normalize_speed(percent: i16) -> i8 {
    let p = percent.clamp(-100, 100);
    if p.unsigned_abs() < u16::from(MOTOR_DEADBAND_PCT) {
        0
    } else {
        p as i8
    }
}

/// Signed-percentage motor output over two PWM lines.
pub struct MotorOutput<A, B> {
    line_a: A,
    line_b: B,
    last_applied: Option<i8>,
}

impl<A, B, E> MotorOutput<A, B>
where
    A: SetDutyCycle<Error = E>,
    B: SetDutyCycle<Error = E>,
{
    pub fn new(
        line_a: A,
        line_b: B,
    ) -> Self {
        Self {
            line_a,
            line_b,
            last_applied: None,
        }
    }

    /// Last command that reached the hardware, `None` after a brake.
    pub fn speed(&self) -> Option<i8> {
        self.last_applied
    }

    /// Apply a signed speed percentage.
    ///
    /// Out-of-range requests are clamped; a value equal to the last applied
    /// one performs no write. After a line error the next command is always
    /// written.
    pub fn set_speed(
        &mut self,
        percent: i16,
    ) -> Result<(), E> {
        let speed = normalize_speed(percent);
        if self.last_applied == Some(speed) {
            return Ok(());
        }

        let duty_a = magnitude_to_duty(speed.max(0).unsigned_abs(), self.line_a.max_duty_cycle());
        let duty_b = magnitude_to_duty(speed.min(0).unsigned_abs(), self.line_b.max_duty_cycle());
        // a failed write leaves the bridge in an unknown state
        self.last_applied = None;
        self.line_a.set_duty_cycle(duty_a)?;
        self.line_b.set_duty_cycle(duty_b)?;

        self.last_applied = Some(speed);
        Ok(())
    }

    /// Coast to a stop.
    pub fn stop(&mut self) -> Result<(), E> {
        self.set_speed(0)
    }

    /// Force both lines low with the driver enabled.
    ///
    /// Always writes, and forgets the last command so the next `set_speed`
    /// is applied even if it repeats the pre-brake value.
    pub fn brake(&mut self) -> Result<(), E> {
        self.last_applied = None;
        self.line_a.set_duty_cycle_fully_off()?;
        self.line_b.set_duty_cycle_fully_off()
    }
}
