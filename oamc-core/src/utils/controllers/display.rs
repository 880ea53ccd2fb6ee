//! 128×64 monochrome status screen.
//!
//! Shows the distance reading, the signed speed with its direction and a bar
//! of the speed magnitude. In error mode the bar is replaced by a fault view.
//! Text composition is kept apart from drawing so it can be checked without a
//! panel; drawing goes through any `embedded-graphics` `DrawTarget`.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use heapless::String;

use super::StatusDisplay;

pub const TITLE: &str = "Motor Control";
const LINE_Y: [i32; 3] = [30, 42, 54];
const BAR_ORIGIN: Point = Point::new(2, 52);
const BAR_MAX_WIDTH: u32 = 124;

pub type Line = String<32>;

fn line(args: core::fmt::Arguments<'_>) -> Line {
    let mut s = Line::new();
    // overlong text is truncated, not an error
    let _ = s.write_fmt(args);
    s
}

/// Text and bar contents of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub lines: [Line; 3],
    /// Filled bar width in pixels; `None` hides the bar frame as well.
    pub bar_width: Option<u32>,
}

impl StatusView {
    pub fn compose(
        distance_cm: u16,
        speed: i8,
        error: bool,
    ) -> Self {
        if error {
            return Self {
                lines: [
                    line(format_args!("ERROR: Timeout")),
                    line(format_args!("Raw: {} cm", distance_cm)),
                    line(format_args!("Check sensor/wiring")),
                ],
                bar_width: None,
            };
        }

        let distance = if distance_cm == 0 {
            line(format_args!("No Obstruction"))
        } else {
            line(format_args!("Distance: {} cm", distance_cm))
        };
        let mag = u32::from(speed.unsigned_abs()).min(100);
        let direction = if speed < 0 { "REV" } else { "FWD" };

        Self {
            lines: [
                distance,
                line(format_args!("PWM: {}% {}", mag, direction)),
                Line::new(),
            ],
            bar_width: Some(mag * BAR_MAX_WIDTH / 100),
        }
    }
}

/// Status screen over an `embedded-graphics` target.
///
/// Buffered panels still need their own flush after `update`; reach the panel
/// through [`OledStatus::target_mut`].
pub struct OledStatus<D> {
    target: D,
}

impl<D> OledStatus<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    /// Splash frame shown until the first tick.
    pub fn begin(&mut self) -> Result<(), D::Error> {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        self.target.clear(BinaryColor::Off)?;
        Text::with_baseline(TITLE, Point::new(0, 10), style, Baseline::Alphabetic)
            .draw(&mut self.target)?;
        Text::with_baseline(
            "System Initializing...",
            Point::new(0, 24),
            style,
            Baseline::Alphabetic,
        )
        .draw(&mut self.target)?;
        Ok(())
    }

    /// Draw a composed view.
    pub fn draw(
        &mut self,
        view: &StatusView,
    ) -> Result<(), D::Error> {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        self.target.clear(BinaryColor::Off)?;
        Text::with_baseline(TITLE, Point::new(0, 10), style, Baseline::Alphabetic)
            .draw(&mut self.target)?;

        for (text, y) in view.lines.iter().zip(LINE_Y) {
            if !text.is_empty() {
                Text::with_baseline(text.as_str(), Point::new(0, y), style, Baseline::Alphabetic)
                    .draw(&mut self.target)?;
            }
        }

        if let Some(width) = view.bar_width {
            Rectangle::new(Point::new(0, 50), Size::new(128, 10))
                .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
                .draw(&mut self.target)?;
            if width > 0 {
                Rectangle::new(BAR_ORIGIN, Size::new(width, 6))
                    .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                    .draw(&mut self.target)?;
            }
        }
        Ok(())
    }
}

impl<D> StatusDisplay for OledStatus<D>
where
    D: DrawTarget<Color = BinaryColor>,
    D::Error: core::fmt::Debug,
{
    type Error = D::Error;

    fn begin(&mut self) -> Result<(), Self::Error> {
        OledStatus::begin(self)
    }

    fn update(
        &mut self,
        distance_cm: u16,
        speed: i8,
        error: bool,
    ) -> Result<(), Self::Error> {
        self.draw(&StatusView::compose(distance_cm, speed, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct Canvas {
        px: [[bool; 128]; 64],
    }

    impl Canvas {
        fn new() -> Self {
            Self {
                px: [[false; 128]; 64],
            }
        }

        fn on(
            &self,
            x: usize,
            y: usize,
        ) -> bool {
            self.px[y][x]
        }

        fn rows_lit(
            &self,
            rows: core::ops::Range<usize>,
        ) -> bool {
            self.px[rows].iter().any(|row| row.iter().any(|&p| p))
        }
    }

    impl OriginDimensions for Canvas {
        fn size(&self) -> Size {
            Size::new(128, 64)
        }
    }

    impl DrawTarget for Canvas {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(
            &mut self,
            pixels: I,
        ) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(p, c) in pixels {
                if (0..128).contains(&p.x) && (0..64).contains(&p.y) {
                    self.px[p.y as usize][p.x as usize] = c.is_on();
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_compose_clear_path() {
        let v = StatusView::compose(0, 100, false);
        assert_eq!(v.lines[0].as_str(), "No Obstruction");
        assert_eq!(v.lines[1].as_str(), "PWM: 100% FWD");
        assert_eq!(v.bar_width, Some(124));
    }

    #[test]
    fn test_compose_reverse() {
        let v = StatusView::compose(72, -20, false);
        assert_eq!(v.lines[0].as_str(), "Distance: 72 cm");
        assert_eq!(v.lines[1].as_str(), "PWM: 20% REV");
        assert_eq!(v.bar_width, Some(24));
    }

    #[test]
    fn test_compose_error() {
        let v = StatusView::compose(0, 40, true);
        assert_eq!(v.lines[0].as_str(), "ERROR: Timeout");
        assert_eq!(v.lines[1].as_str(), "Raw: 0 cm");
        assert_eq!(v.lines[2].as_str(), "Check sensor/wiring");
        assert_eq!(v.bar_width, None);
    }

    #[test]
    fn test_begin_draws_splash() {
        let mut oled = OledStatus::new(Canvas::new());
        oled.update(30, 50, false).unwrap();
        StatusDisplay::begin(&mut oled).unwrap();
        let c = oled.target_mut();
        // title and "System Initializing...", nothing below
        assert!(c.rows_lit(0..11));
        assert!(c.rows_lit(14..25));
        assert!(!c.rows_lit(26..64));
    }

    #[test]
    fn test_bar_tracks_magnitude() {
        let mut oled = OledStatus::new(Canvas::new());
        oled.update(30, 50, false).unwrap();
        let c = oled.target_mut();
        assert!(c.on(0, 50) && c.on(127, 59));
        assert!(c.on(2, 54) && c.on(63, 54));
        assert!(!c.on(64, 54));

        oled.update(30, 0, false).unwrap();
        let c = oled.target_mut();
        assert!(c.on(0, 50));
        assert!(!c.on(2, 54));
    }

    #[test]
    fn test_error_view_has_no_bar() {
        let mut oled = OledStatus::new(Canvas::new());
        oled.update(12, 80, true).unwrap();
        let c = oled.target_mut();
        assert!(!c.on(127, 50) && !c.on(127, 59) && !c.on(120, 55));
    }
}
