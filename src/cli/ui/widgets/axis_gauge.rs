use ratatui::{
    prelude::*,
    widgets::{
        canvas::{Canvas, Circle},
        Block, Widget,
    },
};

use crate::drivers::gamepad_plus::event::{AxisDirection, JoystickInput};

/// Plots a stick position inside its circular range
#[derive(Debug, Default)]
pub struct AxisGauge {
    text: String,
    x: i32,
    y: i32,
    x_direction: AxisDirection,
    y_direction: AxisDirection,
}

impl AxisGauge {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn set_value(&mut self, stick: &JoystickInput) {
        self.x = stick.x_percent();
        self.y = stick.y_percent();
        self.x_direction = stick.x_direction();
        self.y_direction = stick.y_direction();
    }
}

impl Widget for &AxisGauge {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            "{} ({}% {}, {}% {})",
            self.text,
            self.x,
            arrow(self.x_direction, '←', '→'),
            self.y,
            arrow(self.y_direction, '↑', '↓')
        );
        let canvas = Canvas::default()
            .block(Block::bordered().title(title))
            .marker(ratatui::symbols::Marker::Braille)
            .x_bounds([-101.0, 101.0])
            .y_bounds([-101.0, 101.0])
            .paint(|ctx| {
                // Draw the edges
                let circle = Circle {
                    radius: 100.0,
                    ..Default::default()
                };
                ctx.draw(&circle);

                // Canvas y grows upwards, report y grows downwards
                let (x, y) = (self.x as f64, -(self.y as f64));
                for radius in 0..10 {
                    let cursor = Circle {
                        x,
                        y,
                        radius: radius as f64,
                        color: Color::LightRed,
                    };
                    ctx.draw(&cursor);
                }
            });
        canvas.render(area, buf);
    }
}

fn arrow(direction: AxisDirection, negative: char, positive: char) -> char {
    match direction {
        AxisDirection::Negative => negative,
        AxisDirection::Centered => '|',
        AxisDirection::Positive => positive,
    }
}
