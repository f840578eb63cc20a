use ratatui::{
    prelude::*,
    style::Style,
    symbols::border,
    widgets::{Block, Gauge, Widget},
};

use crate::drivers::gamepad_plus::event::TriggerInput;

/// Analog trigger magnitude. The border is highlighted while the trigger's
/// digital "active" bit is set.
#[derive(Debug, Default)]
pub struct TriggerGauge {
    text: String,
    value: TriggerInput,
    active: bool,
}

impl TriggerGauge {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn set_value(&mut self, value: TriggerInput, active: bool) {
        self.value = value;
        self.active = active;
    }
}

impl Widget for &TriggerGauge {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.active {
            Style::new().yellow().bold()
        } else {
            Style::new()
        };
        let block = Block::bordered()
            .title(self.text.as_str())
            .border_set(border::ROUNDED)
            .border_style(border_style);
        let inside_block = block.inner(area);
        block.render(area, buf);

        // Set the color based on the value
        let ratio = self.value.value as f64 / u8::MAX as f64;
        let color = {
            if ratio < 0.2 {
                Color::Indexed(53)
            } else if ratio < 0.4 {
                Color::Indexed(54)
            } else if ratio < 0.6 {
                Color::Indexed(55)
            } else if ratio < 0.8 {
                Color::Indexed(56)
            } else {
                Color::Indexed(57)
            }
        };

        let label = format!("{} ({}%)", self.value.value, self.value.percent());
        let gauge = Gauge::default()
            .gauge_style(color)
            .ratio(ratio)
            .label(label);
        gauge.render(inside_block, buf);
    }
}
