use ratatui::{
    prelude::*,
    symbols::border,
    widgets::{Block, Paragraph, Widget},
};

/// A single digital input, filled while pressed
#[derive(Debug, Default)]
pub struct ButtonGauge {
    text: String,
    pressed: bool,
}

impl ButtonGauge {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            pressed: false,
        }
    }

    pub fn set_value(&mut self, pressed: bool) {
        self.pressed = pressed;
    }
}

impl Widget for &ButtonGauge {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (border_style, fill) = if self.pressed {
            (Style::new().green(), Style::new().bg(Color::Indexed(93)).bold())
        } else {
            (Style::new().gray(), Style::new().bg(Color::Indexed(236)))
        };

        let block = Block::bordered()
            .border_set(border::ROUNDED)
            .border_style(border_style);
        let inside_block = block.inner(area);
        block.render(area, buf);

        // Center the label vertically inside the filled cell
        buf.set_style(inside_block, fill);
        let rows = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(inside_block);
        Paragraph::new(self.text.as_str())
            .style(fill)
            .alignment(Alignment::Center)
            .render(rows[1], buf);
    }
}
