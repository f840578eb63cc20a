pub mod widgets;


use std::{
    io::{self, Stdout},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use ratatui::{
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::Line,
    widgets::{Block, Paragraph, Widget, Wrap},
    Terminal,
};

use crate::{
    drivers::gamepad_plus::event::{Button, DPad, GamepadState, SystemButton},
    reader::{
        report::{LogReporter, Report, Reporter},
        StateSink,
    },
};

use widgets::{axis_gauge::AxisGauge, button_gauge::ButtonGauge, trigger_gauge::TriggerGauge};

/// Most recent warning, shared between a [TerminalReporter] and the
/// [TerminalView] that displays it.
#[derive(Debug, Default, Clone)]
pub struct StatusLine {
    inner: Arc<Mutex<Status>>,
}

#[derive(Debug, Default)]
struct Status {
    message: Option<String>,
    changed: bool,
}

impl StatusLine {
    pub fn set(&self, message: String) {
        let mut status = self.lock();
        status.message = Some(message);
        status.changed = true;
    }

    /// Returns the current message and whether it changed since the last call
    pub fn take(&self) -> (Option<String>, bool) {
        let mut status = self.lock();
        (status.message.clone(), std::mem::take(&mut status.changed))
    }

    fn lock(&self) -> MutexGuard<'_, Status> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [Reporter] that logs every report and keeps warnings and errors on the
/// [StatusLine]. The log output is written to stderr over the frame, so the
/// view repaints from scratch after each one.
#[derive(Debug)]
pub struct TerminalReporter {
    status: StatusLine,
}

impl TerminalReporter {
    pub fn new(status: StatusLine) -> Self {
        Self { status }
    }
}

impl Reporter for TerminalReporter {
    fn report(&mut self, report: Report) {
        if report.level() <= log::Level::Warn {
            self.status.set(report.to_string());
        }
        LogReporter.report(report);
    }
}

/// [StateSink] that redraws the whole terminal for every decoded report.
/// Raw mode is never enabled so Ctrl+C keeps working as usual.
pub struct TerminalView<B: Backend = CrosstermBackend<Stdout>> {
    terminal: Terminal<B>,
    status: StatusLine,
    needs_clear: bool,
    draw_failed: bool,
}

impl TerminalView {
    pub fn new(status: StatusLine) -> io::Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self::with_terminal(terminal, status))
    }
}

impl<B: Backend> TerminalView<B> {
    pub fn with_terminal(terminal: Terminal<B>, status: StatusLine) -> Self {
        Self {
            terminal,
            status,
            needs_clear: true,
            draw_failed: false,
        }
    }

    fn draw(&mut self, state: &GamepadState, raw: &[u8]) -> io::Result<()> {
        let (message, changed) = self.status.take();
        if self.needs_clear || changed {
            self.terminal.clear()?;
            self.terminal.hide_cursor()?;
            self.needs_clear = false;
        }
        let widget = GamepadStateWidget::new(state, raw).with_status(message);
        self.terminal
            .draw(|frame| frame.render_widget(&widget, frame.area()))?;
        Ok(())
    }

    /// Hand the terminal back for log output and prompts
    fn release(&mut self) -> io::Result<()> {
        self.terminal.clear()?;
        self.terminal.set_cursor_position(Position::ORIGIN)?;
        self.terminal.show_cursor()
    }
}

impl<B: Backend> StateSink for TerminalView<B> {
    fn present(&mut self, state: &GamepadState, raw: &[u8]) {
        match self.draw(state, raw) {
            Ok(()) => self.draw_failed = false,
            Err(e) if !self.draw_failed => {
                log::warn!("Unable to draw gamepad state: {e}");
                self.draw_failed = true;
            }
            Err(_) => (),
        }
    }

    fn disconnected(&mut self) {
        if self.needs_clear {
            return;
        }
        self.needs_clear = true;
        if let Err(e) = self.release() {
            log::warn!("Unable to restore terminal: {e}");
        }
    }
}

impl<B: Backend> Drop for TerminalView<B> {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

/// Formats report bytes as space separated hex
pub fn hex_string(raw: &[u8]) -> String {
    raw.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full view of one decoded report
#[derive(Debug)]
pub struct GamepadStateWidget {
    dpad: DPad,
    pressed: Vec<String>,
    raw: String,
    status: Option<String>,
    axes: [AxisGauge; 2],
    triggers: [TriggerGauge; 2],
    buttons: Vec<ButtonGauge>,
}

impl GamepadStateWidget {
    pub fn new(state: &GamepadState, raw: &[u8]) -> Self {
        let mut left_stick = AxisGauge::new("Left Stick");
        left_stick.set_value(&state.left_stick);
        let mut right_stick = AxisGauge::new("Right Stick");
        right_stick.set_value(&state.right_stick);

        let mut left_trigger = TriggerGauge::new("LT");
        left_trigger.set_value(state.left_trigger, state.is_active(SystemButton::LT));
        let mut right_trigger = TriggerGauge::new("RT");
        right_trigger.set_value(state.right_trigger, state.is_active(SystemButton::RT));

        let mut buttons = Vec::with_capacity(Button::ALL.len() + SystemButton::ALL.len());
        for button in Button::ALL {
            let mut gauge = ButtonGauge::new(button.to_string().as_str());
            gauge.set_value(state.is_pressed(button));
            buttons.push(gauge);
        }
        for button in SystemButton::ALL {
            let mut gauge = ButtonGauge::new(button.to_string().as_str());
            gauge.set_value(state.is_active(button));
            buttons.push(gauge);
        }

        let pressed = state
            .buttons
            .iter()
            .map(ToString::to_string)
            .chain(state.system_buttons.iter().map(ToString::to_string))
            .collect();

        Self {
            dpad: state.dpad,
            pressed,
            raw: hex_string(raw),
            status: None,
            axes: [left_stick, right_stick],
            triggers: [left_trigger, right_trigger],
            buttons,
        }
    }

    /// Show a status message below the report details
    pub fn with_status(mut self, status: Option<String>) -> Self {
        self.status = status;
        self
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title("GamePadPlus V3")
            .border_set(border::ROUNDED)
            .border_style(Style::new().blue());

        let pressed = if self.pressed.is_empty() {
            "none".to_string()
        } else {
            self.pressed.join(", ")
        };
        let lines = vec![
            Line::from(format!("D-pad: {}", self.dpad)),
            Line::from(format!("Pressed: {pressed}")),
            Line::from(format!("Raw data: {}", self.raw)),
            Line::from(format!(
                "Status: {}",
                self.status.as_deref().unwrap_or("ok")
            )),
        ];
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }

    fn render_axes(&self, area: Rect, buf: &mut Buffer) {
        let cells = create_grid(area, 1, 2);
        for (widget, area) in self.axes.iter().zip(cells.iter()) {
            widget.render(*area, buf);
        }
    }

    fn render_triggers(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title("Triggers")
            .border_set(border::ROUNDED)
            .border_style(Style::new().yellow());
        let inside_block = block.inner(area);
        block.render(area, buf);

        let cells = create_grid(inside_block, 2, 1);
        for (widget, area) in self.triggers.iter().zip(cells.iter()) {
            widget.render(*area, buf);
        }
    }

    fn render_buttons(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title("Buttons")
            .border_set(border::ROUNDED)
            .border_style(Style::new().green());
        let inside_block = block.inner(area);
        block.render(area, buf);

        let cells = create_grid(inside_block, 2, 5);
        for (btn, area) in self.buttons.iter().zip(cells.iter()) {
            btn.render(*area, buf);
        }
    }
}

impl Widget for &GamepadStateWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let outer_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(7),
                Constraint::Fill(1),
                Constraint::Length(8),
            ])
            .split(area);
        self.render_status(outer_layout[0], buf);

        let middle_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(outer_layout[1]);
        self.render_axes(middle_layout[0], buf);
        self.render_triggers(middle_layout[1], buf);

        self.render_buttons(outer_layout[2], buf);
    }
}

/// Split the given area into equally sized cells, column by column
fn create_grid(area: Rect, rows: u16, columns: u16) -> Vec<Rect> {
    // Create the column areas
    let constraints: Vec<Constraint> = (0..columns).map(|_| Constraint::Fill(1)).collect();
    let column_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    // Create the individual grid cell areas
    let mut cells = Vec::with_capacity((rows * columns) as usize);
    for column in column_areas.iter() {
        let constraints: Vec<Constraint> = (0..rows).map(|_| Constraint::Fill(1)).collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(*column);
        for cell in rows.iter() {
            cells.push(*cell);
        }
    }

    cells
}
