use crate::{
    app::{Action, AppContext, AppResult, AppView},
    components::Component,
};
use alloy::primitives::{Address, U256};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};

/// Number of discrete slider positions across the 160-bit address space.
pub const MAX_POSITION: u64 = 10_000_000_000;

/// Fixed-point scale applied to the float ratio before the integer-only
/// interpolation. Bounds the float rounding error to under one part in 10^12
/// of an address unit.
const RATIO_SCALE: u64 = 1_000_000_000_000;

/// Pane that turns a one-dimensional slider position into an EVM address and
/// bubbles every change upward.
#[derive(Debug)]
pub struct SelectorPane {
    position: u64,
    display_address: String,
    valid: bool,
    gauge_area: Option<Rect>,
}

#[derive(Debug)]
pub enum SelectorCommand {
    Step(i64),
    SetPosition(i64),
}

fn clamp_position(raw: i64) -> u64 {
    raw.clamp(0, MAX_POSITION as i64) as u64
}

/// Maps a slider position onto the 160-bit address range. Float arithmetic
/// stops at the scaled ratio; the final magnitude is integer-only.
fn interpolate(position: u64) -> U256 {
    let position = position.min(MAX_POSITION);
    let ratio = position as f64 / MAX_POSITION as f64;
    let scaled = (ratio * RATIO_SCALE as f64).floor() as u64;
    let max_address = U256::MAX >> 96;
    max_address * U256::from(scaled) / U256::from(RATIO_SCALE)
}

/// Renders an interpolated value as a checksummed address string. Falls back
/// to the uncased hex when the generated string fails validation, in which
/// case no address is reported upward.
fn render_address(value: U256) -> (String, Option<Address>) {
    let raw = format!(
        "0x{}",
        alloy::primitives::hex::encode(&value.to_be_bytes::<32>()[12..])
    );
    match raw.parse::<Address>() {
        Ok(address) => (address.to_checksum(None), Some(address)),
        Err(err) => {
            tracing::warn!(%raw, %err, "generated string failed address validation");
            (raw, None)
        }
    }
}

impl SelectorPane {
    pub fn new() -> Self {
        let mut pane = Self {
            position: 0,
            display_address: String::new(),
            valid: false,
            gauge_area: None,
        };
        pane.apply_set((MAX_POSITION / 2) as i64);
        pane
    }

    /// The address notification for the current position: the checksummed
    /// string, or `None` when generation did not validate.
    pub fn current_address(&self) -> Option<String> {
        self.valid.then(|| self.display_address.clone())
    }

    fn apply_set(&mut self, raw: i64) -> Option<String> {
        self.position = clamp_position(raw);
        let (display, address) = render_address(interpolate(self.position));
        self.valid = address.is_some();
        self.display_address = display;
        self.current_address()
    }

    fn apply_step(&mut self, delta: i64) -> Option<String> {
        let next = (self.position as i64).saturating_add(delta);
        self.apply_set(next)
    }

    /// Maps a mouse column inside the gauge onto a slider position.
    pub fn position_at(&self, column: u16, row: u16) -> Option<i64> {
        let area = self.gauge_area?;
        if row < area.y || row >= area.y + area.height || area.width < 2 {
            return None;
        }
        if column < area.x || column >= area.x + area.width {
            return None;
        }
        let ratio = (column - area.x) as f64 / (area.width - 1) as f64;
        Some((ratio * MAX_POSITION as f64).round() as i64)
    }

    fn ratio(&self) -> f64 {
        self.position as f64 / MAX_POSITION as f64
    }
}

impl Default for SelectorPane {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SelectorPane {
    type Command = SelectorCommand;

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        _ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        let notified = match command {
            SelectorCommand::Step(delta) => self.apply_step(*delta),
            SelectorCommand::SetPosition(raw) => self.apply_set(*raw),
        };
        Ok(Some(Action::AddressChanged(notified)))
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, _ctx: &AppView<'_>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Line::from("Address Selector").style(Style::default().add_modifier(Modifier::BOLD)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        let range = Paragraph::new("RANGE 0x0000...0000 → 0xffff...ffff")
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(range, layout[0]);

        let position = Paragraph::new(format!(
            "POSITION {} / {}",
            super::util::group_digits(self.position),
            super::util::group_digits(MAX_POSITION),
        ));
        frame.render_widget(position, layout[1]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(self.ratio())
            .label(format!("{:.6}%", self.ratio() * 100.0))
            .use_unicode(true);
        self.gauge_area = Some(layout[2]);
        frame.render_widget(gauge, layout[2]);

        let address_style = if self.valid {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let address = Paragraph::new(format!("ADDRESS {}", self.display_address))
            .style(address_style);
        frame.render_widget(address, layout[3]);

        let hint = Paragraph::new("←/→ ±1 • Shift ±100 • Ctrl ±10,000 • Ctrl+Shift ±1,000,000 • drag the bar")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, layout[4]);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}
