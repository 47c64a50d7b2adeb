use super::util::{format_display_units, short_hex};
use crate::{
    app::{Action, AppContext, AppResult, AppView},
    components::Component,
};
use alloy::primitives::U256;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use std::time::Instant;

/// Lifecycle of the balance check owned by the inspector pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckPhase {
    /// No address selected.
    Idle,
    /// Address selected, nothing checked for it yet.
    Ready,
    /// A query is in flight for the checked address.
    Checking,
    /// The latest query returned a wei balance.
    Resolved(U256),
    /// The latest query errored.
    Failed(String),
}

/// Pane that runs the check lifecycle for the externally supplied selected
/// address. It never queries on its own; checks happen only on an explicit
/// trigger, scoped to the address current at trigger time.
#[derive(Debug)]
pub struct InspectorPane {
    phase: CheckPhase,
    current_address: Option<String>,
    checked_address: Option<String>,
    checking_since: Option<Instant>,
    button_area: Option<Rect>,
}

#[derive(Debug)]
pub enum InspectorCommand {
    AddressChanged(Option<String>),
    Trigger,
    Resolved { address: String, balance: U256 },
    Failed { address: String, error: String },
}

impl InspectorPane {
    pub fn new() -> Self {
        Self {
            phase: CheckPhase::Idle,
            current_address: None,
            checked_address: None,
            checking_since: None,
            button_area: None,
        }
    }

    pub fn phase(&self) -> &CheckPhase {
        &self.phase
    }

    /// External address signal. An unset address drops the pane to `Idle`
    /// along with any claim an in-flight check held; a changed address moves
    /// settled phases back to `Ready` but leaves an in-flight check alone.
    pub fn apply_address(&mut self, address: Option<String>) {
        self.current_address = address.clone();
        match address {
            None => {
                self.phase = CheckPhase::Idle;
                self.checked_address = None;
                self.checking_since = None;
            }
            Some(address) => {
                if matches!(self.phase, CheckPhase::Checking) {
                    return;
                }
                if self.checked_address.as_deref() != Some(address.as_str()) {
                    self.phase = CheckPhase::Ready;
                }
            }
        }
    }

    /// Explicit check trigger. Returns the address to query, or `None` when
    /// no address is selected or an identical check is already in flight.
    pub fn apply_trigger(&mut self) -> Option<String> {
        let address = self.current_address.clone()?;
        if matches!(self.phase, CheckPhase::Checking)
            && self.checked_address.as_deref() == Some(address.as_str())
        {
            return None;
        }
        self.checked_address = Some(address.clone());
        self.phase = CheckPhase::Checking;
        self.checking_since = Some(Instant::now());
        Some(address)
    }

    fn accepts_result_for(&self, address: &str) -> bool {
        matches!(self.phase, CheckPhase::Checking)
            && self.checked_address.as_deref() == Some(address)
    }

    pub fn apply_resolved(&mut self, address: &str, balance: U256) {
        if !self.accepts_result_for(address) {
            tracing::debug!(address, "discarding stale balance result");
            return;
        }
        self.phase = CheckPhase::Resolved(balance);
        self.checking_since = None;
    }

    pub fn apply_failed(&mut self, address: &str, error: &str) {
        if !self.accepts_result_for(address) {
            tracing::debug!(address, "discarding stale balance error");
            return;
        }
        self.phase = CheckPhase::Failed(error.to_string());
        self.checking_since = None;
    }

    /// True when the given cell falls on the rendered check button.
    pub fn check_hit(&self, column: u16, row: u16) -> bool {
        self.button_area.is_some_and(|area| {
            row >= area.y
                && row < area.y + area.height
                && column >= area.x
                && column < area.x + area.width
        })
    }

    fn spinner(&self) -> &'static str {
        let elapsed = self
            .checking_since
            .map(|since| since.elapsed().as_millis())
            .unwrap_or_default();
        match (elapsed / 300) % 4 {
            0 => "",
            1 => ".",
            2 => "..",
            _ => "...",
        }
    }

    fn button_label(&self) -> Option<&'static str> {
        match self.phase {
            CheckPhase::Ready => Some("[ CHECK BALANCE ]"),
            CheckPhase::Resolved(_) => Some("[ CHECK AGAIN ]"),
            CheckPhase::Failed(_) => Some("[ RETRY ]"),
            CheckPhase::Idle | CheckPhase::Checking => None,
        }
    }
}

impl Default for InspectorPane {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InspectorPane {
    type Command = InspectorCommand;

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        _ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            InspectorCommand::AddressChanged(address) => {
                self.apply_address(address.clone());
                Ok(None)
            }
            InspectorCommand::Trigger => Ok(self.apply_trigger().map(Action::CheckRequested)),
            InspectorCommand::Resolved { address, balance } => {
                self.apply_resolved(address, *balance);
                Ok(None)
            }
            InspectorCommand::Failed { address, error } => {
                self.apply_failed(address, error);
                Ok(None)
            }
        }
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let network = &ctx.state.network;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Line::from("Balance").style(Style::default().add_modifier(Modifier::BOLD)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        let checked = self.checked_address.as_deref().map(short_hex);
        let context_line = match &self.phase {
            CheckPhase::Idle | CheckPhase::Ready => self
                .current_address
                .as_deref()
                .map(|address| format!("ADDRESS {address}"))
                .unwrap_or_default(),
            _ => checked
                .map(|address| format!("CHECKED {address}"))
                .unwrap_or_default(),
        };
        frame.render_widget(
            Paragraph::new(context_line).style(Style::default().fg(Color::Gray)),
            layout[0],
        );

        let (primary, style) = match &self.phase {
            CheckPhase::Idle => (
                "SLIDE TO SELECT AN ADDRESS".to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            CheckPhase::Ready => (
                format!("NO {} BALANCE CHECKED YET", network.symbol),
                Style::default().fg(Color::Gray),
            ),
            CheckPhase::Checking => (
                format!("SCANNING {}{}", network.descriptor().to_uppercase(), self.spinner()),
                Style::default().fg(Color::Yellow),
            ),
            CheckPhase::Resolved(balance) => (
                format!(
                    "{} {}",
                    format_display_units(*balance, network.decimals),
                    network.symbol
                ),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            CheckPhase::Failed(error) => (
                format!("ERROR: {error}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        };
        frame.render_widget(Paragraph::new(primary).style(style), layout[1]);

        self.button_area = None;
        if let Some(label) = self.button_label() {
            let width = (label.len() as u16).min(layout[2].width);
            let button_rect = Rect::new(layout[2].x, layout[2].y, width, 1);
            self.button_area = Some(button_rect);
            frame.render_widget(
                Paragraph::new(label).style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                button_rect,
            );
        }

        let hint = match &self.phase {
            CheckPhase::Idle => String::new(),
            CheckPhase::Ready => "Enter to check".into(),
            CheckPhase::Checking => "Waiting for the RPC endpoint".into(),
            CheckPhase::Resolved(_) | CheckPhase::Failed(_) => {
                let moved = self.current_address != self.checked_address;
                match (moved, self.current_address.as_deref()) {
                    (true, Some(address)) => {
                        format!("Slider moved: Enter checks {}", short_hex(address))
                    }
                    _ => "Enter to check again".into(),
                }
            }
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            layout[3],
        );
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0x00000000000000000000000000000000000000aa";
    const B: &str = "0x00000000000000000000000000000000000000bb";

    fn ready_pane(address: &str) -> InspectorPane {
        let mut pane = InspectorPane::new();
        pane.apply_address(Some(address.to_string()));
        pane
    }

    #[test]
    fn starts_idle_and_becomes_ready_on_selection() {
        let mut pane = InspectorPane::new();
        assert_eq!(*pane.phase(), CheckPhase::Idle);
        assert!(pane.apply_trigger().is_none());

        pane.apply_address(Some(A.to_string()));
        assert_eq!(*pane.phase(), CheckPhase::Ready);
    }

    #[test]
    fn trigger_resolves_to_a_displayable_balance() {
        let mut pane = ready_pane(A);
        assert_eq!(pane.apply_trigger().as_deref(), Some(A));
        assert_eq!(*pane.phase(), CheckPhase::Checking);

        let wei = U256::from(2_500_000_000_000_000_000u128);
        pane.apply_resolved(A, wei);
        let CheckPhase::Resolved(balance) = pane.phase() else {
            panic!("expected resolved phase");
        };
        assert_eq!(format_display_units(*balance, 18), "2.5000");
    }

    #[test]
    fn failure_offers_a_retry_that_checks_again() {
        let mut pane = ready_pane(A);
        pane.apply_trigger();
        pane.apply_failed(A, "connection refused");
        assert_eq!(
            *pane.phase(),
            CheckPhase::Failed("connection refused".into())
        );

        assert_eq!(pane.apply_trigger().as_deref(), Some(A));
        assert_eq!(*pane.phase(), CheckPhase::Checking);
    }

    #[test]
    fn superseding_trigger_discards_the_older_result() {
        let mut pane = ready_pane(A);
        pane.apply_trigger();
        pane.apply_address(Some(B.to_string()));
        assert_eq!(pane.apply_trigger().as_deref(), Some(B));

        // A's result arrives late and must not surface.
        pane.apply_resolved(A, U256::from(1u64));
        assert_eq!(*pane.phase(), CheckPhase::Checking);

        pane.apply_resolved(B, U256::from(2u64));
        assert_eq!(*pane.phase(), CheckPhase::Resolved(U256::from(2u64)));
    }

    #[test]
    fn duplicate_trigger_while_checking_is_a_no_op() {
        let mut pane = ready_pane(A);
        assert!(pane.apply_trigger().is_some());
        assert!(pane.apply_trigger().is_none());
        assert_eq!(*pane.phase(), CheckPhase::Checking);
    }

    #[test]
    fn unset_address_drops_interest_in_flight() {
        let mut pane = ready_pane(A);
        pane.apply_trigger();
        pane.apply_address(None);
        assert_eq!(*pane.phase(), CheckPhase::Idle);

        pane.apply_resolved(A, U256::from(5u64));
        assert_eq!(*pane.phase(), CheckPhase::Idle);
    }

    #[test]
    fn address_change_during_checking_leaves_the_claim_alone() {
        let mut pane = ready_pane(A);
        pane.apply_trigger();
        pane.apply_address(Some(B.to_string()));
        assert_eq!(*pane.phase(), CheckPhase::Checking);

        // No new trigger happened, so A's result still lands.
        pane.apply_resolved(A, U256::from(9u64));
        assert_eq!(*pane.phase(), CheckPhase::Resolved(U256::from(9u64)));
    }

    #[test]
    fn settled_phases_react_to_address_identity() {
        let mut pane = ready_pane(A);
        pane.apply_trigger();
        pane.apply_resolved(A, U256::ZERO);

        // Re-selecting the checked address keeps the resolved balance.
        pane.apply_address(Some(A.to_string()));
        assert_eq!(*pane.phase(), CheckPhase::Resolved(U256::ZERO));

        // A different address re-arms the pane.
        pane.apply_address(Some(B.to_string()));
        assert_eq!(*pane.phase(), CheckPhase::Ready);
    }
}
