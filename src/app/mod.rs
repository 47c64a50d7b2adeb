use crate::{
    components::Component,
    config::NetworkConfig,
    ui::{
        bottom_bar::BottomBar,
        inspector::{InspectorCommand, InspectorPane},
        selector::{SelectorCommand, SelectorPane},
        top::{TopBar, TopCommand},
        util::short_hex,
    },
};
pub type AppResult<T> = color_eyre::Result<T>;
use alloy::primitives::{Address, U256};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
};
use std::{
    sync::{Arc, mpsc},
    time::Duration,
};
use tokio::runtime::{Handle, Runtime};

mod rpc;

pub use rpc::{BalanceFuture, BalanceSource, ProbeFuture, QueryError, RpcBalanceSource};

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Step magnitude for a keyboard step, by held modifiers. CTRL+SHIFT is its
/// own coarse magnitude rather than deferring to either single modifier.
fn step_magnitude(modifiers: KeyModifiers) -> i64 {
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match (ctrl, shift) {
        (false, false) => 1,
        (false, true) => 100,
        (true, false) => 10_000,
        (true, true) => 1_000_000,
    }
}

/// Central application type that owns the panes, the async runtime, and the
/// message channel completions come back on.
pub struct App {
    running: bool,
    pub state: AppState,
    top_bar: TopBar,
    selector: SelectorPane,
    inspector: InspectorPane,
    bottom_bar: BottomBar,
    balance_source: Arc<dyn BalanceSource>,
    runtime: Runtime,
    runtime_handle: Handle,
    message_rx: mpsc::Receiver<Message>,
    message_tx: mpsc::Sender<Message>,
}

impl App {
    pub fn new(network: NetworkConfig) -> AppResult<Self> {
        let source = Arc::new(RpcBalanceSource::new(network.clone()));
        Self::with_source(network, source)
    }

    /// Wires the app against any balance source; the seam tests use to
    /// substitute a fake collaborator.
    pub fn with_source(
        network: NetworkConfig,
        balance_source: Arc<dyn BalanceSource>,
    ) -> AppResult<Self> {
        let mut state = AppState::new(network);
        let mut top_bar = TopBar::default();
        let mut selector = SelectorPane::default();
        let mut inspector = InspectorPane::default();
        let mut bottom_bar = BottomBar::default();
        let runtime = Runtime::new()?;
        let runtime_handle = runtime.handle().clone();
        let (message_tx, message_rx) = mpsc::channel();

        {
            let mut ctx = AppContext {
                state: &mut state,
                commands: CommandBus::new(message_tx.clone(), runtime_handle.clone()),
            };
            top_bar.init(&mut ctx)?;
            selector.init(&mut ctx)?;
            inspector.init(&mut ctx)?;
            bottom_bar.init(&mut ctx)?;
        }

        // The selector starts at the midpoint; forward its first notification
        // the same way later changes flow.
        let initial = selector.current_address();
        state.selected_address = initial.clone();
        inspector.apply_address(initial);

        let app = Self {
            running: false,
            state,
            top_bar,
            selector,
            inspector,
            bottom_bar,
            balance_source,
            runtime,
            runtime_handle,
            message_rx,
            message_tx,
        };
        app.start_probe();
        Ok(app)
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        execute!(std::io::stdout(), EnableMouseCapture)?;
        let result = self.event_loop(&mut terminal);
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> AppResult<()> {
        self.running = true;
        while self.running {
            self.tick()?;
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(8),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let view = AppView { state: &self.state };
        self.top_bar.render(frame, layout[0], &view);
        self.selector.render(frame, layout[1], &view);
        self.inspector.render(frame, layout[2], &view);
        self.bottom_bar.render(frame, layout[3], &view);
    }

    fn handle_events(&mut self) -> AppResult<()> {
        // Poll with a timeout so async completions render without waiting
        // for the next input event.
        if !event::poll(INPUT_POLL)? {
            return Ok(());
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key)?,
            Event::Mouse(mouse) => self.on_mouse_event(mouse)?,
            _ => {}
        }
        Ok(())
    }

    fn on_key_event(&mut self, key: KeyEvent) -> AppResult<()> {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => {
                self.dispatch(Action::Quit)?;
            }
            (modifiers, KeyCode::Left) => {
                self.selector_command(SelectorCommand::Step(-step_magnitude(modifiers)))?;
            }
            (modifiers, KeyCode::Right) => {
                self.selector_command(SelectorCommand::Step(step_magnitude(modifiers)))?;
            }
            (KeyModifiers::NONE, KeyCode::Char('h')) => {
                self.selector_command(SelectorCommand::Step(-1))?;
            }
            (KeyModifiers::NONE, KeyCode::Char('l')) => {
                self.selector_command(SelectorCommand::Step(1))?;
            }
            (_, KeyCode::Enter) => {
                self.inspector_command(InspectorCommand::Trigger)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_mouse_event(&mut self, mouse: MouseEvent) -> AppResult<()> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(position) = self.selector.position_at(mouse.column, mouse.row) {
                    self.selector_command(SelectorCommand::SetPosition(position))?;
                } else if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
                    && self.inspector.check_hit(mouse.column, mouse.row)
                {
                    self.inspector_command(InspectorCommand::Trigger)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn dispatch(&mut self, action: Action) -> AppResult<()> {
        match action {
            Action::Quit => self.running = false,
            Action::AddressChanged(address) => {
                self.state.selected_address = address.clone();
                self.inspector_command(InspectorCommand::AddressChanged(address))?;
            }
            Action::CheckRequested(address) => self.start_check(address)?,
        }
        Ok(())
    }

    fn selector_command(&mut self, command: SelectorCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            commands: CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone()),
        };
        if let Some(action) = self.selector.update(&command, &mut ctx)? {
            self.dispatch(action)?;
        }
        Ok(())
    }

    fn inspector_command(&mut self, command: InspectorCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            commands: CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone()),
        };
        if let Some(action) = self.inspector.update(&command, &mut ctx)? {
            self.dispatch(action)?;
        }
        Ok(())
    }

    fn top_bar_command(&mut self, command: TopCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            commands: CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone()),
        };
        if let Some(action) = self.top_bar.update(&command, &mut ctx)? {
            self.dispatch(action)?;
        }
        Ok(())
    }

    fn command_bus(&self) -> CommandBus {
        CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone())
    }

    /// One-shot connectivity probe whose outcome the top bar displays.
    fn start_probe(&self) {
        let bus = self.command_bus();
        let source = Arc::clone(&self.balance_source);
        bus.spawn_async(move || async move {
            Message::NetworkProbed(source.probe().await.map_err(|err| err.to_string()))
        });
    }

    fn start_check(&mut self, address: String) -> AppResult<()> {
        self.top_bar_command(TopCommand::ShowStatus(format!(
            "Checking {}",
            short_hex(&address)
        )))?;
        let bus = self.command_bus();
        match address.parse::<Address>() {
            Ok(target) => {
                let source = Arc::clone(&self.balance_source);
                bus.spawn_async(move || async move {
                    match source.native_balance(target).await {
                        Ok(balance) => Message::BalanceResolved { address, balance },
                        Err(err) => Message::BalanceFailed {
                            address,
                            error: err.to_string(),
                        },
                    }
                });
            }
            Err(err) => {
                // The query seam rejects malformed input; nothing is sent
                // over the wire.
                bus.send(Message::BalanceFailed {
                    address,
                    error: format!("not a valid address: {err}"),
                });
            }
        }
        Ok(())
    }

    fn tick(&mut self) -> AppResult<()> {
        let actions = {
            let mut ctx = AppContext {
                state: &mut self.state,
                commands: CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone()),
            };
            let mut actions = Vec::new();
            if let Some(action) = self.top_bar.tick(&mut ctx)? {
                actions.push(action);
            }
            if let Some(action) = self.selector.tick(&mut ctx)? {
                actions.push(action);
            }
            if let Some(action) = self.inspector.tick(&mut ctx)? {
                actions.push(action);
            }
            if let Some(action) = self.bottom_bar.tick(&mut ctx)? {
                actions.push(action);
            }
            actions
        };
        for action in actions {
            self.dispatch(action)?;
        }
        self.drain_messages()
    }

    fn drain_messages(&mut self) -> AppResult<()> {
        while let Ok(message) = self.message_rx.try_recv() {
            match message {
                Message::BalanceResolved { address, balance } => {
                    self.inspector_command(InspectorCommand::Resolved { address, balance })?;
                }
                Message::BalanceFailed { address, error } => {
                    tracing::warn!(%address, %error, "balance query failed");
                    self.inspector_command(InspectorCommand::Failed { address, error })?;
                }
                Message::NetworkProbed(outcome) => {
                    self.state.network_status = Some(outcome);
                }
            }
        }
        Ok(())
    }
}

/// Shared state read by every pane during rendering.
#[derive(Debug)]
pub struct AppState {
    pub network: NetworkConfig,
    pub selected_address: Option<String>,
    pub network_status: Option<Result<u64, String>>,
}

impl AppState {
    pub fn new(network: NetworkConfig) -> Self {
        Self {
            network,
            selected_address: None,
            network_status: None,
        }
    }
}

/// Mutable context passed to panes while handling logic.
pub struct AppContext<'a> {
    pub state: &'a mut AppState,
    pub commands: CommandBus,
}

/// Read-only context used during rendering.
pub struct AppView<'a> {
    pub state: &'a AppState,
}

#[derive(Clone)]
pub struct CommandBus {
    sender: mpsc::Sender<Message>,
    handle: Handle,
}

impl CommandBus {
    pub fn new(sender: mpsc::Sender<Message>, handle: Handle) -> Self {
        Self { sender, handle }
    }

    pub fn spawn_async<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Message> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            let message = task().await;
            let _ = sender.send(message);
        });
    }

    pub fn send(&self, message: Message) {
        let _ = self.sender.send(message);
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    BalanceResolved { address: String, balance: U256 },
    BalanceFailed { address: String, error: String },
    NetworkProbed(Result<u64, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    AddressChanged(Option<String>),
    CheckRequested(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rpc::tests::StaticBalanceSource;
    use crate::ui::inspector::CheckPhase;
    use std::time::Instant;

    fn test_app(balance: Result<U256, String>) -> App {
        App::with_source(
            NetworkConfig::default_profile(),
            Arc::new(StaticBalanceSource { balance }),
        )
        .expect("app")
    }

    fn drain_until<F: Fn(&App) -> bool>(app: &mut App, done: F) {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            app.drain_messages().expect("drain");
            if done(app) {
                return;
            }
            assert!(Instant::now() < deadline, "condition never reached");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn startup_selects_the_midpoint_address() {
        let app = test_app(Ok(U256::ZERO));
        let address = app.state.selected_address.as_deref().expect("address");
        assert_eq!(address.len(), 42);
        assert_eq!(
            address.to_lowercase(),
            "0x7fffffffffffffffffffffffffffffffffffffff"
        );
        assert_eq!(*app.inspector.phase(), CheckPhase::Ready);
    }

    #[test]
    fn triggered_check_resolves_through_the_bus() {
        let wei = U256::from(2_500_000_000_000_000_000u128);
        let mut app = test_app(Ok(wei));
        app.inspector_command(InspectorCommand::Trigger).unwrap();
        assert_eq!(*app.inspector.phase(), CheckPhase::Checking);

        drain_until(&mut app, |app| {
            matches!(app.inspector.phase(), CheckPhase::Resolved(_))
        });
        assert_eq!(*app.inspector.phase(), CheckPhase::Resolved(wei));
    }

    #[test]
    fn failing_source_lands_in_the_failed_phase() {
        let mut app = test_app(Err("execution reverted".into()));
        app.inspector_command(InspectorCommand::Trigger).unwrap();

        drain_until(&mut app, |app| {
            matches!(app.inspector.phase(), CheckPhase::Failed(_))
        });
        let CheckPhase::Failed(error) = app.inspector.phase() else {
            unreachable!();
        };
        assert!(error.contains("execution reverted"));
    }

    #[test]
    fn probe_outcome_reaches_the_state() {
        let mut app = test_app(Ok(U256::ZERO));
        drain_until(&mut app, |app| app.state.network_status.is_some());
        assert_eq!(app.state.network_status, Some(Ok(1)));
    }

    #[test]
    fn step_magnitudes_cover_all_modifier_combinations() {
        assert_eq!(step_magnitude(KeyModifiers::NONE), 1);
        assert_eq!(step_magnitude(KeyModifiers::SHIFT), 100);
        assert_eq!(step_magnitude(KeyModifiers::CONTROL), 10_000);
        assert_eq!(
            step_magnitude(KeyModifiers::CONTROL | KeyModifiers::SHIFT),
            1_000_000
        );
    }

    #[test]
    fn stepping_notifies_the_inspector() {
        let mut app = test_app(Ok(U256::ZERO));
        let before = app.state.selected_address.clone();
        app.selector_command(SelectorCommand::Step(1)).unwrap();
        let after = app.state.selected_address.clone();
        assert_ne!(before, after);
        assert_eq!(*app.inspector.phase(), CheckPhase::Ready);
    }
}
