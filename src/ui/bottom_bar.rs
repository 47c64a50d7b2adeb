use crate::{
    app::{Action, AppContext, AppResult, AppView},
    components::Component,
};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Paragraph},
};

#[derive(Debug, Default)]
pub struct BottomBar;

#[allow(dead_code)]
#[derive(Debug)]
pub enum BottomBarCommand {
    UpdateKeymap(String),
}

impl Component for BottomBar {
    type Command = BottomBarCommand;

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        _command: &Self::Command,
        _ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, _ctx: &AppView<'_>) {
        let widget = Paragraph::new(Line::from(
            "q Quit • ←/→ ±1 • Shift ±100 • Ctrl ±10,000 • Ctrl+Shift ±1,000,000 • Enter Check balance",
        ))
        .block(Block::bordered().title(
            Line::from("Keymap").style(Style::default().add_modifier(Modifier::BOLD)),
        ));
        frame.render_widget(widget, area);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}
