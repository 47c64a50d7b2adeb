use super::util::{group_digits, short_hex};
use crate::{
    app::{Action, AppContext, AppResult, AppView},
    components::Component,
};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Paragraph},
};

#[derive(Debug)]
pub struct TopBar {
    title: String,
    status: Option<String>,
}

impl Default for TopBar {
    fn default() -> Self {
        Self {
            title: "balance-tui".to_string(),
            status: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TopCommand {
    ShowStatus(String),
}

impl Component for TopBar {
    type Command = TopCommand;

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        _ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            TopCommand::ShowStatus(message) => {
                self.status = Some(message.clone());
            }
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let descriptor = match &ctx.state.selected_address {
            Some(address) => short_hex(address),
            None => "No address".to_string(),
        };
        let title = Line::from(format!(
            "{} • {} • {}",
            self.title,
            ctx.state.network.descriptor(),
            descriptor
        ))
        .style(Style::default().add_modifier(Modifier::BOLD));

        let mut lines = Vec::new();
        match &ctx.state.network_status {
            None => lines.push(Line::from(format!(
                "RPC: connecting to {}…",
                ctx.state.network.rpc_url
            ))),
            Some(Ok(block)) => lines.push(Line::from(format!(
                "RPC OK • block {}",
                group_digits(*block)
            ))),
            Some(Err(error)) => lines.push(
                Line::from(format!("RPC unreachable: {error}"))
                    .style(Style::default().fg(Color::Yellow)),
            ),
        }
        if let Some(status) = &self.status {
            lines.push(Line::from(status.clone()).style(Style::default().fg(Color::Gray)));
        }

        let widget = Paragraph::new(lines)
            .style(Style::default().fg(Color::Gray))
            .block(Block::bordered().title(title));
        frame.render_widget(widget, area);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}
