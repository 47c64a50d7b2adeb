mod app;
mod components;
mod config;
mod ui;

use color_eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    config::init_tracing()?;
    let network = config::NetworkConfig::load()?;
    let terminal = ratatui::init();
    let result = app::App::new(network).and_then(|app| app.run(terminal));
    ratatui::restore();
    result
}
