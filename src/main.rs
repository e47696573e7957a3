use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::io;

use snek_arcade::app::App;
use snek_arcade::config::LOG_FILE;
use snek_arcade::high_score::FileStore;

fn main() -> Result<(), io::Error> {
    // Set up logging before anything else
    WriteLogger::init(LevelFilter::Info, Config::default(), File::create(LOG_FILE)?)
        .map_err(io::Error::other)?;

    info!("Starting snek-arcade");

    let mut app = App::new(FileStore::default());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    // Cleanup terminal, even when the game loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
