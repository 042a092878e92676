use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::engine::RodioEngine;
use crate::logging;
use crate::playback::Player;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    match logging::init(&settings.log) {
        Ok(true) => info!("scrubber starting"),
        Ok(false) => {}
        Err(e) => eprintln!("scrubber: logging disabled: {e}"),
    }

    let initial = env::args().nth(1).map(PathBuf::from);

    let engine = RodioEngine::new()?;
    let mut player = Player::new(engine);
    let status = startup::apply_startup(&mut player, &settings, initial.as_deref());
    if let Some(ref msg) = status {
        warn!("{msg}");
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(status);
        event_loop::run(&mut terminal, &settings, &mut player, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player
        .engine_mut()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
    info!("scrubber exiting");

    run_result
}
