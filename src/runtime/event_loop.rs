use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use tracing::debug;

use crate::config;
use crate::engine::MediaEngine;
use crate::playback::Player;
use crate::runtime::startup::{expand_path, open_path};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Open-file prompt input, present while the prompt is shown.
    pub prompt: Option<String>,
    /// Transient message for the status line.
    pub status: Option<String>,
    /// Seek bar area from the last draw; mouse hits are mapped onto it.
    seek_bar: Rect,
}

impl EventLoopState {
    pub fn new(status: Option<String>) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

/// Main terminal event loop: drains engine events, advances the ticker once
/// per frame, draws, and dispatches input. Returns `Ok(())` on quit.
pub fn run<E: MediaEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    player: &mut Player<E>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = Duration::from_millis(settings.ticker.frame_ms);

    loop {
        if let Err(e) = player.pump_engine_events() {
            debug!(error = %e, "load failure reached the event loop");
        }
        player.on_frame();

        let view = player.view();
        terminal.draw(|f| {
            state.seek_bar = ui::draw(
                f,
                &view,
                state.prompt.as_deref(),
                state.status.as_deref(),
                &settings.ui,
                &settings.controls,
            );
        })?;

        if event::poll(frame)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(key, settings, player, state) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, player, state),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Dispatch one key press. Returns `true` when the user asked to quit.
fn handle_key_event<E: MediaEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    player: &mut Player<E>,
    state: &mut EventLoopState,
) -> bool {
    if state.prompt.is_some() {
        handle_prompt_key(key, player, state);
        return false;
    }

    let step = settings.controls.seek_seconds as f64;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char(' ') | KeyCode::Char('p') => player.toggle_play_pause(),
        KeyCode::Char('h') | KeyCode::Left => player.seek_by(-step),
        KeyCode::Char('l') | KeyCode::Right => player.seek_by(step),
        KeyCode::Char('m') => player.toggle_mute(),
        KeyCode::Char('o') => state.prompt = Some(String::new()),
        _ => {}
    }
    false
}

fn handle_prompt_key<E: MediaEngine>(
    key: KeyEvent,
    player: &mut Player<E>,
    state: &mut EventLoopState,
) {
    let Some(input) = state.prompt.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => state.prompt = None,
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char(c) => input.push(c),
        KeyCode::Enter => {
            let input = state.prompt.take().unwrap_or_default();
            if input.trim().is_empty() {
                return;
            }
            let path = expand_path(&input);
            state.status = match open_path(player, &path) {
                Ok(()) => None,
                Err(e) => Some(format!("cannot read {}: {}", path.display(), e)),
            };
        }
        _ => {}
    }
}

/// Left button down on the bar starts a drag; drag and release go to the
/// player regardless of where the pointer is.
fn handle_mouse_event<E: MediaEngine>(
    mouse: MouseEvent,
    player: &mut Player<E>,
    state: &mut EventLoopState,
) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left)
            if ui::hits(state.seek_bar, mouse.column, mouse.row) =>
        {
            player.drag_start(mouse.column as f64, ui::track_rect(state.seek_bar));
        }
        MouseEventKind::Drag(MouseButton::Left) => player.drag_move(mouse.column as f64),
        MouseEventKind::Up(MouseButton::Left) => player.drag_commit(),
        _ => {}
    }
}
