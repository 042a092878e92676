use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config;
use crate::engine::MediaEngine;
use crate::playback::Player;

/// Read `path` and hand its bytes to the player as the new track.
///
/// Read errors never reach the state machine; the caller reports them.
pub fn open_path<E: MediaEngine>(player: &mut Player<E>, path: &Path) -> io::Result<()> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string());

    info!(path = %path.display(), bytes = bytes.len(), "file selected");
    player.select_file(name, bytes);
    Ok(())
}

/// Expand a leading `~/` the way a shell would.
pub fn expand_path(input: &str) -> PathBuf {
    let input = input.trim();
    if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(input)
}

/// Apply startup settings and open the file given on the command line.
///
/// Returns a status message when the initial file could not be read.
pub fn apply_startup<E: MediaEngine>(
    player: &mut Player<E>,
    settings: &config::Settings,
    initial: Option<&Path>,
) -> Option<String> {
    if settings.audio.start_muted && !player.view().is_muted {
        player.toggle_mute();
    }

    let path = initial?;
    match open_path(player, path) {
        Ok(()) => None,
        Err(e) => Some(format!("cannot read {}: {}", path.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::{Call, FakeEngine};
    use crate::playback::Phase;

    #[test]
    fn open_path_selects_the_file_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tune.ogg");
        fs::write(&path, b"bytes").unwrap();

        let mut player = Player::new(FakeEngine::new());
        open_path(&mut player, &path).unwrap();
        assert_eq!(player.phase(), Phase::Loading);
        assert_eq!(player.view().title.as_deref(), Some("tune.ogg"));
    }

    #[test]
    fn unreadable_initial_file_is_reported_without_loading() {
        let mut player = Player::new(FakeEngine::new());
        let msg = apply_startup(
            &mut player,
            &config::Settings::default(),
            Some(Path::new("/definitely/not/here.mp3")),
        )
        .unwrap();
        assert!(msg.contains("not/here.mp3"));
        assert_eq!(player.phase(), Phase::Idle);
        assert!(player.engine().calls.is_empty());
    }

    #[test]
    fn start_muted_mutes_once() {
        let mut settings = config::Settings::default();
        settings.audio.start_muted = true;

        let mut player = Player::new(FakeEngine::new());
        assert_eq!(apply_startup(&mut player, &settings, None), None);
        assert!(player.view().is_muted);
        assert_eq!(player.engine().calls, vec![Call::SetMuted(true)]);
    }

    #[test]
    fn expand_path_trims_and_keeps_plain_paths() {
        assert_eq!(expand_path("  /tmp/a.mp3 "), PathBuf::from("/tmp/a.mp3"));
        assert_eq!(expand_path("rel/b.wav"), PathBuf::from("rel/b.wav"));
    }
}
