use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/scrubber/config.toml` or `~/.config/scrubber/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SCRUBBER__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub ticker: TickerSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// Whether the player starts muted.
    pub start_muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 300,
            start_muted: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Show the indicator position as a percentage next to the times.
    pub show_percent: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ scrub, skip, repeat ~ ".to_string(),
            show_percent: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to jump when pressing `h` / `l`.
    pub seek_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { seek_seconds: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TickerSettings {
    /// Display frame interval (milliseconds). The position is sampled once
    /// per frame while playing.
    pub frame_ms: u64,
}

impl Default for TickerSettings {
    fn default() -> Self {
        Self { frame_ms: 33 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter used when `RUST_LOG` is not set, e.g. `"debug"` or `"scrubber=trace"`.
    pub level: String,
    /// File to append logs to. Logging is off when unset, since the
    /// terminal belongs to the UI.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
