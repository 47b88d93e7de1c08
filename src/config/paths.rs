//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\video-studio\
//!   macOS:   ~/Library/Application Support/video-studio/
//!   Linux:   ~/.config/video-studio/
//!
//! Data dir (fonts, background music):
//!   Windows: %LOCALAPPDATA%\video-studio\
//!   macOS:   ~/Library/Application Support/video-studio/
//!   Linux:   ~/.local/share/video-studio/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Root of the bundled resources (`fonts/`, `songs/`).
    pub resource_dir: PathBuf,
    /// Directory scanned for subtitle fonts.
    pub font_dir: PathBuf,
    /// Directory scanned for background-music tracks.
    pub song_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "video-studio";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let resource_dir = data_dir.join("resource");
        let font_dir = resource_dir.join("fonts");
        let song_dir = resource_dir.join("songs");

        Self {
            config_dir,
            settings_file,
            resource_dir,
            font_dir,
            song_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
