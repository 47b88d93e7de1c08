//! Font and background-music discovery.
//!
//! Both asset directories are walked recursively and matched by file
//! extension.  Symlinked directories are not descended into.  A missing or
//! unreadable directory is not an error: it simply yields an empty list
//! (logged at `warn`).

use std::path::{Path, PathBuf};

use rand::prelude::IndexedRandom;
use walkdir::WalkDir;

/// Extensions accepted as subtitle fonts.
pub const FONT_EXTENSIONS: &[&str] = &["ttf", "ttc"];
/// Extensions accepted as background music.
pub const SONG_EXTENSIONS: &[&str] = &["mp3"];

/// File names of every font under `dir`, sorted.
pub fn list_fonts(dir: &Path) -> Vec<String> {
    file_names(&find_files(dir, FONT_EXTENSIONS))
}

/// File names of every background-music track under `dir`, sorted.
pub fn list_songs(dir: &Path) -> Vec<String> {
    file_names(&find_files(dir, SONG_EXTENSIONS))
}

/// Pick one track under `dir` for [`BgmType::Random`].
///
/// [`BgmType::Random`]: crate::params::BgmType::Random
pub fn random_song(dir: &Path) -> Option<PathBuf> {
    let songs = find_files(dir, SONG_EXTENSIONS);
    let mut rng = rand::rng();
    songs.choose(&mut rng).cloned()
}

/// Full paths of files under `dir` whose extension (case-insensitive) is in
/// `extensions`, sorted by path.
pub fn find_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("assets: cannot read under {}: {e}", dir.display());
                continue;
            }
        };
        if !entry.file_type().is_dir() && has_extension(entry.path(), extensions) {
            out.push(entry.into_path());
        }
    }
    out.sort();
    out
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
