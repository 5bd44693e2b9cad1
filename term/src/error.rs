use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading what the frontend needs before a game can be shown.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("Could not read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid settings in {}", .path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Tileset has {found} glyphs, expected {expected}")]
    GlyphCount { found: usize, expected: usize },
    #[error("Tileset glyph {index} is empty")]
    EmptyGlyph { index: usize },
}
