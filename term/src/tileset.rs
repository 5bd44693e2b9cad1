use std::fs;
use std::path::Path;
use tripwire_core::Symbol;

use crate::error::InitError;

const DEFAULT_GLYPHS: [&str; Symbol::COUNT] = [
    ".", "1", "2", "3", "4", "5", "6", "7", "8", "#", "F", "*", "X",
];

/// Text stand-in for the tile atlas: one glyph per symbol, in atlas order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tileset {
    glyphs: Vec<String>,
    width: usize,
}

impl Default for Tileset {
    fn default() -> Self {
        Self::from_glyphs(DEFAULT_GLYPHS.iter().map(|glyph| glyph.to_string()).collect())
    }
}

impl Tileset {
    fn from_glyphs(glyphs: Vec<String>) -> Self {
        let width = glyphs
            .iter()
            .map(|glyph| glyph.chars().count())
            .max()
            .unwrap_or(1);
        Self { glyphs, width }
    }

    pub fn load(path: &Path) -> Result<Self, InitError> {
        let text = fs::read_to_string(path).map_err(|source| InitError::Read {
            path: path.to_owned(),
            source,
        })?;
        let tileset = Self::parse(&text)?;
        log::debug!("Loaded tileset from {}", path.display());
        Ok(tileset)
    }

    /// One glyph per line, surrounding whitespace is dropped.
    pub fn parse(text: &str) -> Result<Self, InitError> {
        let glyphs: Vec<String> = text.lines().map(|line| line.trim().to_owned()).collect();
        if glyphs.len() != Symbol::COUNT {
            return Err(InitError::GlyphCount {
                found: glyphs.len(),
                expected: Symbol::COUNT,
            });
        }
        if let Some(index) = glyphs.iter().position(String::is_empty) {
            return Err(InitError::EmptyGlyph { index });
        }
        Ok(Self::from_glyphs(glyphs))
    }

    pub fn glyph(&self, symbol: Symbol) -> &str {
        &self.glyphs[usize::from(symbol.atlas_index())]
    }

    /// Widest glyph, in characters.
    pub fn width(&self) -> usize {
        self.width
    }
}
