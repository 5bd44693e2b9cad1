use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tripwire_core::{CellCount, Coord, GameConfig};

use crate::error::InitError;

/// Optional TOML settings file, anything left out falls back to the command line or defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub width: Option<Coord>,
    pub height: Option<Coord>,
    pub mines: Option<CellCount>,
    pub seed: Option<u64>,
    pub tileset: Option<PathBuf>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, InitError> {
        let text = fs::read_to_string(path).map_err(|source| InitError::Read {
            path: path.to_owned(),
            source,
        })?;
        let settings = Self::parse(&text).map_err(|source| InitError::Settings {
            path: path.to_owned(),
            source,
        })?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Board configuration where the given values win over the file.
    pub fn game_config(
        &self,
        width: Option<Coord>,
        height: Option<Coord>,
        mines: Option<CellCount>,
    ) -> tripwire_core::Result<GameConfig> {
        let default = GameConfig::default();
        GameConfig::new(
            width.or(self.width).unwrap_or(default.width),
            height.or(self.height).unwrap_or(default.height),
            mines.or(self.mines).unwrap_or(default.mines),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripwire_core::GameError;

    #[test]
    fn parses_partial_settings() {
        let settings = Settings::parse("width = 16\nmines = 40\ntileset = \"glyphs.txt\"\n").unwrap();

        assert_eq!(settings.width, Some(16));
        assert_eq!(settings.height, None);
        assert_eq!(settings.mines, Some(40));
        assert_eq!(settings.tileset, Some(PathBuf::from("glyphs.txt")));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Settings::parse("difficulty = \"expert\"").is_err());
    }

    #[test]
    fn empty_file_means_defaults() {
        let settings = Settings::parse("").unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.game_config(None, None, None),
            Ok(GameConfig::default())
        );
    }

    #[test]
    fn command_line_wins_over_file() {
        let settings = Settings::parse("width = 16\nheight = 16\nmines = 40").unwrap();

        let config = settings.game_config(Some(30), None, Some(99)).unwrap();

        assert_eq!((config.width, config.height, config.mines), (30, 16, 99));
    }

    #[test]
    fn invalid_board_is_reported() {
        let settings = Settings::parse("width = 2\nheight = 2\nmines = 4").unwrap();

        assert_eq!(
            settings.game_config(None, None, None),
            Err(GameError::TooManyMines)
        );
    }

    #[test]
    fn missing_file_is_an_init_error() {
        let path = std::env::temp_dir().join("tripwire-settings-that-does-not-exist.toml");

        let err = Settings::load(&path).unwrap_err();

        assert!(matches!(err, InitError::Read { .. }));
    }

    #[test]
    fn broken_file_is_an_init_error() {
        let path = std::env::temp_dir().join("tripwire-broken-settings.toml");
        fs::write(&path, "width = \"wide\"").unwrap();

        let err = Settings::load(&path).unwrap_err();
        fs::remove_file(&path).unwrap();

        assert!(matches!(err, InitError::Settings { .. }));
    }
}
