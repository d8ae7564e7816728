//! Persisted training preferences.
//!
//! [`Settings`] is stored as `settings.json` in the store directory. The
//! command line reads it, applies any flags given, and writes it back, so
//! selector state (the sequential cursor in particular) carries over from
//! one invocation to the next.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::Color;
use crate::constants::SETTINGS_FILE;
use crate::error::{Error, Result};
use crate::select::{Filter, SelectorState, VariationMode};

/// Which color the first move of a shown sequence is drawn as.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Black,
    White,
    Random,
}

impl ColorChoice {
    pub fn resolve(self, rng: &mut fastrand::Rng) -> Color {
        match self {
            ColorChoice::Black => Color::Black,
            ColorChoice::White => Color::White,
            ColorChoice::Random => {
                if rng.bool() {
                    Color::Black
                } else {
                    Color::White
                }
            }
        }
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorChoice::Black => write!(f, "black"),
            ColorChoice::White => write!(f, "white"),
            ColorChoice::Random => write!(f, "random"),
        }
    }
}

impl FromStr for ColorChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("random") {
            return Ok(ColorChoice::Random);
        }
        Ok(match s.parse::<Color>()? {
            Color::Black => ColorChoice::Black,
            Color::White => ColorChoice::White,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub variation_mode: VariationMode,
    pub selector: SelectorState,
    pub start_pos: Option<String>,
    pub selected_tags: BTreeSet<String>,
    /// Moves to show; `None` shows the whole sequence.
    pub move_number: Option<usize>,
    pub color_choice: ColorChoice,
    pub randomize_orientation: bool,
    /// Source file of the current catalog.
    pub last_source: Option<String>,
}

impl Settings {
    /// Load settings from `dir`; a missing file gives the defaults.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(SETTINGS_FILE);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::io(format!("read {}", path.display()), e)),
        }
    }

    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| Error::io(format!("create {}", dir.display()), e))?;
        let path = dir.join(SETTINGS_FILE);
        let text = serde_json::to_string_pretty(self)?;
        fs::write(&path, text).map_err(|e| Error::io(format!("write {}", path.display()), e))
    }

    pub fn filter(&self) -> Filter {
        Filter {
            start_pos: self.start_pos.clone(),
            tags: self.selected_tags.clone(),
        }
    }
}
