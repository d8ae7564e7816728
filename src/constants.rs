//! Fixed values shared across the crate.
//!
//! Runtime preferences live in [`crate::config`]; everything here is a
//! property of the data formats and never changes at runtime.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size assumed when a game record does not declare `SZ`.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Largest board a two-letter coordinate can address (`a`..=`z`).
pub const MAX_BOARD_SIZE: usize = 26;

// =============================================================================
// SGF Property Identifiers
// =============================================================================

pub const PROP_BLACK: &str = "B";
pub const PROP_WHITE: &str = "W";
pub const PROP_COMMENT: &str = "C";
pub const PROP_ADD_BLACK: &str = "AB";
pub const PROP_ADD_WHITE: &str = "AW";
pub const PROP_ADD_EMPTY: &str = "AE";
pub const PROP_SIZE: &str = "SZ";
pub const PROP_KOMI: &str = "KM";

/// Non-standard property carrying out-of-band node tags.
pub const PROP_TAGS: &str = "TG";

/// Placeholder comment for nodes without a `C` property.
pub const EMPTY_COMMENT: &str = " ";

// =============================================================================
// Storage Layout
// =============================================================================

/// Prefix of every stored sequence key (`seq:<source>:<n>`).
pub const SEQUENCE_KEY_PREFIX: &str = "seq";

/// Catalog index file inside a store directory.
pub const CATALOG_FILE: &str = "catalog.json";

/// Persisted preferences file inside a store directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Subdirectory of a store directory holding one JSON file per sequence.
pub const SEQUENCES_DIR: &str = "sequences";

/// Store directory used when none is given on the command line.
pub const DEFAULT_STORE_DIR: &str = ".gorecall";
