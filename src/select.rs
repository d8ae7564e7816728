//! Picking a stored sequence from the catalog.
//!
//! The catalog is first narrowed by starting move and by tags, then one
//! entry is chosen according to a [`VariationMode`]. Selection state lives
//! in an explicit [`SelectorState`] owned by the caller, so consecutive
//! calls in sequential mode walk through the filtered catalog in order.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::store::CatalogEntry;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariationMode {
    /// Always the entry at `fixed_index` (clamped).
    #[default]
    Fixed,
    /// A uniformly random entry; the pick is remembered as `fixed_index`.
    Random,
    /// Entries in catalog order, wrapping around.
    Sequential,
}

impl fmt::Display for VariationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariationMode::Fixed => write!(f, "fixed"),
            VariationMode::Random => write!(f, "random"),
            VariationMode::Sequential => write!(f, "sequential"),
        }
    }
}

impl FromStr for VariationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(VariationMode::Fixed),
            "random" => Ok(VariationMode::Random),
            "sequential" => Ok(VariationMode::Sequential),
            _ => Err(Error::InvalidArgument {
                what: "variation mode",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    /// Coordinate the sequence must start with.
    pub start_pos: Option<String>,
    /// Tags the sequence must all carry.
    pub tags: BTreeSet<String>,
}

/// Positions into the filtered catalog, persisted between selections.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectorState {
    pub fixed_index: usize,
    pub sequential_cursor: usize,
}

/// Catalog indices that pass `filter`.
///
/// A start position that matches nothing is ignored; tags that match
/// nothing leave the result empty.
pub fn filter_indices(catalog: &[CatalogEntry], filter: &Filter) -> Vec<usize> {
    let all = || (0..catalog.len()).collect::<Vec<_>>();
    let by_start = match filter.start_pos.as_deref().filter(|s| !s.is_empty()) {
        Some(start) => {
            let matches: Vec<usize> = catalog
                .iter()
                .enumerate()
                .filter(|(_, e)| e.first_move.as_deref() == Some(start))
                .map(|(i, _)| i)
                .collect();
            if matches.is_empty() { all() } else { matches }
        }
        None => all(),
    };

    if filter.tags.is_empty() {
        return by_start;
    }
    by_start
        .into_iter()
        .filter(|&i| filter.tags.is_subset(&catalog[i].tags))
        .collect()
}

/// Choose a catalog index, or `None` when nothing passes the filter.
pub fn select(
    catalog: &[CatalogEntry],
    filter: &Filter,
    mode: VariationMode,
    state: &mut SelectorState,
    rng: &mut fastrand::Rng,
) -> Option<usize> {
    let filtered = filter_indices(catalog, filter);
    if filtered.is_empty() {
        debug!(?filter, "no sequence matches filter");
        return None;
    }
    let len = filtered.len();
    let pos = match mode {
        VariationMode::Fixed => state.fixed_index.min(len - 1),
        VariationMode::Random => {
            let pos = rng.usize(..len);
            state.fixed_index = pos;
            pos
        }
        VariationMode::Sequential => {
            let pos = state.sequential_cursor % len;
            state.sequential_cursor = (pos + 1) % len;
            pos
        }
    };
    debug!(%mode, pos, of = len, "selected variation");
    Some(filtered[pos])
}
