//! Splitting a game tree into independent leaf sequences.
//!
//! Every root-to-leaf path below the root's children becomes one
//! [`StoredSequence`]: the original root properties plus a single-branch
//! chain of node copies ending at the leaf. Branch points are not collapsed,
//! so a tree with L leaves yields exactly L sequences.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::constants::SEQUENCE_KEY_PREFIX;
use crate::error::{Error, Result};
use crate::node::GameNode;
use crate::sgf::parse_game;
use crate::store::{CatalogEntry, SequenceInfo, SequenceStore, StoredSequence, delete_by_source};

/// One leaf path, ready to be stored under `meta.key`.
#[derive(Clone, Debug)]
pub struct SplitSequence {
    pub tree: StoredSequence,
    pub meta: CatalogEntry,
}

/// Storage key of the `n`-th sequence (1-based) split from `source`.
///
/// Keys depend only on the source name and the leaf order, so splitting the
/// same file twice produces the same keys. Characters outside
/// `[A-Za-z0-9._-]` become `_`, so distinct names such as `a b.sgf` and
/// `a_b.sgf` share keys; [`store_sequences`] refuses to overwrite a key
/// owned by another source.
pub fn sequence_key(source: &str, n: usize) -> String {
    format!("{SEQUENCE_KEY_PREFIX}:{}:{n}", sanitize(source))
}

fn sanitize(source: &str) -> String {
    source
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Split `root` into one sequence per leaf, in depth-first variation order.
pub fn split(root: &GameNode, source: &str) -> Vec<SplitSequence> {
    let created_at = chrono::Utc::now().timestamp_millis();
    let mut out = Vec::new();

    // (node, depth below the root's children)
    let mut stack: Vec<(&GameNode, usize)> = root.children.iter().rev().map(|c| (c, 0)).collect();
    let mut path: Vec<&GameNode> = Vec::new();

    while let Some((node, depth)) = stack.pop() {
        path.truncate(depth);
        path.push(node);
        if node.is_leaf() {
            let n = out.len() + 1;
            out.push(leaf_sequence(root, &path, source, n, created_at));
            continue;
        }
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    info!(source, sequences = out.len(), "split game tree");
    out
}

fn leaf_sequence(
    root: &GameNode,
    path: &[&GameNode],
    source: &str,
    n: usize,
    created_at: i64,
) -> SplitSequence {
    let mut chain: Option<GameNode> = None;
    for node in path.iter().rev() {
        let mut clone = node.minimal_clone();
        clone.children.extend(chain.take());
        chain = Some(clone);
    }

    let first_move = path
        .iter()
        .find_map(|n| n.black_move().or(n.white_move()))
        .map(str::to_string);
    let tags: BTreeSet<String> = path.iter().flat_map(|n| n.tags.iter().cloned()).collect();

    let key = sequence_key(source, n);
    SplitSequence {
        tree: StoredSequence {
            data: root.properties.clone(),
            children: chain.into_iter().collect(),
            info: SequenceInfo {
                file_name: Some(source.to_string()),
                created_at,
            },
        },
        meta: CatalogEntry {
            name: format!("{source}#{n}"),
            key,
            first_move,
            tags,
        },
    }
}

/// Persist split sequences and return their catalog entries.
///
/// All or nothing: if any write fails, every key written by this call is
/// put back the way it was (restored or deleted) and the error names the
/// sequence that failed. A key already holding a sequence from a different
/// source is never overwritten.
pub fn store_sequences<S: SequenceStore + ?Sized>(
    store: &mut S,
    sequences: &[SplitSequence],
) -> Result<Vec<CatalogEntry>> {
    let mut previous = Vec::with_capacity(sequences.len());
    for s in sequences {
        let existing = store.get(&s.meta.key)?;
        if let Some(existing) = &existing {
            if existing.info.file_name != s.tree.info.file_name {
                return Err(Error::KeyConflict {
                    key: s.meta.key.clone(),
                    owner: existing.info.file_name.clone().unwrap_or_default(),
                });
            }
        }
        previous.push(existing);
    }

    let items: Vec<(&str, &StoredSequence)> = sequences
        .iter()
        .map(|s| (s.meta.key.as_str(), &s.tree))
        .collect();

    if let Err(e) = store.put_many(&items) {
        let written = match &e {
            Error::SequenceWrite { key, .. } => items
                .iter()
                .position(|(k, _)| *k == key.as_str())
                .map_or(items.len(), |i| i + 1),
            _ => items.len(),
        };
        for ((key, _), old) in items[..written].iter().zip(&previous) {
            let restored = match old {
                Some(old) => store.put(key, old),
                None => store.delete(key).map(drop),
            };
            if let Err(rollback) = restored {
                warn!(key, error = %rollback, "failed to roll back sequence");
            }
        }
        return Err(e);
    }

    Ok(sequences.iter().map(|s| s.meta.clone()).collect())
}

/// Parse SGF text and store one sequence per leaf, replacing the sequences
/// previously imported from the same source.
///
/// The new sequences are written first. Leftover sequences of the previous
/// import are deleted only once every write has succeeded, so a failed
/// import leaves the earlier one intact.
pub fn import<S: SequenceStore + ?Sized>(
    store: &mut S,
    text: &str,
    source: &str,
) -> Result<Vec<CatalogEntry>> {
    let game = parse_game(text)?;
    let sequences = split(&game, source);
    let catalog = store_sequences(store, &sequences)?;
    let keep: BTreeSet<String> = catalog.iter().map(|e| e.key.clone()).collect();
    let removed = delete_by_source(store, source, &keep)?;
    info!(source, removed, stored = catalog.len(), "imported game record");
    Ok(catalog)
}
