//! Tree walking: replaying one path of a game tree as moves and comments.
//!
//! The walker picks a starting variation among the root's children, then
//! follows the main line (child 0) down to a leaf, or to the first node whose
//! tags hit one of the requested stop tags. For the single-branch chains
//! produced by [`crate::split`] this replays the whole stored sequence.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Color, Move, SetupOp};
use crate::constants::{EMPTY_COMMENT, PROP_ADD_BLACK, PROP_ADD_EMPTY, PROP_ADD_WHITE};
use crate::coord::expand_point_list;
use crate::error::Error;
use crate::node::GameNode;

/// How to choose among the root's variations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchPolicy {
    #[default]
    First,
    Random,
}

impl fmt::Display for BranchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchPolicy::First => write!(f, "first"),
            BranchPolicy::Random => write!(f, "random"),
        }
    }
}

impl FromStr for BranchPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(BranchPolicy::First),
            "random" => Ok(BranchPolicy::Random),
            _ => Err(Error::InvalidArgument {
                what: "branch policy",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct WalkOptions {
    pub policy: BranchPolicy,
    /// Prefer the root variation whose black move is at this coordinate.
    pub start_filter: Option<String>,
    /// Stop after the first node carrying any of these tags.
    pub stop_tags: BTreeSet<String>,
    /// Color the first move should be shown as; colors are swapped if the
    /// record disagrees.
    pub start_player: Option<Color>,
}

/// Moves, comments and setup stones collected along one path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Walk {
    pub size: usize,
    pub setup: Vec<SetupOp>,
    pub moves: Vec<Move>,
    /// One entry per visited node, `" "` for nodes without a comment.
    pub comments: Vec<String>,
}

impl Walk {
    /// Swap the color of every move and setup stone.
    pub fn invert_colors(&mut self) {
        for mv in &mut self.moves {
            mv.color = mv.color.opponent();
        }
        for op in &mut self.setup {
            if let SetupOp::Add { color, .. } = op {
                *color = color.opponent();
            }
        }
    }
}

/// Walk `root` along one path and collect what a replay needs.
///
/// Setup stones come from the root and from the chosen first node; moves
/// and comments from every visited node below the root.
pub fn walk(root: &GameNode, options: &WalkOptions, rng: &mut fastrand::Rng) -> Walk {
    let mut walk = Walk {
        size: root.board_size(),
        setup: collect_setup(root),
        ..Walk::default()
    };

    let Some(start) = choose_start(root, options, rng) else {
        return walk;
    };
    walk.setup.extend(collect_setup(start));

    let mut node = start;
    loop {
        if let Some(coord) = node.black_move() {
            walk.moves.push(Move::new(Color::Black, coord));
        }
        if let Some(coord) = node.white_move() {
            walk.moves.push(Move::new(Color::White, coord));
        }
        walk.comments
            .push(node.comment().unwrap_or_else(|| EMPTY_COMMENT.to_string()));

        if !options.stop_tags.is_empty() && !node.tags.is_disjoint(&options.stop_tags) {
            debug!(tags = ?node.tags, "stop tag reached");
            break;
        }
        match node.children.first() {
            Some(child) => node = child,
            None => break,
        }
    }

    if let (Some(want), Some(first)) = (options.start_player, walk.moves.first()) {
        if first.color != want {
            walk.invert_colors();
        }
    }
    debug!(moves = walk.moves.len(), setup = walk.setup.len(), "walked sequence");
    walk
}

fn choose_start<'a>(
    root: &'a GameNode,
    options: &WalkOptions,
    rng: &mut fastrand::Rng,
) -> Option<&'a GameNode> {
    let children = &root.children;
    if children.len() > 1 {
        if let Some(filter) = options.start_filter.as_deref().filter(|f| !f.is_empty()) {
            let matched = children.iter().find(|c| c.black_move() == Some(filter));
            return matched.or(children.first());
        }
        if options.policy == BranchPolicy::Random {
            return children.get(rng.usize(..children.len()));
        }
    }
    children.first()
}

fn collect_setup(node: &GameNode) -> Vec<SetupOp> {
    let mut ops = Vec::new();
    let point_list = |key: &str| node.get(key).map(expand_point_list).unwrap_or_default();
    for coord in point_list(PROP_ADD_BLACK) {
        ops.push(SetupOp::Add {
            color: Color::Black,
            coord,
        });
    }
    for coord in point_list(PROP_ADD_WHITE) {
        ops.push(SetupOp::Add {
            color: Color::White,
            coord,
        });
    }
    for coord in point_list(PROP_ADD_EMPTY) {
        ops.push(SetupOp::Remove { coord });
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(key: &str, coord: &str) -> GameNode {
        GameNode::new().with_property(key, [coord])
    }

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(7)
    }

    fn add(color: Color, coord: &str) -> SetupOp {
        SetupOp::Add {
            color,
            coord: coord.into(),
        }
    }

    fn remove(coord: &str) -> SetupOp {
        SetupOp::Remove {
            coord: coord.into(),
        }
    }

    /// root -> B[aa] -> W[bb] -> B[cc], with a second root variation B[dd].
    fn sample() -> GameNode {
        GameNode::new()
            .with_property("SZ", ["19"])
            .with_child(
                mv("B", "aa")
                    .with_property("C", ["start"])
                    .with_child(mv("W", "bb").with_tag("end").with_child(mv("B", "cc"))),
            )
            .with_child(mv("B", "dd").with_child(mv("W", "ee")))
    }

    #[test]
    fn test_walk_main_line() {
        let w = walk(&sample(), &WalkOptions::default(), &mut rng());
        assert_eq!(w.size, 19);
        assert_eq!(
            w.moves,
            vec![
                Move::new(Color::Black, "aa"),
                Move::new(Color::White, "bb"),
                Move::new(Color::Black, "cc"),
            ]
        );
        assert_eq!(w.comments, vec!["start", " ", " "]);
        assert!(w.setup.is_empty());
    }

    #[test]
    fn test_walk_start_filter() {
        let options = WalkOptions {
            start_filter: Some("dd".into()),
            ..Default::default()
        };
        let w = walk(&sample(), &options, &mut rng());
        assert_eq!(w.moves[0].coord, "dd");
        assert_eq!(w.moves.len(), 2);
    }

    #[test]
    fn test_walk_start_filter_falls_back_to_first() {
        let options = WalkOptions {
            start_filter: Some("qq".into()),
            policy: BranchPolicy::Random,
            ..Default::default()
        };
        for _ in 0..10 {
            let w = walk(&sample(), &options, &mut rng());
            assert_eq!(w.moves[0].coord, "aa");
        }
    }

    #[test]
    fn test_walk_random_policy_reaches_all_variations() {
        let options = WalkOptions {
            policy: BranchPolicy::Random,
            ..Default::default()
        };
        let mut rng = rng();
        let mut seen = BTreeSet::new();
        for _ in 0..64 {
            seen.insert(walk(&sample(), &options, &mut rng).moves[0].coord.clone());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_walk_stop_tags() {
        let options = WalkOptions {
            stop_tags: ["end".to_string()].into(),
            ..Default::default()
        };
        let w = walk(&sample(), &options, &mut rng());
        assert_eq!(w.moves.len(), 2);
        assert_eq!(w.comments.len(), 2);

        let other = WalkOptions {
            stop_tags: ["other".to_string()].into(),
            ..Default::default()
        };
        assert_eq!(walk(&sample(), &other, &mut rng()).moves.len(), 3);
    }

    #[test]
    fn test_walk_setup_from_root_and_first_node() {
        let root = GameNode::new()
            .with_property("AB", ["aa:ba"])
            .with_property("AW", ["cc"])
            .with_child(
                GameNode::new()
                    .with_property("AE", ["aa"])
                    .with_child(mv("B", "dd").with_property("AB", ["ee"])),
            );
        let w = walk(&root, &WalkOptions::default(), &mut rng());
        assert_eq!(
            w.setup,
            vec![
                add(Color::Black, "aa"),
                add(Color::Black, "ba"),
                add(Color::White, "cc"),
                remove("aa"),
            ]
        );
        assert_eq!(w.moves, vec![Move::new(Color::Black, "dd")]);
        assert_eq!(w.comments, vec![" ", " "]);
    }

    #[test]
    fn test_walk_node_with_both_colors() {
        let root = GameNode::new().with_child(
            GameNode::new().with_property("W", ["bb"]).with_property("B", ["aa"]),
        );
        let w = walk(&root, &WalkOptions::default(), &mut rng());
        assert_eq!(w.moves[0].color, Color::Black);
        assert_eq!(w.moves[1].color, Color::White);
        assert_eq!(w.comments.len(), 1);
    }

    #[test]
    fn test_walk_start_player_inverts() {
        let root = GameNode::new()
            .with_property("AB", ["qq"])
            .with_child(mv("W", "aa").with_child(mv("B", "bb")));
        let options = WalkOptions {
            start_player: Some(Color::Black),
            ..Default::default()
        };
        let w = walk(&root, &options, &mut rng());
        assert_eq!(w.moves[0], Move::new(Color::Black, "aa"));
        assert_eq!(w.moves[1], Move::new(Color::White, "bb"));
        assert_eq!(w.setup, vec![add(Color::White, "qq")]);

        let keep = WalkOptions {
            start_player: Some(Color::White),
            ..Default::default()
        };
        assert_eq!(walk(&root, &keep, &mut rng()).moves[0].color, Color::White);
    }

    #[test]
    fn test_walk_empty_root() {
        let root = GameNode::new().with_property("SZ", ["9"]);
        let w = walk(&root, &WalkOptions::default(), &mut rng());
        assert_eq!(w.size, 9);
        assert!(w.moves.is_empty());
        assert!(w.comments.is_empty());
    }

    #[test]
    fn test_walk_does_not_modify_tree() {
        let tree = sample();
        let before = tree.clone();
        let options = WalkOptions {
            start_player: Some(Color::White),
            ..Default::default()
        };
        let _ = walk(&tree, &options, &mut rng());
        assert_eq!(tree, before);
    }
}
