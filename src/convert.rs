//! Turning a reviewed game into training material.
//!
//! A review record holds the game as its main line and the reviewer's
//! suggestions as side variations. [`review_to_training`] lifts every side
//! variation into its own training game that starts from the position where
//! the variation branches off, with the stones played so far given as setup
//! stones.

use tracing::info;

use crate::constants::{PROP_ADD_BLACK, PROP_ADD_WHITE};
use crate::node::GameNode;

/// Build a collection root holding one training game per side variation.
///
/// The result keeps the review's root properties; each child is a setup
/// node (`AB`/`AW` for the stones on the path so far) whose only child is
/// the full side variation.
pub fn review_to_training(review: &GameNode) -> GameNode {
    let mut root = GameNode::new();
    root.properties = review.properties.clone();

    let mut stack: Vec<(&GameNode, usize)> = vec![(review, 0)];
    let mut path: Vec<&GameNode> = Vec::new();

    while let Some((node, depth)) = stack.pop() {
        path.truncate(depth);
        path.push(node);

        if let [_, branches @ ..] = node.children.as_slice() {
            for branch in branches {
                root.children.push(training_game(&path, branch));
            }
        }
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    info!(games = root.children.len(), "converted review to training games");
    root
}

fn training_game(path: &[&GameNode], branch: &GameNode) -> GameNode {
    let mut black = Vec::new();
    let mut white = Vec::new();
    for node in path {
        black.extend(node.black_move().map(str::to_string));
        white.extend(node.white_move().map(str::to_string));
    }

    let mut game = GameNode::new();
    if !black.is_empty() {
        game.set(PROP_ADD_BLACK, black);
    }
    if !white.is_empty() {
        game.set(PROP_ADD_WHITE, white);
    }
    game.with_child(branch.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf::{parse_game, to_sgf};

    #[test]
    fn test_review_to_training() {
        // main line B[pd] W[dd] B[pq]; variation at move 2: W[qc]; at move 3: B[dp]
        let text = "(;SZ[19];B[pd](;W[dd](;B[pq])(;B[dp]C[better]))(;W[qc];B[qd]))";
        let review = parse_game(text).unwrap();
        let training = review_to_training(&review);
        assert_eq!(training.first("SZ"), Some("19"));
        assert_eq!(training.children.len(), 2);

        let first = &training.children[0];
        assert_eq!(first.get("AB"), Some(&["pd".to_string()][..]));
        assert_eq!(first.get("AW"), None);
        assert_eq!(first.children[0].white_move(), Some("qc"));
        assert_eq!(first.children[0].children[0].black_move(), Some("qd"));

        let second = &training.children[1];
        assert_eq!(second.get("AB"), Some(&["pd".to_string()][..]));
        assert_eq!(second.get("AW"), Some(&["dd".to_string()][..]));
        assert_eq!(second.children[0].comment().as_deref(), Some("better"));
    }

    #[test]
    fn test_review_without_variations() {
        let review = parse_game("(;SZ[9];B[ee];W[cc])").unwrap();
        let training = review_to_training(&review);
        assert!(training.children.is_empty());
        assert_eq!(to_sgf(&[training]), "(;SZ[9])\n");
    }

    #[test]
    fn test_nested_variations_are_lifted() {
        let review = parse_game("(;(;B[aa])(;B[bb](;W[cc])(;W[dd])))").unwrap();
        let training = review_to_training(&review);
        assert_eq!(training.children.len(), 2);
        assert_eq!(training.children[0].get("AB"), None);
        assert_eq!(training.children[0].children[0].black_move(), Some("bb"));
        assert_eq!(training.children[1].get("AB"), Some(&["bb".to_string()][..]));
        assert_eq!(training.children[1].children[0].white_move(), Some("dd"));
    }
}
