//! GoRecall: memorize Go sequences from SGF game records.
//!
//! This crate splits an SGF game tree into independent leaf sequences,
//! stores them, picks one according to a training mode, replays it and
//! projects it onto a board for display and recall validation.
//!
//! ## Modules
//!
//! - [`sgf`] - SGF parsing and serialization
//! - [`node`] - Game tree nodes and their JSON form
//! - [`coord`] - Two-letter SGF coordinates
//! - [`board`] - Board projection and orientation
//! - [`walk`] - Replaying one path of a game tree
//! - [`split`] - Splitting a tree into leaf sequences
//! - [`store`] - Sequence persistence and the catalog index
//! - [`select`] - Choosing a sequence from the catalog
//! - [`validate`] - Checking a recalled sequence
//! - [`convert`] - Review records to training games
//! - [`config`] - Persisted preferences
//! - [`constants`] - Fixed values of the data formats
//!
//! ## Example
//!
//! ```
//! use gorecall::board::{render, Color};
//! use gorecall::split::split;
//! use gorecall::sgf::parse_game;
//! use gorecall::walk::{walk, WalkOptions};
//!
//! let game = parse_game("(;SZ[19];B[pd](;W[dd]C[good])(;W[dp]))").unwrap();
//! let sequences = split(&game, "lesson.sgf");
//! assert_eq!(sequences.len(), 2);
//!
//! let mut rng = fastrand::Rng::with_seed(1);
//! let options = WalkOptions { start_player: Some(Color::Black), ..Default::default() };
//! let replay = walk(&sequences[0].tree.root(), &options, &mut rng);
//! let shown = render(&replay, 2, None);
//! assert_eq!(shown.total_moves, 2);
//! assert_eq!(shown.comments, vec![" ", "good"]);
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod convert;
pub mod coord;
pub mod error;
pub mod node;
pub mod select;
pub mod sgf;
pub mod split;
pub mod store;
pub mod validate;
pub mod walk;

pub use error::{Error, Result};
