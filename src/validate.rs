//! Checking a recalled sequence against the projected board.

use std::fmt;

use crate::board::{Board, Color};
use crate::coord::{Point, on_board, parse_coord};
use crate::error::{Error, Result};

/// One move as recalled by the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecalledMove {
    /// `None` for a pass.
    pub point: Option<Point>,
    pub color: Color,
    /// 1-based.
    pub move_number: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    /// Move numbers that were recalled wrongly.
    pub mismatches: Vec<usize>,
    pub total_moves: usize,
    pub recalled: usize,
}

impl Validation {
    /// No mistakes and the whole sequence recalled.
    pub fn is_perfect(&self) -> bool {
        self.mismatches.is_empty() && self.recalled == self.total_moves
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.recalled == 0 {
            return write!(f, "No moves to validate");
        }
        if self.is_perfect() {
            return write!(f, "All moves match!");
        }
        write!(f, "Found {} incorrect moves", self.mismatches.len())?;
        if self.recalled != self.total_moves {
            write!(f, " ({} of {} moves recalled)", self.recalled, self.total_moves)?;
        }
        for n in &self.mismatches {
            write!(f, "\nMove {n}")?;
        }
        Ok(())
    }
}

/// Compare recalled moves with a board projected from the stored sequence.
///
/// A recalled pass is wrong if the sequence has a stone with that move
/// number. A recalled point is wrong unless the board holds a stone of the
/// same color and move number there.
pub fn validate(recalled: &[RecalledMove], board: &Board, total_moves: usize) -> Validation {
    let mismatches = recalled
        .iter()
        .filter(|mv| match mv.point {
            None => board
                .numbered()
                .any(|(_, cell)| cell.move_index == Some(mv.move_number)),
            Some(pt) if !on_board(pt, board.size) => true,
            Some((x, y)) => board.get(x, y).is_none_or(|cell| {
                cell.color != Some(mv.color) || cell.move_index != Some(mv.move_number)
            }),
        })
        .map(|mv| mv.move_number)
        .collect();

    Validation {
        mismatches,
        total_moves,
        recalled: recalled.len(),
    }
}

/// Parse a recalled sequence such as `"pd dd, pass qp"`.
///
/// Colors alternate starting with `first`; `pass` (any case) is a pass.
pub fn parse_recall(text: &str, first: Color) -> Result<Vec<RecalledMove>> {
    let mut color = first;
    let mut out = Vec::new();
    for (i, token) in text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .enumerate()
    {
        let point = if token.eq_ignore_ascii_case("pass") {
            None
        } else {
            Some(parse_coord(token).ok_or_else(|| Error::InvalidArgument {
                what: "coordinate",
                value: token.to_string(),
            })?)
        };
        out.push(RecalledMove {
            point,
            color,
            move_number: i + 1,
        });
        color = color.opponent();
    }
    Ok(out)
}
