//! Board projection.
//!
//! A [`Board`] is a square grid of [`Cell`]s built from a list of setup
//! operations and numbered moves. Projection only places and clears stones;
//! it does not resolve captures, since recall training shows every stone of
//! the sequence with its move number.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coord::{Point, on_board, parse_coord};
use crate::error::Error;
use crate::walk::Walk;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Ok(Color::Black),
            "w" | "white" => Ok(Color::White),
            _ => Err(Error::InvalidArgument {
                what: "color",
                value: s.to_string(),
            }),
        }
    }
}

/// A move as recorded in the game tree: color and raw SGF coordinate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub color: Color,
    pub coord: String,
}

impl Move {
    pub fn new(color: Color, coord: impl Into<String>) -> Self {
        Self {
            color,
            coord: coord.into(),
        }
    }
}

/// A setup-stone operation (`AB`, `AW`, `AE`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SetupOp {
    Add { color: Color, coord: String },
    Remove { coord: String },
}

/// One point of the board.
///
/// `move_index` is `None` for setup stones and the 1-based move number for
/// stones placed by moves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub color: Option<Color>,
    pub move_index: Option<usize>,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub size: usize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::default(); size * size],
        }
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.size || y >= self.size {
            return None;
        }
        Some(self.cells[self.idx(x, y)])
    }

    /// Write a stone; returns false if the point is off the board.
    pub fn place(&mut self, (x, y): Point, color: Color, move_index: Option<usize>) -> bool {
        if !on_board((x, y), self.size) {
            return false;
        }
        let i = self.idx(x, y);
        self.cells[i] = Cell {
            color: Some(color),
            move_index,
        };
        true
    }

    pub fn clear(&mut self, (x, y): Point) -> bool {
        if !on_board((x, y), self.size) {
            return false;
        }
        let i = self.idx(x, y);
        self.cells[i] = Cell::default();
        true
    }

    /// Rows top to bottom, the nested-array form consumed by renderers.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        self.cells.chunks(self.size.max(1)).map(<[Cell]>::to_vec).collect()
    }

    /// Points carrying a move number, in board order.
    pub fn numbered(&self) -> impl Iterator<Item = (Point, Cell)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.move_index
                .map(|_| ((i % self.size, i / self.size), *cell))
        })
    }

    /// Rotate 90 degrees clockwise: `new[r][c] = old[size-1-c][r]`.
    pub fn rotate_clockwise(&self) -> Self {
        let n = self.size;
        let mut out = Board::new(n);
        for r in 0..n {
            for c in 0..n {
                out.cells[r * n + c] = self.cells[(n - 1 - c) * n + r];
            }
        }
        out
    }

    /// Reflect across the main diagonal: `new[r][c] = old[c][r]`.
    pub fn transpose(&self) -> Self {
        let n = self.size;
        let mut out = Board::new(n);
        for r in 0..n {
            for c in 0..n {
                out.cells[r * n + c] = self.cells[c * n + r];
            }
        }
        out
    }

    /// Apply an orientation: rotations first, then the transpose.
    pub fn oriented(&self, orientation: Orientation) -> Self {
        let mut out = self.clone();
        for _ in 0..orientation.rotations % 4 {
            out = out.rotate_clockwise();
        }
        if orientation.transpose {
            out = out.transpose();
        }
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let ch = match self.cells[self.idx(x, y)].color {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A symmetry of the board: `rotations` clockwise quarter turns followed by
/// an optional transpose.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orientation {
    pub rotations: u8,
    pub transpose: bool,
}

impl Orientation {
    /// One of the eight board symmetries, uniformly.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self {
            rotations: rng.u8(0..4),
            transpose: rng.bool(),
        }
    }
}

/// Result of [`project`].
#[derive(Clone, Debug)]
pub struct Projection {
    pub board: Board,
    /// Length of the full move list, independent of the move limit.
    pub total_moves: usize,
}

/// Project setup stones and the first `move_limit` moves onto a fresh board.
///
/// The i-th move (1-based) gets move index i. A move whose coordinate does
/// not decode or falls off the board still uses up its number but writes
/// nothing.
pub fn project(
    size: usize,
    setup: &[SetupOp],
    moves: &[Move],
    move_limit: usize,
    orientation: Option<Orientation>,
) -> Projection {
    let mut board = Board::new(size);

    for op in setup {
        match op {
            SetupOp::Add { color, coord } => {
                if let Some(pt) = parse_coord(coord) {
                    board.place(pt, *color, None);
                }
            }
            SetupOp::Remove { coord } => {
                if let Some(pt) = parse_coord(coord) {
                    board.clear(pt);
                }
            }
        }
    }

    for (i, mv) in moves.iter().take(move_limit).enumerate() {
        if let Some(pt) = parse_coord(&mv.coord) {
            board.place(pt, mv.color, Some(i + 1));
        }
    }

    if let Some(orientation) = orientation {
        board = board.oriented(orientation);
    }

    Projection {
        board,
        total_moves: moves.len(),
    }
}

/// What a board renderer consumes.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rendering {
    pub sign_map: Vec<Vec<Cell>>,
    pub total_moves: usize,
    pub comments: Vec<String>,
}

/// Project a walked sequence and package it with its comments.
pub fn render(walk: &Walk, move_limit: usize, orientation: Option<Orientation>) -> Rendering {
    let projection = project(walk.size, &walk.setup, &walk.moves, move_limit, orientation);
    Rendering {
        sign_map: projection.board.rows(),
        total_moves: projection.total_moves,
        comments: walk.comments.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(list: &[(Color, &str)]) -> Vec<Move> {
        list.iter().map(|&(c, s)| Move::new(c, s)).collect()
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

    #[test]
    fn test_project_numbers_moves() {
        let mv = moves(&[(Color::Black, "pd"), (Color::White, "dd"), (Color::Black, "pp")]);
        let p = project(19, &[], &mv, 2, None);
        assert_eq!(p.total_moves, 3);
        let pd = p.board.get(15, 3).unwrap();
        assert_eq!(pd.color, Some(Color::Black));
        assert_eq!(pd.move_index, Some(1));
        let dd = p.board.get(3, 3).unwrap();
        assert_eq!(dd.color, Some(Color::White));
        assert_eq!(dd.move_index, Some(2));
        assert!(p.board.get(15, 15).unwrap().is_empty());
    }

    #[test]
    fn test_project_zero_limit() {
        let mv = moves(&[(Color::Black, "pd")]);
        let p = project(19, &[], &mv, 0, None);
        assert_eq!(p.board.numbered().count(), 0);
        assert_eq!(p.total_moves, 1);
    }

    #[test]
    fn test_project_skips_pass_but_keeps_numbering() {
        let mv = moves(&[
            (Color::Black, "aa"),
            (Color::White, ""),
            (Color::Black, "tt"),
            (Color::White, "bb"),
        ]);
        let p = project(19, &[], &mv, 10, None);
        let numbered: Vec<_> = p.board.numbered().collect();
        assert_eq!(numbered.len(), 2);
        assert_eq!(p.board.get(0, 0).unwrap().move_index, Some(1));
        assert_eq!(p.board.get(1, 1).unwrap().move_index, Some(4));
    }

    #[test]
    fn test_project_setup_stones() {
        let setup = vec![
            add(Color::Black, "cc"),
            add(Color::White, "dd"),
            remove("dd"),
            add(Color::White, "zz"),
        ];
        let p = project(9, &setup, &[], 0, None);
        let cc = p.board.get(2, 2).unwrap();
        assert_eq!(cc.color, Some(Color::Black));
        assert_eq!(cc.move_index, None);
        assert!(p.board.get(3, 3).unwrap().is_empty());
    }

    #[test]
    fn test_project_small_board_drops_off_board_moves() {
        let mv = moves(&[(Color::Black, "jj"), (Color::White, "ii")]);
        let p = project(9, &[], &mv, 2, None);
        assert_eq!(p.board.numbered().count(), 1);
        assert_eq!(p.board.get(8, 8).unwrap().move_index, Some(2));
    }

    #[test]
    fn test_rotate_clockwise() {
        let mut board = Board::new(3);
        board.place((0, 0), Color::Black, Some(1));
        let rotated = board.rotate_clockwise();
        // top-left goes to top-right
        assert_eq!(rotated.get(2, 0).unwrap().color, Some(Color::Black));
        assert!(rotated.get(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_transpose() {
        let mut board = Board::new(3);
        board.place((2, 0), Color::White, None);
        let t = board.transpose();
        assert_eq!(t.get(0, 2).unwrap().color, Some(Color::White));
    }

    #[test]
    fn test_oriented_rotates_before_transpose() {
        let mut board = Board::new(3);
        board.place((1, 0), Color::Black, Some(1));
        let o = board.oriented(Orientation {
            rotations: 1,
            transpose: true,
        });
        let expected = board.rotate_clockwise().transpose();
        assert_eq!(o, expected);
        assert_eq!(o.get(2, 1).unwrap().color, None);
        assert_eq!(o.get(1, 2).unwrap().color, Some(Color::Black));
    }

    #[test]
    fn test_rows_and_display() {
        let mut board = Board::new(2);
        board.place((1, 0), Color::Black, Some(1));
        board.place((0, 1), Color::White, None);
        let rows = board.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1].move_index, Some(1));
        assert_eq!(format!("{board}"), ". X \nO . \n");
    }

    #[test]
    fn test_cell_json() {
        let cell = Cell {
            color: Some(Color::White),
            move_index: Some(3),
        };
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, r#"{"color":"white","moveIndex":3}"#);
        let empty = serde_json::to_string(&Cell::default()).unwrap();
        assert_eq!(empty, r#"{"color":null,"moveIndex":null}"#);
    }

    #[test]
    fn test_color_from_str() {
        assert_eq!("B".parse::<Color>().unwrap(), Color::Black);
        assert_eq!("white".parse::<Color>().unwrap(), Color::White);
        assert!("red".parse::<Color>().is_err());
        assert_eq!(Color::Black.opponent(), Color::White);
    }
}
