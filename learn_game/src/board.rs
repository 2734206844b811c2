use crate::error::{GameError, Result};
use crate::players::Marks;
use itertools::Itertools;
use ndarray::prelude::*;
use std::{fmt, ops::Deref};

pub const SIZE: usize = 3;
pub const CELLS: usize = SIZE * SIZE;
pub const EMPTY: i8 = 0;

#[derive(Debug, PartialEq)]
pub enum IsGameOver {
    InPlay,
    Drawn,
    Win(Marks),
}

/// The 3x3 grid. Cells hold `1` for a cross, `-1` for a nought and `0` when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    state: Array2<i8>,
}

impl Deref for Board {
    type Target = Array2<i8>;
    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let border = "+---".repeat(SIZE) + "+";
        for row in self.rows() {
            writeln!(f, "{border}")?;
            writeln!(f, "¦ {} ¦", row.iter().map(|&v| glyph(v)).join(" ¦ "))?;
        }
        write!(f, "{border}")
    }
}

fn glyph(value: i8) -> char {
    match Marks::from_value(value) {
        Some(mark) => mark.as_char(),
        None => ' ',
    }
}

/// Row-major linear index of a cell.
pub fn to_index((row, col): (usize, usize)) -> usize {
    row * SIZE + col
}

impl Board {
    pub fn new() -> Self {
        Board {
            state: Array::from_elem((SIZE, SIZE), EMPTY),
        }
    }

    pub fn from_cells(cells: [[i8; SIZE]; SIZE]) -> Result<Self> {
        let mut board = Board::new();
        for (row, values) in cells.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if !(-1..=1).contains(&value) {
                    return Err(GameError::InvalidCellValue(value));
                }
                board.state[[row, col]] = value;
            }
        }
        Ok(board)
    }

    pub fn reset(&mut self) {
        self.state.fill(EMPTY);
    }

    pub fn place(&mut self, (row, col): (usize, usize), mark: Marks) -> Result<()> {
        let cell = self
            .state
            .get_mut([row, col])
            .ok_or(GameError::CellOutOfRange { row, col })?;
        if *cell != EMPTY {
            return Err(GameError::OccupiedCell { row, col });
        }
        *cell = mark.value();
        Ok(())
    }

    pub fn is_empty_at(&self, (row, col): (usize, usize)) -> bool {
        self.state.get([row, col]) == Some(&EMPTY)
    }

    /// Empty cells in row-major order.
    pub fn available_moves(&self) -> Vec<(usize, usize)> {
        self.indexed_iter()
            .filter(|(_index, &value)| value == EMPTY)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.iter().all(|&value| value != EMPTY)
    }

    /// Returns the owner of a completed line, if any.
    pub fn check_win(&self) -> Option<Marks> {
        let diagonal: i8 = self.diag().sum();
        let anti_diagonal: i8 = (0..SIZE).map(|i| self.state[[i, SIZE - 1 - i]]).sum();
        self.rows()
            .into_iter()
            .map(|row| row.sum())
            .chain(self.columns().into_iter().map(|column| column.sum()))
            .chain([diagonal, anti_diagonal])
            .find_map(|total| match total {
                3 => Some(Marks::CROSS),
                -3 => Some(Marks::NOUGHT),
                _ => None,
            })
    }

    pub fn status(&self) -> IsGameOver {
        match self.check_win() {
            Some(mark) => IsGameOver::Win(mark),
            None if self.is_full() => IsGameOver::Drawn,
            None => IsGameOver::InPlay,
        }
    }

    pub fn to_state_key(&self) -> String {
        self.iter().map(|value| value.to_string()).collect()
    }

    /// Quarter turn: `new[col][2 - row] = old[row][col]`.
    pub fn rotate(&self) -> Board {
        Board {
            state: self.state.slice(s![..;-1, ..]).reversed_axes().to_owned(),
        }
    }

    pub fn draw(&self) {
        println!("{self}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_board_working() {
        let mut board = Board::new();
        board.place((0, 0), Marks::CROSS).unwrap();
        let moves = board.available_moves();
        assert_eq!(moves.len(), 8);
        assert!(!moves.contains(&(0, 0)));
        assert_eq!(moves[0], (0, 1));
        assert_eq!(board.to_state_key(), "100000000");
    }

    #[test]
    fn occupied_cell_is_rejected() {
        let mut board = Board::new();
        board.place((1, 1), Marks::NOUGHT).unwrap();
        let err = board.place((1, 1), Marks::CROSS).unwrap_err();
        assert!(matches!(err, GameError::OccupiedCell { row: 1, col: 1 }));
        assert!(matches!(
            board.place((3, 0), Marks::CROSS),
            Err(GameError::CellOutOfRange { row: 3, col: 0 })
        ));
    }

    #[test]
    fn single_mark_is_not_a_win() {
        let board = Board::from_cells([[1, 0, 0], [0, 0, 0], [0, 0, 0]]).unwrap();
        assert_eq!(board.check_win(), None);
        assert_eq!(board.status(), IsGameOver::InPlay);
    }

    #[test]
    fn top_row_wins_before_board_is_full() {
        let board = Board::from_cells([[1, 1, 1], [-1, -1, 0], [0, 0, 0]]).unwrap();
        assert_eq!(board.check_win(), Some(Marks::CROSS));
        assert_eq!(board.status(), IsGameOver::Win(Marks::CROSS));
    }

    #[test]
    fn winning_on_last_cell_is_a_win() {
        let board = Board::from_cells([[1, -1, 1], [-1, 1, -1], [-1, 1, 1]]).unwrap();
        assert!(board.is_full());
        assert_eq!(board.status(), IsGameOver::Win(Marks::CROSS));
    }

    #[test]
    fn is_game_over_working() {
        let columns = Board::from_cells([[0, -1, 1], [0, -1, 1], [1, -1, 0]]).unwrap();
        assert_eq!(columns.check_win(), Some(Marks::NOUGHT));
        let diagonal = Board::from_cells([[1, 0, 0], [0, 1, 0], [0, 0, 1]]).unwrap();
        assert_eq!(diagonal.check_win(), Some(Marks::CROSS));
        let anti = Board::from_cells([[0, 0, -1], [0, -1, 0], [-1, 0, 0]]).unwrap();
        assert_eq!(anti.check_win(), Some(Marks::NOUGHT));
    }

    #[test]
    fn full_board_without_line_is_drawn() {
        let board = Board::from_cells([[1, -1, 1], [1, -1, -1], [-1, 1, 1]]).unwrap();
        assert_eq!(board.check_win(), None);
        assert!(board.is_full());
        assert_eq!(board.status(), IsGameOver::Drawn);
    }

    #[test]
    fn rotation_moves_cells_a_quarter_turn() {
        let board = Board::from_cells([[1, 0, 0], [0, 0, 0], [0, 0, -1]]).unwrap();
        let rotated = board.rotate();
        assert_eq!(rotated[[0, 2]], 1);
        assert_eq!(rotated[[2, 0]], -1);
        assert_eq!(rotated.to_state_key(), "001000-100");
    }

    #[test]
    fn four_rotations_return_to_start() {
        let board = Board::from_cells([[1, -1, 0], [0, 1, 0], [-1, 0, 0]]).unwrap();
        let back = board.rotate().rotate().rotate().rotate();
        assert_eq!(back, board);
    }

    #[test]
    fn rendering_has_ascii_border() {
        let board = Board::from_cells([[1, 0, -1], [0, 0, 0], [0, 0, 0]]).unwrap();
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "+---+---+---+");
        assert_eq!(lines[1], "¦ X ¦   ¦ O ¦");
    }

    #[test]
    fn invalid_cell_values_are_rejected() {
        assert!(matches!(
            Board::from_cells([[2, 0, 0], [0, 0, 0], [0, 0, 0]]),
            Err(GameError::InvalidCellValue(2))
        ));
    }
}
