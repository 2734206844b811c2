//! Rotational equivalents of a board.
//!
//! Every position has four orientations: the board itself and its 90, 180 and 270
//! degree quarter turns. The learning agent looks all of them up in the value table
//! so that experience gained in one orientation carries over to the others.

use crate::board::Board;

pub const ROTATIONS: usize = 4;

/// Identity first, then each quarter turn of the previous board.
pub fn rotations(board: &Board) -> [Board; ROTATIONS] {
    let quarter = board.rotate();
    let half = quarter.rotate();
    let three_quarters = half.rotate();
    [board.clone(), quarter, half, three_quarters]
}

/// State keys of [`rotations`], in the same order.
pub fn symmetry_keys(board: &Board) -> [String; ROTATIONS] {
    rotations(board).map(|rotated| rotated.to_state_key())
}
