use crate::board::{to_index, Board};
use crate::error::{GameError, Result};
use crate::q_table::ValueTable;
use crate::symmetry::symmetry_keys;
use clap::ValueEnum;
use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Marks {
    CROSS = 1,
    NOUGHT = -1,
}

impl Marks {
    pub fn other(self) -> Self {
        match self {
            Self::CROSS => Marks::NOUGHT,
            Self::NOUGHT => Marks::CROSS,
        }
    }
    pub fn as_char(self) -> char {
        match self {
            Self::CROSS => 'X',
            Self::NOUGHT => 'O',
        }
    }
    /// Cell encoding used on the board and in state keys.
    pub fn value(self) -> i8 {
        self as i8
    }
    pub fn from_value(value: i8) -> Option<Self> {
        match value {
            1 => Some(Self::CROSS),
            -1 => Some(Self::NOUGHT),
            _ => None,
        }
    }
}

/// The `(state key, linear index)` pairs one learning agent played in an episode.
pub type MoveRecord = Vec<(String, usize)>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Random,
    Learning,
}

pub trait Player {
    fn set_mark(&mut self, mark: Marks);
    fn get_mark(&self) -> Marks;
    fn get_name(&self) -> &str;
    /// Picks an empty cell for the current board.
    fn choose_move(&mut self, board: &Board, q: &ValueTable) -> Result<(usize, usize)>;
    /// Clears per-episode state.
    fn reset(&mut self) {}
    /// Hands over the moves recorded this episode. Only learning agents keep a record.
    fn take_moves(&mut self) -> Option<MoveRecord> {
        None
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub fn build_player(
    kind: PlayerKind,
    name: &str,
    mark: Marks,
    seed: Option<u64>,
    input_delay: Duration,
) -> Box<dyn Player> {
    match kind {
        PlayerKind::Human => Box::new(HumanPlayer::from_stdin(name, mark, input_delay)),
        PlayerKind::Random => Box::new(RandomPlayer::new(name, mark, seed)),
        PlayerKind::Learning => Box::new(LearningAgent::new(name, mark, seed)),
    }
}

#[derive(Debug)]
pub struct RandomPlayer {
    pub name: String,
    pub mark: Marks,
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new(name: &str, mark: Marks, seed: Option<u64>) -> Self {
        RandomPlayer {
            name: name.to_owned(),
            mark,
            rng: seeded_rng(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn set_mark(&mut self, mark: Marks) {
        self.mark = mark;
    }
    fn get_mark(&self) -> Marks {
        self.mark
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board, _q: &ValueTable) -> Result<(usize, usize)> {
        board
            .available_moves()
            .choose(&mut self.rng)
            .copied()
            .ok_or(GameError::NoLegalMove)
    }
}

/// Plays the highest scoring empty cell of the first rotation found in the table.
#[derive(Debug)]
pub struct LearningAgent {
    pub name: String,
    pub mark: Marks,
    rng: StdRng,
    moves: MoveRecord,
}

impl LearningAgent {
    pub fn new(name: &str, mark: Marks, seed: Option<u64>) -> Self {
        LearningAgent {
            name: name.to_owned(),
            mark,
            rng: seeded_rng(seed),
            moves: MoveRecord::new(),
        }
    }

    pub fn moves(&self) -> &[(String, usize)] {
        &self.moves
    }
}

impl Player for LearningAgent {
    fn set_mark(&mut self, mark: Marks) {
        self.mark = mark;
    }
    fn get_mark(&self) -> Marks {
        self.mark
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board, q: &ValueTable) -> Result<(usize, usize)> {
        let available_moves = board.available_moves();
        if available_moves.is_empty() {
            return Err(GameError::NoLegalMove);
        }
        let [identity, rotated @ ..] = symmetry_keys(board);
        let matched = std::iter::once(identity.clone())
            .chain(rotated)
            .find(|key| q.contains_key(key));

        let (key, mv) = match matched {
            Some(key) => {
                let scores = q.get(&key);
                // Strict comparison keeps the lowest index on ties.
                let mut best = available_moves[0];
                for &mv in &available_moves[1..] {
                    if scores[to_index(mv)] > scores[to_index(best)] {
                        best = mv;
                    }
                }
                (key, best)
            }
            None => {
                let mv = *available_moves
                    .choose(&mut self.rng)
                    .ok_or(GameError::NoLegalMove)?;
                (identity, mv)
            }
        };
        log::trace!("{} plays {:?} from {}", self.name, mv, key);
        self.moves.push((key, to_index(mv)));
        Ok(mv)
    }
    fn reset(&mut self) {
        self.moves.clear();
    }
    fn take_moves(&mut self) -> Option<MoveRecord> {
        Some(std::mem::take(&mut self.moves))
    }
}

/// Reads 1-indexed row and column from the terminal.
pub struct HumanPlayer {
    pub name: String,
    pub mark: Marks,
    input: Box<dyn BufRead>,
    delay: Duration,
}

impl fmt::Debug for HumanPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HumanPlayer")
            .field("name", &self.name)
            .field("mark", &self.mark)
            .finish()
    }
}

impl HumanPlayer {
    pub fn new(name: &str, mark: Marks, input: Box<dyn BufRead>, delay: Duration) -> Self {
        HumanPlayer {
            name: name.to_owned(),
            mark,
            input,
            delay,
        }
    }

    pub fn from_stdin(name: &str, mark: Marks, delay: Duration) -> Self {
        Self::new(name, mark, Box::new(io::BufReader::new(io::stdin())), delay)
    }

    fn read_coordinate(&mut self, board: &Board, label: &str) -> Result<usize> {
        loop {
            println!("Enter the {label} (1-3): ");
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(GameError::InputClosed);
            }
            match line.trim().parse::<usize>() {
                Ok(value @ 1..=3) => return Ok(value - 1),
                _ => self.complain(board, &format!("The {label} you entered was not valid.")),
            }
        }
    }

    fn complain(&self, board: &Board, message: &str) {
        println!("{message} Please enter another.");
        thread::sleep(self.delay);
        board.draw();
    }
}

impl Player for HumanPlayer {
    fn set_mark(&mut self, mark: Marks) {
        self.mark = mark;
    }
    fn get_mark(&self) -> Marks {
        self.mark
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board, _q: &ValueTable) -> Result<(usize, usize)> {
        if board.is_full() {
            return Err(GameError::NoLegalMove);
        }
        loop {
            let row = self.read_coordinate(board, "row")?;
            let col = self.read_coordinate(board, "column")?;
            if board.is_empty_at((row, col)) {
                return Ok((row, col));
            }
            self.complain(board, "That square is taken.");
        }
    }
}
