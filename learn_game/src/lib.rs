use crate::board::{Board, IsGameOver};
use crate::config::TrainingConfig;
use crate::error::Result;
use crate::players::{build_player, Marks, Player, PlayerKind};
use crate::q_table::ValueTable;
use std::io::{self, Write};
use std::mem;

pub mod board;
pub mod config;
pub mod error;
pub mod players;
pub mod q_table;
pub mod symmetry;
pub mod trainer;

pub use error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Marks),
    Draw,
}

pub struct Game {
    pub board: Board,
    pub current_player: Box<dyn Player>,
    pub other_player: Box<dyn Player>,
}

impl Game {
    /// `player1` plays crosses and always opens.
    pub fn new(mut player1: Box<dyn Player>, mut player2: Box<dyn Player>) -> Self {
        player1.set_mark(Marks::CROSS);
        player2.set_mark(Marks::NOUGHT);
        Game {
            board: Board::new(),
            current_player: player1,
            other_player: player2,
        }
    }

    pub fn swap_players(&mut self) {
        mem::swap(&mut self.current_player, &mut self.other_player);
    }

    fn assign_players(&mut self) {
        if self.current_player.get_mark() == Marks::NOUGHT {
            self.swap_players();
        }
    }

    pub fn players_mut(&mut self) -> [&mut Box<dyn Player>; 2] {
        [&mut self.current_player, &mut self.other_player]
    }

    pub fn start_episode(&mut self) {
        self.board.reset();
        self.assign_players();
        for player in self.players_mut() {
            player.reset();
        }
    }

    /// One ply. Players are swapped only while the game is still in play.
    pub fn play_turn(&mut self, q: &ValueTable) -> Result<IsGameOver> {
        let mv = self.current_player.choose_move(&self.board, q)?;
        self.board.place(mv, self.current_player.get_mark())?;
        let status = self.board.status();
        if status == IsGameOver::InPlay {
            self.swap_players();
        }
        Ok(status)
    }

    pub fn play_episode(&mut self, q: &ValueTable) -> Result<Outcome> {
        self.start_episode();
        loop {
            match self.play_turn(q)? {
                IsGameOver::InPlay => continue,
                IsGameOver::Drawn => return Ok(Outcome::Draw),
                IsGameOver::Win(mark) => return Ok(Outcome::Win(mark)),
            }
        }
    }

    fn name_of(&self, mark: Marks) -> &str {
        if self.current_player.get_mark() == mark {
            self.current_player.get_name()
        } else {
            self.other_player.get_name()
        }
    }
}

fn clear_terminal() {
    print!("\x1B[2J\x1B[1;1H");
    let _ = io::stdout().flush();
}

/// A single game at the terminal. Computer opponents read the table but never update it.
pub fn play_interactive(
    config: &TrainingConfig,
    player1: PlayerKind,
    player2: PlayerKind,
) -> Result<Outcome> {
    let q = if player1 == PlayerKind::Learning || player2 == PlayerKind::Learning {
        ValueTable::load(&config.table_path)?
    } else {
        ValueTable::new()
    };
    let delay = config.input_delay();
    let mut game = Game::new(
        build_player(player1, "Player 1", Marks::CROSS, config.player_seed(1), delay),
        build_player(player2, "Player 2", Marks::NOUGHT, config.player_seed(2), delay),
    );
    game.start_episode();
    let outcome = loop {
        clear_terminal();
        println!("{}'s turn", game.current_player.get_name());
        game.board.draw();
        match game.play_turn(&q)? {
            IsGameOver::InPlay => continue,
            IsGameOver::Drawn => break Outcome::Draw,
            IsGameOver::Win(mark) => break Outcome::Win(mark),
        }
    };
    clear_terminal();
    game.board.draw();
    match outcome {
        Outcome::Win(mark) => println!("{} won.", game.name_of(mark)),
        Outcome::Draw => println!("Player 1 and Player 2 drew"),
    }
    Ok(outcome)
}
