//! Self-play training and end-of-episode credit assignment.
//!
//! Every move a learning agent made during an episode receives the same flat delta
//! once the episode is over. There is no discounting by recency.

use crate::config::TrainingConfig;
use crate::error::{GameError, Result};
use crate::players::{build_player, Marks, Player};
use crate::q_table::ValueTable;
use crate::{Game, Outcome};
use chrono::Local;
use serde::Serialize;
use std::fmt;

/// Episode result from one learning agent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentOutcome {
    Win,
    Loss,
    Draw,
    NoResult,
}

impl AgentOutcome {
    /// `None` stands for an episode that ended in a failure.
    pub fn for_mark(result: Option<Outcome>, mark: Marks) -> Self {
        match result {
            Some(Outcome::Win(winner)) if winner == mark => AgentOutcome::Win,
            Some(Outcome::Win(_)) => AgentOutcome::Loss,
            Some(Outcome::Draw) => AgentOutcome::Draw,
            None => AgentOutcome::NoResult,
        }
    }
}

/// Note the signs: a win is penalised and a loss earns the largest delta.
pub fn reward(outcome: AgentOutcome) -> i64 {
    match outcome {
        AgentOutcome::Win => -1,
        AgentOutcome::Draw => 1,
        AgentOutcome::Loss | AgentOutcome::NoResult => 2,
    }
}

pub fn assign_credit(
    q: &mut ValueTable,
    moves: &[(String, usize)],
    outcome: AgentOutcome,
) -> Result<()> {
    let delta = reward(outcome);
    for (key, index) in moves {
        q.apply_delta(key, *index, delta)?;
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub side1_wins: usize,
    pub side2_wins: usize,
    pub draws: usize,
    pub failures: usize,
}

impl Stats {
    /// Player 1 always holds crosses.
    pub fn record(&mut self, result: Option<Outcome>) {
        match result {
            Some(Outcome::Win(Marks::CROSS)) => self.side1_wins += 1,
            Some(Outcome::Win(Marks::NOUGHT)) => self.side2_wins += 1,
            Some(Outcome::Draw) => self.draws += 1,
            None => self.failures += 1,
        }
    }

    pub fn merge(&mut self, other: &Stats) {
        self.side1_wins += other.side1_wins;
        self.side2_wins += other.side2_wins;
        self.draws += other.draws;
        self.failures += other.failures;
    }

    pub fn total(&self) -> usize {
        self.side1_wins + self.side2_wins + self.draws + self.failures
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "player 1 wins: {}, player 2 wins: {}, draws: {}, failures: {}",
            self.side1_wins, self.side2_wins, self.draws, self.failures
        )
    }
}

/// Counts for episodes `first..=last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub first: usize,
    pub last: usize,
    pub stats: Stats,
}

pub struct Trainer {
    config: TrainingConfig,
    table: ValueTable,
    game: Game,
    /// Episodes of closed batches; the open batch lives in `batch`.
    totals: Stats,
    batch: Stats,
    batches: Vec<BatchSummary>,
    episode: usize,
}

impl Trainer {
    /// Loads the table from `config.table_path` and builds both players.
    pub fn new(config: TrainingConfig) -> Result<Self> {
        let table = ValueTable::load(&config.table_path)?;
        let delay = config.input_delay();
        let player1 = build_player(
            config.player1,
            "Player 1",
            Marks::CROSS,
            config.player_seed(1),
            delay,
        );
        let player2 = build_player(
            config.player2,
            "Player 2",
            Marks::NOUGHT,
            config.player_seed(2),
            delay,
        );
        Ok(Self::with_players(config, table, player1, player2))
    }

    pub fn with_players(
        config: TrainingConfig,
        table: ValueTable,
        player1: Box<dyn Player>,
        player2: Box<dyn Player>,
    ) -> Self {
        Trainer {
            config,
            table,
            game: Game::new(player1, player2),
            totals: Stats::default(),
            batch: Stats::default(),
            batches: Vec::new(),
            episode: 0,
        }
    }

    pub fn stats(&self) -> Stats {
        let mut stats = self.totals;
        stats.merge(&self.batch);
        stats
    }

    /// Summaries of the batches completed so far.
    pub fn batches(&self) -> &[BatchSummary] {
        &self.batches
    }

    pub fn episodes_played(&self) -> usize {
        self.episode
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    /// Plays one episode and credits every learning agent.
    ///
    /// An occupied-cell move ends the episode as a failure; any other error is returned.
    pub fn run_episode(&mut self) -> Result<Option<Outcome>> {
        let result = match self.game.play_episode(&self.table) {
            Ok(outcome) => Some(outcome),
            Err(GameError::OccupiedCell { row, col }) => {
                log::warn!(
                    "Episode {}: {} played occupied cell ({row}, {col})",
                    self.episode + 1,
                    self.game.current_player.get_name()
                );
                None
            }
            Err(err) => return Err(err),
        };
        self.episode += 1;
        self.batch.record(result);
        log::debug!("Episode {}: {:?}", self.episode, result);

        for player in self.game.players_mut() {
            let mark = player.get_mark();
            if let Some(moves) = player.take_moves() {
                assign_credit(&mut self.table, &moves, AgentOutcome::for_mark(result, mark))?;
            }
        }
        Ok(result)
    }

    /// Runs the configured number of episodes, then saves the table once.
    ///
    /// On a fatal error the summary gathered so far is still printed and the table
    /// is left unsaved.
    pub fn run(&mut self) -> Result<Stats> {
        log::info!(
            "Training {} episodes ({:?} vs {:?}), started at {}",
            self.config.episodes,
            self.config.player1,
            self.config.player2,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        for _ in 0..self.config.episodes {
            if let Err(err) = self.run_episode() {
                log::error!("Training stopped after {} episodes: {err}", self.episode);
                self.report_final();
                return Err(err);
            }
            if self.config.batch_size > 0 && self.episode % self.config.batch_size == 0 {
                self.report_batch();
            }
        }
        self.report_final();
        self.table.save(&self.config.table_path)?;
        if let Some(dir) = &self.config.archive_dir {
            self.table.archive(dir)?;
        }
        Ok(self.stats())
    }

    fn report_batch(&mut self) {
        let summary = BatchSummary {
            first: self.episode + 1 - self.batch.total(),
            last: self.episode,
            stats: self.batch,
        };
        println!("Episodes {}-{}: {}", summary.first, summary.last, summary.stats);
        self.totals.merge(&self.batch);
        self.batch = Stats::default();
        self.batches.push(summary);
    }

    fn report_final(&self) {
        println!("Overall after {} episodes: {}", self.episode, self.stats());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewards_follow_the_outcome() {
        assert_eq!(reward(AgentOutcome::Win), -1);
        assert_eq!(reward(AgentOutcome::Draw), 1);
        assert_eq!(reward(AgentOutcome::Loss), 2);
        assert_eq!(reward(AgentOutcome::NoResult), 2);
    }

    #[test]
    fn outcome_is_relative_to_the_agent() {
        let win = Some(Outcome::Win(Marks::NOUGHT));
        assert_eq!(AgentOutcome::for_mark(win, Marks::NOUGHT), AgentOutcome::Win);
        assert_eq!(AgentOutcome::for_mark(win, Marks::CROSS), AgentOutcome::Loss);
        assert_eq!(
            AgentOutcome::for_mark(Some(Outcome::Draw), Marks::CROSS),
            AgentOutcome::Draw
        );
        assert_eq!(
            AgentOutcome::for_mark(None, Marks::CROSS),
            AgentOutcome::NoResult
        );
    }

    #[test]
    fn credit_is_flat_across_the_episode() {
        let mut q = ValueTable::new();
        let moves = vec![
            ("000000000".to_owned(), 4),
            ("1000-10000".to_owned(), 0),
            ("1000-10000".to_owned(), 2),
        ];
        assert!(q.get("1000-10000").iter().all(|&v| v == 0));
        assign_credit(&mut q, &moves, AgentOutcome::Loss).unwrap();
        assert_eq!(q.get("000000000")[4], 2);
        assert_eq!(q.get("1000-10000")[0], 2);
        assert_eq!(q.get("1000-10000")[2], 2);
        assign_credit(&mut q, &moves, AgentOutcome::Win).unwrap();
        assert_eq!(q.get("000000000")[4], 1);
        assert_eq!(q.get("1000-10000")[1], 0);
    }

    #[test]
    fn stats_count_by_side() {
        let mut stats = Stats::default();
        stats.record(Some(Outcome::Win(Marks::CROSS)));
        stats.record(Some(Outcome::Win(Marks::NOUGHT)));
        stats.record(Some(Outcome::Win(Marks::NOUGHT)));
        stats.record(Some(Outcome::Draw));
        stats.record(None);
        assert_eq!(
            stats,
            Stats {
                side1_wins: 1,
                side2_wins: 2,
                draws: 1,
                failures: 1
            }
        );
        let mut totals = Stats::default();
        totals.merge(&stats);
        totals.merge(&stats);
        assert_eq!(totals.total(), 10);
        assert_eq!(
            stats.to_string(),
            "player 1 wins: 1, player 2 wins: 2, draws: 1, failures: 1"
        );
    }
}
