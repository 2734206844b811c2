use crate::error::Result;
use crate::players::PlayerKind;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const NUM_EPISODES: usize = 100_000_usize;
pub const BATCH_SIZE: usize = 10_000_usize;
pub const TABLE_PATH: &str = "value_table.csv";
pub const INPUT_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: usize,
    /// Episodes between two batch summaries.
    pub batch_size: usize,
    pub table_path: PathBuf,
    /// Plays crosses and moves first.
    pub player1: PlayerKind,
    pub player2: PlayerKind,
    pub seed: Option<u64>,
    pub archive_dir: Option<PathBuf>,
    pub input_delay_ms: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            episodes: NUM_EPISODES,
            batch_size: BATCH_SIZE,
            table_path: PathBuf::from(TABLE_PATH),
            player1: PlayerKind::Learning,
            player2: PlayerKind::Random,
            seed: None,
            archive_dir: None,
            input_delay_ms: INPUT_DELAY_MS,
        }
    }
}

impl TrainingConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn input_delay(&self) -> Duration {
        Duration::from_millis(self.input_delay_ms)
    }

    /// Per-player seed so two seeded players do not mirror each other.
    pub fn player_seed(&self, side: u64) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(side))
    }
}
