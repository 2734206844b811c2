use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use learn_game::config::TrainingConfig;
use learn_game::players::PlayerKind;
use learn_game::trainer::Trainer;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tic-tac-toe", about = "Tic-tac-toe with a self-taught value table agent")]
struct Cli {
    /// JSON file with training settings; flags below override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Value table file
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train by self-play and save the value table at the end
    Train {
        #[arg(long)]
        episodes: Option<usize>,
        /// Episodes between batch summaries
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long, value_enum)]
        player1: Option<PlayerKind>,
        #[arg(long, value_enum)]
        player2: Option<PlayerKind>,
        /// Also write a dated JSON snapshot of the table here
        #[arg(long)]
        archive_dir: Option<PathBuf>,
        /// Print the final counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play one game at the terminal
    Play {
        #[arg(long, value_enum, default_value = "human")]
        player1: PlayerKind,
        #[arg(long, value_enum, default_value = "learning")]
        player2: PlayerKind,
        /// Pause after invalid input, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

fn load_config(cli: &Cli) -> Result<TrainingConfig> {
    let mut config = match &cli.config {
        Some(path) => TrainingConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => TrainingConfig::default(),
    };
    if let Some(table) = &cli.table {
        config.table_path = table.clone();
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Train {
            episodes,
            batch_size,
            player1,
            player2,
            archive_dir,
            json,
        } => {
            config.episodes = episodes.unwrap_or(config.episodes);
            config.batch_size = batch_size.unwrap_or(config.batch_size);
            config.player1 = player1.unwrap_or(config.player1);
            config.player2 = player2.unwrap_or(config.player2);
            config.archive_dir = archive_dir.or(config.archive_dir);

            let mut trainer = Trainer::new(config.clone()).with_context(|| {
                format!("loading value table {}", config.table_path.display())
            })?;
            let stats = trainer.run().context("training stopped")?;
            if json {
                println!("{}", serde_json::to_string(&stats)?);
            }
        }
        Command::Play {
            player1,
            player2,
            delay_ms,
        } => {
            config.input_delay_ms = delay_ms.unwrap_or(config.input_delay_ms);
            learn_game::play_interactive(&config, player1, player2).context("game aborted")?;
        }
    }
    Ok(())
}
