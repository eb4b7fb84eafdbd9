mod chat;
mod config;
mod db;
mod error;
mod stats;
mod tracker;

pub use chat::{ChatHandler, Command, UserProfile, PAUSE_REASONS};
pub use config::Config;
pub use db::models::{Pause, User, WorkSession};
pub use db::Database;
pub use error::TrackerError;
pub use stats::{
    daily_stats, session_stats, weekly_stats, DailyStats, DayBreakdown, SessionStats, WeeklyStats,
};
pub use tracker::{ActivePause, PauseToggle, Tracker, TrackerStatus};

use std::path::Path;

use anyhow::Result;
use log::info;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Chat id used by the local line-oriented front-end; a real transport
/// supplies one per conversation.
const LOCAL_CHAT_ID: i64 = 1;

pub async fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("worktrack starting up...");

    let config = Config::load(Path::new("worktrack.json"))?;
    let database = Database::new(config.db_path.clone())?;
    let tracker = Tracker::new(database);
    let handler = ChatHandler::new(tracker, config);

    let profile = UserProfile {
        username: std::env::var("USER").ok(),
        first_name: None,
        last_name: None,
    };

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    stdout
        .write_all(b"worktrack ready. Send /start to register, /help for commands, /quit to exit.\n> ")
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }

        let reply = if line.is_empty() {
            None
        } else {
            Some(match Command::parse(line) {
                Some(command) => handler.handle(LOCAL_CHAT_ID, &profile, command).await,
                None => "Unknown command. Send /help for the list.".to_string(),
            })
        };

        if let Some(reply) = reply {
            stdout.write_all(format!("{reply}\n").as_bytes()).await?;
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    info!("worktrack shutting down");
    Ok(())
}
