use std::time::Duration;

use clap::Parser;

use crate::names;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// libSQL database URL. `file:<path>` opens a local database.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// libSQL authentication token for remote databases.
    #[arg(long, env = "DATABASE_AUTH_TOKEN", default_value = "")]
    pub database_auth_token: String,

    /// The address to bind to.
    #[arg(short, long, env = "ADDRESS", default_value = "127.0.0.1:8080")]
    pub address: String,

    /// Trivia provider endpoint.
    #[arg(long, env = "OPENTDB_URL", default_value = "https://opentdb.com/api.php")]
    pub opentdb_url: String,

    /// Upper bound for every store and trivia provider call, in milliseconds.
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS", default_value_t = 5000)]
    pub upstream_timeout_ms: u64,

    /// Number of questions served in a quiz.
    #[arg(long, env = "QUESTIONS_PER_QUIZ", default_value_t = names::DEFAULT_QUESTIONS_PER_QUIZ)]
    pub questions_per_quiz: usize,
}

impl Config {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}
