use clap::Parser;
use quizmaster::{config::Config, content::TriviaClient, db::Db, services::content::Content, AppState};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "quizmaster=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let config = Config::parse();
    let timeout = config.upstream_timeout();

    let db = Db::new(config.database_url, config.database_auth_token).await?;
    let trivia = TriviaClient::new(config.opentdb_url, timeout)?;
    let state = AppState::new(
        db.clone(),
        Content::new(db, trivia),
        config.questions_per_quiz,
        timeout,
    );

    let listener = tokio::net::TcpListener::bind(&config.address).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, quizmaster::router(state)).await?;

    Ok(())
}
