// Database module - the document store behind every service

use std::sync::Arc;

use color_eyre::{eyre::OptionExt, Result};

pub mod models;
pub use models::*;

mod category;
mod helpers;
mod ledger;
mod quiz;
mod schema;
mod user;

// Main database handle
#[derive(Clone)]
pub struct Db {
    db: Arc<libsql::Database>,
}

impl Db {
    pub async fn new(url: String, auth_token: String) -> Result<Self> {
        let db = if let Some(path) = url.strip_prefix("file:") {
            libsql::Builder::new_local(path).build().await?
        } else {
            libsql::Builder::new_remote(url, auth_token).build().await?
        };

        let conn = db.connect()?;

        // Verify connection
        let one = conn
            .query("SELECT 1", ())
            .await?
            .next()
            .await?
            .ok_or_eyre("connection check failed")?
            .get::<i64>(0)?;
        color_eyre::eyre::ensure!(one == 1, "connection check returned {one}");

        schema::create_schema(&conn).await?;

        tracing::info!("database connection has been verified");

        Ok(Self { db: Arc::new(db) })
    }

    async fn connect(&self) -> Result<libsql::Connection> {
        let conn = self.db.connect()?;
        // Both pragmas are per connection.
        conn.query("PRAGMA foreign_keys = ON", ()).await?;
        conn.query("PRAGMA busy_timeout = 5000", ()).await?;
        Ok(conn)
    }

    /// Open a write transaction that takes the database lock up front, so two
    /// writers never both read and then fail to upgrade.
    async fn begin_write(&self) -> Result<libsql::Transaction> {
        let conn = self.connect().await?;
        let tx = conn
            .transaction_with_behavior(libsql::TransactionBehavior::Immediate)
            .await?;
        Ok(tx)
    }
}
