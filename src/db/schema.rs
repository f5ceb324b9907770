// Database schema initialization

use color_eyre::Result;

pub async fn create_schema(conn: &libsql::Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            token TEXT,
            picture TEXT NOT NULL,
            coins INTEGER NOT NULL DEFAULT 0 CHECK (coins >= 0),
            experience INTEGER NOT NULL DEFAULT 0 CHECK (experience >= 0),
            quizzes_played INTEGER NOT NULL DEFAULT 0,
            correct_responses INTEGER NOT NULL DEFAULT 0,
            full_marks INTEGER NOT NULL DEFAULT 0,
            used_cheat_sheets INTEGER NOT NULL DEFAULT 0
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_token
        ON users(token) WHERE token IS NOT NULL
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS inventory (
            user_id INTEGER NOT NULL,
            rarity INTEGER NOT NULL CHECK (rarity IN (3, 4, 5)),
            quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
            PRIMARY KEY (user_id, rarity),
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
            UNIQUE(user_id, name)
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS category_questions (
            id INTEGER PRIMARY KEY,
            category_id INTEGER NOT NULL,
            question_text TEXT NOT NULL,
            responses TEXT NOT NULL,
            response_correct TEXT NOT NULL,
            FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE,
            UNIQUE(category_id, question_text)
        )
        "#,
        (),
    )
    .await?;

    // A quiz embeds a snapshot of its questions as JSON.
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS quizzes (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            questions TEXT NOT NULL,
            question_count INTEGER NOT NULL CHECK (question_count > 0),
            current_index INTEGER NOT NULL DEFAULT 0,
            correct_count INTEGER NOT NULL DEFAULT 0,
            finished INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
            CHECK (current_index BETWEEN 0 AND question_count),
            CHECK (correct_count BETWEEN 0 AND current_index),
            CHECK (finished = (current_index = question_count))
        )
        "#,
        (),
    )
    .await?;

    // At most one unfinished quiz per user.
    conn.execute(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_quizzes_one_active
        ON quizzes(user_id) WHERE finished = 0
        "#,
        (),
    )
    .await?;

    Ok(())
}
