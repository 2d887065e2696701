use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id VARCHAR NOT NULL,
            name VARCHAR NOT NULL,
            phone VARCHAR NOT NULL,
            email VARCHAR,
            birthday VARCHAR,
            photo_url VARCHAR,
            created_at BIGINT NOT NULL,
            updated_at BIGINT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS contact_categories (
            contact_id INTEGER NOT NULL,
            category_id VARCHAR NOT NULL,
            PRIMARY KEY (contact_id, category_id),
            FOREIGN KEY (contact_id) REFERENCES contacts (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contacts_user
            ON contacts(user_id, name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contact_categories_category
            ON contact_categories(category_id)",
        [],
    )?;

    Ok(())
}
