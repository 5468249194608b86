use rusqlite::Connection;

use crate::error::AppError;

/// Run the consolidated schema migration. The schema is idempotent
/// (`CREATE TABLE IF NOT EXISTS`) so it is safe to run on every startup.
pub fn run(conn: &Connection) -> Result<(), AppError> {
    tracing::debug!("Running database migrations");

    conn.execute_batch(SCHEMA)?;

    tracing::info!("Database migrations complete");
    Ok(())
}

const SCHEMA: &str = r#"

-- ============================================================================
-- Legacy users
--
-- Rows carried over from the previous system. A row existing here means the
-- user has not been migrated to the auth provider yet; migration deletes it.
-- ============================================================================

CREATE TABLE IF NOT EXISTS legacy_users (
    id              INTEGER PRIMARY KEY,
    username        TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash   TEXT NOT NULL
);

-- ============================================================================
-- Products
-- ============================================================================

CREATE TABLE IF NOT EXISTS products (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    category    TEXT,
    price       REAL NOT NULL DEFAULT 0 CHECK(price >= 0),
    stock       INTEGER NOT NULL DEFAULT 0 CHECK(stock >= 0),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
CREATE INDEX IF NOT EXISTS idx_products_name     ON products(name);

-- ============================================================================
-- Transactions
--
-- user_id is TEXT: before migration it holds the legacy integer id rendered
-- as text; afterwards the auth provider's opaque id.
-- ============================================================================

CREATE TABLE IF NOT EXISTS transactions (
    id            TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    status        TEXT NOT NULL DEFAULT 'pending'
                  CHECK(status IN ('pending', 'completed', 'cancelled')),
    total         REAL NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    completed_at  TEXT
);
CREATE INDEX IF NOT EXISTS idx_transactions_user    ON transactions(user_id);
CREATE INDEX IF NOT EXISTS idx_transactions_status  ON transactions(status);
CREATE INDEX IF NOT EXISTS idx_transactions_created ON transactions(created_at);

CREATE TABLE IF NOT EXISTS transaction_items (
    id              TEXT PRIMARY KEY,
    transaction_id  TEXT NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    product_id      TEXT NOT NULL REFERENCES products(id),
    quantity        INTEGER NOT NULL CHECK(quantity >= 1),
    unit_price      REAL NOT NULL CHECK(unit_price >= 0)
);
CREATE INDEX IF NOT EXISTS idx_ti_transaction ON transaction_items(transaction_id);
CREATE INDEX IF NOT EXISTS idx_ti_product     ON transaction_items(product_id);

"#;
