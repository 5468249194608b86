use rusqlite::{params, Row, TransactionBehavior};

use crate::db::models::{
    CreateTransactionInput, Transaction, TransactionDetail, TransactionItem,
};
use crate::db::DbPool;
use crate::error::AppError;
use crate::validation::{require_non_empty, require_positive};

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        status: row.get("status")?,
        total: row.get("total")?,
        created_at: row.get("created_at")?,
        completed_at: row.get("completed_at")?,
    })
}

fn row_to_item(row: &Row) -> rusqlite::Result<TransactionItem> {
    Ok(TransactionItem {
        id: row.get("id")?,
        transaction_id: row.get("transaction_id")?,
        product_id: row.get("product_id")?,
        quantity: row.get("quantity")?,
        unit_price: row.get("unit_price")?,
    })
}

pub fn get_by_id(pool: &DbPool, id: &str) -> Result<TransactionDetail, AppError> {
    let conn = pool.get()?;
    let transaction = conn
        .query_row(
            "SELECT * FROM transactions WHERE id = ?1",
            params![id],
            row_to_transaction,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Transaction {id}")),
            other => AppError::Database(other),
        })?;

    let mut stmt =
        conn.prepare("SELECT * FROM transaction_items WHERE transaction_id = ?1")?;
    let items = stmt
        .query_map(params![id], row_to_item)?
        .filter_map(|r| r.ok())
        .collect();

    Ok(TransactionDetail { transaction, items })
}

/// List transactions newest-first, optionally filtered by owner.
pub fn list(pool: &DbPool, user_id: Option<&str>) -> Result<Vec<Transaction>, AppError> {
    let conn = pool.get()?;
    match user_id {
        Some(uid) => {
            let mut stmt = conn.prepare(
                "SELECT * FROM transactions WHERE user_id = ?1 ORDER BY created_at DESC",
            )?;
            let rows = stmt.query_map(params![uid], row_to_transaction)?;
            Ok(rows.filter_map(|r| r.ok()).collect())
        }
        None => {
            let mut stmt =
                conn.prepare("SELECT * FROM transactions ORDER BY created_at DESC")?;
            let rows = stmt.query_map([], row_to_transaction)?;
            Ok(rows.filter_map(|r| r.ok()).collect())
        }
    }
}

/// Capture a new pending order with its line items. Unit prices are snapshot
/// from the catalog at creation time so later price edits don't rewrite
/// history. All rows land in one SQL transaction.
pub fn create(pool: &DbPool, input: CreateTransactionInput) -> Result<TransactionDetail, AppError> {
    require_non_empty("user_id", &input.user_id)?;
    if input.items.is_empty() {
        return Err(AppError::Validation("a transaction needs at least one item".into()));
    }
    for item in &input.items {
        require_non_empty("product_id", &item.product_id)?;
        require_positive("quantity", item.quantity)?;
    }

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO transactions (id, user_id, status, total, created_at)
         VALUES (?1, ?2, 'pending', 0, ?3)",
        params![id, input.user_id, now],
    )?;

    for item in &input.items {
        let unit_price: f64 = tx
            .query_row(
                "SELECT price FROM products WHERE id = ?1",
                params![item.product_id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    AppError::NotFound(format!("Product {}", item.product_id))
                }
                other => AppError::Database(other),
            })?;

        tx.execute(
            "INSERT INTO transaction_items (id, transaction_id, product_id, quantity, unit_price)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                uuid::Uuid::new_v4().to_string(),
                id,
                item.product_id,
                item.quantity,
                unit_price,
            ],
        )?;
    }

    tx.commit()?;
    drop(conn);

    get_by_id(pool, &id)
}

/// Complete a pending transaction: decrement stock for every line item and
/// finalize the total, atomically. If any product lacks stock the whole
/// completion rolls back and nothing changes.
pub fn complete(pool: &DbPool, id: &str) -> Result<TransactionDetail, AppError> {
    let now = chrono::Utc::now().to_rfc3339();

    let mut conn = pool.get()?;
    // Immediate write lock so two completions of the same order serialize
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let status: String = tx
        .query_row(
            "SELECT status FROM transactions WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Transaction {id}")),
            other => AppError::Database(other),
        })?;
    if status != "pending" {
        return Err(AppError::Validation(format!(
            "transaction {id} is {status}, only pending transactions can be completed"
        )));
    }

    let items: Vec<(String, i64)> = {
        let mut stmt = tx.prepare(
            "SELECT product_id, quantity FROM transaction_items WHERE transaction_id = ?1",
        )?;
        let rows = stmt.query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.filter_map(|r| r.ok()).collect()
    };

    for (product_id, quantity) in &items {
        let updated = tx.execute(
            "UPDATE products SET stock = stock - ?1, updated_at = ?2
             WHERE id = ?3 AND stock >= ?1",
            params![quantity, now, product_id],
        )?;
        if updated == 0 {
            // Dropping tx rolls back every decrement made so far
            return Err(AppError::Validation(format!(
                "insufficient stock for product {product_id}"
            )));
        }
    }

    tx.execute(
        "UPDATE transactions
         SET status = 'completed',
             completed_at = ?1,
             total = (SELECT COALESCE(SUM(quantity * unit_price), 0)
                      FROM transaction_items WHERE transaction_id = ?2)
         WHERE id = ?2",
        params![now, id],
    )?;

    tx.commit()?;
    drop(conn);

    get_by_id(pool, id)
}

/// Cancel a pending transaction. Stock is untouched since nothing was
/// decremented yet. The UPDATE is self-guarding so a completion that commits
/// concurrently cannot be overwritten: only a still-pending row transitions.
pub fn cancel(pool: &DbPool, id: &str) -> Result<TransactionDetail, AppError> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "UPDATE transactions SET status = 'cancelled' WHERE id = ?1 AND status = 'pending'",
        params![id],
    )?;
    drop(conn);

    if rows == 0 {
        // Either the row is gone (404) or it already left pending
        let detail = get_by_id(pool, id)?;
        return Err(AppError::Validation(format!(
            "transaction {id} is {}, only pending transactions can be cancelled",
            detail.transaction.status
        )));
    }

    get_by_id(pool, id)
}
