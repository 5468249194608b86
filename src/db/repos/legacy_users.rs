//! Legacy Store: the previous system's user table plus its password check.
//!
//! Password hashes are PBKDF2-SHA256 PHC strings from the old system. The
//! comparison happens entirely inside this module; hashes are never returned
//! to callers or accepted over the wire.

use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use rand::RngCore;
use rusqlite::{params, Row};

use crate::db::models::{LegacyIdentity, LegacyUser};
use crate::db::DbPool;
use crate::error::AppError;

/// Work factor of the legacy scheme. Fixed by the old system's data.
const LEGACY_PBKDF2_ROUNDS: u32 = 10_000;

fn row_to_legacy_user(row: &Row) -> rusqlite::Result<LegacyUser> {
    Ok(LegacyUser {
        id: row.get("id")?,
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
    })
}

/// Find a legacy user by username (case-insensitive). Returns None once the
/// user has been migrated, since migration deletes the row.
pub fn find_by_username(pool: &DbPool, username: &str) -> Result<Option<LegacyUser>, AppError> {
    let conn = pool.get()?;
    let result = conn.query_row(
        "SELECT id, username, password_hash FROM legacy_users WHERE username = ?1",
        params![username],
        row_to_legacy_user,
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// Check the supplied credentials against the stored legacy hash.
///
/// Returns the identity tuple on a match and None otherwise. A missing user
/// and a wrong password are indistinguishable to the caller; only the DEBUG
/// logs differ, so the API surface cannot be used for username enumeration.
pub fn authenticate(
    pool: &DbPool,
    username: &str,
    password: &str,
) -> Result<Option<LegacyIdentity>, AppError> {
    let user = match find_by_username(pool, username)? {
        Some(u) => u,
        None => {
            tracing::debug!(username = %username, "Legacy authenticate: no such user");
            return Ok(None);
        }
    };

    if !verify_password(password, &user.password_hash) {
        tracing::debug!(username = %username, "Legacy authenticate: password mismatch");
        return Ok(None);
    }

    Ok(Some(LegacyIdentity {
        user_id: user.id,
        username: user.username,
    }))
}

/// Repoint every transaction owned by the legacy id to the new auth provider
/// id. Returns the number of rows updated.
pub fn repoint_foreign_keys(pool: &DbPool, old_id: i64, new_id: &str) -> Result<usize, AppError> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "UPDATE transactions SET user_id = ?1 WHERE user_id = ?2",
        params![new_id, old_id.to_string()],
    )?;
    Ok(rows)
}

/// Delete a legacy user row. Idempotent: deleting an already-deleted row
/// returns false rather than an error.
pub fn delete(pool: &DbPool, legacy_user_id: i64) -> Result<bool, AppError> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM legacy_users WHERE id = ?1",
        params![legacy_user_id],
    )?;
    Ok(rows > 0)
}

/// Insert a legacy row with an already-hashed password. Used when importing
/// the legacy dataset and by test fixtures.
pub fn insert(
    pool: &DbPool,
    id: i64,
    username: &str,
    password_hash: &str,
) -> Result<(), AppError> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO legacy_users (id, username, password_hash) VALUES (?1, ?2, ?3)",
        params![id, username, password_hash],
    )?;
    Ok(())
}

/// Hash a password with the legacy scheme. Only needed when importing or
/// seeding legacy data; the live flow never writes new legacy hashes.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("failed to encode salt: {e}")))?;

    Pbkdf2
        .hash_password_customized(
            password.as_bytes(),
            None,
            None,
            Params {
                rounds: LEGACY_PBKDF2_ROUNDS,
                output_length: 32,
            },
            salt.as_salt(),
        )
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            // A malformed stored hash is a data problem, not a caller problem.
            tracing::warn!("Unparseable legacy password hash: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;

    fn seed(pool: &DbPool, id: i64, username: &str, password: &str) {
        let hash = hash_password(password).unwrap();
        insert(pool, id, username, &hash).unwrap();
    }

    #[test]
    fn test_find_by_username_case_insensitive() {
        let pool = init_test_db().unwrap();
        seed(&pool, 1, "Sari", "cake123");

        assert!(find_by_username(&pool, "sari").unwrap().is_some());
        assert!(find_by_username(&pool, "SARI").unwrap().is_some());
        assert!(find_by_username(&pool, "someone-else").unwrap().is_none());
    }

    #[test]
    fn test_authenticate_match_and_mismatch() {
        let pool = init_test_db().unwrap();
        seed(&pool, 7, "sari", "correct-horse");

        let identity = authenticate(&pool, "sari", "correct-horse").unwrap().unwrap();
        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.username, "sari");

        // Wrong password and unknown user produce the same None
        assert_eq!(authenticate(&pool, "sari", "wrong").unwrap(), None);
        assert_eq!(authenticate(&pool, "nobody", "wrong").unwrap(), None);
    }

    #[test]
    fn test_authenticate_tolerates_malformed_hash() {
        let pool = init_test_db().unwrap();
        insert(&pool, 2, "broken", "not-a-phc-string").unwrap();

        assert_eq!(authenticate(&pool, "broken", "anything").unwrap(), None);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let pool = init_test_db().unwrap();
        seed(&pool, 3, "once", "pw");

        assert!(delete(&pool, 3).unwrap());
        assert!(!delete(&pool, 3).unwrap());
    }

    #[test]
    fn test_repoint_foreign_keys() {
        let pool = init_test_db().unwrap();
        let conn = pool.get().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO transactions (id, user_id, status, total, created_at)
             VALUES ('t1', '7', 'completed', 10.0, ?1),
                    ('t2', '7', 'pending', 0, ?1),
                    ('t3', '8', 'pending', 0, ?1)",
            params![now],
        )
        .unwrap();
        drop(conn);

        let updated = repoint_foreign_keys(&pool, 7, "new-uuid").unwrap();
        assert_eq!(updated, 2);

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM transactions WHERE user_id = 'new-uuid'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);

        // Unrelated owner untouched
        let other: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM transactions WHERE user_id = '8'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(other, 1);
    }
}
