//! One-time legacy-user migration, run at login time.
//!
//! Moves a user from the legacy table into the auth provider: verify the
//! password against the legacy hash, provision the user with the provider,
//! repoint transaction ownership, delete the legacy row. The row's absence is
//! the sole completion marker, so repeated calls after success are no-ops.

use crate::auth::provider::{AuthProvider, NewUserInput};
use crate::db::repos::legacy_users;
use crate::db::DbPool;
use crate::error::AppError;

/// Outcome of one migration attempt.
///
/// `NotApplicable` covers both "no legacy row" and "credentials didn't
/// match": the two are logged differently but are deliberately a single
/// variant so callers cannot distinguish them (username enumeration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    NotApplicable,
    Migrated { user_id: String },
}

/// Deterministic placeholder email for a legacy user, who had no email in
/// the old system. Satisfies the provider's schema; not routable.
pub fn placeholder_email(username: &str) -> String {
    format!("{}@placeholder.local", username.trim().to_lowercase())
}

/// Run the migration flow for one login attempt.
///
/// Steps are strictly ordered; each depends on the previous result. There
/// are no retries here: if provisioning fails the legacy row is untouched and
/// the user's next login re-enters the flow. A failure after provisioning
/// leaves an orphaned provider user; both ids are logged for reconciliation
/// and the created user is not rolled back.
pub async fn migrate_legacy_user(
    pool: &DbPool,
    provider: &dyn AuthProvider,
    username: &str,
    password: &str,
) -> Result<MigrationOutcome, AppError> {
    // Step 1: lookup. No row is the steady state once everyone is migrated.
    let legacy = match legacy_users::find_by_username(pool, username)? {
        Some(user) => user,
        None => {
            tracing::debug!(username = %username, "No legacy row, nothing to migrate");
            return Ok(MigrationOutcome::NotApplicable);
        }
    };

    // Step 2: verify against the legacy hash, server-side.
    let identity = match legacy_users::authenticate(pool, username, password)? {
        Some(identity) => identity,
        None => {
            // Same outcome as not-found on purpose
            tracing::debug!(username = %username, "Legacy credentials did not match");
            return Ok(MigrationOutcome::NotApplicable);
        }
    };

    // Step 3: provision. Password ownership was just proven, so the
    // placeholder email counts as verified.
    let new_user = provider
        .create_user(NewUserInput {
            username: identity.username.clone(),
            display_username: identity.username.clone(),
            name: identity.username.clone(),
            email: placeholder_email(&identity.username),
            email_verified: true,
            password: password.to_string(),
        })
        .await
        .map_err(|e| AppError::Provisioning(format!("user creation failed: {e}")))?;
    if new_user.id.is_empty() {
        return Err(AppError::Provisioning(
            "auth provider returned no user id".into(),
        ));
    }

    // Step 4: repoint ownership. From here on the provider user exists; a
    // failure is logged with both ids for manual reconciliation.
    let repointed = legacy_users::repoint_foreign_keys(pool, legacy.id, &new_user.id)
        .map_err(|e| {
            tracing::error!(
                legacy_id = legacy.id,
                new_id = %new_user.id,
                "Failed to repoint ownership after provisioning: {}",
                e
            );
            e
        })?;

    // Step 5: cleanup, only after the repoint succeeded. The delete is the
    // completion marker.
    legacy_users::delete(pool, legacy.id).map_err(|e| {
        tracing::error!(
            legacy_id = legacy.id,
            new_id = %new_user.id,
            "Failed to delete legacy row after repoint: {}",
            e
        );
        e
    })?;

    tracing::info!(
        username = %identity.username,
        legacy_id = legacy.id,
        new_id = %new_user.id,
        repointed,
        "Legacy user migrated"
    );

    Ok(MigrationOutcome::Migrated {
        user_id: new_user.id,
    })
}
