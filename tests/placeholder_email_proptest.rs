//! Property tests for placeholder-email derivation and field validation.

use nayscake_server::auth::migration::placeholder_email;
use nayscake_server::validation::require_non_empty;
use proptest::prelude::*;

proptest! {
    /// The derived email is deterministic and case-insensitive over the
    /// username, matching the case-insensitive legacy username comparison.
    #[test]
    fn placeholder_email_is_deterministic_and_case_insensitive(
        username in "[A-Za-z][A-Za-z0-9_.-]{0,30}",
    ) {
        let email = placeholder_email(&username);
        prop_assert_eq!(email.clone(), placeholder_email(&username));
        prop_assert_eq!(email.clone(), placeholder_email(&username.to_uppercase()));
        prop_assert!(email.ends_with("@placeholder.local"));
        prop_assert_eq!(
            email.strip_suffix("@placeholder.local").unwrap(),
            username.to_lowercase()
        );
    }

    /// Surrounding whitespace never changes the derived address.
    #[test]
    fn placeholder_email_ignores_surrounding_whitespace(
        username in "[a-z][a-z0-9]{0,20}",
        pad in "[ \t]{0,4}",
    ) {
        let padded = format!("{pad}{username}{pad}");
        prop_assert_eq!(placeholder_email(&padded), placeholder_email(&username));
    }

    /// Whitespace-only values never pass the non-empty check.
    #[test]
    fn whitespace_never_passes_require_non_empty(value in "[ \t\r\n]{0,16}") {
        prop_assert!(require_non_empty("field", &value).is_err());
    }

    /// Values with any non-whitespace character always pass.
    #[test]
    fn non_blank_always_passes_require_non_empty(value in "[ ]{0,3}[a-z]{1,8}[ ]{0,3}") {
        prop_assert!(require_non_empty("field", &value).is_ok());
    }
}
