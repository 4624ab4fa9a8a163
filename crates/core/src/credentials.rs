//! Built-in demo accounts and helpers for synthesizing session profiles.
//!
//! The two demo pairs below grant an admin session without touching any
//! user store. They exist so the builder can be demonstrated with no
//! backend at all. Deployments must disable them (`DEMO_ACCOUNTS_ENABLED=false`).

use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

/// A hardcoded username/password pair that maps to an admin identity.
#[derive(Debug)]
pub struct DemoAccount {
    /// Reserved negative id, never issued by any store.
    pub id: DbId,
    pub username: &'static str,
    password: &'static str,
    pub email: &'static str,
}

impl DemoAccount {
    pub fn role(&self) -> &'static str {
        ROLE_ADMIN
    }
}

pub const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        id: -1,
        username: "admin",
        password: "1234567",
        email: "admin@demo.local",
    },
    DemoAccount {
        id: -2,
        username: "superadmin",
        password: "admin123",
        email: "superadmin@demo.local",
    },
];

/// Exact, case-sensitive match against the demo pairs.
pub fn match_demo_account(username: &str, password: &str) -> Option<&'static DemoAccount> {
    DEMO_ACCOUNTS
        .iter()
        .find(|a| a.username == username && a.password == password)
}

/// Whether `id` belongs to a demo identity rather than a stored user.
pub fn is_demo_user_id(id: DbId) -> bool {
    DEMO_ACCOUNTS.iter().any(|a| a.id == id)
}

/// Username derived from the local part of an email address, used when a
/// profile cannot be fetched after authentication.
///
/// ```
/// use tablebuilder_core::credentials::username_from_email;
///
/// assert_eq!(username_from_email("maria.rossi@osteria.example"), "maria.rossi");
/// assert_eq!(username_from_email("no-at-sign"), "no-at-sign");
/// ```
pub fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_pairs_match_exactly() {
        let account = match_demo_account("admin", "1234567").expect("demo admin");
        assert_eq!(account.id, -1);
        assert_eq!(account.role(), ROLE_ADMIN);

        assert!(match_demo_account("superadmin", "admin123").is_some());
        assert!(match_demo_account("Admin", "1234567").is_none());
        assert!(match_demo_account("admin", "1234567 ").is_none());
        assert!(match_demo_account("admin", "admin123").is_none());
    }

    #[test]
    fn demo_ids_are_reserved() {
        assert!(is_demo_user_id(-1));
        assert!(is_demo_user_id(-2));
        assert!(!is_demo_user_id(1));
    }
}
