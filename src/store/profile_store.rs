//! The registered-account registry and signed-in profile snapshot.
//!
//! Accounts are plain records in a local blob; "login" is a lookup against
//! them, and passwords are stored and compared in plaintext. The snapshot
//! blob holds the password-free view of whoever signed in last.

use chrono::Utc;
use uuid::Uuid;

use crate::currency;
use crate::domain::merge;
use crate::domain::profile::{Preferences, Profile, ProfileInput, ProfilePatch, RegisteredUser};
use crate::errors::{Result, TrackerError};
use crate::storage::KeyValueBackend;

/// Key the registered-account list is stored under.
pub const REGISTRY_STORAGE_KEY: &str = "expenseTracker_registeredUsers";

/// Key the signed-in profile snapshot is stored under.
pub const SESSION_STORAGE_KEY: &str = "expenseTracker_user";

const DEFAULT_CURRENCY: &str = "INR";

/// Blob-backed store for registered accounts and the signed-in profile.
pub struct ProfileStore {
    backend: Box<dyn KeyValueBackend>,
}

impl ProfileStore {
    pub fn new(backend: Box<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    fn registry(&self) -> Result<Vec<RegisteredUser>> {
        match self.backend.read(REGISTRY_STORAGE_KEY)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(users) => Ok(users),
                Err(err) => {
                    tracing::warn!("discarding corrupt account registry: {err}");
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }

    fn save_registry(&self, users: &[RegisteredUser]) -> Result<()> {
        let json = serde_json::to_string(users)?;
        self.backend.write(REGISTRY_STORAGE_KEY, &json)
    }

    fn persist_session(&self, profile: &Profile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.backend.write(SESSION_STORAGE_KEY, &json)
    }

    /// Registers a new account and signs it in.
    ///
    /// Emails are stored lowercased and must be unique case-insensitively.
    pub fn register(&self, input: ProfileInput) -> Result<Profile> {
        let mut users = self.registry()?;
        let email = input.email.trim().to_lowercase();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            return Err(TrackerError::Validation(
                "An account with this email already exists. Please login instead.".into(),
            ));
        }

        let currency_code = input
            .currency
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let user = RegisteredUser {
            id: Uuid::new_v4(),
            email,
            name: input.name,
            password: input.password,
            profile_picture: None,
            preferences: Preferences::for_currency(&currency_code),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        self.save_registry(&users)?;

        let profile = user.profile();
        self.persist_session(&profile)?;
        tracing::info!(email = %profile.email, "account registered");
        Ok(profile)
    }

    /// Looks up the account for `email` and signs it in.
    ///
    /// A missing currency symbol on an older account is backfilled from its
    /// currency code before the snapshot is persisted.
    pub fn login(&self, email: &str, password: &str) -> Result<Profile> {
        let users = self.registry()?;
        let user = users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .ok_or_else(|| {
                TrackerError::NotFound(
                    "No account found with this email. Please register first.".into(),
                )
            })?;
        if user.password != password {
            return Err(TrackerError::Validation(
                "Invalid password. Please try again.".into(),
            ));
        }

        let mut profile = user.profile();
        if profile.preferences.currency_symbol.is_empty() {
            profile.preferences.currency_symbol =
                currency::symbol_for(&profile.preferences.currency);
        }
        self.persist_session(&profile)?;
        Ok(profile)
    }

    /// The signed-in profile snapshot, if any.
    ///
    /// A corrupt snapshot is discarded rather than surfaced.
    pub fn current(&self) -> Result<Option<Profile>> {
        match self.backend.read(SESSION_STORAGE_KEY)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(profile) => Ok(Some(profile)),
                Err(err) => {
                    tracing::warn!("discarding corrupt profile snapshot: {err}");
                    self.backend.remove(SESSION_STORAGE_KEY)?;
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Merges `patch` over the signed-in snapshot.
    ///
    /// Changes apply to the session snapshot only, not the registry; a
    /// currency change also refreshes the derived symbol.
    pub fn update_current(&self, patch: ProfilePatch) -> Result<Profile> {
        let mut profile = self
            .current()?
            .ok_or_else(|| TrackerError::NotFound("No user is signed in".into()))?;
        merge(&mut profile.name, patch.name);
        merge(&mut profile.profile_picture, patch.profile_picture);
        merge(&mut profile.preferences.theme, patch.theme);
        if let Some(currency_code) = patch.currency {
            profile.preferences.currency_symbol = currency::symbol_for(&currency_code);
            profile.preferences.currency = currency_code;
        }
        self.persist_session(&profile)?;
        Ok(profile)
    }

    /// Signs out by removing the snapshot.
    pub fn logout(&self) -> Result<()> {
        self.backend.remove(SESSION_STORAGE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn store() -> ProfileStore {
        ProfileStore::new(Box::new(MemoryBackend::new()))
    }

    fn input(email: &str) -> ProfileInput {
        ProfileInput {
            name: "Asha".into(),
            email: email.into(),
            password: "hunter2".into(),
            currency: Some("USD".into()),
        }
    }

    #[test]
    fn register_then_login_roundtrips() {
        let store = store();
        let registered = store.register(input("Asha@Example.com")).unwrap();
        assert_eq!(registered.email, "asha@example.com");
        assert_eq!(registered.preferences.currency_symbol, "$");

        let logged_in = store.login("asha@example.com", "hunter2").unwrap();
        assert_eq!(logged_in.id, registered.id);
        assert_eq!(store.current().unwrap().unwrap().id, registered.id);
    }

    #[test]
    fn duplicate_email_is_rejected_case_insensitively() {
        let store = store();
        store.register(input("asha@example.com")).unwrap();
        let err = store
            .register(input("ASHA@example.com"))
            .expect_err("duplicate must fail");
        assert!(
            matches!(err, TrackerError::Validation(ref message) if message.contains("already exists")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn login_distinguishes_unknown_email_from_bad_password() {
        let store = store();
        store.register(input("asha@example.com")).unwrap();

        let missing = store.login("none@example.com", "hunter2").unwrap_err();
        assert!(matches!(missing, TrackerError::NotFound(_)));

        let wrong = store.login("asha@example.com", "nope").unwrap_err();
        assert!(matches!(wrong, TrackerError::Validation(_)));
    }

    #[test]
    fn logout_clears_the_snapshot() {
        let store = store();
        store.register(input("asha@example.com")).unwrap();
        store.logout().unwrap();
        assert!(store.current().unwrap().is_none());
    }

    #[test]
    fn currency_update_refreshes_symbol_in_snapshot_only() {
        let store = store();
        store.register(input("asha@example.com")).unwrap();
        let updated = store
            .update_current(ProfilePatch {
                currency: Some("GBP".into()),
                ..ProfilePatch::default()
            })
            .unwrap();
        assert_eq!(updated.preferences.currency_symbol, "£");

        // The registry still holds the registration-time preference.
        let relogged = store.login("asha@example.com", "hunter2").unwrap();
        assert_eq!(relogged.preferences.currency, "USD");
    }

    #[test]
    fn corrupt_snapshot_is_discarded() {
        let store = store();
        store.register(input("asha@example.com")).unwrap();
        store
            .backend
            .write(SESSION_STORAGE_KEY, "not json at all")
            .unwrap();
        assert!(store.current().unwrap().is_none());
        assert!(store.current().unwrap().is_none());
    }
}
