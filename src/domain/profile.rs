use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency;

/// Display preferences attached to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub currency: String,
    #[serde(default)]
    pub currency_symbol: String,
    #[serde(default = "Preferences::default_theme")]
    pub theme: String,
}

impl Preferences {
    /// Preferences for a currency code, with the symbol derived from it.
    pub fn for_currency(code: &str) -> Self {
        Self {
            currency: code.to_string(),
            currency_symbol: currency::symbol_for(code),
            theme: Self::default_theme(),
        }
    }

    fn default_theme() -> String {
        "light".into()
    }
}

/// A registered account as stored in the registry blob.
///
/// Carries the plaintext password; only [`RegisteredUser::profile`] views are
/// handed to consumers or persisted as the session snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
}

impl RegisteredUser {
    /// The password-free view of this account.
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            profile_picture: self.profile_picture.clone(),
            preferences: self.preferences.clone(),
            created_at: self.created_at,
        }
    }
}

/// The signed-in user snapshot. Never carries the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for registering an account.
#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `INR` when absent.
    pub currency: Option<String>,
}

/// Partial update applied to the signed-in snapshot.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    /// `Some(None)` clears the picture; `None` keeps it.
    pub profile_picture: Option<Option<String>>,
    pub currency: Option<String>,
    pub theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_derive_symbol_from_code() {
        let prefs = Preferences::for_currency("USD");
        assert_eq!(prefs.currency_symbol, "$");
        assert_eq!(prefs.theme, "light");
    }

    #[test]
    fn profile_view_drops_password() {
        let user = RegisteredUser {
            id: Uuid::new_v4(),
            email: "a@b.c".into(),
            name: "A".into(),
            password: "secret".into(),
            profile_picture: None,
            preferences: Preferences::for_currency("INR"),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"currencySymbol\""));
    }
}
