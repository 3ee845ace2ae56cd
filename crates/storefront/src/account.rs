//! Profile and password management.

use quickpick_api::session::MIN_PASSWORD_LENGTH;
use quickpick_api::{ApiError, Session};
use quickpick_core::{Gender, User};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{info, instrument};

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ApiError::Validation("Name cannot be empty".to_owned()));
        }
        Ok(())
    }
}

/// Password change form.
pub struct PasswordChange {
    pub current: SecretString,
    pub new: SecretString,
}

impl PasswordChange {
    fn validate(&self) -> Result<(), ApiError> {
        if self.current.expose_secret().is_empty() {
            return Err(ApiError::Validation(
                "Current password is required".to_owned(),
            ));
        }
        if self.new.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(())
    }

    fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "current_password": self.current.expose_secret(),
            "new_password": self.new.expose_secret(),
        })
    }
}

/// The signed-in customer's own account.
#[derive(Debug, Clone)]
pub struct Account {
    session: Session,
}

impl Account {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Fetch the profile from `GET /auth/me` and refresh the cached user.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ApiError> {
        let user: User = self.session.get("auth/me").await?;
        self.session.set_user(user.clone()).await?;
        Ok(user)
    }

    /// `PUT /user/profile`; the returned user replaces the cached one.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` before any request, or the API error.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        update.validate()?;
        let user: User = self.session.put("user/profile", update).await?;
        self.session.set_user(user.clone()).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// `PUT /user/password`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` before any request, or the API error.
    #[instrument(skip(self, change))]
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        change.validate()?;
        self.session
            .put::<_, serde_json::Value>("user/password", &change.body())
            .await?;
        info!("Password changed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            phone: Some("0100".to_owned()),
            ..ProfileUpdate::default()
        };
        assert!(update.validate().is_ok());
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, serde_json::json!({"phone": "0100"}));

        let blank = ProfileUpdate {
            name: Some(" ".to_owned()),
            ..ProfileUpdate::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_password_change_validation() {
        let change = PasswordChange {
            current: SecretString::from("old-pass".to_owned()),
            new: SecretString::from("short".to_owned()),
        };
        assert_eq!(
            change.validate().unwrap_err().to_string(),
            "Password must be at least 6 characters"
        );

        let change = PasswordChange {
            current: SecretString::from(String::new()),
            new: SecretString::from("long-enough".to_owned()),
        };
        assert!(change.validate().is_err());
    }
}
