//! Customer and staff account management.

use quickpick_core::{Gender, User, UserId};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::client::{AdminClient, resource_path};
use crate::error::AdminError;

/// Editable account fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Serialize)]
struct AdminFlagBody {
    is_admin: bool,
}

impl AdminClient {
    /// List all accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_users(&self) -> Result<Vec<User>, AdminError> {
        Ok(self.session().get("users").await?)
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &UserId) -> Result<User, AdminError> {
        Ok(self
            .session()
            .get(&resource_path("users", id.as_str()))
            .await?)
    }

    /// Update an account's profile fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or the API error.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_user(&self, id: &UserId, update: &UserUpdate) -> Result<User, AdminError> {
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AdminError::validation("Name cannot be empty"));
        }
        Ok(self
            .session()
            .put(&resource_path("users", id.as_str()), update)
            .await?)
    }

    /// Delete an account. Admins cannot delete themselves.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the signed-in admin's own account, or
    /// the API error.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), AdminError> {
        self.ensure_not_self(id, "delete").await?;
        self.session()
            .delete(&resource_path("users", id.as_str()))
            .await?;
        warn!("User deleted");
        Ok(())
    }

    /// Grant or revoke admin access, flipping the user's current flag.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the signed-in admin's own account, or
    /// the API error.
    #[instrument(skip(self, user), fields(user_id = %user.id, was_admin = user.is_admin))]
    pub async fn toggle_admin(&self, user: &User) -> Result<User, AdminError> {
        self.ensure_not_self(&user.id, "change the admin rights of").await?;
        let path = format!("{}/admin", resource_path("users", user.id.as_str()));
        let updated: User = self
            .session()
            .put(
                &path,
                &AdminFlagBody {
                    is_admin: !user.is_admin,
                },
            )
            .await?;
        info!(is_admin = updated.is_admin, "Admin flag changed");
        Ok(updated)
    }

    async fn ensure_not_self(&self, id: &UserId, action: &str) -> Result<(), AdminError> {
        if self.current_user().await.is_some_and(|me| &me.id == id) {
            return Err(AdminError::validation(format!(
                "You cannot {action} your own account"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_update_body() {
        let update = UserUpdate {
            name: Some("Sara".to_owned()),
            gender: Some(Gender::Female),
            ..UserUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"name": "Sara", "gender": "female"})
        );
    }
}
