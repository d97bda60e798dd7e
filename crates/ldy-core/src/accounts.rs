use chrono::Utc;
use ldy_schemas::{Notification, User, UserRole};
use tracing::info;
use uuid::Uuid;

use crate::desk::LaundryDesk;
use crate::error::{LaundryError, LaundryResult};

const MIN_PHONE_DIGITS: usize = 10;

fn check_phone(phone: &str) -> LaundryResult<()> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < MIN_PHONE_DIGITS {
        return Err(LaundryError::Validation(format!(
            "phone number needs at least {MIN_PHONE_DIGITS} digits"
        )));
    }
    Ok(())
}

impl LaundryDesk {
    /// Find the user for `phone_number`, creating it on first sign-in.
    /// An existing user keeps its role whatever `role` says.
    pub async fn sign_in(&self, phone_number: &str, role: UserRole) -> LaundryResult<User> {
        let phone_number = phone_number.trim();
        check_phone(phone_number)?;

        if let Some(user) = self
            .store
            .find_user_by_phone(phone_number)
            .await
            .map_err(LaundryError::store)?
        {
            return Ok(user);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            phone_number: phone_number.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert_user(&user)
            .await
            .map_err(LaundryError::store)?;

        info!(user_id = %user.id, role = user.role.as_str(), "user registered");
        Ok(user)
    }

    pub async fn notifications_for(&self, user_id: Uuid) -> LaundryResult<Vec<Notification>> {
        self.store
            .list_notifications(user_id)
            .await
            .map_err(LaundryError::store)
    }

    pub async fn mark_notification_read(&self, notification_id: Uuid) -> LaundryResult<()> {
        let found = self
            .store
            .mark_notification_read(notification_id)
            .await
            .map_err(LaundryError::store)?;
        if !found {
            return Err(LaundryError::not_found("notification", notification_id));
        }
        Ok(())
    }
}
