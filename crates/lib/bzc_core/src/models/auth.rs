//! Account wire models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user profile.
///
/// The login response serializes the user with Go's bare field names
/// (`ID`, `FullName`, ...) while `/api/account` uses snake_case with
/// `user_id`; the aliases accept both shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "ID", alias = "user_id")]
    pub id: Uuid,
    #[serde(alias = "FullName")]
    pub full_name: String,
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(alias = "IsAdmin")]
    pub is_admin: bool,
    #[serde(default, alias = "CreatedAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "UpdatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_login_shape() {
        let json = r#"{
            "ID": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "FullName": "Ada Shopper",
            "Email": "ada@example.com",
            "IsAdmin": true,
            "CreatedAt": "2025-01-01T00:00:00Z",
            "UpdatedAt": "2025-01-02T00:00:00Z"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.full_name, "Ada Shopper");
        assert!(user.is_admin);
    }

    #[test]
    fn decodes_account_shape() {
        let json = r#"{
            "user_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "email": "ada@example.com",
            "full_name": "Ada Shopper",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z",
            "is_admin": false
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(!user.is_admin);
    }
}
