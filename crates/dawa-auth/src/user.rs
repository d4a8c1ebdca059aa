//! Signed-in shopper.

use dawa_commerce::UserId;
use serde::{Deserialize, Serialize};

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Regular customer.
    #[default]
    Customer,
    /// Pharmacy staff with access to the admin area.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

/// The account behind a session, as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            is_admin: false,
        }
    }

    pub fn role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else {
            Role::Customer
        }
    }

    /// Identifier attached to orders placed by this user.
    pub fn user_id(&self) -> UserId {
        UserId::new(self.id.to_string())
    }

    /// First word of the name, for greetings.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_api_json() {
        let user: User =
            serde_json::from_str(r#"{"id": 7, "name": "Amina Hassan", "email": "amina@example.co.ke"}"#)
                .unwrap();
        assert_eq!(user.role(), Role::Customer);
        assert_eq!(user.user_id().as_str(), "7");
        assert_eq!(user.first_name(), "Amina");
    }

    #[test]
    fn test_admin_role() {
        let mut user = User::new(1, "Admin", "admin@example.co.ke");
        user.is_admin = true;
        assert_eq!(user.role(), Role::Admin);
        assert_eq!(user.role().as_str(), "admin");
    }
}
