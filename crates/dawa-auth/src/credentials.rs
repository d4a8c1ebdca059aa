//! Login and sign-up forms.

use dawa_commerce::checkout::{is_valid_email, FormField, ValidationErrors};
use serde::Serialize;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Fields of the login and sign-up forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CredentialField {
    Name,
    Email,
    Password,
}

impl FormField for CredentialField {
    fn as_str(&self) -> &'static str {
        match self {
            CredentialField::Name => "name",
            CredentialField::Email => "email",
            CredentialField::Password => "password",
        }
    }
}

fn check_email(email: &str, errors: &mut ValidationErrors<CredentialField>) {
    if email.is_empty() {
        errors.add(CredentialField::Email, "Email is required");
    } else if !is_valid_email(email) {
        errors.add(CredentialField::Email, "Please enter a valid email");
    }
}

/// `POST /api/auth/login` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

impl LoginRequest {
    /// Validate raw input. The email is trimmed, the password is sent as typed.
    pub fn new(email: &str, password: &str) -> Result<Self, ValidationErrors<CredentialField>> {
        let mut errors = ValidationErrors::new();
        let email = email.trim();
        check_email(email, &mut errors);
        if password.is_empty() {
            errors.add(CredentialField::Password, "Password is required");
        }
        errors.into_result(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// `POST /api/auth/signup` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

impl SignupRequest {
    pub fn new(
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, ValidationErrors<CredentialField>> {
        let mut errors = ValidationErrors::new();
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            errors.add(CredentialField::Name, "Name is required");
        }
        check_email(email, &mut errors);
        if password.is_empty() {
            errors.add(CredentialField::Password, "Password is required");
        } else if password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                CredentialField::Password,
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        errors.into_result(Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        let errors = LoginRequest::new("  ", "").unwrap_err();
        assert_eq!(errors.get(CredentialField::Email), Some("Email is required"));
        assert_eq!(errors.get(CredentialField::Password), Some("Password is required"));
    }

    #[test]
    fn test_login_trims_email_only() {
        let req = LoginRequest::new(" amina@example.co.ke ", " secret ").unwrap();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"email": "amina@example.co.ke", "password": " secret "})
        );
    }

    #[test]
    fn test_signup_password_length() {
        let errors = SignupRequest::new("Amina", "amina@example.co.ke", "short").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(CredentialField::Password),
            Some("Password must be at least 8 characters")
        );
        assert!(SignupRequest::new("Amina", "amina@example.co.ke", "long enough").is_ok());
    }

    #[test]
    fn test_signup_rejects_bad_email() {
        let errors = SignupRequest::new("Amina", "amina.example", "long enough").unwrap_err();
        assert_eq!(errors.get(CredentialField::Email), Some("Please enter a valid email"));
    }
}
