//! Shipping details.

use super::validation::{FormField, ValidationErrors};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email pattern"));
pub(crate) static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-\s()]+$").expect("valid phone pattern"));

/// Loose `something@host.tld` check used by every storefront form.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Fields of the shipping form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShippingField {
    FullName,
    Email,
    Phone,
    Address,
    City,
    PostalCode,
}

impl FormField for ShippingField {
    fn as_str(&self) -> &'static str {
        match self {
            ShippingField::FullName => "fullName",
            ShippingField::Email => "email",
            ShippingField::Phone => "phone",
            ShippingField::Address => "address",
            ShippingField::City => "city",
            ShippingField::PostalCode => "postalCode",
        }
    }
}

/// Raw shipping form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ShippingForm {
    /// Check every field and build [`ShippingInfo`] from the trimmed values.
    pub fn validate(&self) -> Result<ShippingInfo, ValidationErrors<ShippingField>> {
        let mut errors = ValidationErrors::new();

        let full_name = self.full_name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        let address = self.address.trim();
        let city = self.city.trim();
        let postal_code = self.postal_code.trim();

        if full_name.is_empty() {
            errors.add(ShippingField::FullName, "Full name is required");
        }
        if email.is_empty() {
            errors.add(ShippingField::Email, "Email is required");
        } else if !EMAIL_RE.is_match(email) {
            errors.add(ShippingField::Email, "Please enter a valid email");
        }
        if phone.is_empty() {
            errors.add(ShippingField::Phone, "Phone number is required");
        } else if !PHONE_RE.is_match(phone) {
            errors.add(ShippingField::Phone, "Please enter a valid phone number");
        }
        if address.is_empty() {
            errors.add(ShippingField::Address, "Address is required");
        }
        if city.is_empty() {
            errors.add(ShippingField::City, "City is required");
        }
        if postal_code.is_empty() {
            errors.add(ShippingField::PostalCode, "Postal code is required");
        }

        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        errors.into_result(ShippingInfo {
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            postal_code: postal_code.to_string(),
            notes,
        })
    }
}

/// Validated shipping details.
///
/// Only obtainable through [`ShippingForm::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    full_name: String,
    email: String,
    phone: String,
    address: String,
    city: String,
    postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl ShippingInfo {
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        format!("{}, {} {}", self.address, self.city, self.postal_code)
    }
}
