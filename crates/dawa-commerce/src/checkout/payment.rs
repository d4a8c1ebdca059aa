//! Payment method selection.
//!
//! Gateway processing happens server-side: an M-Pesa payment is identified by
//! the phone that receives the STK push and a card payment by a token issued
//! before checkout.

use super::shipping::PHONE_RE;
use super::validation::{FormField, ValidationErrors};
use serde::{Deserialize, Serialize};

/// Payment methods offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "mpesa")]
    Mpesa,
    #[serde(rename = "card")]
    Card,
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Mpesa,
        PaymentMethod::Card,
        PaymentMethod::CashOnDelivery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Card => "card",
            PaymentMethod::CashOnDelivery => "cod",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "M-Pesa",
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
        }
    }

    /// Parse the wire tag. `cash_on_delivery` is accepted for `cod`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "mpesa" | "m-pesa" => Some(PaymentMethod::Mpesa),
            "card" => Some(PaymentMethod::Card),
            "cod" | "cash_on_delivery" => Some(PaymentMethod::CashOnDelivery),
            _ => None,
        }
    }
}

/// Fields of the payment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaymentField {
    Phone,
    CardToken,
}

impl FormField for PaymentField {
    fn as_str(&self) -> &'static str {
        match self {
            PaymentField::Phone => "phone",
            PaymentField::CardToken => "cardToken",
        }
    }
}

/// Raw payment form input. Fields not used by the selected method are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    pub method: PaymentMethod,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub card_token: String,
}

impl PaymentForm {
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Check the fields the selected method needs.
    pub fn validate(&self) -> Result<PaymentInfo, ValidationErrors<PaymentField>> {
        let mut errors = ValidationErrors::new();
        let info = match self.method {
            PaymentMethod::Mpesa => {
                let phone = self.phone.trim();
                if phone.is_empty() {
                    errors.add(PaymentField::Phone, "M-Pesa phone number is required");
                } else if !PHONE_RE.is_match(phone) {
                    errors.add(PaymentField::Phone, "Please enter a valid phone number");
                }
                PaymentInfo::Mpesa {
                    phone: phone.to_string(),
                }
            }
            PaymentMethod::Card => {
                let card_token = self.card_token.trim();
                if card_token.is_empty() {
                    errors.add(PaymentField::CardToken, "Card information is required");
                }
                PaymentInfo::Card {
                    card_token: card_token.to_string(),
                }
            }
            PaymentMethod::CashOnDelivery => PaymentInfo::CashOnDelivery,
        };
        errors.into_result(info)
    }
}

/// Validated payment details; one variant per method carrying only what
/// that method needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method")]
pub enum PaymentInfo {
    #[serde(rename = "mpesa")]
    Mpesa { phone: String },
    #[serde(rename = "card", rename_all = "camelCase")]
    Card { card_token: String },
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentInfo {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentInfo::Mpesa { .. } => PaymentMethod::Mpesa,
            PaymentInfo::Card { .. } => PaymentMethod::Card,
            PaymentInfo::CashOnDelivery => PaymentMethod::CashOnDelivery,
        }
    }

    /// Summary line for the confirmation screen.
    pub fn describe(&self) -> String {
        match self {
            PaymentInfo::Mpesa { phone } => format!("M-Pesa ({phone})"),
            other => other.method().display_name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpesa_requires_phone() {
        let mut form = PaymentForm::new(PaymentMethod::Mpesa);
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get(PaymentField::Phone), Some("M-Pesa phone number is required"));

        form.phone = "0712 345 678".into();
        assert_eq!(
            form.validate().unwrap(),
            PaymentInfo::Mpesa {
                phone: "0712 345 678".into()
            }
        );
    }

    #[test]
    fn test_mpesa_rejects_bad_phone() {
        let form = PaymentForm {
            method: PaymentMethod::Mpesa,
            phone: "call me".into(),
            card_token: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get(PaymentField::Phone), Some("Please enter a valid phone number"));
    }

    #[test]
    fn test_card_requires_token() {
        let errors = PaymentForm::new(PaymentMethod::Card).validate().unwrap_err();
        assert!(errors.contains(PaymentField::CardToken));
    }

    #[test]
    fn test_cod_ignores_stray_fields() {
        let form = PaymentForm {
            method: PaymentMethod::CashOnDelivery,
            phone: "not a phone".into(),
            card_token: "tok_123".into(),
        };
        assert_eq!(form.validate().unwrap(), PaymentInfo::CashOnDelivery);
    }

    #[test]
    fn test_wire_shape() {
        let card = PaymentInfo::Card {
            card_token: "tok_abc".into(),
        };
        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            serde_json::json!({"method": "card", "cardToken": "tok_abc"})
        );
        assert_eq!(
            serde_json::to_value(PaymentInfo::CashOnDelivery).unwrap(),
            serde_json::json!({"method": "cod"})
        );
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(PaymentMethod::from_tag("cash_on_delivery"), Some(PaymentMethod::CashOnDelivery));
        assert_eq!(PaymentMethod::from_tag("MPESA"), Some(PaymentMethod::Mpesa));
        assert_eq!(PaymentMethod::from_tag("paypal"), None);
    }
}
