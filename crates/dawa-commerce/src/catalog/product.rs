//! Product types.

use crate::ids::ProductId;
use crate::money::{major_units, Money};
use serde::{Deserialize, Serialize};

/// A product as listed by the storefront API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Current selling price.
    #[serde(with = "major_units")]
    pub price: Money,
    /// Price before discount, when on offer.
    #[serde(default, with = "optional_major_units", skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            original_price: None,
            category: String::new(),
            image_url: None,
            is_popular: false,
            stock_count: None,
            rating: None,
            review_count: 0,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check if product is on sale.
    pub fn is_on_sale(&self) -> bool {
        self.original_price
            .map(|orig| orig.amount_cents > self.price.amount_cents)
            .unwrap_or(false)
    }

    /// Amount saved against the original price, if on sale.
    pub fn savings(&self) -> Option<Money> {
        let original = self.original_price?;
        original
            .try_subtract(&self.price)
            .filter(|saved| saved.is_positive())
    }

    /// Whole-percent discount, if on sale.
    pub fn discount_percent(&self) -> Option<u8> {
        let original = self.original_price?;
        let saved = self.savings()?;
        if original.amount_cents <= 0 {
            return None;
        }
        Some(((saved.amount_cents * 100) / original.amount_cents).clamp(0, 100) as u8)
    }

    /// False only when the API reports zero stock.
    pub fn in_stock(&self) -> bool {
        self.stock_count.map(|n| n > 0).unwrap_or(true)
    }
}

mod optional_major_units {
    use super::major_units;
    use crate::money::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Money>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(money) => major_units::serialize(money, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Money>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "major_units")] Money);

        let value: Option<Wrapper> = Option::deserialize(deserializer)?;
        Ok(value.map(|Wrapper(money)| money))
    }
}
