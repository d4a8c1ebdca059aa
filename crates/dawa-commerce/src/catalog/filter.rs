//! Product list filtering and sorting.

use super::product::Product;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Price,
    Rating,
    Popular,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Rating => "rating",
            SortField::Popular => "popular",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(SortField::Name),
            "price" => Some(SortField::Price),
            "rating" => Some(SortField::Rating),
            "popular" => Some(SortField::Popular),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filter options of the product list page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Case-insensitive text matched against name, description and category.
    #[serde(default)]
    pub search: String,
    /// Exact category; empty or "All" means every category.
    #[serde(default)]
    pub category: String,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub sort_by: Option<SortField>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl ProductFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn price_range(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = Some(field);
        self.sort_order = order;
        self
    }

    /// Check whether a single product passes the filters.
    pub fn matches(&self, product: &Product) -> bool {
        let term = self.search.trim().to_lowercase();
        if !term.is_empty()
            && !product.name.to_lowercase().contains(&term)
            && !product.description.to_lowercase().contains(&term)
            && !product.category.to_lowercase().contains(&term)
        {
            return false;
        }

        if !self.category.is_empty()
            && self.category != ALL_CATEGORIES
            && product.category != self.category
        {
            return false;
        }

        if let Some(min) = self.min_price {
            if product.price.amount_cents < min.amount_cents {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price.amount_cents > max.amount_cents {
                return false;
            }
        }
        true
    }

    /// Filter then sort. Ties keep their input order.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut filtered: Vec<Product> = products.iter().filter(|p| self.matches(p)).cloned().collect();

        if let Some(field) = self.sort_by {
            filtered.sort_by(|a, b| {
                let ordering = compare(field, a, b);
                match self.sort_order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }
        filtered
    }
}

fn compare(field: SortField, a: &Product, b: &Product) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Price => a.price.amount_cents.cmp(&b.price.amount_cents),
        SortField::Rating => a.rating.unwrap_or(0.0).total_cmp(&b.rating.unwrap_or(0.0)),
        SortField::Popular => a
            .is_popular
            .cmp(&b.is_popular)
            .then(a.review_count.cmp(&b.review_count)),
    }
}

/// Product count per category, plus a "Total" entry.
pub fn category_counts(products: &[Product]) -> BTreeMap<String, usize> {
    let mut stats = BTreeMap::new();
    for product in products {
        *stats.entry(product.category.clone()).or_insert(0) += 1;
    }
    stats.insert("Total".to_string(), products.len());
    stats
}

/// Distinct categories, sorted.
pub fn available_categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Cheapest and dearest price, or `None` for an empty list.
pub fn price_range(products: &[Product]) -> Option<(Money, Money)> {
    let min = products.iter().map(|p| p.price).min_by_key(|m| m.amount_cents)?;
    let max = products.iter().map(|p| p.price).max_by_key(|m| m.amount_cents)?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        let mut panadol = Product::new("p1", "Panadol Extra", Money::kes(450))
            .with_category("Pain Relief")
            .with_description("Fast headache relief");
        panadol.rating = Some(4.5);
        panadol.is_popular = true;

        let mut vitamin = Product::new("p2", "Vitamin C 1000mg", Money::kes(1200))
            .with_category("Supplements");
        vitamin.rating = Some(4.8);

        let mut brufen = Product::new("p3", "brufen 400", Money::kes(300))
            .with_category("Pain Relief");
        brufen.is_popular = true;
        brufen.review_count = 40;

        vec![panadol, vitamin, brufen]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_over_fields() {
        let products = catalog();
        assert_eq!(ids(&ProductFilter::new().search("HEADACHE").apply(&products)), vec!["p1"]);
        assert_eq!(ids(&ProductFilter::new().search("pain").apply(&products)), vec!["p1", "p3"]);
    }

    #[test]
    fn test_all_category_disables_filter() {
        let products = catalog();
        assert_eq!(ProductFilter::new().category(ALL_CATEGORIES).apply(&products).len(), 3);
        assert_eq!(ids(&ProductFilter::new().category("Supplements").apply(&products)), vec!["p2"]);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let products = catalog();
        let filter = ProductFilter::new().price_range(Some(Money::kes(300)), Some(Money::kes(450)));
        assert_eq!(ids(&filter.apply(&products)), vec!["p1", "p3"]);
    }

    #[test]
    fn test_sorting() {
        let products = catalog();
        let by_price = ProductFilter::new().sort(SortField::Price, SortOrder::Asc);
        assert_eq!(ids(&by_price.apply(&products)), vec!["p3", "p1", "p2"]);

        let by_name_desc = ProductFilter::new().sort(SortField::Name, SortOrder::Desc);
        assert_eq!(ids(&by_name_desc.apply(&products)), vec!["p2", "p1", "p3"]);

        let by_rating = ProductFilter::new().sort(SortField::Rating, SortOrder::Desc);
        assert_eq!(ids(&by_rating.apply(&products)), vec!["p2", "p1", "p3"]);

        let popular = ProductFilter::new().sort(SortField::Popular, SortOrder::Desc);
        assert_eq!(ids(&popular.apply(&products)), vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn test_stats() {
        let products = catalog();
        let counts = category_counts(&products);
        assert_eq!(counts["Pain Relief"], 2);
        assert_eq!(counts["Total"], 3);
        assert_eq!(available_categories(&products), vec!["Pain Relief", "Supplements"]);
        assert_eq!(price_range(&products), Some((Money::kes(300), Money::kes(1200))));
        assert_eq!(price_range(&[]), None);
    }
}
