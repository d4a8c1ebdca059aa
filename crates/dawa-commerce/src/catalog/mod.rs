//! Catalog module.
//!
//! Product listings and the filters of the product list page.

mod filter;
mod product;

pub use filter::{
    available_categories, category_counts, price_range, ProductFilter, SortField, SortOrder,
    ALL_CATEGORIES,
};
pub use product::Product;
