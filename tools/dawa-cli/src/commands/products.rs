//! Browse a product list with the storefront's filters.

use std::path::Path;

use anyhow::{Context as _, Result};
use dawa_commerce::catalog::{
    available_categories, category_counts, price_range, Product, ProductFilter, SortField, SortOrder,
};
use serde::Deserialize;

use super::cart::parse_price;
use super::ProductsArgs;
use crate::context::Context;

#[derive(Deserialize)]
#[serde(untagged)]
enum Catalog {
    Bare(Vec<Product>),
    Wrapped { products: Vec<Product> },
}

fn load_catalog(path: &Path) -> Result<Vec<Product>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read product list: {}", path.display()))?;
    let catalog: Catalog = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse product list: {}", path.display()))?;
    Ok(match catalog {
        Catalog::Bare(products) | Catalog::Wrapped { products } => products,
    })
}

/// Build the filter from command-line flags.
pub fn build_filter(args: &ProductsArgs) -> Result<ProductFilter> {
    let sort_field = SortField::from_str(&args.sort)
        .with_context(|| format!("Unknown sort field '{}'; use name, price, rating or popular", args.sort))?;
    let order = if args.desc { SortOrder::Desc } else { SortOrder::Asc };
    let min = args.min_price.as_deref().map(parse_price).transpose()?;
    let max = args.max_price.as_deref().map(parse_price).transpose()?;

    let mut filter = ProductFilter::new().sort(sort_field, order).price_range(min, max);
    if let Some(search) = &args.search {
        filter = filter.search(search.as_str());
    }
    if let Some(category) = &args.category {
        filter = filter.category(category.as_str());
    }
    Ok(filter)
}

/// Run the products command.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let products = load_catalog(&ctx.resolve_path(&args.file))?;

    if args.categories {
        let counts = category_counts(&products);
        if ctx.output.is_json() {
            ctx.output.json(&counts);
        } else {
            ctx.output.header("Categories");
            for category in available_categories(&products) {
                let count = counts.get(&category).copied().unwrap_or(0);
                ctx.output.list_item(&format!("{} ({})", category, count));
            }
            if let Some((min, max)) = price_range(&products) {
                ctx.output.kv("Prices", &format!("{} – {}", min.display(), max.display()));
            }
        }
        return Ok(());
    }

    let shown = build_filter(&args)?.apply(&products);
    if ctx.output.is_json() {
        ctx.output.json(&shown);
        return Ok(());
    }

    ctx.output.header(&format!("Products ({} of {})", shown.len(), products.len()));
    let widths = [10, 32, 16, 14, 8];
    ctx.output.table_row(&["ID", "Name", "Category", "Price", "Stock"], &widths);
    for product in &shown {
        let price = match product.discount_percent() {
            Some(pct) => format!("{} -{}%", product.price.display(), pct),
            None => product.price.display(),
        };
        let stock = if product.in_stock() { "yes" } else { "no" };
        ctx.output.table_row(
            &[
                product.id.as_str(),
                product.name.as_str(),
                product.category.as_str(),
                price.as_str(),
                stock,
            ],
            &widths,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> ProductsArgs {
        ProductsArgs {
            file: PathBuf::from("catalog.json"),
            search: Some("amox".into()),
            category: Some("Antibiotics".into()),
            min_price: Some("100".into()),
            max_price: None,
            sort: "price".into(),
            desc: true,
            categories: false,
        }
    }

    #[test]
    fn test_build_filter_from_flags() {
        let filter = build_filter(&args()).unwrap();
        assert_eq!(filter.search, "amox");
        assert_eq!(filter.category, "Antibiotics");
        assert_eq!(filter.min_price, Some(dawa_commerce::Money::kes(100)));
        assert_eq!(filter.sort_by, Some(SortField::Price));
        assert_eq!(filter.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_unknown_sort_field() {
        let mut args = args();
        args.sort = "colour".into();
        assert!(build_filter(&args).is_err());
    }

    #[test]
    fn test_load_wrapped_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"products": [{"id": "p1", "name": "Amoxicillin 250mg", "price": 850, "category": "Antibiotics"}]}"#,
        )
        .unwrap();
        let products = load_catalog(&path).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, dawa_commerce::Money::kes(850));
    }
}
