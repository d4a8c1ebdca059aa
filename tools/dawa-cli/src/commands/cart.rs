//! Cart commands.

use std::str::FromStr;

use anyhow::{bail, Context as _, Result};
use dawa_commerce::{Currency, Money, ProductId};
use dialoguer::Confirm;
use rust_decimal::Decimal;

use super::{CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.cart_store()?;

    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => {}
        CartCommand::Add {
            id,
            name,
            price,
            quantity,
            image,
        } => {
            let price = parse_price(&price)?;
            cart.add_item(ProductId::new(id.as_str()), name.as_str(), price, quantity, image)
                .with_context(|| format!("Could not add {}", name))?;
            ctx.output.success(&format!("Added {} × {}", quantity, name));
        }
        CartCommand::Update { id, quantity } => {
            let id = ProductId::new(id);
            let changed = cart.update_quantity(&id, quantity)?;
            if !changed {
                ctx.output.warn(&format!("Nothing to update for {}", id));
            } else if quantity <= 0 {
                ctx.output.success(&format!("Removed {}", id));
            } else {
                ctx.output.success(&format!("Quantity of {} set to {}", id, quantity));
            }
        }
        CartCommand::Remove { id } => {
            let id = ProductId::new(id);
            if cart.remove_item(&id) {
                ctx.output.success(&format!("Removed {}", id));
            } else {
                ctx.output.warn(&format!("{} is not in the cart", id));
            }
        }
        CartCommand::Clear { yes } => {
            if cart.is_empty() {
                ctx.output.info("Your cart is already empty");
                return Ok(());
            }
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Remove all {} items from the cart?", cart.item_count()))
                    .default(false)
                    .interact()?;
            if !confirmed {
                ctx.output.info("Cart left unchanged");
                return Ok(());
            }
            cart.clear();
            ctx.output.success("Cart cleared");
        }
    }

    ctx.output.header("Cart");
    ctx.output.cart(&cart.snapshot());
    Ok(())
}

/// Parse a shilling amount such as `850`, `12.50` or `Ksh 1,200`.
pub fn parse_price(input: &str) -> Result<Money> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("Ksh")
        .trim_start_matches("KES")
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let amount = Decimal::from_str(&cleaned).with_context(|| format!("Invalid price: {}", input))?;
    if amount.is_sign_negative() {
        bail!("Price cannot be negative: {}", input);
    }
    Ok(Money::from_decimal(amount, Currency::KES)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_forms() {
        assert_eq!(parse_price("850").unwrap(), Money::kes(850));
        assert_eq!(parse_price("Ksh 1,200").unwrap(), Money::kes(1200));
        assert_eq!(parse_price("12.50").unwrap(), Money::new(1250, Currency::KES));
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(parse_price("cheap").is_err());
        assert!(parse_price("-5").is_err());
    }
}
