//! Interactive checkout.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::{bail, Context as _, Result};
use console::Term;
use dawa_auth::{AuthStore, User};
use dawa_commerce::checkout::{
    place_order, CheckoutError, CheckoutSequencer, CheckoutState, CheckoutStep, FormField, Navigation,
    OrderErrorCode, PaymentForm, PaymentMethod, ShippingForm, SubmitOutcome, ValidationErrors,
};
use dialoguer::{Confirm, Input, Select};

use super::CheckoutArgs;
use crate::context::Context;
use crate::output::format_timestamp;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.cart_store()?;
    let snapshot = cart.snapshot();
    let auth = ctx.auth_store()?;

    let user = signed_in_user(&auth)?;
    let draft = ShippingForm {
        full_name: user.name.clone(),
        email: user.email.clone(),
        ..ShippingForm::default()
    };

    let mut seq = match CheckoutSequencer::start_with(&snapshot, draft) {
        Ok(seq) => seq.with_user(user.user_id()),
        Err(CheckoutError::EmptyCart) => bail!("Your cart is empty. Add products with `dawa cart add`."),
        Err(e) => return Err(e.into()),
    };
    let interactive = !ctx.output.is_json() && Term::stdout().is_term();

    ctx.output.header("Checkout");
    ctx.output.cart(&snapshot);

    // Shipping
    loop {
        step_banner(ctx, seq.step());
        let form = match &args.shipping {
            Some(path) => read_shipping(&ctx.resolve_path(path))?,
            None => prompt_shipping(seq.shipping_draft())?,
        };
        match seq.submit_shipping(form) {
            Ok(_) => break,
            Err(CheckoutError::Shipping(errors)) => {
                report(ctx, &errors);
                if args.shipping.is_some() || !interactive {
                    bail!("Shipping details are incomplete");
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Payment
    loop {
        step_banner(ctx, seq.step());
        let form = payment_form(&args, seq.payment_draft(), interactive)?;
        match seq.submit_payment(form) {
            Ok(_) => break,
            Err(CheckoutError::Payment(errors)) => {
                report(ctx, &errors);
                if !interactive {
                    bail!("Payment details are incomplete");
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Confirmation
    step_banner(ctx, seq.step());
    if let CheckoutState::Confirmation { shipping, payment } = seq.state() {
        ctx.output.kv("Ship to", &shipping.one_line());
        ctx.output.kv("Payment", &payment.describe());
    }
    ctx.output.pricing(&seq.pricing(&snapshot), snapshot.item_count);

    let terms_accepted = args.accept_terms
        || (interactive
            && Confirm::new()
                .with_prompt("I agree to the Terms and Conditions and Privacy Policy")
                .default(false)
                .interact()?);

    let orders = ctx.orders_api(auth)?;
    let seq = Mutex::new(seq);
    let receipt = loop {
        let spinner = ctx.output.spinner("Placing your order...");
        let outcome = place_order(&seq, terms_accepted, &snapshot, &orders, ctx.order_timeout()).await;
        spinner.finish_and_clear();

        match outcome? {
            SubmitOutcome::Placed(receipt) => break receipt,
            SubmitOutcome::Failed(failure) => {
                ctx.output.error(failure.user_message());
                ctx.output.debug(&failure.detail);
                if failure.code == OrderErrorCode::LoginRequired {
                    bail!("Run `dawa login` and then `dawa checkout` again");
                }
                let retry = interactive
                    && Confirm::new()
                        .with_prompt("Try placing the order again?")
                        .default(failure.is_retryable())
                        .interact()?;
                if !retry {
                    bail!("Order was not placed");
                }
            }
            SubmitOutcome::AlreadySubmitting => bail!("An order submission is already in progress"),
        }
    };

    let mut seq = seq.into_inner().unwrap_or_else(PoisonError::into_inner);

    if ctx.output.is_json() {
        ctx.output.json(&receipt);
    } else {
        ctx.output.header("Order placed");
        ctx.output.success(&format!("Thank you! Your order {} is confirmed.", receipt.order_number));
        ctx.output.kv("Total", &receipt.total.display());
        ctx.output.kv("Placed", &format_timestamp(&receipt.created_at));
        if let Some(eta) = &receipt.estimated_delivery {
            ctx.output.kv("Estimated delivery", &format_timestamp(eta));
        }
    }

    let navigation = if args.continue_shopping {
        Navigation::ContinueShopping
    } else {
        Navigation::ViewOrders
    };
    match seq.finish(navigation, &mut cart)? {
        Navigation::ViewOrders => ctx.output.info("See your orders with `dawa orders list`"),
        Navigation::ContinueShopping => ctx.output.info("Your cart is empty and ready for more"),
    }
    Ok(())
}

/// Orders are attributed to an account, so checkout needs a session.
fn signed_in_user(auth: &AuthStore) -> Result<User> {
    match auth.user() {
        Some(user) => Ok(user),
        None => bail!("Please log in to check out (`dawa login`)."),
    }
}

fn step_banner(ctx: &Context, step: CheckoutStep) {
    ctx.output.step(step.number(), 3, step.display_name());
}

fn report<F: FormField>(ctx: &Context, errors: &ValidationErrors<F>) {
    for (field, message) in errors.iter() {
        ctx.output.error(&format!("{}: {}", field.as_str(), message));
    }
}

fn read_shipping(path: &Path) -> Result<ShippingForm> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read shipping details: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse shipping details: {}", path.display()))
}

fn ask(prompt: &str, initial: &str) -> Result<String> {
    Ok(Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?)
}

fn prompt_shipping(draft: &ShippingForm) -> Result<ShippingForm> {
    let notes = ask("Delivery notes (optional)", draft.notes.as_deref().unwrap_or(""))?;
    Ok(ShippingForm {
        full_name: ask("Full name", &draft.full_name)?,
        email: ask("Email", &draft.email)?,
        phone: ask("Phone", &draft.phone)?,
        address: ask("Address", &draft.address)?,
        city: ask("City", &draft.city)?,
        postal_code: ask("Postal code", &draft.postal_code)?,
        notes: Some(notes).filter(|n| !n.trim().is_empty()),
    })
}

/// Build the payment form from flags, prompting for whatever is missing.
fn payment_form(args: &CheckoutArgs, draft: &PaymentForm, interactive: bool) -> Result<PaymentForm> {
    let method = match &args.payment {
        Some(tag) => PaymentMethod::from_tag(tag)
            .with_context(|| format!("Unknown payment method '{}'; use mpesa, card or cod", tag))?,
        None if interactive => {
            let names: Vec<&str> = PaymentMethod::ALL.iter().map(|m| m.display_name()).collect();
            let current = PaymentMethod::ALL
                .iter()
                .position(|m| *m == draft.method)
                .unwrap_or(0);
            let choice = Select::new()
                .with_prompt("Payment method")
                .items(&names)
                .default(current)
                .interact()?;
            PaymentMethod::ALL[choice]
        }
        None => draft.method,
    };

    let mut form = PaymentForm::new(method);
    match method {
        PaymentMethod::Mpesa => {
            form.phone = match &args.phone {
                Some(phone) => phone.clone(),
                None if interactive => ask("M-Pesa phone number", &draft.phone)?,
                None => String::new(),
            };
        }
        PaymentMethod::Card => {
            form.card_token = match &args.card_token {
                Some(token) => token.clone(),
                None if interactive => ask("Card token", &draft.card_token)?,
                None => String::new(),
            };
        }
        PaymentMethod::CashOnDelivery => {}
    }
    Ok(form)
}
