//! Order history commands.

use anyhow::{bail, Result};
use dawa_commerce::checkout::{OrderHistory, OrderSummary};
use dawa_commerce::OrderId;
use dawa_data::FetchError;
use dialoguer::Confirm;

use super::{OrdersArgs, OrdersCommand};
use crate::context::Context;
use crate::output::{format_timestamp, status_badge};

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    let auth = ctx.auth_store()?;
    if !auth.is_authenticated() {
        bail!("Please log in to view your orders (`dawa login`)");
    }
    let orders = ctx.orders_api(auth)?;

    let command = args.command.unwrap_or(OrdersCommand::List { page: 1, limit: 10 });
    match dispatch(ctx, &orders, command).await {
        Err(e) if e.downcast_ref::<FetchError>().map(FetchError::requires_login) == Some(true) => {
            bail!("Your session has expired. Please log in again (`dawa login`).")
        }
        other => other,
    }
}

async fn dispatch<H>(ctx: &Context, orders: &H, command: OrdersCommand) -> Result<()>
where
    H: OrderHistory<Error = FetchError>,
{
    match command {
        OrdersCommand::List { page, limit } => list(ctx, orders, page, limit).await,
        OrdersCommand::Show { id } => {
            let order = orders.get_order(&OrderId::new(id)).await?;
            show(ctx, &order);
            Ok(())
        }
        OrdersCommand::Track { order_number } => {
            let order = orders.track_order(&order_number).await?;
            show(ctx, &order);
            Ok(())
        }
        OrdersCommand::Cancel { id, yes } => cancel(ctx, orders, OrderId::new(id), yes).await,
    }
}

async fn list<H>(ctx: &Context, orders: &H, page: u32, limit: u32) -> Result<()>
where
    H: OrderHistory<Error = FetchError>,
{
    let result = orders.list_orders(page, limit).await?;
    if ctx.output.is_json() {
        ctx.output.json(&result);
        return Ok(());
    }

    ctx.output.header("My orders");
    if result.orders.is_empty() {
        ctx.output.info("No orders yet");
        return Ok(());
    }

    let widths = [16, 20, 12, 14];
    ctx.output.table_row(&["Order", "Date", "Status", "Total"], &widths);
    for order in &result.orders {
        let placed = format_timestamp(&order.created_at);
        let status = status_badge(order.status);
        let total = order.total.display();
        ctx.output.table_row(
            &[order.order_number.as_str(), placed.as_str(), status.as_str(), total.as_str()],
            &widths,
        );
    }

    let p = result.pagination;
    ctx.output.info(&format!(
        "Page {} of {} ({} orders)",
        p.page,
        p.total_pages.max(1),
        p.total
    ));
    if p.has_next() {
        ctx.output
            .info(&format!("Next page: `dawa orders list --page {}`", p.page + 1));
    }
    Ok(())
}

fn show(ctx: &Context, order: &OrderSummary) {
    if ctx.output.is_json() {
        ctx.output.json(order);
        return;
    }

    ctx.output.header(&format!("Order {}", order.order_number));
    ctx.output.kv("ID", order.id.as_str());
    ctx.output.kv("Status", &status_badge(order.status));
    ctx.output.kv("Placed", &format_timestamp(&order.created_at));
    if let Some(eta) = &order.estimated_delivery {
        ctx.output.kv("Estimated delivery", &format_timestamp(eta));
    }
    for line in &order.items {
        ctx.output.list_item(&format!(
            "{} × {} @ {}",
            line.quantity,
            line.name,
            line.price.display()
        ));
    }
    ctx.output.kv("Total", &order.total.display());
}

async fn cancel<H>(ctx: &Context, orders: &H, id: OrderId, yes: bool) -> Result<()>
where
    H: OrderHistory<Error = FetchError>,
{
    let order = orders.get_order(&id).await?;
    if !order.status.can_cancel() {
        bail!(
            "Order {} is {} and can no longer be cancelled",
            order.order_number,
            order.status.display_name().to_lowercase()
        );
    }

    let confirmed = yes
        || Confirm::new()
            .with_prompt(format!("Cancel order {}?", order.order_number))
            .default(false)
            .interact()?;
    if !confirmed {
        ctx.output.info("Order left unchanged");
        return Ok(());
    }

    orders.cancel_order(&id).await?;
    ctx.output.success(&format!("Order {} cancelled", order.order_number));
    Ok(())
}
