//! Output formatting for the CLI.

use console::style;
use dawa_commerce::cart::{CartSnapshot, DeliveryPricing};
use dawa_commerce::checkout::OrderStatus;
use indicatif::{ProgressBar, ProgressStyle};

/// Output handler for CLI messages.
#[derive(Debug, Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Errors are printed in JSON mode too, as `{"error": ...}` on stderr.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a step in a process.
    pub fn step(&self, num: u8, total: u8, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style(format!("[{}/{}]", num, total)).dim(), msg);
    }

    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        println!("  {}", format_row(cols, widths));
    }

    /// Spinner for the order call and other waits.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Render the cart with its delivery summary.
    pub fn cart(&self, cart: &CartSnapshot) {
        if self.json {
            self.json(&serde_json::json!({
                "cart": cart,
                "pricing": DeliveryPricing::for_subtotal(cart.subtotal),
            }));
            return;
        }
        if cart.is_empty() {
            self.info("Your cart is empty");
            return;
        }

        let widths = [12, 32, 14, 5, 14];
        self.table_row(&["ID", "Product", "Price", "Qty", "Total"], &widths);
        for line in &cart.lines {
            let total = line
                .line_total()
                .map(|m| m.display())
                .unwrap_or_else(|| "-".to_string());
            self.table_row(
                &[
                    line.product_id.as_str(),
                    &line.name,
                    &line.unit_price.display(),
                    &line.quantity.to_string(),
                    &total,
                ],
                &widths,
            );
        }
        self.pricing(&DeliveryPricing::for_subtotal(cart.subtotal), cart.item_count);
    }

    pub fn pricing(&self, pricing: &DeliveryPricing, item_count: i64) {
        if self.json {
            return;
        }
        println!();
        self.kv("Items", &item_count.to_string());
        self.kv("Subtotal", &pricing.subtotal.display());
        if pricing.free_delivery {
            self.kv("Delivery", &style("FREE").green().to_string());
        } else {
            self.kv("Delivery", &pricing.delivery_fee.display());
            self.kv(
                "Free delivery",
                &format!("add {} more", pricing.remaining_for_free_delivery.display()),
            );
        }
        self.kv("Total", &style(pricing.grand_total.display()).bold().to_string());
    }
}

/// Pad columns to fixed widths, truncating long values.
pub fn format_row(cols: &[&str], widths: &[usize]) -> String {
    let formatted: Vec<String> = cols
        .iter()
        .zip(widths.iter())
        .map(|(col, width)| {
            let text: String = if col.chars().count() > *width {
                let mut t: String = col.chars().take(width.saturating_sub(1)).collect();
                t.push('…');
                t
            } else {
                col.to_string()
            };
            format!("{:width$}", text, width = width)
        })
        .collect();
    formatted.join("  ").trim_end().to_string()
}

/// Coloured order status.
pub fn status_badge(status: OrderStatus) -> String {
    let label = status.display_name();
    match status {
        OrderStatus::Delivered => style(label).green().to_string(),
        OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing => {
            style(label).yellow().to_string()
        }
        OrderStatus::Shipped => style(label).cyan().to_string(),
        OrderStatus::Cancelled => style(label).dim().to_string(),
    }
}

/// Render an API timestamp for humans; unparseable values are shown as-is.
pub fn format_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%d %b %Y, %H:%M").to_string())
        .or_else(|_| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| d.format("%d %b %Y").to_string())
        })
        .unwrap_or_else(|_| raw.to_string())
}
