//! CLI command implementations.

pub mod account;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod orders;
pub mod products;

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart and its delivery summary.
    Show,
    /// Add a product, or more of one already in the cart.
    Add {
        /// Product ID.
        id: String,
        /// Product name as shown in the cart.
        #[arg(short, long)]
        name: String,
        /// Unit price in shillings (e.g. 850 or 12.50).
        #[arg(short, long)]
        price: String,
        /// Quantity to add.
        #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
        quantity: i64,
        /// Product image URL.
        #[arg(long)]
        image: Option<String>,
    },
    /// Set the quantity of a line; zero or less removes it.
    Update {
        /// Product ID.
        id: String,
        /// New quantity.
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line.
    Remove {
        /// Product ID.
        id: String,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Read shipping details from a JSON file instead of prompting.
    #[arg(long)]
    pub shipping: Option<PathBuf>,

    /// Payment method: mpesa, card or cod.
    #[arg(long)]
    pub payment: Option<String>,

    /// M-Pesa phone number.
    #[arg(long)]
    pub phone: Option<String>,

    /// Pre-issued card token.
    #[arg(long)]
    pub card_token: Option<String>,

    /// Accept the terms and conditions without prompting.
    #[arg(long)]
    pub accept_terms: bool,

    /// After a placed order, keep shopping instead of viewing orders.
    #[arg(long)]
    pub continue_shopping: bool,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: Option<OrdersCommand>,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List past orders.
    List {
        /// Page number (1-based).
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Orders per page.
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },
    /// Show one order.
    Show {
        /// Order ID.
        id: String,
    },
    /// Cancel an order that has not shipped yet.
    Cancel {
        /// Order ID.
        id: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Track an order by its order number.
    Track {
        /// Order number (e.g. MP-2024-0042).
        order_number: String,
    },
}

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    /// Product list as JSON (an array, or `{"products": [...]}`).
    #[arg(short, long)]
    pub file: PathBuf,

    /// Search name, description and category.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Category ("All" for every category).
    #[arg(short, long)]
    pub category: Option<String>,

    /// Minimum price in shillings.
    #[arg(long)]
    pub min_price: Option<String>,

    /// Maximum price in shillings.
    #[arg(long)]
    pub max_price: Option<String>,

    /// Sort by name, price, rating or popular.
    #[arg(long, default_value = "name")]
    pub sort: String,

    /// Sort descending.
    #[arg(long)]
    pub desc: bool,

    /// Show category counts instead of products.
    #[arg(long)]
    pub categories: bool,
}

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Account email.
    pub email: Option<String>,
}

/// Arguments for the signup command.
#[derive(Args)]
pub struct SignupArgs {
    /// Full name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Account email.
    #[arg(short, long)]
    pub email: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// API base URL to write.
        #[arg(long, default_value = "http://localhost:5000")]
        base_url: String,
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
