//! Dawa CLI - shop the pharmacy storefront from the terminal.
//!
//! Commands:
//! - `dawa products` - Browse and filter a product list
//! - `dawa cart` - Manage the persistent cart
//! - `dawa checkout` - Shipping, payment and order placement
//! - `dawa orders` - Order history, tracking and cancellation
//! - `dawa login` / `dawa signup` / `dawa logout` / `dawa whoami` - Account session
//! - `dawa config` - Manage configuration

mod commands;
mod config;
mod context;
mod logging;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    CartArgs, CheckoutArgs, ConfigArgs, LoginArgs, OrdersArgs, ProductsArgs, SignupArgs,
};

/// Dawa CLI - Online pharmacy cart, checkout and orders
#[derive(Parser)]
#[command(name = "dawa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse a product list
    Products(ProductsArgs),

    /// View and edit the cart
    Cart(CartArgs),

    /// Check out the cart
    Checkout(CheckoutArgs),

    /// View, track and cancel orders
    Orders(OrdersArgs),

    /// Log in to your account
    Login(LoginArgs),

    /// Create an account
    Signup(SignupArgs),

    /// Log out
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = match context::Context::load(cli.config.as_deref(), output) {
        Ok(ctx) => ctx,
        Err(e) => {
            output::Output::new(cli.verbose, cli.json).error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(&ctx.config.logging, cli.verbose) {
        ctx.output.warn(&format!("{:#}", e));
    }

    let result = match cli.command {
        Commands::Products(args) => commands::products::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Login(args) => commands::account::login(args, &ctx).await,
        Commands::Signup(args) => commands::account::signup(args, &ctx).await,
        Commands::Logout => commands::account::logout(&ctx).await,
        Commands::Whoami => commands::account::whoami(&ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
