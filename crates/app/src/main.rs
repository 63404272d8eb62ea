//! Wrapshop CLI
//!
//! A terminal front end over the storefront stores: session management,
//! cart editing, checkout, and order history.

use std::{path::PathBuf, process};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wrapshop::{
    cart::LineKey,
    checkout::{CustomerDetails, DeliveryMethod},
};
use wrapshop_app::context::{AppConfig, AppContext};

#[derive(Debug, Parser)]
#[command(name = "wrapshop", about = "Wrapshop storefront CLI", long_about = None)]
struct Cli {
    /// API base URL including the path prefix
    #[arg(long, env = "WRAPSHOP_API_URL", default_value = "http://localhost:5000/api")]
    api_url: String,

    /// Where the session token is persisted
    #[arg(long, env = "WRAPSHOP_TOKEN_FILE", default_value = ".wrapshop_token")]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login(CredentialArgs),

    /// End the persisted session
    Logout,

    /// Create a customer account
    Register(CredentialArgs),

    /// Inspect and edit the cart
    Cart(CartCommand),

    /// Place an order for the current cart
    Checkout(CheckoutArgs),

    /// List your orders
    Orders,

    /// Cancel a pending order
    Cancel(CancelArgs),
}

#[derive(Debug, Args)]
struct CredentialArgs {
    /// Account username
    #[arg(long)]
    username: String,

    /// Account password
    #[arg(long)]
    password: String,
}

#[derive(Debug, Args)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print the cart with totals
    Show,

    /// Add a product option
    Add(LineArgs),

    /// Set the quantity of a line
    Set(LineArgs),

    /// Remove a line
    Remove(KeyArgs),

    /// Replace the note on a line
    Note(NoteArgs),

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct KeyArgs {
    /// Product identifier
    #[arg(long)]
    product: String,

    /// Option position within the product
    #[arg(long, default_value_t = 0)]
    option: u32,
}

#[derive(Debug, Args)]
struct LineArgs {
    #[command(flatten)]
    key: KeyArgs,

    /// Quantity
    #[arg(long, default_value_t = 1)]
    quantity: i64,
}

#[derive(Debug, Args)]
struct NoteArgs {
    #[command(flatten)]
    key: KeyArgs,

    /// Free-text note for the line
    #[arg(long)]
    note: String,
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Customer's full name
    #[arg(long)]
    name: String,

    /// Mobile phone number
    #[arg(long)]
    phone: String,

    /// Contact email
    #[arg(long)]
    email: Option<String>,

    /// Delivery city
    #[arg(long, default_value = "")]
    city: String,

    /// Delivery street
    #[arg(long, default_value = "")]
    street: String,

    /// Delivery house number
    #[arg(long, default_value = "")]
    house: String,

    /// Postal code
    #[arg(long)]
    postal_code: Option<String>,

    /// Free-text notes for the whole order
    #[arg(long)]
    notes: Option<String>,

    /// Ship by courier instead of store pickup
    #[arg(long)]
    shipping: bool,

    /// Accept the terms of service
    #[arg(long)]
    accept_terms: bool,
}

#[derive(Debug, Args)]
struct CancelArgs {
    /// Identifier of the order to cancel
    #[arg(long)]
    order_id: String,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let app = AppContext::init(AppConfig {
        base_url: cli.api_url,
        token_path: cli.token_file,
    })
    .await
    .map_err(|error| format!("failed to start: {error}"))?;

    match cli.command {
        Commands::Login(args) => login(&app, &args).await,
        Commands::Logout => {
            app.logout();
            println!("logged out");

            Ok(())
        }
        Commands::Register(args) => register(&app, &args).await,
        Commands::Cart(CartCommand { command }) => cart(&app, command).await,
        Commands::Checkout(args) => checkout(&app, args).await,
        Commands::Orders => orders(&app).await,
        Commands::Cancel(args) => cancel(&app, &args).await,
    }
}

async fn login(app: &AppContext, args: &CredentialArgs) -> Result<(), String> {
    if !app.login(&args.username, &args.password).await {
        return Err("login failed; check your credentials".to_string());
    }

    println!("logged in as {}", args.username);

    Ok(())
}

async fn register(app: &AppContext, args: &CredentialArgs) -> Result<(), String> {
    let response = app
        .api
        .register(&args.username, &args.password)
        .await
        .map_err(|error| format!("registration failed: {error}"))?;

    if response.message.is_empty() {
        println!("account created");
    } else {
        println!("{}", response.message);
    }

    Ok(())
}

async fn cart(app: &AppContext, command: CartSubcommand) -> Result<(), String> {
    match command {
        CartSubcommand::Show => {
            show_cart(app);

            Ok(())
        }
        CartSubcommand::Add(args) => {
            let quantity = u32::try_from(args.quantity.max(1)).unwrap_or(1);
            app.cart
                .add_item(&key_of(&args.key), quantity)
                .await
                .map_err(|error| error.to_string())?;
            show_cart(app);

            Ok(())
        }
        CartSubcommand::Set(args) => {
            app.cart
                .update_quantity(&key_of(&args.key), args.quantity)
                .await
                .map_err(|error| error.to_string())?;
            show_cart(app);

            Ok(())
        }
        CartSubcommand::Remove(args) => {
            app.cart
                .remove_item(&key_of(&args))
                .await
                .map_err(|error| error.to_string())?;
            show_cart(app);

            Ok(())
        }
        CartSubcommand::Note(args) => {
            app.cart
                .update_item_note(&key_of(&args.key), &args.note)
                .await
                .map_err(|error| error.to_string())?;

            Ok(())
        }
        CartSubcommand::Clear => {
            app.cart.clear().await.map_err(|error| error.to_string())?;
            println!("cart emptied");

            Ok(())
        }
    }
}

fn key_of(args: &KeyArgs) -> LineKey {
    LineKey::new(&args.product, args.option)
}

fn show_cart(app: &AppContext) {
    let cart = app.cart.snapshot();

    if cart.is_empty() {
        println!("the cart is empty");

        return;
    }

    for line in cart.iter() {
        println!(
            "{} x{} ({} / {}) @ {:.2}",
            line.product_name, line.quantity, line.product_id, line.option_name, line.unit_price
        );
    }

    println!("subtotal: {:.2}", app.cart.subtotal());
    println!("total incl. tax: {:.2}", app.cart.total_with_tax());
}

async fn checkout(app: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    let delivery_method = if args.shipping {
        DeliveryMethod::Shipping
    } else {
        DeliveryMethod::Pickup
    };

    let details = CustomerDetails {
        full_name: args.name,
        phone: args.phone,
        email: args.email,
        city: args.city,
        street: args.street,
        house_number: args.house,
        postal_code: args.postal_code,
        notes: args.notes,
        delivery_method,
        accepted_terms: args.accept_terms,
        ..CustomerDetails::default()
    };

    let totals = app.checkout.totals(delivery_method);
    println!("amount due: {:.2}", totals.total_to_pay);

    let placed = app
        .checkout
        .place_order(&details)
        .await
        .map_err(|error| error.to_string())?;

    println!("order {} placed", placed.order.id);
    println!("complete payment at: {}", placed.payment.url);

    Ok(())
}

async fn orders(app: &AppContext) -> Result<(), String> {
    let orders = app
        .orders
        .my_orders()
        .await
        .map_err(|error| error.to_string())?;

    if orders.is_empty() {
        println!("no orders yet");

        return Ok(());
    }

    for order in orders {
        println!(
            "{} {} {:?} total {:.2}",
            order.id, order.date, order.status, order.total
        );
    }

    Ok(())
}

async fn cancel(app: &AppContext, args: &CancelArgs) -> Result<(), String> {
    let orders = app
        .orders
        .my_orders()
        .await
        .map_err(|error| error.to_string())?;

    let order = orders
        .into_iter()
        .find(|order| order.id == args.order_id)
        .ok_or_else(|| format!("order {} not found", args.order_id))?;

    let canceled = app
        .orders
        .cancel_order(&order)
        .await
        .map_err(|error| error.to_string())?;

    println!("order {} is now {:?}", canceled.id, canceled.status);

    Ok(())
}
