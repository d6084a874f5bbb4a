//! Command line interface.

use std::io::{self, Write};

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use meg_store::{
    cart::{CartError, QuantityUpdate, service::CartService, storage::JsonFileCartStore},
    checkout::{CheckoutError, Customer, SimulatedGateway, SimulatedOutcome, place_order},
    config::StoreConfig,
    fixtures::FixtureError,
    orders::{JsonOrderStore, OrderId, OrderOwner, OrderRepository, OrderStatus, OrderStoreError},
    pricing::PricingError,
    products::{Catalog, ProductId, StaticCatalog},
    receipt::{Receipt, ReceiptError},
};

/// Errors reported by a command.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Orders(#[from] OrderStoreError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("no order with id {0}")]
    UnknownOrder(OrderId),
}

#[derive(Debug, Parser)]
#[command(name = "meg-store", about = "Meg Store cart and checkout", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: StoreConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List or search the catalog
    Products(ProductsArgs),

    /// Change or show the persisted cart
    Cart(CartCommand),

    /// Pay for the cart and record the order
    Checkout(CheckoutArgs),

    /// Inspect or update placed orders
    Orders(OrdersCommand),
}

#[derive(Debug, Args)]
struct ProductsArgs {
    /// Only products whose name or category contains this term
    #[arg(long)]
    search: Option<String>,

    /// Only best sellers
    #[arg(long)]
    best_sellers: bool,
}

#[derive(Debug, Args)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Add units of a product
    Add {
        /// Product id
        product: String,

        /// Units to add
        #[arg(long, short, default_value_t = 1)]
        quantity: u32,
    },

    /// Remove a product's line
    Remove {
        /// Product id
        product: String,
    },

    /// Set a line's quantity; zero removes it
    Set {
        /// Product id
        product: String,

        /// New quantity
        quantity: u32,
    },

    /// Empty the cart
    Clear,

    /// Print the cart with its checkout totals
    Show {
        /// Coupon code to price the cart with
        #[arg(long)]
        coupon: Option<String>,
    },
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Coupon code to apply
    #[arg(long)]
    coupon: Option<String>,

    /// Customer name
    #[arg(long)]
    name: String,

    /// Customer email
    #[arg(long)]
    email: String,

    /// Outcome reported by the simulated payment gateway
    #[arg(long, value_enum, default_value_t = SimulatedOutcome::Succeed)]
    payment: SimulatedOutcome,
}

#[derive(Debug, Args)]
struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// List the current user's orders, newest first
    List {
        /// List every user's orders
        #[arg(long)]
        all: bool,
    },

    /// Change an order's status
    Status {
        /// Order id
        id: String,

        /// New status
        #[arg(value_enum)]
        status: OrderStatus,
    },
}

impl Cli {
    /// Load configuration from `.env`, the environment and CLI arguments
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) fn run(self, out: &mut impl Write) -> Result<(), CliError> {
        let config = self.config;
        let fixture = config.load_fixture()?;
        let catalog = fixture.catalog();
        let coupons = fixture.coupon_table();

        info!(
            products = catalog.len(),
            coupons = coupons.len(),
            set = %config.fixture_set,
            "loaded fixtures"
        );

        let service = CartService::new(
            fixture.currency()?,
            &catalog,
            &coupons,
            config.delivery_rate()?,
            JsonFileCartStore::new(config.cart_file.clone()),
        );

        match self.command {
            Commands::Products(args) => list_products(out, &catalog, &args),
            Commands::Cart(CartCommand { command }) => run_cart(out, service, command),
            Commands::Checkout(args) => checkout(out, service, &config, args),
            Commands::Orders(OrdersCommand { command }) => run_orders(out, &config, command),
        }
    }
}

fn list_products(
    out: &mut impl Write,
    catalog: &StaticCatalog<'_>,
    args: &ProductsArgs,
) -> Result<(), CliError> {
    let products: Vec<_> = match &args.search {
        Some(term) => catalog.search(term),
        None => catalog.products().iter().collect(),
    };

    for product in products
        .into_iter()
        .filter(|product| !args.best_sellers || product.best_seller)
    {
        let discount = product
            .discount
            .map(|percent| format!(" (-{}%)", (percent * Decimal::ONE_HUNDRED).normalize()))
            .unwrap_or_default();

        writeln!(
            out,
            "{:>4}  {:<24} {:<14} {}{discount}",
            product.id, product.name, product.category, product.price
        )?;
    }

    Ok(())
}

fn run_cart<'a, C: Catalog<'a>>(
    out: &mut impl Write,
    mut service: CartService<'a, C, JsonFileCartStore>,
    command: CartSubcommand,
) -> Result<(), CliError> {
    match command {
        CartSubcommand::Add { product, quantity } => {
            let id = ProductId::from(product);
            let catalog = service.catalog();
            let product = catalog
                .product(&id)
                .ok_or_else(|| CliError::UnknownProduct(id.clone()))?;

            service.add(product, quantity)?;
            writeln!(out, "Added {quantity} x {}; cart has {} items", product.name, service.count())?;
        }
        CartSubcommand::Remove { product } => {
            let id = ProductId::from(product);

            match service.remove(&id) {
                Some(removed) => writeln!(out, "Removed {}", removed.line().name())?,
                None => writeln!(out, "{id} is not in the cart")?,
            }
        }
        CartSubcommand::Set { product, quantity } => {
            let id = ProductId::from(product);

            match service.update_quantity(&id, quantity) {
                QuantityUpdate::Updated => writeln!(out, "{id} quantity set to {quantity}")?,
                QuantityUpdate::Removed(removed) => {
                    writeln!(out, "Removed {}", removed.line().name())?;
                }
                QuantityUpdate::Missing => writeln!(out, "{id} is not in the cart")?,
            }
        }
        CartSubcommand::Clear => {
            service.clear();
            writeln!(out, "Cart cleared")?;
        }
        CartSubcommand::Show { coupon } => {
            apply_coupon(out, &mut service, coupon.as_deref())?;

            let totals = service.totals()?;
            Receipt::new(service.ledger(), service.catalog(), totals)?.write_to(&mut *out)?;
        }
    }

    Ok(())
}

fn apply_coupon<'a, C: Catalog<'a>>(
    out: &mut impl Write,
    service: &mut CartService<'a, C, JsonFileCartStore>,
    code: Option<&str>,
) -> Result<(), CliError> {
    let Some(code) = code else {
        return Ok(());
    };

    if let Err(err) = service.apply_coupon(code) {
        warn!(code, "coupon rejected");
        writeln!(out, "{err}")?;
    }

    Ok(())
}

fn checkout<'a, C: Catalog<'a>>(
    out: &mut impl Write,
    mut service: CartService<'a, C, JsonFileCartStore>,
    config: &StoreConfig,
    args: CheckoutArgs,
) -> Result<(), CliError> {
    apply_coupon(out, &mut service, args.coupon.as_deref())?;

    let gateway = SimulatedGateway::new(args.payment);
    let mut orders = JsonOrderStore::new(config.orders_dir.clone());
    let customer = Customer {
        user_id: config.user.clone(),
        name: args.name,
        email: args.email,
    };

    let order = place_order(&mut service, &gateway, &mut orders, &customer)?;

    writeln!(
        out,
        "Order {} placed: {} {} charged for {} items",
        order.id,
        order.grand_total,
        order.currency,
        order.item_count()
    )?;

    Ok(())
}

fn run_orders(
    out: &mut impl Write,
    config: &StoreConfig,
    command: OrdersSubcommand,
) -> Result<(), CliError> {
    let mut orders = JsonOrderStore::new(config.orders_dir.clone());

    match command {
        OrdersSubcommand::List { all } => {
            let listed = if all {
                orders.all_orders()?
            } else {
                orders.orders_for(&OrderOwner::from_user(config.user.as_deref()))?
            };

            for order in listed {
                writeln!(
                    out,
                    "{}  {}  {:<9}  {} {}  {} items",
                    order.id,
                    order.created_at,
                    order.status,
                    order.grand_total,
                    order.currency,
                    order.item_count()
                )?;
            }
        }
        OrdersSubcommand::Status { id, status } => {
            let id = OrderId::from(id.as_str());

            if !orders.update_status(&id, status)? {
                return Err(CliError::UnknownOrder(id));
            }

            writeln!(out, "Order {id} is now {status}")?;
        }
    }

    Ok(())
}
