use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use shop_common::Money;
use storefront_client::ClientConfig;
use storefront_engine::{
    session::Role,
    store_types::{OrderId, OrderStatus, ProductId, UserId},
};

mod admin;
mod context;
mod formatting;
mod shopper;

use context::Shop;

#[derive(Parser, Debug)]
#[command(version, about = "Storefront and admin console")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every order (admin)
    #[clap(name = "orders")]
    Orders {
        /// Only show high-value orders
        #[arg(long = "high-value")]
        high_value: bool,
        /// Free-text filter on id, customer, status or total
        #[arg(short = 's', long = "search")]
        search: Option<String>,
    },
    /// Show one order in detail (admin)
    #[clap(name = "order")]
    Order { id: OrderId },
    /// Change an order's status (admin)
    #[clap(name = "set-status")]
    SetStatus { id: OrderId, status: OrderStatus },
    /// Revenue and best sellers (admin)
    #[clap(name = "stats")]
    Stats,
    /// Per-customer order totals (admin)
    #[clap(name = "aggregates")]
    Aggregates,
    /// Follow the order-notification and dead-letter feeds (admin)
    #[clap(name = "watch")]
    Watch {
        /// Stop after this many seconds. Runs until interrupted otherwise.
        #[arg(long = "seconds")]
        seconds: Option<u64>,
    },
    #[clap(name = "clear-notifications")]
    ClearNotifications,
    #[clap(name = "clear-deadletters")]
    ClearDeadLetters,
    /// Your orders
    #[clap(name = "my-orders")]
    MyOrders,
    /// Manage the local shopping cart
    #[clap(name = "cart", subcommand)]
    Cart(CartCommand),
    /// Store a session token obtained from the storefront
    #[clap(name = "login")]
    Login(LoginParams),
    #[clap(name = "logout")]
    Logout,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    #[clap(name = "list")]
    List,
    /// Add one unit of a product
    #[clap(name = "add")]
    Add(AddParams),
    /// Increase a product's quantity
    #[clap(name = "inc")]
    Inc {
        id: ProductId,
        #[arg(long = "by", default_value = "1")]
        by: u32,
    },
    /// Decrease a product's quantity. Never goes below one.
    #[clap(name = "dec")]
    Dec {
        id: ProductId,
        #[arg(long = "by", default_value = "1")]
        by: u32,
    },
    #[clap(name = "remove")]
    Remove { id: ProductId },
    #[clap(name = "clear")]
    Clear,
    /// Place an order for everything in the cart
    #[clap(name = "checkout")]
    Checkout,
}

#[derive(Debug, Args)]
pub struct AddParams {
    pub id: ProductId,
    #[arg(short = 'n', long = "name")]
    pub name: String,
    #[arg(short = 'p', long = "price")]
    pub price: Money,
    #[arg(short = 'b', long = "brand")]
    pub brand: Option<String>,
}

#[derive(Debug, Args)]
pub struct LoginParams {
    #[arg(short = 't', long = "token")]
    pub token: String,
    #[arg(short = 'u', long = "user-id")]
    pub user_id: Option<UserId>,
    #[arg(short = 'e', long = "email")]
    pub email: Option<String>,
    #[arg(short = 'r', long = "role", default_value = "customer")]
    pub role: String,
}

impl LoginParams {
    pub fn role(&self) -> Role {
        Role::from_name(&self.role)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    let shop = Shop::from_config(ClientConfig::from_env_or_default())?;
    match cli.command {
        Command::Orders { high_value, search } => admin::list_orders(&shop, high_value, search).await,
        Command::Order { id } => admin::show_order(&shop, id).await,
        Command::SetStatus { id, status } => admin::set_status(&shop, id, status).await,
        Command::Stats => admin::stats(&shop).await,
        Command::Aggregates => admin::aggregates(&shop).await,
        Command::Watch { seconds } => admin::watch(&shop, seconds).await,
        Command::ClearNotifications => admin::clear_notifications(&shop).await,
        Command::ClearDeadLetters => admin::clear_dead_letters(&shop).await,
        Command::MyOrders => shopper::my_orders(&shop).await,
        Command::Cart(cmd) => shopper::cart(&shop, cmd).await,
        Command::Login(params) => shopper::login(&shop, params),
        Command::Logout => shopper::logout(&shop),
    }
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Arguments::command().debug_assert();
    }

    #[test]
    fn parses_typed_arguments() {
        let args = Arguments::try_parse_from(["shoptools", "set-status", "#12", "shipped"]).unwrap();
        match args.command {
            Command::SetStatus { id, status } => {
                assert_eq!(id, OrderId(12));
                assert_eq!(status, OrderStatus::Shipped);
            },
            other => panic!("unexpected command {other:?}"),
        }
        let args = Arguments::try_parse_from(["shoptools", "cart", "add", "3", "-n", "Oud", "-p", "79.90"]).unwrap();
        assert!(matches!(args.command, Command::Cart(CartCommand::Add(AddParams { id: ProductId(3), .. }))));
        assert!(Arguments::try_parse_from(["shoptools", "cart", "add", "3", "-n", "Oud", "-p", "cheap"]).is_err());
    }

    #[test]
    fn login_roles() {
        let args = Arguments::try_parse_from(["shoptools", "login", "-t", "abc", "-r", "ADMIN"]).unwrap();
        let Command::Login(params) = args.command else { panic!("expected login") };
        assert_eq!(params.role(), Role::Admin);
    }
}
