//! Storefront commands.

use std::error::Error;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use quickpick_api::{ApiConfig, Credentials, Restored, Route, SignupForm};
use quickpick_core::{
    AddressId, CardId, CategoryId, DEFAULT_LOCALE, Delivery, DeliveryMode, Email, Gender, Money,
    NewCard, Order, OrderId, PaymentMethod, Product, ProductId, ProductQuery, ShippingAddress,
    User,
};
use quickpick_storefront::{
    AddressChoice, CheckoutForm, NewAddress, PasswordChange, ProfileUpdate, Storefront,
};
use secrecy::SecretString;

use super::CliError;
use crate::output::Output;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Subcommand)]
pub enum ShopCommand {
    /// Sign in to the storefront
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "QUICKPICK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a customer account
    Signup(SignupArgs),
    /// Sign out of the storefront
    Logout,
    /// Show the signed-in customer
    Whoami,
    /// Update profile fields
    Profile(ProfileArgs),
    /// Change the account password
    Password {
        #[arg(long, env = "QUICKPICK_PASSWORD", hide_env_values = true)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Browse categories and products
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Wallet balance, deposits and withdrawals
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
    /// Saved shipping addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Saved payment cards
    Cards {
        #[command(subcommand)]
        action: CardAction,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Check a promo code
    Promo { code: String },
    /// Place an order
    Checkout(CheckoutArgs),
    /// Show CMS settings
    Settings {
        /// Show a single key
        key: Option<String>,
    },
}

#[derive(Args)]
pub struct SignupArgs {
    #[arg(short, long)]
    name: String,
    #[arg(short, long)]
    email: String,
    #[arg(short, long, env = "QUICKPICK_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    phone: Option<String>,
    /// `male` or `female`
    #[arg(long)]
    gender: Option<Gender>,
}

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    gender: Option<Gender>,
    #[arg(long)]
    address: Option<String>,
}

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List visible categories
    Categories,
    /// List products
    Products {
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one product
    Product { id: String },
}

#[derive(Subcommand)]
pub enum WalletAction {
    /// Show the balance
    Balance,
    /// Deposit funds
    Add { amount: Money },
    /// Withdraw funds
    Withdraw { amount: Money },
}

#[derive(Subcommand)]
pub enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add(AddressArgs),
    /// Delete a saved address
    Remove { id: String },
}

#[derive(Args)]
pub struct AddressArgs {
    #[arg(long)]
    label: Option<String>,
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    building: Option<String>,
    #[arg(long)]
    area: Option<String>,
    #[arg(long)]
    city: String,
    #[arg(long)]
    notes: Option<String>,
    /// Make this the default address
    #[arg(long)]
    default: bool,
}

#[derive(Subcommand)]
pub enum CardAction {
    /// List saved cards
    List,
    /// Save a card tokenized by the payment processor
    Add {
        /// Processor token
        #[arg(long)]
        token: String,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        last4: String,
        #[arg(long)]
        exp_month: u8,
        #[arg(long)]
        exp_year: u16,
        #[arg(long)]
        holder: Option<String>,
    },
    /// Delete a saved card
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum OrderAction {
    /// List your orders
    List,
    /// Show one order
    Show { id: String },
    /// Ask to cancel an order
    Cancel { id: String },
}

#[derive(Args)]
pub struct CheckoutArgs {
    /// `PRODUCT_ID[:QUANTITY]`, repeatable
    #[arg(short, long = "item", required = true)]
    items: Vec<String>,
    /// Saved address ID (defaults to the default address)
    #[arg(short, long)]
    address: Option<String>,
    /// `card`, `wallet` or `cash`
    #[arg(short, long)]
    payment: Option<PaymentMethod>,
    /// Saved card ID, when paying by card
    #[arg(long)]
    card: Option<String>,
    #[arg(long)]
    promo: Option<String>,
    /// Delivery date (YYYY-MM-DD) for scheduled delivery
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Delivery time slot, e.g. `10:00-12:00`
    #[arg(long)]
    slot: Option<String>,
    #[arg(long)]
    instructions: Option<String>,
}

/// Build the storefront from the environment.
fn connect() -> Result<Storefront, Box<dyn Error>> {
    let config = ApiConfig::from_env()?;
    Ok(Storefront::new(config)?)
}

/// Restore the persisted session or fail with a sign-in hint.
async fn require_user(shop: &Storefront) -> Result<User, CliError> {
    match shop.start().await {
        Restored::Active(user) => Ok(user),
        Restored::SignedOut(route) => Err(CliError::signed_out(&route)),
    }
}

/// Parse `PRODUCT_ID[:QUANTITY]`.
fn parse_item(raw: &str) -> Result<(ProductId, u32), CliError> {
    let (id, qty) = match raw.split_once(':') {
        Some((id, qty)) => (
            id,
            qty.parse::<u32>()
                .map_err(|_| CliError::InvalidItem(raw.to_owned()))?,
        ),
        None => (raw, 1),
    };
    if id.trim().is_empty() || qty == 0 {
        return Err(CliError::InvalidItem(raw.to_owned()));
    }
    Ok((ProductId::new(id.trim()), qty))
}

/// Delivery block from the checkout flags. A date or slot means scheduled.
fn delivery_from(args: &CheckoutArgs) -> Delivery {
    let delivery = if args.date.is_some() || args.slot.is_some() {
        Delivery {
            mode: DeliveryMode::Scheduled,
            date: args.date,
            time: args.slot.clone(),
            instructions: None,
        }
    } else {
        Delivery::instant()
    };
    match &args.instructions {
        Some(text) => delivery.with_instructions(text.clone()),
        None => delivery,
    }
}

fn user_lines(user: &User) -> Vec<String> {
    vec![
        format!("{} <{}>", user.name, user.email),
        format!("Wallet: {}", user.wallet_balance),
        format!("Admin: {}", if user.is_admin { "yes" } else { "no" }),
    ]
}

fn product_line(product: &Product, locale: &str) -> String {
    let stock = if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "out of stock".to_owned()
    };
    format!(
        "{}  {}  {}  ({stock})",
        product.id,
        product.name.get(locale),
        product.price
    )
}

fn order_lines(order: &Order) -> Vec<String> {
    let mut lines = vec![format!(
        "Order {}  {}  payment {} ({})  total {}",
        order.id, order.status, order.payment_method, order.payment_status, order.total
    )];
    for item in &order.items {
        lines.push(format!(
            "  {} x{} @ {}",
            item.name.as_ref().map_or(item.product_id.as_str(), |n| n.get(DEFAULT_LOCALE)),
            item.quantity,
            item.price
        ));
    }
    lines.push(format!("  Ship to: {}", order.shipping_address.one_line()));
    lines
}

/// Run a storefront command.
#[allow(clippy::too_many_lines)]
pub async fn run(command: ShopCommand, out: &Output) -> CliResult {
    let shop = connect()?;
    let locale = shop.config().locale.clone();

    match command {
        ShopCommand::Login { email, password } => {
            let credentials = Credentials::parse(&email, &password)?;
            let user = shop.login(&credentials).await?;
            out.show(&user, user_lines)?;
        }
        ShopCommand::Signup(args) => {
            let form = SignupForm {
                name: args.name,
                email: Email::parse(&args.email)?,
                password: SecretString::from(args.password),
                phone: args.phone,
                gender: args.gender,
            };
            let user = shop.signup(&form).await?;
            out.show(&user, user_lines)?;
        }
        ShopCommand::Logout => {
            shop.start().await;
            let route = shop.logout().await;
            out.say(format!("Signed out ({})", route.path()));
        }
        ShopCommand::Whoami => {
            let user = require_user(&shop).await?;
            out.show(&user, user_lines)?;
        }
        ShopCommand::Profile(args) => {
            require_user(&shop).await?;
            let update = ProfileUpdate {
                name: args.name,
                phone: args.phone,
                gender: args.gender,
                address: args.address,
            };
            let user = shop.account().update_profile(&update).await?;
            out.show(&user, user_lines)?;
        }
        ShopCommand::Password { current, new } => {
            require_user(&shop).await?;
            shop.account()
                .change_password(&PasswordChange {
                    current: SecretString::from(current),
                    new: SecretString::from(new),
                })
                .await?;
            out.say("Password changed");
        }
        ShopCommand::Catalog { action } => catalog(&shop, action, &locale, out).await?,
        ShopCommand::Wallet { action } => {
            require_user(&shop).await?;
            let wallet = shop.wallet();
            let balance = match action {
                WalletAction::Balance => wallet.refresh().await?,
                WalletAction::Add { amount } => wallet.add_funds(amount).await?,
                WalletAction::Withdraw { amount } => wallet.withdraw_funds(amount).await?,
            };
            out.show(&serde_json::json!({ "balance": balance }), |_| {
                vec![format!("Wallet balance: {balance}")]
            })?;
        }
        ShopCommand::Addresses { action } => {
            require_user(&shop).await?;
            let addresses = shop.addresses();
            match action {
                AddressAction::List => {
                    let list = addresses.load().await?;
                    out.show(&list, |list| {
                        list.iter()
                            .map(|a| {
                                format!(
                                    "{}{}  {}  {}",
                                    a.id,
                                    if a.is_default { " (default)" } else { "" },
                                    a.label.as_deref().unwrap_or("-"),
                                    a.details.one_line()
                                )
                            })
                            .collect()
                    })?;
                }
                AddressAction::Add(args) => {
                    let address = addresses
                        .add(&NewAddress {
                            label: args.label,
                            details: ShippingAddress {
                                full_name: args.full_name,
                                phone: args.phone,
                                street: args.street,
                                building: args.building,
                                area: args.area,
                                city: args.city,
                                notes: args.notes,
                            },
                            is_default: args.default,
                        })
                        .await?;
                    out.show(&address, |a| vec![format!("Saved address {}", a.id)])?;
                }
                AddressAction::Remove { id } => {
                    addresses.remove(&AddressId::new(id)).await?;
                    out.say("Address removed");
                }
            }
        }
        ShopCommand::Cards { action } => {
            require_user(&shop).await?;
            let cards = shop.payment_methods();
            match action {
                CardAction::List => {
                    let list = cards.load().await?;
                    out.show(&list, |list| {
                        list.iter()
                            .map(|c| {
                                format!(
                                    "{}  {}  exp {:02}/{}{}",
                                    c.id,
                                    c.label(),
                                    c.exp_month,
                                    c.exp_year,
                                    if c.is_default { " (default)" } else { "" }
                                )
                            })
                            .collect()
                    })?;
                }
                CardAction::Add {
                    token,
                    brand,
                    last4,
                    exp_month,
                    exp_year,
                    holder,
                } => {
                    let card = cards
                        .add(&NewCard {
                            token,
                            brand,
                            last4,
                            exp_month,
                            exp_year,
                            holder_name: holder,
                        })
                        .await?;
                    out.show(&card, |c| vec![format!("Saved card {} ({})", c.id, c.label())])?;
                }
                CardAction::Remove { id } => {
                    cards.remove(&CardId::new(id)).await?;
                    out.say("Card removed");
                }
            }
        }
        ShopCommand::Orders { action } => {
            require_user(&shop).await?;
            let orders = shop.orders();
            match action {
                OrderAction::List => {
                    let list = orders.list().await?;
                    out.show(&list, |list| {
                        list.iter()
                            .map(|o| {
                                format!(
                                    "{}  {}  {} items  {}",
                                    o.id,
                                    o.status,
                                    o.unit_count(),
                                    o.total
                                )
                            })
                            .collect()
                    })?;
                }
                OrderAction::Show { id } => {
                    let order = orders.get(&OrderId::new(id)).await?;
                    out.show(&order, order_lines)?;
                }
                OrderAction::Cancel { id } => {
                    let order = orders.get(&OrderId::new(id)).await?;
                    let order = orders.cancel(&order).await?;
                    out.show(&order, order_lines)?;
                }
            }
        }
        ShopCommand::Promo { code } => {
            require_user(&shop).await?;
            let applied = shop.promotions().apply(&code).await?;
            out.show(&applied, |p| vec![format!("{}: {} off", p.code, p.discount)])?;
        }
        ShopCommand::Checkout(args) => checkout(&shop, args, out).await?,
        ShopCommand::Settings { key } => {
            let content = shop.content();
            let settings = match key {
                Some(key) => content.setting(&key).await?.into_iter().collect(),
                None => content.settings().await?,
            };
            out.show(&settings, |settings| {
                settings
                    .iter()
                    .map(|s| format!("{}: {}", s.key, s.value.get(&locale)))
                    .collect()
            })?;
        }
    }
    Ok(())
}

async fn catalog(shop: &Storefront, action: CatalogAction, locale: &str, out: &Output) -> CliResult {
    let catalog = shop.catalog();
    match action {
        CatalogAction::Categories => {
            let categories = catalog.categories().await?;
            out.show(&categories, |list| {
                list.iter()
                    .map(|c| format!("{}  {}", c.id, c.name.get(locale)))
                    .collect()
            })?;
        }
        CatalogAction::Products {
            category,
            search,
            page,
            limit,
        } => {
            let query = ProductQuery {
                category: category.map(CategoryId::new),
                search,
                page,
                limit,
            };
            let page = catalog.products(&query).await?;
            out.show(&page, |page| {
                let mut lines: Vec<String> = page
                    .products
                    .iter()
                    .map(|p| product_line(p, locale))
                    .collect();
                if let Some(pages) = page.pages {
                    lines.push(format!("Page {} of {pages}", page.page));
                }
                lines
            })?;
        }
        CatalogAction::Product { id } => {
            let product = catalog.product(&ProductId::new(id)).await?;
            out.show(&product, |p| {
                vec![
                    product_line(p, locale),
                    p.description.get(locale).to_owned(),
                ]
            })?;
        }
    }
    Ok(())
}

async fn checkout(shop: &Storefront, args: CheckoutArgs, out: &Output) -> CliResult {
    require_user(shop).await?;

    for raw in &args.items {
        let (id, qty) = parse_item(raw)?;
        let product = shop.catalog().product(&id).await?;
        shop.cart().add(&product, qty).await?;
    }

    shop.addresses().load().await?;
    let address = match &args.address {
        Some(id) => Some(AddressChoice::Saved(AddressId::new(id.as_str()))),
        None => shop
            .addresses()
            .selected()
            .await
            .map(|a| AddressChoice::Saved(a.id)),
    };

    let card = match &args.card {
        Some(id) => {
            let id = CardId::new(id.as_str());
            shop.payment_methods().load().await?;
            shop.payment_methods().select(&id).await?;
            Some(id)
        }
        None => None,
    };

    let promotion = match &args.promo {
        Some(code) => Some(shop.promotions().apply(code).await?),
        None => None,
    };

    let form = CheckoutForm {
        address,
        delivery: delivery_from(&args),
        payment: args.payment,
        card,
        promotion,
    };

    let checkout = shop.checkout();
    let totals = checkout.summary(&form).await;
    out.say(format!("Subtotal:  {}", totals.subtotal));
    out.say(format!("Shipping:  {}", totals.shipping));
    if totals.cash_fee > Money::ZERO {
        out.say(format!("Cash fee:  {}", totals.cash_fee));
    }
    if totals.savings() > Money::ZERO {
        out.say(format!("Discount: -{} ({})", totals.savings(), totals.discount));
    }
    out.say(format!("Total:     {}", totals.discounted_total));

    match checkout.submit(&form).await? {
        Route::OrderConfirmation(order) => out.show(order.as_ref(), order_lines)?,
        other => out.say(format!("Continue at {}", other.path())),
    }
    Ok(())
}
