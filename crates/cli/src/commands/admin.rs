//! Back-office commands.
//!
//! Every command except `login` restores the admin session first and stops
//! with a sign-in hint when there is none.

use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use quickpick_admin::{
    AdminClient, CategoryInput, ImageUpload, OrderFilter, ProductInput, PromotionInput,
};
use quickpick_api::{ApiConfig, ApiError, Credentials, Restored};
use quickpick_core::{
    Category, CategoryId, CmsSetting, LocalizedText, Money, Order, OrderId,
    OrderStatus, PaymentStatus, Percentage, Product, ProductId, ProductQuery, Promotion,
    PromotionId, User, UserId,
};

use super::CliError;
use crate::output::Output;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Sign in as an administrator
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "QUICKPICK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out of the back office
    Logout,
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// List orders
    Orders {
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        payment_status: Option<PaymentStatus>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one order
    Order { id: String },
    /// Move an order to a new status
    OrderStatus { id: String, status: OrderStatus },
    /// Set an order's payment status
    PaymentStatus {
        id: String,
        payment_status: PaymentStatus,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage promo codes
    Promotions {
        #[command(subcommand)]
        action: PromotionAction,
    },
    /// Manage CMS settings
    Settings {
        #[command(subcommand)]
        action: SettingAction,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List all categories, hidden ones included
    List,
    /// Create a category
    Create {
        name: String,
        /// Create it hidden from the storefront
        #[arg(long)]
        hidden: bool,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Show a category on the storefront
    Show { id: String },
    /// Hide a category from the storefront
    Hide { id: String },
    /// Delete a category
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products
    List {
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Create a product
    Create(ProductArgs),
    /// Replace a product's fields
    Update {
        id: String,
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Delete a product
    Delete { id: String },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    price: Money,
    #[arg(long)]
    stock: u32,
    #[arg(long)]
    category: Option<String>,
    /// Image file (jpg, png, webp or gif)
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List users
    List,
    /// Grant or revoke admin rights
    ToggleAdmin { id: String },
    /// Delete a user
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum PromotionAction {
    /// List promo codes
    List,
    /// Create a promo code
    Create {
        code: String,
        /// Discount percentage, e.g. `10` or `10%`
        discount: Percentage,
        /// Last valid day (YYYY-MM-DD)
        #[arg(long)]
        expires: Option<NaiveDate>,
        /// Create it switched off
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a promo code
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum SettingAction {
    /// List settings
    List,
    /// Create or replace a setting
    Set {
        key: String,
        /// Text value
        #[arg(long)]
        text: Option<String>,
        /// Locale of the text (defaults to QUICKPICK_LOCALE)
        #[arg(long)]
        locale: Option<String>,
        /// Image file
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a setting
    Delete { key: String },
}

fn connect() -> Result<(AdminClient, ApiConfig), Box<dyn Error>> {
    let config = ApiConfig::from_env()?;
    let admin = AdminClient::new(&config)?;
    Ok((admin, config))
}

async fn require_admin(admin: &AdminClient) -> Result<User, CliError> {
    match admin.restore().await {
        Restored::Active(user) => Ok(user),
        Restored::SignedOut(route) => Err(CliError::signed_out(&route)),
    }
}

async fn load_image(path: Option<PathBuf>) -> Result<Option<ImageUpload>, Box<dyn Error>> {
    match path {
        Some(path) => Ok(Some(ImageUpload::from_path(path).await?)),
        None => Ok(None),
    }
}

async fn find_category(admin: &AdminClient, id: &str) -> Result<Category, Box<dyn Error>> {
    admin
        .get_categories()
        .await?
        .into_iter()
        .find(|c| c.id.as_str() == id)
        .ok_or_else(|| ApiError::NotFound(format!("category {id}")).into())
}

fn category_line(category: &Category, locale: &str) -> String {
    format!(
        "{}  {}{}",
        category.id,
        category.name.get(locale),
        if category.is_visible { "" } else { "  (hidden)" }
    )
}

fn product_line(product: &Product, locale: &str) -> String {
    format!(
        "{}  {}  {}  stock {}",
        product.id,
        product.name.get(locale),
        product.price,
        product.stock
    )
}

fn order_line(order: &Order) -> String {
    format!(
        "{}  {}  {} ({})  {}  {}",
        order.id,
        order.status,
        order.payment_method,
        order.payment_status,
        order.total,
        order.shipping_address.full_name
    )
}

fn user_line(user: &User) -> String {
    format!(
        "{}  {} <{}>{}",
        user.id,
        user.name,
        user.email,
        if user.is_admin { "  (admin)" } else { "" }
    )
}

fn promotion_line(promotion: &Promotion) -> String {
    let expires = promotion
        .expires_at
        .map_or_else(|| "never".to_owned(), |at| at.format("%Y-%m-%d").to_string());
    format!(
        "{}  {}  {} off  expires {expires}{}",
        promotion.id.as_ref().map_or("-", PromotionId::as_str),
        promotion.code,
        promotion.discount,
        if promotion.is_active { "" } else { "  (inactive)" }
    )
}

fn setting_line(setting: &CmsSetting, locale: &str) -> String {
    match &setting.image {
        Some(image) => format!("{}: {}  [{image}]", setting.key, setting.value.get(locale)),
        None => format!("{}: {}", setting.key, setting.value.get(locale)),
    }
}

impl ProductArgs {
    fn input(&self) -> ProductInput {
        ProductInput {
            name: LocalizedText::plain(self.name.as_str()),
            description: LocalizedText::plain(self.description.as_str()),
            price: self.price,
            stock: self.stock,
            category_id: self.category.as_deref().map(CategoryId::new),
        }
    }
}

/// Run a back-office command.
#[allow(clippy::too_many_lines)]
pub async fn run(action: AdminAction, out: &Output) -> CliResult {
    let (admin, config) = connect()?;
    let locale = config.locale.as_str();

    match action {
        AdminAction::Login { email, password } => {
            let credentials = Credentials::parse(&email, &password)?;
            let user = admin.login(&credentials).await?;
            out.show(&user, |u| vec![format!("Signed in as {}", user_line(u))])?;
            return Ok(());
        }
        AdminAction::Logout => {
            admin.restore().await;
            let route = admin.logout().await;
            out.say(format!("Signed out ({})", route.path()));
            return Ok(());
        }
        _ => {}
    }

    require_admin(&admin).await?;

    match action {
        AdminAction::Login { .. } | AdminAction::Logout => {}
        AdminAction::Categories { action } => categories(&admin, action, locale, out).await?,
        AdminAction::Products { action } => products(&admin, action, locale, out).await?,
        AdminAction::Orders {
            status,
            payment_status,
            page,
        } => {
            let filter = OrderFilter {
                status,
                payment_status,
                page,
            };
            let orders = admin.get_orders(&filter).await?;
            out.show(&orders, |list| list.iter().map(order_line).collect())?;
        }
        AdminAction::Order { id } => {
            let order = admin.get_order(&OrderId::new(id)).await?;
            out.show(&order, |o| {
                let mut lines = vec![order_line(o)];
                lines.extend(o.items.iter().map(|item| {
                    format!(
                        "  {} x{} @ {}",
                        item.name
                            .as_ref()
                            .map_or(item.product_id.as_str(), |n| n.get(locale)),
                        item.quantity,
                        item.price
                    )
                }));
                lines.push(format!("  Ship to: {}", o.shipping_address.one_line()));
                lines
            })?;
        }
        AdminAction::OrderStatus { id, status } => {
            let order = admin.get_order(&OrderId::new(id)).await?;
            let order = admin.update_order_status(&order, status).await?;
            out.show(&order, |o| vec![order_line(o)])?;
        }
        AdminAction::PaymentStatus { id, payment_status } => {
            let order = admin
                .update_payment_status(&OrderId::new(id), payment_status)
                .await?;
            out.show(&order, |o| vec![order_line(o)])?;
        }
        AdminAction::Users { action } => match action {
            UserAction::List => {
                let users = admin.get_users().await?;
                out.show(&users, |list| list.iter().map(user_line).collect())?;
            }
            UserAction::ToggleAdmin { id } => {
                let user = admin.get_user(&UserId::new(id)).await?;
                let user = admin.toggle_admin(&user).await?;
                out.show(&user, |u| vec![user_line(u)])?;
            }
            UserAction::Delete { id } => {
                admin.delete_user(&UserId::new(id)).await?;
                out.say("User deleted");
            }
        },
        AdminAction::Promotions { action } => match action {
            PromotionAction::List => {
                let promotions = admin.get_promotions().await?;
                out.show(&promotions, |list| list.iter().map(promotion_line).collect())?;
            }
            PromotionAction::Create {
                code,
                discount,
                expires,
                inactive,
            } => {
                let promotion = admin
                    .create_promotion(&PromotionInput {
                        code,
                        discount,
                        expires_at: expires
                            .and_then(|d| d.and_hms_opt(23, 59, 59))
                            .map(|naive| naive.and_utc()),
                        is_active: !inactive,
                    })
                    .await?;
                out.show(&promotion, |p| vec![promotion_line(p)])?;
            }
            PromotionAction::Delete { id } => {
                admin.delete_promotion(&PromotionId::new(id)).await?;
                out.say("Promotion deleted");
            }
        },
        AdminAction::Settings { action } => match action {
            SettingAction::List => {
                let settings = admin.get_settings().await?;
                out.show(&settings, |list| {
                    list.iter().map(|s| setting_line(s, locale)).collect()
                })?;
            }
            SettingAction::Set {
                key,
                text,
                locale: text_locale,
                image,
            } => {
                let value = text.map_or_else(LocalizedText::default, |text| {
                    LocalizedText::default()
                        .with(text_locale.as_deref().unwrap_or(locale), text)
                });
                let image = load_image(image).await?;
                let setting = admin.upsert_setting(&key, &value, image).await?;
                out.show(&setting, |s| vec![setting_line(s, locale)])?;
            }
            SettingAction::Delete { key } => {
                admin.delete_setting(&key).await?;
                out.say("Setting deleted");
            }
        },
    }
    Ok(())
}

async fn categories(
    admin: &AdminClient,
    action: CategoryAction,
    locale: &str,
    out: &Output,
) -> CliResult {
    match action {
        CategoryAction::List => {
            let list = admin.get_categories().await?;
            out.show(&list, |l| l.iter().map(|c| category_line(c, locale)).collect())?;
        }
        CategoryAction::Create {
            name,
            hidden,
            image,
        } => {
            let category = admin
                .create_category(&CategoryInput {
                    name: LocalizedText::default().with(locale, name),
                    is_visible: !hidden,
                    image,
                })
                .await?;
            out.show(&category, |c| vec![category_line(c, locale)])?;
        }
        CategoryAction::Show { id } => {
            let category = find_category(admin, &id).await?;
            let category = admin.set_category_visibility(&category, true).await?;
            out.show(&category, |c| vec![category_line(c, locale)])?;
        }
        CategoryAction::Hide { id } => {
            let category = find_category(admin, &id).await?;
            let category = admin.set_category_visibility(&category, false).await?;
            out.show(&category, |c| vec![category_line(c, locale)])?;
        }
        CategoryAction::Delete { id } => {
            admin.delete_category(&CategoryId::new(id)).await?;
            out.say("Category deleted");
        }
    }
    Ok(())
}

async fn products(
    admin: &AdminClient,
    action: ProductAction,
    locale: &str,
    out: &Output,
) -> CliResult {
    match action {
        ProductAction::List {
            category,
            search,
            page,
        } => {
            let query = ProductQuery {
                category: category.map(CategoryId::new),
                search,
                page,
                limit: None,
            };
            let list = admin.get_products(&query).await?;
            out.show(&list, |l| l.iter().map(|p| product_line(p, locale)).collect())?;
        }
        ProductAction::Create(args) => {
            let image = load_image(args.image.clone()).await?;
            let product = admin.create_product(args.input(), image).await?;
            out.show(&product, |p| vec![product_line(p, locale)])?;
        }
        ProductAction::Update { id, product } => {
            let image = load_image(product.image.clone()).await?;
            let updated = admin
                .update_product(&ProductId::new(id), product.input(), image)
                .await?;
            out.show(&updated, |p| vec![product_line(p, locale)])?;
        }
        ProductAction::Delete { id } => {
            admin.delete_product(&ProductId::new(id)).await?;
            out.say("Product deleted");
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quickpick_core::DEFAULT_LOCALE;

    use super::*;

    #[test]
    fn test_product_args_input() {
        let args = ProductArgs {
            name: "Bananas".to_owned(),
            description: String::new(),
            price: "1.25".parse().unwrap(),
            stock: 40,
            category: Some("fruit".to_owned()),
            image: None,
        };
        let input = args.input();
        assert_eq!(input.name.get(DEFAULT_LOCALE), "Bananas");
        assert_eq!(input.category_id, Some(CategoryId::new("fruit")));
        assert_eq!(input.stock, 40);
    }
}
