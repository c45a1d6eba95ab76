//! Demo registry and seeded store used by every command.

use docadmin_core::{CoreResult, InputFields, TypeRegistry};
use docadmin_server::{Admin, AdminResult};
use serde::{Deserialize, Serialize};

/// A catalog product.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: i64,
    pub tags: Vec<String>,
    pub in_stock: bool,
}

/// A customer order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Order {
    pub customer: String,
    pub product: String,
    pub quantity: i64,
    pub note: Option<String>,
}

/// An account.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub name: String,
    pub admin: bool,
}

/// Creates the demo registry.
pub fn registry() -> CoreResult<TypeRegistry> {
    let registry = TypeRegistry::new();
    registry.register::<Product>("shop.products")?;
    registry.register::<Order>("shop.orders")?;
    registry.register::<Account>("accounts.users")?;
    Ok(registry)
}

/// Inserts a few documents through the admin.
pub fn seed(admin: &Admin) -> AdminResult<()> {
    let products = [("Desk lamp", "2499", "lighting"), ("Notebook", "399", "paper")];
    for (name, price, tag) in products {
        let input = InputFields::new()
            .with("name", name)
            .with("price", price)
            .with("tags", tag)
            .with("in_stock", "true");
        admin.create("shop.products", &input)?;
    }

    let order = InputFields::new()
        .with("customer", "ada@example.com")
        .with("product", "Desk lamp")
        .with("quantity", "2");
    admin.create("shop.orders", &order)?;

    let account = InputFields::new()
        .with("email", "ada@example.com")
        .with("name", "Ada")
        .with("admin", "on");
    admin.create("accounts.users", &account)?;

    tracing::debug!("seeded demo store");
    Ok(())
}
