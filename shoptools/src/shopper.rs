use anyhow::{anyhow, Result};
use log::*;
use shop_common::helpers::non_empty;
use storefront_engine::{
    errors::ValidationError,
    orders::my_orders as fetch_my_orders,
    store_types::CartItem,
    SessionUser,
};

use crate::{
    context::Shop,
    formatting::{format_cart, format_order, format_orders},
    CartCommand,
    LoginParams,
};

pub async fn cart(shop: &Shop, command: CartCommand) -> Result<()> {
    let store = &shop.cart;
    let items = store.load();
    let items = match command {
        CartCommand::List => items,
        CartCommand::Add(params) => {
            let mut item = CartItem::new(params.id, params.name, params.price);
            if let Some(brand) = params.brand {
                item = item.with_brand(brand);
            }
            store.add_item(items, item)
        },
        CartCommand::Inc { id, by } => store.update_quantity(items, id, i64::from(by)),
        CartCommand::Dec { id, by } => store.update_quantity(items, id, -i64::from(by)),
        CartCommand::Remove { id } => store.remove_item(items, id),
        CartCommand::Clear => {
            store.clear();
            Vec::new()
        },
        CartCommand::Checkout => return checkout(shop, &items).await,
    };
    println!("{}", format_cart(&items));
    Ok(())
}

async fn checkout(shop: &Shop, items: &[CartItem]) -> Result<()> {
    let user_id = shop.session.user().and_then(|u| u.id);
    let service = shop.submission_service();
    match service.place_order(user_id, items).await? {
        Some(order) => println!("Thank you for your order!\n{}", format_order(&order, false)?),
        None => println!("Thank you for your order! It has been placed."),
    }
    Ok(())
}

pub async fn my_orders(shop: &Shop) -> Result<()> {
    let user = shop.session.user().ok_or(ValidationError::NotAuthenticated)?;
    let orders = fetch_my_orders(&shop.api, &user).await?;
    println!("{}", format_orders(&orders, |_| false));
    Ok(())
}

pub fn login(shop: &Shop, params: LoginParams) -> Result<()> {
    let token = non_empty(Some(params.token.as_str())).ok_or_else(|| anyhow!("The token cannot be empty"))?;
    let role = params.role();
    let user = SessionUser { id: params.user_id, email: params.email, role, ..Default::default() };
    shop.session.set_auth_token(Some(token));
    shop.session.set_user(&user);
    info!("🔑️ Signed in as {}", user.email.as_deref().unwrap_or("an anonymous user"));
    println!("Signed in{}", if user.is_admin() { " as an administrator" } else { "" });
    Ok(())
}

pub fn logout(shop: &Shop) -> Result<()> {
    shop.session.clear();
    println!("Signed out");
    Ok(())
}
