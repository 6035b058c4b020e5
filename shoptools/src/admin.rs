use std::time::Duration;

use anyhow::{anyhow, Result};
use log::*;
use storefront_client::ReqwestTransport;
use storefront_engine::{
    store_types::{OrderId, OrderStatus},
    AggregatesView,
    DeadLetterFeed,
    FeedPoller,
    NotificationFeed,
    OrderAdminReconciler,
    StatsView,
};
use tokio::time::sleep;

use crate::{
    context::Shop,
    formatting::{format_aggregates, format_dead_letters, format_notifications, format_order, format_orders, format_stats},
};

async fn load_orders(shop: &Shop) -> Result<OrderAdminReconciler<ReqwestTransport>> {
    let mut admin = OrderAdminReconciler::new(shop.api.clone());
    admin.refresh().await;
    match admin.error() {
        Some(e) => Err(anyhow!("Could not load the orders. {e}")),
        None => Ok(admin),
    }
}

async fn select_order(shop: &Shop, id: OrderId) -> Result<OrderAdminReconciler<ReqwestTransport>> {
    let mut admin = load_orders(shop).await?;
    if !admin.select(id) {
        return Err(anyhow!("Order {id} does not exist"));
    }
    Ok(admin)
}

pub async fn list_orders(shop: &Shop, high_value: bool, search: Option<String>) -> Result<()> {
    let mut admin = load_orders(shop).await?;
    admin.set_high_value_only(high_value);
    if let Some(query) = search {
        admin.set_filter(query);
    }
    let visible = admin.visible_orders();
    let shown = visible.len();
    println!("{}", format_orders(visible, |o| admin.is_high_value(o)));
    println!("{shown} of {} orders shown. {} high value.", admin.orders().len(), admin.high_value_count());
    Ok(())
}

pub async fn show_order(shop: &Shop, id: OrderId) -> Result<()> {
    let admin = select_order(shop, id).await?;
    if let Some(order) = admin.selected() {
        println!("{}", format_order(order, admin.selected_is_high_value())?);
    }
    Ok(())
}

pub async fn set_status(shop: &Shop, id: OrderId, status: OrderStatus) -> Result<()> {
    let mut admin = select_order(shop, id).await?;
    let previous = admin.status_of_selected().unwrap_or_default();
    admin.edit_status(status)?;
    let saved = admin.save_status().await?;
    info!("📦️ Order {id} moved from {previous} to {}", saved.status_or_default());
    println!("{}", format_order(&saved, admin.is_high_value(&saved))?);
    Ok(())
}

pub async fn stats(shop: &Shop) -> Result<()> {
    let admin = load_orders(shop).await?;
    let mut view = StatsView::new();
    println!("{}", format_stats(view.update_now(admin.orders()))?);
    Ok(())
}

pub async fn aggregates(shop: &Shop) -> Result<()> {
    let mut view = AggregatesView::new(shop.api.clone());
    view.refresh().await;
    if let Some(e) = view.error() {
        return Err(anyhow!("Could not load the aggregates. {e}"));
    }
    println!("{}", format_aggregates(view.records()));
    Ok(())
}

/// Polls both feeds and prints each one whenever it changes, until interrupted or `seconds` have passed.
pub async fn watch(shop: &Shop, seconds: Option<u64>) -> Result<()> {
    let notifications = FeedPoller::new(NotificationFeed::new(shop.api.clone()));
    let dead_letters = FeedPoller::new(DeadLetterFeed::new(shop.api.clone()));
    let mut notification_rx = notifications.subscribe();
    let mut dead_letter_rx = dead_letters.subscribe();
    let mut handles = [notifications.start(), dead_letters.start()];
    let deadline = async {
        match seconds {
            Some(s) => sleep(Duration::from_secs(s)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            changed = notification_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = notification_rx.borrow_and_update().clone();
                if !snapshot.is_loading() {
                    println!("{}", format_notifications(&snapshot));
                }
            },
            changed = dead_letter_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = dead_letter_rx.borrow_and_update().clone();
                if !snapshot.is_loading() {
                    println!("{}", format_dead_letters(&snapshot));
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("🔔️ Interrupted");
                break;
            },
            _ = &mut deadline => break,
        }
    }
    handles.iter_mut().for_each(|h| h.stop());
    Ok(())
}

pub async fn clear_notifications(shop: &Shop) -> Result<()> {
    FeedPoller::new(NotificationFeed::new(shop.api.clone())).clear().await?;
    println!("Order notifications cleared");
    Ok(())
}

pub async fn clear_dead_letters(shop: &Shop) -> Result<()> {
    FeedPoller::new(DeadLetterFeed::new(shop.api.clone())).clear().await?;
    println!("Dead letters cleared");
    Ok(())
}
