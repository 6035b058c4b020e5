use std::collections::HashMap;

use chrono::{Days, NaiveDate, Utc};
use log::*;
use shop_common::Money;

use crate::{
    helpers::day_key,
    orders::total_of,
    store_types::{Order, OrderId, ProductId},
};

/// Days covered by the revenue histogram, ending today.
pub const HISTOGRAM_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRevenue {
    pub day: NaiveDate,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSales {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub quantity: i64,
    pub revenue: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesStats {
    pub revenue: Money,
    pub order_count: usize,
    pub average_order_value: Money,
    /// One entry per day, oldest first, always [`HISTOGRAM_DAYS`] long.
    pub daily: Vec<DailyRevenue>,
    /// Best sellers by quantity. Ties keep the order in which products were first seen.
    pub top_products: Vec<ProductSales>,
}

/// Read-model over an order list. It never fetches; feed it the list the admin view already holds.
pub struct StatsAggregator;

impl StatsAggregator {
    pub fn compute(orders: &[Order], today: NaiveDate) -> SalesStats {
        let revenue = orders.iter().fold(Money::ZERO, |acc, order| add_or_skip(acc, total_of(order), order.id));
        let order_count = orders.len();
        let stats = SalesStats {
            revenue,
            order_count,
            average_order_value: revenue.average_over(order_count),
            daily: Self::daily_revenue(orders, today),
            top_products: Self::product_ranking(orders),
        };
        trace!("📊️ {order_count} orders, revenue {revenue}, {} products", stats.top_products.len());
        stats
    }

    /// Revenue per calendar day for the [`HISTOGRAM_DAYS`] days ending on `today`. Orders without a readable date,
    /// or dated outside the window, are left out.
    pub fn daily_revenue(orders: &[Order], today: NaiveDate) -> Vec<DailyRevenue> {
        let mut days = (0..HISTOGRAM_DAYS)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|day| DailyRevenue { day, revenue: Money::ZERO })
            .collect::<Vec<_>>();
        for order in orders {
            let Some(day) = order.placed_at().map(|dt| day_key(&dt)) else {
                continue;
            };
            if let Some(bucket) = days.iter_mut().find(|d| d.day == day) {
                bucket.revenue = add_or_skip(bucket.revenue, total_of(order), order.id);
            }
        }
        days
    }

    /// Quantity and revenue per product, best sellers first. Lines without a product id are skipped.
    pub fn product_ranking(orders: &[Order]) -> Vec<ProductSales> {
        let mut ranking: Vec<ProductSales> = Vec::new();
        let mut index: HashMap<ProductId, usize> = HashMap::new();
        for (order, line) in orders.iter().flat_map(|o| o.items.iter().map(move |line| (o, line))) {
            let Some(id) = line.product_id() else {
                continue;
            };
            let quantity = line.quantity_or_zero();
            let revenue = line.unit_price_or_zero().checked_mul_qty(quantity);
            let pos = *index.entry(id).or_insert_with(|| {
                ranking.push(ProductSales {
                    id,
                    name: line.product_name().unwrap_or("Unknown").to_string(),
                    brand: line.product_brand().unwrap_or("Unknown").to_string(),
                    quantity: 0,
                    revenue: Money::ZERO,
                });
                ranking.len() - 1
            });
            let entry = &mut ranking[pos];
            entry.quantity = entry.quantity.saturating_add(quantity);
            entry.revenue = add_or_skip(entry.revenue, revenue, order.id);
        }
        ranking.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        ranking
    }
}

/// Adds an order's (or a line's) amount to a running sum. Amounts that could not be computed, or that would overflow
/// the sum, are left out.
fn add_or_skip(sum: Money, amount: Option<Money>, order: OrderId) -> Money {
    match amount.map(|a| sum.checked_add(a)) {
        Some(Some(total)) => total,
        Some(None) => {
            warn!("📊️ Leaving order {order} out of the stats: the sum would overflow");
            sum
        },
        None => {
            warn!("📊️ Leaving order {order} out of the stats: its amount does not fit");
            sum
        },
    }
}

/// The stats page: the computed stats plus the product currently shown in the detail panel.
#[derive(Debug, Clone, Default)]
pub struct StatsView {
    stats: SalesStats,
    focused: Option<ProductId>,
}

impl StatsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes from `orders`. The focused product is kept if it still appears, otherwise focus moves to the
    /// best seller.
    pub fn update(&mut self, orders: &[Order], today: NaiveDate) -> &SalesStats {
        self.stats = StatsAggregator::compute(orders, today);
        let still_there = self.focused.filter(|id| self.stats.top_products.iter().any(|p| p.id == *id));
        self.focused = still_there.or_else(|| self.stats.top_products.first().map(|p| p.id));
        &self.stats
    }

    pub fn update_now(&mut self, orders: &[Order]) -> &SalesStats {
        self.update(orders, Utc::now().date_naive())
    }

    pub fn stats(&self) -> &SalesStats {
        &self.stats
    }

    pub fn focus(&mut self, id: ProductId) -> bool {
        if self.stats.top_products.iter().any(|p| p.id == id) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    pub fn focused(&self) -> Option<&ProductSales> {
        self.focused.and_then(|id| self.stats.top_products.iter().find(|p| p.id == id))
    }
}
