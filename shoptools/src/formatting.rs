use std::fmt::Write;

use anyhow::Result;
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};
use storefront_engine::{
    orders::total_of,
    store_types::{AggregateRecord, CartItem, DeadLetterItem, NotificationItem, Order},
    CartStore,
    FeedSnapshot,
    SalesStats,
};
use storefront_client::FileStore;

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_style(table: &mut Table) {
    table.set_format(markdown_format());
}

fn amount(order: &Order) -> String {
    total_of(order).map(|t| t.display_with_currency()).unwrap_or_else(|| "?".to_string())
}

pub fn format_orders<'a, I>(orders: I, is_high_value: impl Fn(&Order) -> bool) -> String
where I: IntoIterator<Item = &'a Order> {
    let mut table = Table::new();
    table.set_titles(row!["ID", "Status", "Customer", "Email", "Total", "HV", "Placed"]);
    let mut count = 0;
    for order in orders {
        count += 1;
        table.add_row(row![
            order.id,
            order.status_or_default(),
            order.customer_name().unwrap_or_default(),
            order.customer_email().unwrap_or_default(),
            r->amount(order),
            if is_high_value(order) { "★" } else { "" },
            order.placed_at_raw().unwrap_or_default()
        ]);
    }
    if count == 0 {
        return "No orders".to_string();
    }
    markdown_style(&mut table);
    table.to_string()
}

pub fn format_order(order: &Order, high_value: bool) -> Result<String> {
    let mut f = String::new();
    writeln!(
        f,
        "Order {id:<12} [{status:^12}] {hv}",
        id = order.id.to_string(),
        status = order.status_or_default().to_string(),
        hv = if high_value { "HIGH VALUE" } else { "" }
    )?;
    writeln!(f, "Placed:   {}", order.placed_at_raw().unwrap_or("Unknown"))?;
    writeln!(
        f,
        "Customer: {} <{}>",
        order.customer_name().unwrap_or_else(|| "Unknown".into()),
        order.customer_email().unwrap_or("no email")
    )?;
    writeln!(f, "Ship to:  {}", order.shipping_address.as_deref().unwrap_or("Not given"))?;
    writeln!(f, "-----------------------------------------------------------------------------")?;
    let mut table = Table::new();
    table.set_titles(row!["Product", "Name", "Qty", "Unit price"]);
    for line in &order.items {
        table.add_row(row![
            line.product_id().map(|id| id.to_string()).unwrap_or_default(),
            line.product_name().unwrap_or_default(),
            r->line.quantity_or_zero(),
            r->line.unit_price_or_zero().display_with_currency()
        ]);
    }
    markdown_style(&mut table);
    writeln!(f, "{table}")?;
    writeln!(f, "Total: {}", amount(order))?;
    Ok(f)
}

pub fn format_cart(items: &[CartItem]) -> String {
    if items.is_empty() {
        return "Your cart is empty".to_string();
    }
    let mut table = Table::new();
    table.set_titles(row!["Product", "Name", "Qty", "Price", "Line total"]);
    for item in items {
        table.add_row(row![
            item.id,
            item.name,
            r->item.quantity,
            r->item.price.display_with_currency(),
            r->item.line_total().display_with_currency()
        ]);
    }
    markdown_style(&mut table);
    format!("{table}\nTotal: {}", CartStore::<FileStore>::total(items).display_with_currency())
}

pub fn format_stats(stats: &SalesStats) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "===============================================================================")?;
    writeln!(
        f,
        "{count} orders. Revenue: {revenue}. Average order: {avg}",
        count = stats.order_count,
        revenue = stats.revenue.display_with_currency(),
        avg = stats.average_order_value.display_with_currency()
    )?;
    writeln!(f, "===============================================================================")?;
    let mut daily = Table::new();
    daily.set_titles(row!["Day", "Revenue"]);
    for day in &stats.daily {
        daily.add_row(row![day.day.format("%a %Y-%m-%d"), r->day.revenue.display_with_currency()]);
    }
    markdown_style(&mut daily);
    writeln!(f, "{daily}")?;
    let mut top = Table::new();
    top.set_titles(row!["#", "Product", "Name", "Brand", "Qty", "Revenue"]);
    for (i, p) in stats.top_products.iter().take(12).enumerate() {
        top.add_row(row![i + 1, p.id, p.name, p.brand, r->p.quantity, r->p.revenue.display_with_currency()]);
    }
    markdown_style(&mut top);
    write!(f, "{top}")?;
    Ok(f)
}

pub fn format_aggregates(records: &[AggregateRecord]) -> String {
    if records.is_empty() {
        return "No aggregates yet".to_string();
    }
    let mut table = Table::new();
    table.set_titles(row!["Customer", "Orders", "Total", "Last order"]);
    for record in records {
        table.add_row(row![
            record.customer_email.as_deref().unwrap_or("Unknown"),
            r->record.count.unwrap_or_default(),
            r->record.total.map(|t| t.display_with_currency()).unwrap_or_default(),
            record.last_created_at.as_deref().unwrap_or_default()
        ]);
    }
    markdown_style(&mut table);
    table.to_string()
}

fn feed_header<I>(name: &str, snapshot: &FeedSnapshot<I>) -> String {
    let status = match &snapshot.error {
        Some(e) => format!("error: {e}"),
        None => format!("{:?}", snapshot.status).to_lowercase(),
    };
    let updated = snapshot.last_updated.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_else(|| "never".into());
    format!("## {name}: {} ({status}, updated {updated})", snapshot.count())
}

pub fn format_notifications(snapshot: &FeedSnapshot<NotificationItem>) -> String {
    let mut table = Table::new();
    table.set_titles(row!["Order", "Customer", "Total", "Status", "At"]);
    for n in &snapshot.items {
        table.add_row(row![
            n.order_id.map(|id| id.to_string()).unwrap_or_default(),
            n.customer_email.as_deref().unwrap_or_default(),
            r->n.total.map(|t| t.display_with_currency()).unwrap_or_default(),
            n.status.as_ref().map(|s| s.to_string()).unwrap_or_default(),
            n.created_at.as_deref().unwrap_or_default()
        ]);
    }
    markdown_style(&mut table);
    format!("{}\n{table}", feed_header("Order notifications", snapshot))
}

pub fn format_dead_letters(snapshot: &FeedSnapshot<DeadLetterItem>) -> String {
    let mut table = Table::new();
    table.set_titles(row!["Type", "Reason", "At"]);
    for d in &snapshot.items {
        table.add_row(row![
            d.kind.as_deref().unwrap_or("?"),
            d.reason.as_deref().unwrap_or_default(),
            d.created_at.as_deref().unwrap_or_default()
        ]);
    }
    markdown_style(&mut table);
    format!("{}\n{table}", feed_header("Dead letters", snapshot))
}
