use std::cmp::Reverse;

use log::*;

use crate::{
    api::StorefrontApi,
    errors::ApiError,
    session::SessionUser,
    store_types::Order,
    traits::HttpTransport,
};

/// The signed-in customer's orders, newest first.
pub async fn my_orders<T: HttpTransport>(api: &StorefrontApi<T>, user: &SessionUser) -> Result<Vec<Order>, ApiError> {
    let orders = api.fetch_user_orders().await?;
    let mine = orders_for_user(orders, user);
    debug!("📦️ {} orders belong to the signed-in customer", mine.len());
    Ok(mine)
}

/// Keeps the orders owned by `user`, matched on user id or (case-insensitively) on email, and sorts them newest
/// first. Orders without a readable date go last.
pub fn orders_for_user(orders: Vec<Order>, user: &SessionUser) -> Vec<Order> {
    let email = user.email.as_deref().map(str::to_lowercase).filter(|e| !e.is_empty());
    let mut mine = orders
        .into_iter()
        .filter(|o| {
            let by_id = user.id.is_some() && o.owner_id() == user.id;
            let by_email = match (&email, o.customer_email()) {
                (Some(mine), Some(theirs)) => theirs.to_lowercase() == *mine,
                _ => false,
            };
            by_id || by_email
        })
        .collect::<Vec<_>>();
    mine.sort_by_key(|o| Reverse(o.placed_at()));
    mine
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::store_types::{OrderId, UserId};

    fn orders() -> Vec<Order> {
        serde_json::from_value(json!([
            {"id": 1, "user": {"id": 5}, "orderDate": "2024-03-01T10:00:00"},
            {"id": 2, "userEmail": "ANA@example.com", "createdAt": "2024-03-05"},
            {"id": 3, "user": {"id": 6, "email": "bob@example.com"}, "orderDate": "2024-03-09"},
            {"id": 4, "userId": 5},
            {"id": 5, "userId": 5, "orderDate": "2024-04-01T08:00:00Z"}
        ]))
        .unwrap()
    }

    #[test]
    fn filters_and_sorts_newest_first() {
        let user = SessionUser { id: Some(UserId(5)), email: Some("ana@example.com".into()), ..Default::default() };
        let ids = orders_for_user(orders(), &user).into_iter().map(|o| o.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![OrderId(5), OrderId(2), OrderId(1), OrderId(4)]);
    }

    #[test]
    fn anonymous_users_own_nothing() {
        assert!(orders_for_user(orders(), &SessionUser::default()).is_empty());
    }
}
