//! Order history queries.

use tradepost_core::UserId;
use tradepost_orders::Order;

use crate::store::OrderStore;

use super::ServiceResult;

/// Read side of order history.
///
/// Both queries are exact matches on the stored id and return orders in
/// placement order. A user with no orders gets an empty list, never an
/// error.
#[derive(Debug)]
pub struct OrderQueries<O> {
    orders: O,
}

impl<O> OrderQueries<O> {
    pub fn new(orders: O) -> Self {
        Self { orders }
    }
}

impl<O> OrderQueries<O>
where
    O: OrderStore,
{
    pub async fn by_buyer(&self, buyer_id: &UserId) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list_by_buyer(buyer_id).await?)
    }

    pub async fn by_seller(&self, seller_id: &UserId) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list_by_seller(seller_id).await?)
    }
}
