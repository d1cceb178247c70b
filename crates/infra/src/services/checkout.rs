//! Order placement: one durable write, then idempotent cleanup.

use tracing::{info, warn};

use tradepost_baskets::BasketKind;
use tradepost_core::{ProductId, UserId};
use tradepost_orders::{Order, OrderDraft};

use crate::store::{BasketStore, OrderStore, ProductStore, StoreError};

use super::{ServiceError, ServiceResult};

/// Order placement workflow.
///
/// ## Execution Order
///
/// ```text
/// OrderDraft
///   ↓
/// 1. Validate the draft (pure; nothing is written on failure)
///   ↓
/// 2. Record the order (durable commit point)
///   ↓
/// 3. Pull the purchased ids from the buyer's cart (idempotent)
///   ↓
/// 4. Retire the purchased listings (idempotent)
/// ```
///
/// ## Failure Semantics
///
/// - Steps 1 and 2 failing leave no trace; the caller sees `Validation` or
///   `Persistence` and may simply retry the whole request.
/// - Steps 3 and 4 failing return [`ServiceError::Retraction`] carrying the
///   already persisted order. The order stands; only the cleanup is
///   outstanding, and [`CheckoutService::retract`] can be re-run until it
///   succeeds because both steps skip what is already gone.
///
/// The buyer's wishlist is deliberately left alone; only the cart is
/// cleared.
#[derive(Debug)]
pub struct CheckoutService<P, B, O> {
    products: P,
    baskets: B,
    orders: O,
}

impl<P, B, O> CheckoutService<P, B, O> {
    pub fn new(products: P, baskets: B, orders: O) -> Self {
        Self {
            products,
            baskets,
            orders,
        }
    }
}

impl<P, B, O> CheckoutService<P, B, O>
where
    P: ProductStore,
    B: BasketStore,
    O: OrderStore,
{
    /// Validate the draft, record the order, then clean up after it.
    pub async fn place_order(&self, draft: OrderDraft) -> ServiceResult<Order> {
        let order = draft.into_order()?;

        self.orders.insert(order.clone()).await?;
        info!(
            order_id = %order.id(),
            buyer_id = %order.buyer_id(),
            seller_id = %order.seller_id(),
            lines = order.lines().len(),
            "order recorded"
        );

        let product_ids = order.product_ids();
        if let Err(source) = self.retract(order.buyer_id(), &product_ids).await {
            warn!(
                order_id = %order.id(),
                error = %source,
                "order recorded but cleanup failed; retraction must be re-run"
            );
            return Err(ServiceError::Retraction {
                order: Box::new(order),
                source,
            });
        }

        Ok(order)
    }

    /// Clear the purchased ids from the buyer's cart and retire the
    /// listings. Safe to repeat: ids already cleared or retired are skipped.
    pub async fn retract(
        &self,
        buyer_id: &UserId,
        product_ids: &[ProductId],
    ) -> Result<(), StoreError> {
        self.baskets
            .pull_items(buyer_id, BasketKind::Cart, product_ids)
            .await?;
        self.products.delete_many(product_ids).await?;
        Ok(())
    }
}
