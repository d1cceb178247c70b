//! Basket workflows: adding, removing and expanding cart or wishlist entries.

use tracing::{debug, info};

use tradepost_baskets::{Basket, BasketEntry, BasketKind};
use tradepost_catalog::Product;
use tradepost_core::{ProductId, UserId};

use crate::store::{BasketStore, ProductStore, PushOutcome};

use super::{ServiceError, ServiceResult};

/// Basket workflows over a basket store and the product catalog.
///
/// Cart and wishlist share every rule; the [`BasketKind`] argument picks the
/// document, nothing else changes.
#[derive(Debug)]
pub struct BasketService<B, P> {
    baskets: B,
    products: P,
}

impl<B, P> BasketService<B, P> {
    pub fn new(baskets: B, products: P) -> Self {
        Self { baskets, products }
    }
}

impl<B, P> BasketService<B, P>
where
    B: BasketStore,
    P: ProductStore,
{
    /// Add a product to the user's basket of the given kind.
    ///
    /// The membership decision belongs to the store, which checks and appends
    /// as one atomic step. A second add of the same product id fails with
    /// [`ServiceError::DuplicateItem`] and leaves the document untouched.
    pub async fn add_item(
        &self,
        user_id: &UserId,
        kind: BasketKind,
        product_id: ProductId,
        added_by: &UserId,
    ) -> ServiceResult<Basket> {
        let entry = BasketEntry::new(product_id, added_by.clone());
        match self
            .baskets
            .push_item_if_absent(user_id, kind, entry)
            .await?
        {
            PushOutcome::Added(basket) => {
                info!(
                    user_id = %user_id,
                    kind = %kind,
                    product_id = %product_id,
                    "basket item added"
                );
                Ok(basket)
            }
            PushOutcome::AlreadyPresent(_) => Err(ServiceError::DuplicateItem(format!(
                "product {product_id} is already in the {kind}"
            ))),
        }
    }

    /// Remove a product from the user's basket.
    ///
    /// Removing an id that is not present succeeds and returns the document
    /// unchanged. Only a user with no basket of this kind at all gets
    /// [`ServiceError::NotFound`].
    pub async fn remove_item(
        &self,
        user_id: &UserId,
        kind: BasketKind,
        product_id: ProductId,
    ) -> ServiceResult<Basket> {
        self.baskets
            .pull_items(user_id, kind, &[product_id])
            .await?
            .ok_or_else(|| ServiceError::NotFound(kind.as_str().to_string()))
    }

    /// Expand the basket into full product documents, in entry order.
    ///
    /// Entries whose listing has since been retired are dropped from the
    /// result; the basket document keeps the reference.
    pub async fn expanded(
        &self,
        user_id: &UserId,
        kind: BasketKind,
    ) -> ServiceResult<Vec<Product>> {
        let basket = self
            .baskets
            .find(user_id, kind)
            .await?
            .ok_or_else(|| ServiceError::NotFound(kind.as_str().to_string()))?;

        let mut products = Vec::with_capacity(basket.len());
        for entry in basket.items() {
            match self.products.find(entry.product_id).await? {
                Some(product) => products.push(product),
                None => {
                    debug!(
                        product_id = %entry.product_id,
                        kind = %kind,
                        "dropping basket entry for retired listing"
                    );
                }
            }
        }
        Ok(products)
    }
}
