use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use tradepost_baskets::{Basket, BasketEntry, BasketKind};
use tradepost_catalog::{Category, Product};
use tradepost_core::{ProductId, UserId};
use tradepost_orders::Order;

/// Store operation error.
///
/// These are **infrastructure errors** (backend failures, documents that fail
/// to encode or decode) as opposed to domain errors (validation, duplicates).
/// Services wrap them; they never carry business meaning on their own.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend failure: {0}")]
    Backend(String),

    #[error("document serialization failed: {0}")]
    Serialization(String),
}

/// Outcome of [`BasketStore::push_item_if_absent`].
///
/// Both variants carry the basket document as it stood when the store made
/// the membership decision, so callers never need a follow-up read to report
/// what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The entry was appended. The document was created first if the user had
    /// no basket of this kind yet.
    Added(Basket),
    /// The product id was already present. The document was left untouched.
    AlreadyPresent(Basket),
}

/// Persistence for product listings.
///
/// Listings are whole documents keyed by [`ProductId`]. List operations
/// return results in creation order; ids are time-ordered, so sorting by id
/// is sufficient and both backends do exactly that.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a listing, replacing any existing document with the same id.
    async fn put(&self, product: Product) -> Result<(), StoreError>;

    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// List all listings, optionally restricted to an exact category match.
    async fn list(&self, category: Option<&Category>) -> Result<Vec<Product>, StoreError>;

    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Product>, StoreError>;

    /// Delete one listing. Returns `false` if no document had this id.
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Delete a batch of listings, skipping ids with no document. Returns the
    /// number actually removed, so the call is safe to repeat.
    async fn delete_many(&self, ids: &[ProductId]) -> Result<usize, StoreError>;
}

/// Persistence for basket documents (carts and wishlists).
///
/// ## Document Identity
///
/// A user owns at most one basket per [`BasketKind`]; the store key is
/// `(user_id, kind)`. Documents are created lazily by the first push and are
/// never deleted, they just become empty.
///
/// ## Membership Is Decided by the Store
///
/// `push_item_if_absent` is the only way an entry enters a basket, and the
/// membership check plus the append happen as one atomic step against the
/// backend. Two racing pushes of the same product id therefore resolve to
/// exactly one [`PushOutcome::Added`] and one [`PushOutcome::AlreadyPresent`],
/// never a doubled entry. A read-modify-write sequence in the caller could
/// not give that guarantee.
///
/// ## Idempotent Removal
///
/// `pull_items` removes whatever subset of the given ids is present and
/// succeeds regardless, so retraction after a checkout can be re-run until
/// it sticks without multiplying effects.
#[async_trait]
pub trait BasketStore: Send + Sync {
    async fn find(&self, user_id: &UserId, kind: BasketKind)
        -> Result<Option<Basket>, StoreError>;

    /// Append `entry` to the user's basket unless its product id is already
    /// present. Creates the document on first use. Atomic per document.
    async fn push_item_if_absent(
        &self,
        user_id: &UserId,
        kind: BasketKind,
        entry: BasketEntry,
    ) -> Result<PushOutcome, StoreError>;

    /// Remove every entry whose product id appears in `product_ids`. Ids not
    /// present are skipped. Returns the updated document, or `None` if the
    /// user has no basket of this kind.
    async fn pull_items(
        &self,
        user_id: &UserId,
        kind: BasketKind,
        product_ids: &[ProductId],
    ) -> Result<Option<Basket>, StoreError>;
}

/// Persistence for placed orders.
///
/// Orders are immutable once written; there is no update or delete. History
/// queries return orders in placement order (ids are time-ordered) and an
/// empty vector for a user with no orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Record an order durably. This is the commit point of checkout: once
    /// this returns `Ok`, the order exists no matter what happens after.
    async fn insert(&self, order: Order) -> Result<(), StoreError>;

    async fn list_by_buyer(&self, buyer_id: &UserId) -> Result<Vec<Order>, StoreError>;

    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Order>, StoreError>;
}

/// Shared handle to a product store, usable wherever the concrete backend is
/// chosen at runtime.
pub type DynProductStore = Arc<dyn ProductStore>;
pub type DynBasketStore = Arc<dyn BasketStore>;
pub type DynOrderStore = Arc<dyn OrderStore>;

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn put(&self, product: Product) -> Result<(), StoreError> {
        (**self).put(product).await
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find(id).await
    }

    async fn list(&self, category: Option<&Category>) -> Result<Vec<Product>, StoreError> {
        (**self).list(category).await
    }

    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Product>, StoreError> {
        (**self).list_by_seller(seller_id).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn delete_many(&self, ids: &[ProductId]) -> Result<usize, StoreError> {
        (**self).delete_many(ids).await
    }
}

#[async_trait]
impl<S> BasketStore for Arc<S>
where
    S: BasketStore + ?Sized,
{
    async fn find(
        &self,
        user_id: &UserId,
        kind: BasketKind,
    ) -> Result<Option<Basket>, StoreError> {
        (**self).find(user_id, kind).await
    }

    async fn push_item_if_absent(
        &self,
        user_id: &UserId,
        kind: BasketKind,
        entry: BasketEntry,
    ) -> Result<PushOutcome, StoreError> {
        (**self).push_item_if_absent(user_id, kind, entry).await
    }

    async fn pull_items(
        &self,
        user_id: &UserId,
        kind: BasketKind,
        product_ids: &[ProductId],
    ) -> Result<Option<Basket>, StoreError> {
        (**self).pull_items(user_id, kind, product_ids).await
    }
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn insert(&self, order: Order) -> Result<(), StoreError> {
        (**self).insert(order).await
    }

    async fn list_by_buyer(&self, buyer_id: &UserId) -> Result<Vec<Order>, StoreError> {
        (**self).list_by_buyer(buyer_id).await
    }

    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Order>, StoreError> {
        (**self).list_by_seller(seller_id).await
    }
}
