use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use tradepost_baskets::{Basket, BasketEntry, BasketKind};
use tradepost_catalog::{Category, Product};
use tradepost_core::{ProductId, UserId};
use tradepost_orders::Order;

use super::r#trait::{BasketStore, OrderStore, ProductStore, PushOutcome, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BasketKey {
    user_id: UserId,
    kind: BasketKind,
}

/// In-memory backend for all three collections.
///
/// Intended for tests/dev. Documents are cloned in and out; basket atomicity
/// comes from holding the write lock across the membership check and the
/// append.
#[derive(Debug, Default)]
pub struct InMemoryStores {
    products: RwLock<HashMap<ProductId, Product>>,
    baskets: RwLock<HashMap<BasketKey, Basket>>,
    orders: RwLock<Vec<Order>>,
}

impl InMemoryStores {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl ProductStore for InMemoryStores {
    async fn put(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        products.insert(product.id, product);
        Ok(())
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.get(&id).cloned())
    }

    async fn list(&self, category: Option<&Category>) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        let mut matched: Vec<Product> = products
            .values()
            .filter(|p| category.is_none_or(|c| &p.category == c))
            .cloned()
            .collect();
        matched.sort_by_key(|p| *p.id.as_uuid());
        Ok(matched)
    }

    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        let mut matched: Vec<Product> = products
            .values()
            .filter(|p| &p.seller_id == seller_id)
            .cloned()
            .collect();
        matched.sort_by_key(|p| *p.id.as_uuid());
        Ok(matched)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        Ok(products.remove(&id).is_some())
    }

    async fn delete_many(&self, ids: &[ProductId]) -> Result<usize, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        let mut removed = 0;
        for id in ids {
            if products.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl BasketStore for InMemoryStores {
    async fn find(
        &self,
        user_id: &UserId,
        kind: BasketKind,
    ) -> Result<Option<Basket>, StoreError> {
        let baskets = self.baskets.read().map_err(|_| poisoned())?;
        let key = BasketKey {
            user_id: user_id.clone(),
            kind,
        };
        Ok(baskets.get(&key).cloned())
    }

    async fn push_item_if_absent(
        &self,
        user_id: &UserId,
        kind: BasketKind,
        entry: BasketEntry,
    ) -> Result<PushOutcome, StoreError> {
        let mut baskets = self.baskets.write().map_err(|_| poisoned())?;
        let key = BasketKey {
            user_id: user_id.clone(),
            kind,
        };
        let basket = baskets
            .entry(key)
            .or_insert_with(|| Basket::new(user_id.clone(), kind));

        // `Basket::add` rejects a duplicate id without touching the document.
        match basket.add(entry) {
            Ok(()) => Ok(PushOutcome::Added(basket.clone())),
            Err(_) => Ok(PushOutcome::AlreadyPresent(basket.clone())),
        }
    }

    async fn pull_items(
        &self,
        user_id: &UserId,
        kind: BasketKind,
        product_ids: &[ProductId],
    ) -> Result<Option<Basket>, StoreError> {
        let mut baskets = self.baskets.write().map_err(|_| poisoned())?;
        let key = BasketKey {
            user_id: user_id.clone(),
            kind,
        };
        match baskets.get_mut(&key) {
            Some(basket) => {
                basket.remove_all(product_ids);
                Ok(Some(basket.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryStores {
    async fn insert(&self, order: Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().map_err(|_| poisoned())?;
        orders.push(order);
        Ok(())
    }

    async fn list_by_buyer(&self, buyer_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        Ok(orders
            .iter()
            .filter(|o| o.buyer_id() == buyer_id)
            .cloned()
            .collect())
    }

    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        Ok(orders
            .iter()
            .filter(|o| o.seller_id() == seller_id)
            .cloned()
            .collect())
    }
}
