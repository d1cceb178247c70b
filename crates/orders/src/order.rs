use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_catalog::Category;
use tradepost_core::{DomainError, DomainResult, OrderId, ProductId, UserId};

/// A by-value snapshot of one purchased product.
///
/// Lines are frozen copies of what the buyer saw at checkout. Later changes
/// to the catalog (including the listing's deletion, which checkout itself
/// performs) must never show through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub title: String,
    pub description: String,
    /// Price in smallest currency unit (e.g., cents).
    pub price: u64,
    pub category: Category,
    pub image_url: Option<String>,
}

/// A completed purchase.
///
/// Orders are immutable once placed; there are no mutating operations, only
/// construction via [`OrderDraft::into_order`] and rehydration from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    buyer_id: UserId,
    seller_id: UserId,
    placed_at: DateTime<Utc>,
    lines: Vec<LineItem>,
}

impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn buyer_id(&self) -> &UserId {
        &self.buyer_id
    }

    pub fn seller_id(&self) -> &UserId {
        &self.seller_id
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Product ids covered by this order (used for cart retraction and
    /// listing retirement after the order is durable).
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|l| l.product_id).collect()
    }
}

/// Unvalidated order input: buyer, seller, and the submitted line snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderDraft {
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub lines: Vec<LineItem>,
}

impl OrderDraft {
    /// Validate the draft and mint the order.
    ///
    /// A legal cart holds each product id at most once, so a repeated id in
    /// the submitted snapshots means the caller assembled the draft wrong.
    pub fn into_order(self) -> DomainResult<Order> {
        if self.lines.is_empty() {
            return Err(DomainError::validation(
                "an order must contain at least one product",
            ));
        }

        let mut seen = HashSet::with_capacity(self.lines.len());
        for line in &self.lines {
            if line.title.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "product {} has an empty title",
                    line.product_id
                )));
            }
            if !seen.insert(line.product_id) {
                return Err(DomainError::validation(format!(
                    "product {} appears more than once",
                    line.product_id
                )));
            }
        }

        Ok(Order {
            id: OrderId::new(),
            buyer_id: self.buyer_id,
            seller_id: self.seller_id,
            placed_at: Utc::now(),
            lines: self.lines,
        })
    }
}
