use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{DomainError, DomainResult, ProductId, UserId};

/// The two basket flavours share one document shape and one rule set; only
/// their role differs (carts feed checkout, wishlists are bookmarks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasketKind {
    Cart,
    Wishlist,
}

impl BasketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BasketKind::Cart => "cart",
            BasketKind::Wishlist => "wishlist",
        }
    }
}

impl core::fmt::Display for BasketKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for BasketKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(BasketKind::Cart),
            "wishlist" => Ok(BasketKind::Wishlist),
            other => Err(DomainError::validation(format!(
                "unknown basket kind '{other}'"
            ))),
        }
    }
}

/// A single basket membership: which product, who put it there, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketEntry {
    pub product_id: ProductId,
    pub added_by: UserId,
    pub added_at: DateTime<Utc>,
}

impl BasketEntry {
    pub fn new(product_id: ProductId, added_by: UserId) -> Self {
        Self {
            product_id,
            added_by,
            added_at: Utc::now(),
        }
    }
}

/// A user's basket document, keyed by `(user_id, kind)`.
///
/// Invariant: `items` holds each product id at most once, in the order the
/// entries were added. Adding an id that is already present is an error and
/// leaves the document untouched; removal is idempotent. The document itself
/// is never deleted, it just becomes empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    user_id: UserId,
    kind: BasketKind,
    /// Who performed the most recent successful add. Removals leave it as-is.
    last_added_by: Option<UserId>,
    items: Vec<BasketEntry>,
}

impl Basket {
    /// Create an empty basket for a user.
    pub fn new(user_id: UserId, kind: BasketKind) -> Self {
        Self {
            user_id,
            kind,
            last_added_by: None,
            items: Vec::new(),
        }
    }

    /// Rehydrate a basket from stored parts.
    ///
    /// Callers must supply `items` already free of duplicate product ids;
    /// stores only ever persist arrays that went through [`Basket::add`].
    pub fn from_parts(
        user_id: UserId,
        kind: BasketKind,
        last_added_by: Option<UserId>,
        items: Vec<BasketEntry>,
    ) -> Self {
        Self {
            user_id,
            kind,
            last_added_by,
            items,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn kind(&self) -> BasketKind {
        self.kind
    }

    pub fn last_added_by(&self) -> Option<&UserId> {
        self.last_added_by.as_ref()
    }

    pub fn items(&self) -> &[BasketEntry] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|e| e.product_id == *product_id)
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|e| e.product_id).collect()
    }

    /// Append an entry, rejecting duplicates.
    ///
    /// On success the entry goes to the end of the list and the document's
    /// provenance marker is updated.
    pub fn add(&mut self, entry: BasketEntry) -> DomainResult<()> {
        if self.contains(&entry.product_id) {
            return Err(DomainError::duplicate_item(format!(
                "product {} is already in the {}",
                entry.product_id, self.kind
            )));
        }
        self.last_added_by = Some(entry.added_by.clone());
        self.items.push(entry);
        Ok(())
    }

    /// Remove one product id. Removing an id that is not present is a no-op.
    ///
    /// Returns whether an entry was actually removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|e| e.product_id != *product_id);
        self.items.len() != before
    }

    /// Remove every entry whose product id appears in `product_ids`.
    ///
    /// Ids with no matching entry are skipped, so re-running the same removal
    /// converges on the same document. Returns how many entries were removed.
    pub fn remove_all(&mut self, product_ids: &[ProductId]) -> usize {
        let before = self.items.len();
        self.items.retain(|e| !product_ids.contains(&e.product_id));
        before - self.items.len()
    }
}
