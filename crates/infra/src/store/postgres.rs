//! Postgres-backed document stores.
//!
//! This module persists the three marketplace collections in PostgreSQL.
//! Listings and orders are stored as whole JSONB documents next to the
//! columns the exact-match queries filter on; baskets keep their entry list
//! in a JSONB array that is mutated in place.
//!
//! ## Schema
//!
//! The stores expect the following tables to be provisioned:
//!
//! ```sql
//! CREATE TABLE products (
//!     id          UUID PRIMARY KEY,
//!     seller_id   TEXT NOT NULL,
//!     category    TEXT NOT NULL,
//!     document    JSONB NOT NULL,
//!     created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! CREATE INDEX products_seller_idx ON products (seller_id);
//! CREATE INDEX products_category_idx ON products (category);
//!
//! CREATE TABLE baskets (
//!     user_id       TEXT NOT NULL,
//!     kind          TEXT NOT NULL,
//!     last_added_by TEXT,
//!     items         JSONB NOT NULL DEFAULT '[]'::jsonb,
//!     updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (user_id, kind)
//! );
//!
//! CREATE TABLE orders (
//!     id          UUID PRIMARY KEY,
//!     buyer_id    TEXT NOT NULL,
//!     seller_id   TEXT NOT NULL,
//!     placed_at   TIMESTAMPTZ NOT NULL,
//!     document    JSONB NOT NULL,
//!     created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! CREATE INDEX orders_buyer_idx ON orders (buyer_id);
//! CREATE INDEX orders_seller_idx ON orders (seller_id);
//! ```
//!
//! ## Atomic Basket Mutations
//!
//! `push_item_if_absent` is a single `INSERT ... ON CONFLICT DO UPDATE`
//! whose update is guarded by a JSONB containment check on the existing
//! row. Postgres evaluates the guard and the append under the row lock it
//! takes for the upsert, so two racing pushes of the same product id cannot
//! both append. `pull_items` is likewise a single `UPDATE` that rebuilds
//! the entry array server-side.
//!
//! ## Error Mapping
//!
//! | SQLx Error | `StoreError` | Scenario |
//! |------------|--------------|----------|
//! | `Database` | `Backend` | Constraint violations and other server-side failures |
//! | `PoolClosed` | `Backend` | Connection pool shut down |
//! | `RowNotFound` | `Backend` | Should not occur (queries use `fetch_optional`/`fetch_all`) |
//! | Other | `Backend` | Network errors, connection failures, etc. |
//!
//! Documents that fail to encode or decode map to `StoreError::Serialization`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row};
use tracing::{instrument, Span};

use tradepost_baskets::{Basket, BasketEntry, BasketKind};
use tradepost_catalog::{Category, Product};
use tradepost_core::{ProductId, UserId};
use tradepost_orders::Order;

use super::r#trait::{BasketStore, OrderStore, ProductStore, PushOutcome, StoreError};

/// Postgres-backed stores for products, baskets and orders.
///
/// Uses a SQLx connection pool, so the struct is cheap to clone and safe to
/// share across threads. Every operation is a single statement; the basket
/// mutations rely on Postgres row locking for their atomicity guarantee.
#[derive(Debug, Clone)]
pub struct PostgresStores {
    pool: Arc<PgPool>,
}

impl PostgresStores {
    /// Create stores backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn fetch_basket(
        &self,
        user_id: &UserId,
        kind: BasketKind,
    ) -> Result<Option<Basket>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, kind, last_added_by, items
            FROM baskets
            WHERE user_id = $1 AND kind = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(kind.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_basket", e))?;

        match row {
            Some(row) => {
                let basket = BasketRow::from_row(&row)
                    .map_err(|e| {
                        StoreError::Serialization(format!("failed to read basket row: {e}"))
                    })?
                    .into_basket()?;
                Ok(Some(basket))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ProductStore for PostgresStores {
    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn put(&self, product: Product) -> Result<(), StoreError> {
        let document = serde_json::to_value(&product).map_err(|e| {
            StoreError::Serialization(format!("failed to encode product {}: {e}", product.id))
        })?;

        sqlx::query(
            r#"
            INSERT INTO products (id, seller_id, category, document)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                seller_id = EXCLUDED.seller_id,
                category = EXCLUDED.category,
                document = EXCLUDED.document
            "#,
        )
        .bind(*product.id.as_uuid())
        .bind(product.seller_id.as_str())
        .bind(product.category.as_str())
        .bind(&document)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("put_product", e))?;

        Ok(())
    }

    #[instrument(skip(self, id), fields(product_id = %id), err)]
    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT document FROM products WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        match row {
            Some(row) => Ok(Some(decode_product(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, category), fields(count = tracing::field::Empty), err)]
    async fn list(&self, category: Option<&Category>) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT document
            FROM products
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY id ASC
            "#,
        )
        .bind(category.map(Category::as_str))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(decode_product(&row)?);
        }

        Span::current().record("count", products.len());
        Ok(products)
    }

    #[instrument(skip(self), fields(seller_id = %seller_id, count = tracing::field::Empty), err)]
    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT document
            FROM products
            WHERE seller_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(seller_id.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products_by_seller", e))?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(decode_product(&row)?);
        }

        Span::current().record("count", products.len());
        Ok(products)
    }

    #[instrument(skip(self, id), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, ids), fields(requested = ids.len(), removed = tracing::field::Empty), err)]
    async fn delete_many(&self, ids: &[ProductId]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let result = sqlx::query("DELETE FROM products WHERE id = ANY($1)")
            .bind(&uuids)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_products", e))?;

        let removed = result.rows_affected() as usize;
        Span::current().record("removed", removed);
        Ok(removed)
    }
}

#[async_trait]
impl BasketStore for PostgresStores {
    #[instrument(skip(self), fields(user_id = %user_id, kind = %kind), err)]
    async fn find(
        &self,
        user_id: &UserId,
        kind: BasketKind,
    ) -> Result<Option<Basket>, StoreError> {
        self.fetch_basket(user_id, kind).await
    }

    /// One upsert statement: the insert arm covers the first entry of a new
    /// document, the update arm appends only when the containment guard
    /// confirms the product id is absent. No row back means the guard
    /// rejected the append.
    #[instrument(
        skip(self, entry),
        fields(
            user_id = %user_id,
            kind = %kind,
            product_id = %entry.product_id,
            outcome = tracing::field::Empty
        ),
        err
    )]
    async fn push_item_if_absent(
        &self,
        user_id: &UserId,
        kind: BasketKind,
        entry: BasketEntry,
    ) -> Result<PushOutcome, StoreError> {
        let product_id = entry.product_id.to_string();
        let added_by = entry.added_by.as_str().to_string();
        let entry_json = serde_json::to_value(&entry).map_err(|e| {
            StoreError::Serialization(format!(
                "failed to encode basket entry {}: {e}",
                entry.product_id
            ))
        })?;

        let row = sqlx::query(
            r#"
            INSERT INTO baskets (user_id, kind, last_added_by, items)
            VALUES ($1, $2, $3, jsonb_build_array($4::jsonb))
            ON CONFLICT (user_id, kind)
            DO UPDATE SET
                items = baskets.items || $4::jsonb,
                last_added_by = EXCLUDED.last_added_by,
                updated_at = NOW()
            WHERE NOT baskets.items @> jsonb_build_array(
                jsonb_build_object('product_id', $5::text)
            )
            RETURNING user_id, kind, last_added_by, items
            "#,
        )
        .bind(user_id.as_str())
        .bind(kind.as_str())
        .bind(&added_by)
        .bind(&entry_json)
        .bind(&product_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("push_basket_item", e))?;

        let span = Span::current();
        match row {
            Some(row) => {
                let basket = BasketRow::from_row(&row)
                    .map_err(|e| {
                        StoreError::Serialization(format!("failed to read basket row: {e}"))
                    })?
                    .into_basket()?;
                span.record("outcome", "added");
                Ok(PushOutcome::Added(basket))
            }
            None => {
                // Documents are never deleted once created, so the row the
                // guard saw must still be there.
                let basket = self.fetch_basket(user_id, kind).await?.ok_or_else(|| {
                    StoreError::Backend(format!(
                        "basket ({}, {kind}) vanished between upsert and read",
                        user_id.as_str()
                    ))
                })?;
                span.record("outcome", "already_present");
                Ok(PushOutcome::AlreadyPresent(basket))
            }
        }
    }

    #[instrument(
        skip(self, product_ids),
        fields(user_id = %user_id, kind = %kind, pulled = product_ids.len()),
        err
    )]
    async fn pull_items(
        &self,
        user_id: &UserId,
        kind: BasketKind,
        product_ids: &[ProductId],
    ) -> Result<Option<Basket>, StoreError> {
        let id_strings: Vec<String> = product_ids.iter().map(ProductId::to_string).collect();

        let row = sqlx::query(
            r#"
            UPDATE baskets
            SET items = COALESCE(
                    (
                        SELECT jsonb_agg(entry ORDER BY idx)
                        FROM jsonb_array_elements(baskets.items)
                            WITH ORDINALITY AS kept(entry, idx)
                        WHERE NOT (entry->>'product_id' = ANY($3::text[]))
                    ),
                    '[]'::jsonb
                ),
                updated_at = NOW()
            WHERE user_id = $1 AND kind = $2
            RETURNING user_id, kind, last_added_by, items
            "#,
        )
        .bind(user_id.as_str())
        .bind(kind.as_str())
        .bind(&id_strings)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("pull_basket_items", e))?;

        match row {
            Some(row) => {
                let basket = BasketRow::from_row(&row)
                    .map_err(|e| {
                        StoreError::Serialization(format!("failed to read basket row: {e}"))
                    })?
                    .into_basket()?;
                Ok(Some(basket))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderStore for PostgresStores {
    #[instrument(skip(self, order), fields(order_id = %order.id()), err)]
    async fn insert(&self, order: Order) -> Result<(), StoreError> {
        let document = serde_json::to_value(&order).map_err(|e| {
            StoreError::Serialization(format!("failed to encode order {}: {e}", order.id()))
        })?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, buyer_id, seller_id, placed_at, document)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*order.id().as_uuid())
        .bind(order.buyer_id().as_str())
        .bind(order.seller_id().as_str())
        .bind(order.placed_at())
        .bind(&document)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(buyer_id = %buyer_id, count = tracing::field::Empty), err)]
    async fn list_by_buyer(&self, buyer_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT document
            FROM orders
            WHERE buyer_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(buyer_id.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders_by_buyer", e))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(decode_order(&row)?);
        }

        Span::current().record("count", orders.len());
        Ok(orders)
    }

    #[instrument(skip(self), fields(seller_id = %seller_id, count = tracing::field::Empty), err)]
    async fn list_by_seller(&self, seller_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT document
            FROM orders
            WHERE seller_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(seller_id.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders_by_seller", e))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(decode_order(&row)?);
        }

        Span::current().record("count", orders.len());
        Ok(orders)
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Backend(format!(
            "database error in {operation}: {}",
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::RowNotFound => {
            StoreError::Backend(format!("unexpected row not found in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

fn decode_product(row: &sqlx::postgres::PgRow) -> Result<Product, StoreError> {
    let document: serde_json::Value = row
        .try_get("document")
        .map_err(|e| StoreError::Serialization(format!("failed to read product row: {e}")))?;
    serde_json::from_value(document)
        .map_err(|e| StoreError::Serialization(format!("failed to decode product document: {e}")))
}

fn decode_order(row: &sqlx::postgres::PgRow) -> Result<Order, StoreError> {
    let document: serde_json::Value = row
        .try_get("document")
        .map_err(|e| StoreError::Serialization(format!("failed to read order row: {e}")))?;
    serde_json::from_value(document)
        .map_err(|e| StoreError::Serialization(format!("failed to decode order document: {e}")))
}

// SQLx row types

#[derive(Debug)]
struct BasketRow {
    user_id: String,
    kind: String,
    last_added_by: Option<String>,
    items: serde_json::Value,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for BasketRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(BasketRow {
            user_id: row.try_get("user_id")?,
            kind: row.try_get("kind")?,
            last_added_by: row.try_get("last_added_by")?,
            items: row.try_get("items")?,
        })
    }
}

impl BasketRow {
    fn into_basket(self) -> Result<Basket, StoreError> {
        let user_id = UserId::new(self.user_id)
            .map_err(|e| StoreError::Serialization(format!("bad basket row: {e}")))?;
        let kind: BasketKind = self
            .kind
            .parse()
            .map_err(|e| StoreError::Serialization(format!("bad basket row: {e}")))?;
        let last_added_by = self
            .last_added_by
            .map(UserId::new)
            .transpose()
            .map_err(|e| StoreError::Serialization(format!("bad basket row: {e}")))?;
        let items: Vec<BasketEntry> = serde_json::from_value(self.items).map_err(|e| {
            StoreError::Serialization(format!("failed to decode basket items: {e}"))
        })?;

        Ok(Basket::from_parts(user_id, kind, last_added_by, items))
    }
}
