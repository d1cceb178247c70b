use axum::http::StatusCode;
use serde::Deserialize;

use tradepost_baskets::{Basket, BasketEntry};
use tradepost_catalog::{Category, Product};
use tradepost_core::{ProductId, UserId};
use tradepost_orders::{LineItem, Order, OrderDraft};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /cart/items` and `POST /wishlist/items`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBasketItemRequest {
    pub product_id: String,
    pub user_id: String,
    pub added_by: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub price: u64,
    pub category: String,
    pub user_id: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: String,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub category: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub user_id: String,
    pub seller_id: String,
    pub products: Vec<OrderLineRequest>,
}

// -------------------------
// Query DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerQuery {
    pub seller_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "title": p.title,
        "description": p.description,
        "price": p.price,
        "category": p.category.as_str(),
        "sellerId": p.seller_id.as_str(),
        "photoUrls": p.photo_urls,
        "listedAt": p.listed_at.to_rfc3339(),
    })
}

pub fn basket_to_json(b: Basket) -> serde_json::Value {
    serde_json::json!({
        "userId": b.user_id().as_str(),
        "kind": b.kind().as_str(),
        "lastAddedBy": b.last_added_by().map(UserId::as_str),
        "items": b.items().iter().map(basket_entry_to_json).collect::<Vec<_>>(),
    })
}

fn basket_entry_to_json(e: &BasketEntry) -> serde_json::Value {
    serde_json::json!({
        "productId": e.product_id.to_string(),
        "addedBy": e.added_by.as_str(),
        "addedAt": e.added_at.to_rfc3339(),
    })
}

pub fn order_to_json(o: Order) -> serde_json::Value {
    serde_json::json!({
        "id": o.id().to_string(),
        "userId": o.buyer_id().as_str(),
        "sellerId": o.seller_id().as_str(),
        "placedAt": o.placed_at().to_rfc3339(),
        "products": o.lines().iter().map(order_line_to_json).collect::<Vec<_>>(),
    })
}

fn order_line_to_json(l: &LineItem) -> serde_json::Value {
    serde_json::json!({
        "productId": l.product_id.to_string(),
        "title": l.title,
        "description": l.description,
        "price": l.price,
        "category": l.category.as_str(),
        "imageUrl": l.image_url,
    })
}

/// Parse an order submission into a draft, or a ready-made 400 response.
pub fn to_order_draft(req: PlaceOrderRequest) -> Result<OrderDraft, axum::response::Response> {
    let buyer_id = parse_user_id(req.user_id)?;
    let seller_id = parse_user_id(req.seller_id)?;

    let mut lines = Vec::with_capacity(req.products.len());
    for l in req.products {
        let product_id: ProductId = match l.product_id.parse() {
            Ok(v) => v,
            Err(_) => {
                return Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid product id",
                ))
            }
        };
        let category = match Category::new(l.category) {
            Ok(v) => v,
            Err(e) => {
                return Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    e.to_string(),
                ))
            }
        };
        lines.push(LineItem {
            product_id,
            title: l.title,
            description: l.description,
            price: l.price,
            category,
            image_url: l.image_url,
        });
    }

    Ok(OrderDraft {
        buyer_id,
        seller_id,
        lines,
    })
}

pub fn parse_user_id(raw: impl Into<String>) -> Result<UserId, axum::response::Response> {
    UserId::new(raw).map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
    })
}
