use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use tradepost_baskets::BasketKind;
use tradepost_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

// Cart and wishlist expose the same surface; each named handler pins the
// kind and delegates.

pub fn cart_router() -> Router {
    Router::new()
        .route("/", get(expand_cart))
        .route("/items", post(add_to_cart))
        .route("/items/:user_id/:product_id", delete(remove_from_cart))
}

pub fn wishlist_router() -> Router {
    Router::new()
        .route("/", get(expand_wishlist))
        .route("/items", post(add_to_wishlist))
        .route("/items/:user_id/:product_id", delete(remove_from_wishlist))
}

pub async fn add_to_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AddBasketItemRequest>,
) -> axum::response::Response {
    add_item(services, BasketKind::Cart, body).await
}

pub async fn add_to_wishlist(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AddBasketItemRequest>,
) -> axum::response::Response {
    add_item(services, BasketKind::Wishlist, body).await
}

pub async fn remove_from_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> axum::response::Response {
    remove_item(services, BasketKind::Cart, user_id, product_id).await
}

pub async fn remove_from_wishlist(
    Extension(services): Extension<Arc<AppServices>>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> axum::response::Response {
    remove_item(services, BasketKind::Wishlist, user_id, product_id).await
}

pub async fn expand_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::UserQuery>,
) -> axum::response::Response {
    expand(services, BasketKind::Cart, query).await
}

pub async fn expand_wishlist(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::UserQuery>,
) -> axum::response::Response {
    expand(services, BasketKind::Wishlist, query).await
}

async fn add_item(
    services: Arc<AppServices>,
    kind: BasketKind,
    body: dto::AddBasketItemRequest,
) -> axum::response::Response {
    let user_id = match dto::parse_user_id(body.user_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let added_by = match dto::parse_user_id(body.added_by) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let product_id: ProductId = match body.product_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match services
        .baskets
        .add_item(&user_id, kind, product_id, &added_by)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": format!("item added to {kind}") })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

async fn remove_item(
    services: Arc<AppServices>,
    kind: BasketKind,
    user_id: String,
    product_id: String,
) -> axum::response::Response {
    let user_id = match dto::parse_user_id(user_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let product_id: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match services.baskets.remove_item(&user_id, kind, product_id).await {
        Ok(basket) => (StatusCode::OK, Json(dto::basket_to_json(basket))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

async fn expand(
    services: Arc<AppServices>,
    kind: BasketKind,
    query: dto::UserQuery,
) -> axum::response::Response {
    let Some(raw) = query.user_id else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "userId query parameter is required",
        );
    };
    let user_id = match dto::parse_user_id(raw) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.baskets.expanded(&user_id, kind).await {
        Ok(products) => {
            let items = products
                .into_iter()
                .map(dto::product_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
