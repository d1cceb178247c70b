use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(place_order))
        .route("/by-buyer", get(list_by_buyer))
        .route("/by-seller", get(list_by_seller))
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PlaceOrderRequest>,
) -> axum::response::Response {
    let draft = match dto::to_order_draft(body) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    match services.checkout.place_order(draft).await {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_to_json(order))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_by_buyer(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::UserQuery>,
) -> axum::response::Response {
    let Some(raw) = query.user_id else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "userId query parameter is required",
        );
    };
    let buyer_id = match dto::parse_user_id(raw) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.orders.by_buyer(&buyer_id).await {
        Ok(orders) => {
            let items = orders.into_iter().map(dto::order_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_by_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SellerQuery>,
) -> axum::response::Response {
    let Some(raw) = query.seller_id else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "sellerId query parameter is required",
        );
    };
    let seller_id = match dto::parse_user_id(raw) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.orders.by_seller(&seller_id).await {
        Ok(orders) => {
            let items = orders.into_iter().map(dto::order_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
