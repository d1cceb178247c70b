use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use tradepost_catalog::{Category, NewListing};
use tradepost_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_listing).get(list_products))
        .route("/:id", get(get_product))
        .route("/by-user/:seller_id", get(list_by_seller))
}

pub async fn create_listing(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateListingRequest>,
) -> axum::response::Response {
    let seller_id = match dto::parse_user_id(body.user_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let submission = NewListing {
        title: body.title,
        description: body.description,
        price: body.price,
        category: body.category,
        seller_id,
        photo_urls: body.photos,
    };

    match services.catalog.create_listing(submission).await {
        Ok(product) => {
            (StatusCode::CREATED, Json(dto::product_to_json(product))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match services.catalog.get(id).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CatalogQuery>,
) -> axum::response::Response {
    let category = match query.category {
        Some(raw) => match Category::new(raw) {
            Ok(c) => Some(c),
            Err(e) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
            }
        },
        None => None,
    };

    match services.catalog.list(category.as_ref()).await {
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

pub async fn list_by_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Path(seller_id): Path<String>,
) -> axum::response::Response {
    let seller_id = match dto::parse_user_id(seller_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.list_by_seller(&seller_id).await {
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
