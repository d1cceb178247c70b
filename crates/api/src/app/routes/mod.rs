use axum::Router;

pub mod baskets;
pub mod orders;
pub mod products;
pub mod system;

/// Router for all marketplace endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/cart", baskets::cart_router())
        .nest("/wishlist", baskets::wishlist_router())
        .nest("/orders", orders::router())
}
