use std::sync::Arc;

use sqlx::PgPool;

use tradepost_infra::{
    BasketService, CatalogService, CheckoutService, DynBasketStore, DynOrderStore,
    DynProductStore, InMemoryStores, OrderQueries, PostgresStores,
};

/// Wired service handles shared by every request handler.
///
/// Handlers never see a store directly; they go through these services, so
/// swapping the backend is invisible above this file.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService<DynProductStore>>,
    pub baskets: Arc<BasketService<DynBasketStore, DynProductStore>>,
    pub checkout: Arc<CheckoutService<DynProductStore, DynBasketStore, DynOrderStore>>,
    pub orders: Arc<OrderQueries<DynOrderStore>>,
}

/// Build the service set from the environment.
///
/// `USE_PERSISTENT_STORES=true` selects Postgres (connection string taken
/// from `DATABASE_URL`); anything else wires the in-memory stores.
pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        return build_persistent_services().await;
    }

    build_in_memory_services()
}

fn build_in_memory_services() -> AppServices {
    // In-memory wiring (dev/test): one store behind all three handles.
    let stores = Arc::new(InMemoryStores::new());

    let products: DynProductStore = stores.clone();
    let baskets: DynBasketStore = stores.clone();
    let orders: DynOrderStore = stores;

    wire(products, baskets, orders)
}

async fn build_persistent_services() -> AppServices {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for persistent stores");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("failed to connect to postgres");

    let stores = Arc::new(PostgresStores::new(pool));

    let products: DynProductStore = stores.clone();
    let baskets: DynBasketStore = stores.clone();
    let orders: DynOrderStore = stores;

    wire(products, baskets, orders)
}

fn wire(
    products: DynProductStore,
    baskets: DynBasketStore,
    orders: DynOrderStore,
) -> AppServices {
    AppServices {
        catalog: Arc::new(CatalogService::new(products.clone())),
        baskets: Arc::new(BasketService::new(baskets.clone(), products.clone())),
        checkout: Arc::new(CheckoutService::new(products, baskets, orders.clone())),
        orders: Arc::new(OrderQueries::new(orders)),
    }
}
