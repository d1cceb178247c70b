use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        // USE_PERSISTENT_STORES is unset here, so each server gets its own
        // fresh in-memory stores.
        let app = tradepost_api::app::build_app().await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_listing(
    client: &reqwest::Client,
    base_url: &str,
    seller: &str,
    title: &str,
    category: &str,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/products", base_url))
        .json(&json!({
            "title": title,
            "description": "well loved",
            "price": 2500,
            "category": category,
            "userId": seller,
            "photos": ["https://img.example/1.jpg"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn add_to(
    client: &reqwest::Client,
    base_url: &str,
    surface: &str,
    user: &str,
    product_id: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/{}/items", base_url, surface))
        .json(&json!({
            "productId": product_id,
            "userId": user,
            "addedBy": user,
        }))
        .send()
        .await
        .unwrap()
}

fn order_line(product: &serde_json::Value) -> serde_json::Value {
    json!({
        "productId": product["id"],
        "title": product["title"],
        "description": product["description"],
        "price": product["price"],
        "category": product["category"],
        "imageUrl": product["photoUrls"][0],
    })
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn listing_lifecycle_create_get_filter() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create_listing(&client, &srv.base_url, "seller-1", "Road Bike", "Bikes").await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["sellerId"], "seller-1");
    // Categories are stored normalised.
    assert_eq!(created["category"], "bikes");

    let res = client
        .get(format!("{}/products/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["title"], "Road Bike");
    assert_eq!(fetched["photoUrls"].as_array().unwrap().len(), 1);

    create_listing(&client, &srv.base_url, "seller-2", "Tent", "camping").await;

    // The category filter normalises the query the same way as storage.
    let res = client
        .get(format!("{}/products?category=BIKES", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: serde_json::Value = res.json().await.unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"].as_str().unwrap(), id);

    let res = client
        .get(format!("{}/products", srv.base_url))
        .send()
        .await
        .unwrap();
    let all: serde_json::Value = res.json().await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let res = client
        .get(format!("{}/products/by-user/seller-2", srv.base_url))
        .send()
        .await
        .unwrap();
    let mine: serde_json::Value = res.json().await.unwrap();
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["title"], "Tent");
}

#[tokio::test]
async fn malformed_product_id_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/products/not-a-uuid", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    // A well-formed but unknown id is a 404 instead.
    let res = client
        .get(format!("{}/products/{}", srv.base_url, uuid::Uuid::now_v7()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn duplicate_cart_add_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let product = create_listing(&client, &srv.base_url, "seller-1", "Road Bike", "bikes").await;
    let id = product["id"].as_str().unwrap();

    let res = add_to(&client, &srv.base_url, "cart", "buyer-1", id).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "item added to cart");

    let res = add_to(&client, &srv.base_url, "cart", "buyer-1", id).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_item");

    // The same product in the wishlist is a different document.
    let res = add_to(&client, &srv.base_url, "wishlist", "buyer-1", id).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn basket_queries_require_a_user() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/cart", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    // A user who never added anything has no cart document.
    let res = client
        .get(format!("{}/cart?userId=ghost", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removal_returns_the_document_and_is_idempotent() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let product = create_listing(&client, &srv.base_url, "seller-1", "Road Bike", "bikes").await;
    let id = product["id"].as_str().unwrap();

    let res = add_to(&client, &srv.base_url, "cart", "buyer-1", id).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(format!("{}/cart/items/buyer-1/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let doc: serde_json::Value = res.json().await.unwrap();
    assert_eq!(doc["userId"], "buyer-1");
    assert_eq!(doc["kind"], "cart");
    assert_eq!(doc["items"].as_array().unwrap().len(), 0);

    // Removing the same id again succeeds against the now-empty document.
    let res = client
        .delete(format!("{}/cart/items/buyer-1/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // A user with no document at all is a 404.
    let res = client
        .delete(format!("{}/cart/items/stranger/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_placement_clears_the_cart_and_retires_listings() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let bike = create_listing(&client, &srv.base_url, "seller-1", "Road Bike", "bikes").await;
    let tent = create_listing(&client, &srv.base_url, "seller-1", "Tent", "camping").await;
    let bike_id = bike["id"].as_str().unwrap();
    let tent_id = tent["id"].as_str().unwrap();

    assert_eq!(
        add_to(&client, &srv.base_url, "cart", "buyer-1", bike_id).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        add_to(&client, &srv.base_url, "cart", "buyer-1", tent_id).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        add_to(&client, &srv.base_url, "wishlist", "buyer-1", bike_id).await.status(),
        StatusCode::OK
    );

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .json(&json!({
            "userId": "buyer-1",
            "sellerId": "seller-1",
            "products": [order_line(&bike), order_line(&tent)],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: serde_json::Value = res.json().await.unwrap();
    assert_eq!(order["userId"], "buyer-1");
    assert_eq!(order["products"].as_array().unwrap().len(), 2);

    // The cart document survives, emptied.
    let res = client
        .get(format!("{}/cart?userId=buyer-1", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cart: serde_json::Value = res.json().await.unwrap();
    assert_eq!(cart.as_array().unwrap().len(), 0);

    // Purchased listings are gone from the catalog.
    let res = client
        .get(format!("{}/products/{}", srv.base_url, bike_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The wishlist keeps its reference; expansion just drops the retired
    // listing.
    let res = client
        .get(format!("{}/wishlist?userId=buyer-1", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let wishlist: serde_json::Value = res.json().await.unwrap();
    assert_eq!(wishlist.as_array().unwrap().len(), 0);

    // Both sides of the trade can query the order.
    let res = client
        .get(format!("{}/orders/by-buyer?userId=buyer-1", srv.base_url))
        .send()
        .await
        .unwrap();
    let bought: serde_json::Value = res.json().await.unwrap();
    assert_eq!(bought.as_array().unwrap().len(), 1);
    assert_eq!(bought[0]["id"], order["id"]);

    let res = client
        .get(format!("{}/orders/by-seller?sellerId=seller-1", srv.base_url))
        .send()
        .await
        .unwrap();
    let sold: serde_json::Value = res.json().await.unwrap();
    assert_eq!(sold.as_array().unwrap().len(), 1);

    // Order lines kept their snapshot even though the listings are gone.
    assert_eq!(bought[0]["products"][0]["title"], "Road Bike");
}

#[tokio::test]
async fn an_order_with_no_lines_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .json(&json!({
            "userId": "buyer-1",
            "sellerId": "seller-1",
            "products": [],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}
