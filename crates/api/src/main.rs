#[tokio::main]
async fn main() {
    tradepost_observability::init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or_else(|| {
            tracing::warn!("PORT not set or unparseable; defaulting to 8080");
            8080
        });

    let app = tradepost_api::app::build_app().await;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
