use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::sync::Arc;

use tradepost_baskets::{BasketEntry, BasketKind};
use tradepost_catalog::NewListing;
use tradepost_core::{ProductId, UserId};
use tradepost_infra::{
    BasketService, BasketStore, CheckoutService, InMemoryStores, ProductStore,
};
use tradepost_orders::{LineItem, OrderDraft};

fn setup() -> (tokio::runtime::Runtime, Arc<InMemoryStores>) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let stores = Arc::new(InMemoryStores::new());
    (rt, stores)
}

fn bench_listing(index: usize, seller: &UserId) -> NewListing {
    NewListing {
        title: format!("Item {index}"),
        description: "Benchmark listing".to_string(),
        price: 1_000,
        category: "misc".to_string(),
        seller_id: seller.clone(),
        photo_urls: vec![],
    }
}

fn bench_basket_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("basket_push_latency");
    group.sample_size(1000);

    // First entry into a fresh document: the insert arm of the upsert.
    group.bench_function("first_entry_for_a_fresh_user", |b| {
        let (rt, stores) = setup();
        let mut n = 0u64;
        b.iter(|| {
            n += 1;
            let user = UserId::new(format!("buyer-{n}")).unwrap();
            let entry = BasketEntry::new(ProductId::new(), user.clone());
            rt.block_on(async {
                black_box(
                    stores
                        .push_item_if_absent(&user, BasketKind::Cart, entry)
                        .await
                        .unwrap(),
                );
            });
        });
    });

    // Re-pushing a present id: the guard rejects, the document is unchanged.
    group.bench_function("duplicate_id_rejected", |b| {
        let (rt, stores) = setup();
        let user = UserId::new("buyer-0").unwrap();
        let product_id = ProductId::new();
        rt.block_on(async {
            stores
                .push_item_if_absent(
                    &user,
                    BasketKind::Cart,
                    BasketEntry::new(product_id, user.clone()),
                )
                .await
                .unwrap();
        });

        b.iter(|| {
            rt.block_on(async {
                black_box(
                    stores
                        .push_item_if_absent(
                            &user,
                            BasketKind::Cart,
                            BasketEntry::new(product_id, user.clone()),
                        )
                        .await
                        .unwrap(),
                );
            });
        });
    });

    group.finish();
}

fn bench_basket_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("basket_expand_latency");

    for entry_count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*entry_count as u64));
        group.bench_with_input(
            BenchmarkId::new("expand", entry_count),
            entry_count,
            |b, &count| {
                let (rt, stores) = setup();
                let service = BasketService::new(stores.clone(), stores.clone());
                let user = UserId::new("buyer-0").unwrap();
                let seller = UserId::new("seller-0").unwrap();

                rt.block_on(async {
                    for i in 0..count {
                        let product = bench_listing(i, &seller).into_product().unwrap();
                        stores.put(product.clone()).await.unwrap();
                        stores
                            .push_item_if_absent(
                                &user,
                                BasketKind::Cart,
                                BasketEntry::new(product.id, user.clone()),
                            )
                            .await
                            .unwrap();
                    }
                });

                b.iter(|| {
                    rt.block_on(async {
                        black_box(service.expanded(&user, BasketKind::Cart).await.unwrap());
                    });
                });
            },
        );
    }

    group.finish();
}

fn bench_checkout(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkout_latency");
    group.sample_size(500);

    // Seed a listing, cart it, place the order. Each iteration leaves the
    // cart empty again, so the measured state stays constant.
    group.bench_function("single_line_order_end_to_end", |b| {
        let (rt, stores) = setup();
        let baskets = BasketService::new(stores.clone(), stores.clone());
        let checkout = CheckoutService::new(stores.clone(), stores.clone(), stores.clone());
        let buyer = UserId::new("buyer-0").unwrap();
        let seller = UserId::new("seller-0").unwrap();

        let mut n = 0usize;
        b.iter(|| {
            n += 1;
            rt.block_on(async {
                let product = bench_listing(n, &seller).into_product().unwrap();
                stores.put(product.clone()).await.unwrap();
                baskets
                    .add_item(&buyer, BasketKind::Cart, product.id, &buyer)
                    .await
                    .unwrap();

                let draft = OrderDraft {
                    buyer_id: buyer.clone(),
                    seller_id: seller.clone(),
                    lines: vec![LineItem {
                        product_id: product.id,
                        title: product.title.clone(),
                        description: product.description.clone(),
                        price: product.price,
                        category: product.category.clone(),
                        image_url: None,
                    }],
                };
                black_box(checkout.place_order(draft).await.unwrap());
            });
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_basket_push,
    bench_basket_expand,
    bench_checkout
);
criterion_main!(benches);
