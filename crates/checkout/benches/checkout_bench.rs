use std::sync::Arc;
use std::time::Duration;

use cart::{CartStore, InMemoryCartStore};
use checkout::{CheckoutRequest, CheckoutService, SimulatedGateway};
use common::{Money, SessionId, Tenant};
use criterion::{Criterion, criterion_group, criterion_main};
use store::{InMemoryCatalog, InMemoryOrders, Product};

fn bench_checkout_happy_path(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let catalog = Arc::new(InMemoryCatalog::new());
    let orders = Arc::new(InMemoryOrders::new());
    let carts = Arc::new(InMemoryCartStore::new());
    let tenant = Tenant::new("bench");
    let session = SessionId::new("bench-session").unwrap();

    let product = Product::new(
        tenant.id,
        "Benchmark Widget",
        Money::from_cents(1000),
        i64::MAX / 2,
    );
    let product_id = product.id.to_string();
    rt.block_on(catalog.insert(product));

    let service = CheckoutService::new(
        catalog,
        orders,
        carts.clone(),
        SimulatedGateway::new(Duration::ZERO),
    );

    c.bench_function("checkout/happy_path_single_item", |b| {
        b.iter(|| {
            rt.block_on(async {
                carts
                    .add_item(&tenant.slug, &session, &product_id, 1)
                    .await
                    .unwrap();
                service
                    .checkout(
                        &tenant,
                        Some(&session),
                        CheckoutRequest {
                            shipping_address: "1 Bench Way".to_string(),
                            payment_method: "credit_card".to_string(),
                        },
                    )
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_checkout_happy_path);
criterion_main!(benches);
