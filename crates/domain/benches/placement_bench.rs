use criterion::{Criterion, criterion_group, criterion_main};
use domain::{NewProduct, OrderLine, OrderService, OrderStatus, ProductId, TransitionPolicy};
use rust_decimal::Decimal;
use store::{InMemoryStore, ProductStore};

fn seeded_service(
    rt: &tokio::runtime::Runtime,
    products: usize,
) -> (OrderService<InMemoryStore>, Vec<ProductId>) {
    let store = InMemoryStore::new();
    let ids = rt.block_on(async {
        let mut ids = Vec::with_capacity(products);
        for n in 0..products {
            let product = store
                .create_product(NewProduct::new(
                    format!("Bench {n}"),
                    Decimal::ONE,
                    i64::MAX / 2,
                ))
                .await
                .unwrap();
            ids.push(product.id);
        }
        ids
    });
    (OrderService::new(store), ids)
}

fn bench_place_single_line(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (service, ids) = seeded_service(&rt, 1);

    c.bench_function("domain/place_order_1_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .place_order(vec![OrderLine::new(ids[0], 1)])
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_place_ten_lines(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (service, ids) = seeded_service(&rt, 10);
    let lines: Vec<OrderLine> = ids.iter().map(|id| OrderLine::new(*id, 1)).collect();

    c.bench_function("domain/place_order_10_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.place_order(lines.clone()).await.unwrap();
            });
        });
    });
}

fn bench_rejected_placement(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (service, ids) = seeded_service(&rt, 10);
    let mut lines: Vec<OrderLine> = ids.iter().map(|id| OrderLine::new(*id, 1)).collect();
    lines.push(OrderLine::new(ProductId::new(-1), 1));

    c.bench_function("domain/place_order_rejected_after_10_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.place_order(lines.clone()).await.unwrap_err();
            });
        });
    });
}

fn bench_status_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    let product = rt.block_on(async {
        store
            .create_product(NewProduct::new("Bench", Decimal::ONE, 1))
            .await
            .unwrap()
    });
    let service = OrderService::with_policy(store, TransitionPolicy::Override);
    let order =
        rt.block_on(async { service.place_order(vec![OrderLine::new(product.id, 1)]).await.unwrap() });

    c.bench_function("domain/update_status", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .update_status(order.id, OrderStatus::Sent)
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_place_single_line,
    bench_place_ten_lines,
    bench_rejected_placement,
    bench_status_cycle,
);
criterion_main!(benches);
